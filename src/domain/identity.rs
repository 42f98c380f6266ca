//! Maps caption filenames to video ids.
//!
//! Files are named `[<video id>]<anything>.vtt`. Anything else is left
//! unresolved and reported by the caller.

use regex::Regex;
use std::sync::OnceLock;

const CAPTION_SUFFIX: &str = ".vtt";
const BRACKET_ID_PATTERN: &str = r"^\[([^\]]+)\]";

fn bracket_id() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BRACKET_ID_PATTERN).ok())
        .as_ref()
}

/// Returns the bracketed video id at the start of `filename`, if any.
pub fn resolve(filename: &str) -> Option<String> {
    let stem = filename.strip_suffix(CAPTION_SUFFIX).unwrap_or(filename);
    bracket_id()?
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Case-insensitive check for the caption file extension.
pub fn is_caption_file(filename: &str) -> bool {
    filename.len() >= CAPTION_SUFFIX.len()
        && filename
            .get(filename.len() - CAPTION_SUFFIX.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CAPTION_SUFFIX))
}
