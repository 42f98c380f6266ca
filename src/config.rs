//! Configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_CAPTIONS_DIR: &str = "./captions";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_API_BASE_URL: &str = "https://ws.api.video";
const DEFAULT_PACING_SECS: u64 = 2;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for a caption synchronization run.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Folder scanned for `[<video id>]<name>.vtt` files
    pub captions_dir: PathBuf,
    /// Caption language used when no override is given
    pub language: String,
    /// Base URL of the video hosting API
    pub api_base_url: String,
    /// API key exchanged for a bearer token
    pub api_key: Option<String>,
    /// Wait between two consecutive videos of a batch
    pub pacing_interval: Duration,
    /// Per-request timeout applied by the HTTP transport
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            captions_dir: PathBuf::from(DEFAULT_CAPTIONS_DIR),
            language: String::from(DEFAULT_LANGUAGE),
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            api_key: None,
            pacing_interval: Duration::from_secs(DEFAULT_PACING_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            captions_dir: env::var("CAPTIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CAPTIONS_DIR)),
            language: env::var("CAPTIONS_LANGUAGE")
                .unwrap_or_else(|_| String::from(DEFAULT_LANGUAGE)),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| String::from(DEFAULT_API_BASE_URL)),
            api_key: env::var("API_KEY").ok().filter(|key| !key.trim().is_empty()),
            pacing_interval: secs_var("PACING_INTERVAL_SECS", DEFAULT_PACING_SECS),
            request_timeout: secs_var("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn secs_var(name: &str, default: u64) -> Duration {
    Duration::from_secs(parse_secs(name, env::var(name).ok().as_deref(), default))
}

fn parse_secs(name: &str, raw: Option<&str>, default: u64) -> u64 {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value, "not a number of seconds, using default {}", default);
            default
        }),
    }
}
