use crate::error::CaptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A caption track as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language: String,
    /// Raw item returned by the service, kept opaque
    pub metadata: serde_json::Value,
}

/// A `.vtt` file found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCaptionFile {
    pub filename: String,
    pub path: PathBuf,
    /// Video id parsed from the filename, if it follows the bracket convention
    pub resource_id: Option<String>,
}

impl LocalCaptionFile {
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let resource_id = super::identity::resolve(&filename);
        Self {
            filename,
            path: path.to_path_buf(),
            resource_id,
        }
    }
}

/// One video/file/language triple to reconcile.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationTarget {
    pub resource_id: String,
    pub file: LocalCaptionFile,
    pub language: String,
}

impl ReconciliationTarget {
    pub fn new(resource_id: impl Into<String>, file: LocalCaptionFile, language: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            file,
            language: language.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    List,
    Delete,
    Upload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::List => write!(f, "list"),
            Step::Delete => write!(f, "delete"),
            Step::Upload => write!(f, "upload"),
        }
    }
}

/// Terminal result of reconciling one target.
#[derive(Debug)]
pub enum Outcome {
    Success {
        resource_id: String,
        language: String,
    },
    Failure {
        step: Step,
        resource_id: String,
        filename: String,
        error: CaptionError,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn resource_id(&self) -> &str {
        match self {
            Outcome::Success { resource_id, .. } | Outcome::Failure { resource_id, .. } => {
                resource_id
            }
        }
    }

    /// The failed step, if any.
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { step, .. } => Some(*step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_file_from_path_parses_id() {
        let file = LocalCaptionFile::from_path(Path::new("/subs/[vid1]_Title_en.vtt"));
        assert_eq!(file.filename, "[vid1]_Title_en.vtt");
        assert_eq!(file.resource_id.as_deref(), Some("vid1"));
    }

    #[test]
    fn test_local_file_without_brackets() {
        let file = LocalCaptionFile::from_path(Path::new("/subs/stray.vtt"));
        assert_eq!(file.resource_id, None);
    }

    #[test]
    fn test_step_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Step::Delete).unwrap(), "\"delete\"");
        assert_eq!(Step::Upload.to_string(), "upload");
    }

    #[test]
    fn test_outcome_accessors() {
        let failure = Outcome::Failure {
            step: Step::List,
            resource_id: "vid1".to_string(),
            filename: "[vid1].vtt".to_string(),
            error: CaptionError::InvalidResponse("x".to_string()),
        };
        assert!(!failure.is_success());
        assert_eq!(failure.failed_step(), Some(Step::List));
        assert_eq!(failure.resource_id(), "vid1");
    }
}
