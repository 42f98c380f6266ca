use crate::error::{CaptionError, RunError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local source of caption files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSourcePort: Send + Sync {
    /// Caption files directly inside `folder`, in a stable order
    async fn list_caption_files(&self, folder: &Path) -> Result<Vec<PathBuf>, RunError>;

    async fn exists(&self, path: &Path) -> bool;

    async fn read(&self, path: &Path) -> Result<Vec<u8>, CaptionError>;
}
