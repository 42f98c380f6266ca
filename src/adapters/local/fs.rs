use crate::domain::identity::is_caption_file;
use crate::error::{CaptionError, RunError};
use crate::ports::files::CaptionSourcePort;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads caption files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsCaptionSource;

impl FsCaptionSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CaptionSourcePort for FsCaptionSource {
    async fn list_caption_files(&self, folder: &Path) -> Result<Vec<PathBuf>, RunError> {
        let io_error = |source: std::io::Error| {
            if source.kind() == ErrorKind::NotFound {
                RunError::FolderNotFound(folder.to_path_buf())
            } else {
                RunError::Io {
                    path: folder.to_path_buf(),
                    source,
                }
            }
        };

        let mut entries = tokio::fs::read_dir(folder).await.map_err(io_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let name = entry.file_name();
            if !is_caption_file(&name.to_string_lossy()) {
                continue;
            }
            // Follows symlinks; a dangling link is simply skipped.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => paths.push(entry.path()),
                _ => continue,
            }
        }

        // read_dir order is platform dependent
        paths.sort();
        Ok(paths)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, CaptionError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| CaptionError::from_io(path, e))
    }
}
