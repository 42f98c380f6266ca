use crate::domain::CaptionTrack;
use crate::error::CaptionError;
use async_trait::async_trait;

/// Caption store of the video hosting service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionStorePort: Send + Sync {
    /// List every caption track attached to a video
    async fn list(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError>;

    /// Remove the track for `language`. Succeeds if the track is already gone.
    async fn delete(&self, video_id: &str, language: &str) -> Result<(), CaptionError>;

    /// Create a track for `language` from the given WebVTT bytes
    async fn upload(
        &self,
        video_id: &str,
        language: &str,
        contents: Vec<u8>,
        filename: &str,
    ) -> Result<(), CaptionError>;
}
