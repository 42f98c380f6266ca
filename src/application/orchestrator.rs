use super::reconciler::Reconciler;
use crate::config::SyncConfig;
use crate::domain::{BatchSummary, CaptionTrack, LocalCaptionFile, Outcome, ReconciliationTarget};
use crate::error::RunError;
use crate::ports::captions::CaptionStorePort;
use crate::ports::credentials::CredentialPort;
use crate::ports::files::CaptionSourcePort;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Drives caption reconciliation for a folder of files, one video at a time.
pub struct BatchOrchestrator<C, F, A> {
    config: SyncConfig,
    credentials: A,
    reconciler: Reconciler<C, F>,
}

impl<C, F, A> BatchOrchestrator<C, F, A>
where
    C: CaptionStorePort,
    F: CaptionSourcePort,
    A: CredentialPort,
{
    pub fn new(config: SyncConfig, captions: C, files: F, credentials: A) -> Self {
        Self {
            config,
            credentials,
            reconciler: Reconciler::new(captions, files),
        }
    }

    /// Reconciles every resolvable caption file in `folder` (default: configured folder).
    pub async fn run(
        &self,
        folder: Option<&Path>,
        language: Option<&str>,
    ) -> Result<BatchSummary, RunError> {
        self.run_until_cancelled(folder, language, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops starting new videos once `cancel` fires.
    ///
    /// A video already in progress always runs to its outcome.
    pub async fn run_until_cancelled(
        &self,
        folder: Option<&Path>,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, RunError> {
        let folder = folder.unwrap_or(self.config.captions_dir.as_path());
        let language = language.unwrap_or(self.config.language.as_str());

        self.credentials.ensure_valid_token().await?;

        let (targets, mut summary) = self.discover(folder, language).await?;
        if targets.is_empty() {
            info!(folder = %folder.display(), "No caption files with a video id, nothing to do");
            return Ok(summary);
        }

        let total = targets.len();
        info!(total, language, "Starting caption sync");

        for (index, target) in targets.into_iter().enumerate() {
            if index > 0 && !cancel.is_cancelled() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.config.pacing_interval) => {}
                }
            }
            if cancel.is_cancelled() {
                summary.skipped.push(target.resource_id);
                continue;
            }

            info!(
                video_id = %target.resource_id,
                file = %target.file.filename,
                "Syncing caption {}/{}",
                index + 1,
                total
            );
            let outcome = self.reconciler.reconcile(&target).await;
            summary.record(outcome);
        }

        if !summary.skipped.is_empty() {
            warn!(skipped = summary.skipped.len(), "Caption sync cancelled");
        }
        info!(
            succeeded = summary.success_count(),
            failed = summary.failure_count(),
            unresolvable = summary.unresolvable.len(),
            "Caption sync finished"
        );
        Ok(summary)
    }

    /// Reconciles a single file for a known video id, bypassing discovery.
    pub async fn run_one(
        &self,
        resource_id: &str,
        path: &Path,
        language: Option<&str>,
    ) -> Result<Outcome, RunError> {
        let language = language.unwrap_or(self.config.language.as_str());

        if !self.reconciler.files().exists(path).await {
            return Err(RunError::FileNotFound(path.to_path_buf()));
        }
        self.credentials.ensure_valid_token().await?;

        let target =
            ReconciliationTarget::new(resource_id, LocalCaptionFile::from_path(path), language);
        Ok(self.reconciler.reconcile(&target).await)
    }

    /// Remote caption tracks of one video.
    pub async fn list_tracks(&self, resource_id: &str) -> Result<Vec<CaptionTrack>, RunError> {
        self.credentials.ensure_valid_token().await?;
        Ok(self.reconciler.captions().list(resource_id).await?)
    }

    async fn discover(
        &self,
        folder: &Path,
        language: &str,
    ) -> Result<(Vec<ReconciliationTarget>, BatchSummary), RunError> {
        let paths = self.reconciler.files().list_caption_files(folder).await?;
        let mut summary = BatchSummary::new(language);
        let mut targets = Vec::with_capacity(paths.len());

        for path in paths {
            let file = LocalCaptionFile::from_path(&path);
            match file.resource_id.clone() {
                Some(resource_id) => targets.push(ReconciliationTarget::new(resource_id, file, language)),
                None => {
                    warn!(file = %file.filename, "No [video id] prefix, skipping");
                    summary.record_unresolvable(&file);
                }
            }
        }

        info!(
            folder = %folder.display(),
            resolvable = targets.len(),
            unresolvable = summary.unresolvable.len(),
            "Discovered caption files"
        );
        Ok((targets, summary))
    }
}
