//! Per-video caption reconciliation: list, delete the stale track if any, upload.
//!
//! The hosting service does not replace a track on upload, so deleting first is
//! what keeps a single track per language. No step is retried here.

use crate::domain::{Outcome, ReconciliationTarget, Step};
use crate::error::CaptionError;
use crate::ports::captions::CaptionStorePort;
use crate::ports::files::CaptionSourcePort;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Listed,
    DeleteSkipped,
    Deleted,
    Uploaded,
    Done,
    Failed(Step),
}

impl Stage {
    fn advance(&mut self, video_id: &str, to: Stage) {
        debug!(video_id, from = %self, %to, "Reconciliation transition");
        *self = to;
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Listed => "listed",
            Stage::DeleteSkipped => "delete-skipped",
            Stage::Deleted => "deleted",
            Stage::Uploaded => "uploaded",
            Stage::Done => "done",
            Stage::Failed(step) => return write!(f, "failed({})", step),
        };
        f.write_str(name)
    }
}

pub struct Reconciler<C, F> {
    captions: C,
    files: F,
}

impl<C, F> Reconciler<C, F>
where
    C: CaptionStorePort,
    F: CaptionSourcePort,
{
    pub fn new(captions: C, files: F) -> Self {
        Self { captions, files }
    }

    pub fn captions(&self) -> &C {
        &self.captions
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    /// Runs the full sequence for one target. Never returns early without an outcome.
    pub async fn reconcile(&self, target: &ReconciliationTarget) -> Outcome {
        let mut stage = Stage::Start;
        match self.run_steps(target, &mut stage).await {
            Ok(()) => {
                stage.advance(&target.resource_id, Stage::Done);
                info!(
                    video_id = %target.resource_id,
                    language = %target.language,
                    "Caption reconciled"
                );
                Outcome::Success {
                    resource_id: target.resource_id.clone(),
                    language: target.language.clone(),
                }
            }
            Err((step, error)) => {
                stage.advance(&target.resource_id, Stage::Failed(step));
                warn!(
                    video_id = %target.resource_id,
                    %step,
                    error = %error,
                    "Caption reconciliation failed"
                );
                Outcome::Failure {
                    step,
                    resource_id: target.resource_id.clone(),
                    filename: target.file.filename.clone(),
                    error,
                }
            }
        }
    }

    async fn run_steps(
        &self,
        target: &ReconciliationTarget,
        stage: &mut Stage,
    ) -> Result<(), (Step, CaptionError)> {
        let video_id = target.resource_id.as_str();
        let language = target.language.as_str();

        let tracks = self
            .captions
            .list(video_id)
            .await
            .map_err(|e| (Step::List, e))?;
        stage.advance(video_id, Stage::Listed);

        if tracks.iter().any(|track| track.language == language) {
            self.captions
                .delete(video_id, language)
                .await
                .map_err(|e| (Step::Delete, e))?;
            stage.advance(video_id, Stage::Deleted);
        } else {
            stage.advance(video_id, Stage::DeleteSkipped);
        }

        // The file may have disappeared since discovery.
        let contents = self
            .files
            .read(&target.file.path)
            .await
            .map_err(|e| (Step::Upload, e))?;
        self.captions
            .upload(video_id, language, contents, &target.file.filename)
            .await
            .map_err(|e| (Step::Upload, e))?;
        stage.advance(video_id, Stage::Uploaded);
        Ok(())
    }
}
