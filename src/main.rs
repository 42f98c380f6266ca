//! Captionsync CLI
//!
//! Wires the api.video adapters and the local filesystem into the batch
//! orchestrator.
//!
//! Environment Variables:
//! - CAPTIONS_DIR: folder scanned by `batch` (default ./captions)
//! - CAPTIONS_LANGUAGE: default caption language (default en)
//! - API_BASE_URL: API endpoint (default https://ws.api.video)
//! - API_KEY: API key exchanged for an access token
//! - PACING_INTERVAL_SECS: wait between two videos (default 2)
//! - REQUEST_TIMEOUT_SECS: HTTP timeout (default 30)

use captionsync::adapters::apivideo::{ApiKeyCredentials, ApiVideoCaptions, ReqwestTransport};
use captionsync::adapters::local::FsCaptionSource;
use captionsync::{BatchOrchestrator, BatchSummary, Outcome, SyncConfig};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

type ApiOrchestrator = BatchOrchestrator<
    ApiVideoCaptions<ReqwestTransport<ApiKeyCredentials>>,
    FsCaptionSource,
    ApiKeyCredentials,
>;

#[derive(Debug, Parser)]
#[command(name = "captionsync", version, about = "Sync local WebVTT captions to hosted videos")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sync every `[<video id>]*.vtt` file of the captions folder
    Batch {
        /// Caption language (defaults to CAPTIONS_LANGUAGE)
        #[arg(short, long)]
        language: Option<String>,
        /// Folder to scan (defaults to CAPTIONS_DIR)
        #[arg(short, long)]
        folder: Option<PathBuf>,
    },
    /// Sync one caption file to a known video
    Video {
        video_id: String,
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Show the caption tracks of a video
    Tracks { video_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("captionsync=info")),
        )
        .init();

    let config = SyncConfig::from_env();
    let orchestrator = match build(config) {
        Ok(o) => o,
        Err(e) => {
            error!("Failed to set up caption sync: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Batch { language, folder } => {
            batch(&orchestrator, folder, language, cli.json).await
        }
        Command::Video {
            video_id,
            file,
            language,
        } => video(&orchestrator, &video_id, file, language, cli.json).await,
        Command::Tracks { video_id } => tracks(&orchestrator, &video_id, cli.json).await,
    }
}

fn build(config: SyncConfig) -> Result<ApiOrchestrator, Box<dyn Error + Send + Sync>> {
    let credentials = ApiKeyCredentials::new(&config)?;
    let transport = ReqwestTransport::new(&config, credentials.clone())?;
    let captions = ApiVideoCaptions::new(transport, &config.api_base_url)?;
    Ok(BatchOrchestrator::new(
        config,
        captions,
        FsCaptionSource::new(),
        credentials,
    ))
}

async fn batch(
    orchestrator: &ApiOrchestrator,
    folder: Option<PathBuf>,
    language: Option<String>,
    as_json: bool,
) -> ExitCode {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current video");
            interrupt.cancel();
        }
    });

    let result = orchestrator
        .run_until_cancelled(folder.as_deref(), language.as_deref(), &cancel)
        .await;

    match result {
        Ok(summary) => {
            print_summary(&summary, as_json);
            if summary.has_failures() || !summary.skipped.is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("Caption sync aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_summary(summary: &BatchSummary, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
    } else if summary.nothing_to_do() {
        println!("Nothing to do: no caption file carries a [video id] prefix.");
        print!("{}", summary);
    } else {
        print!("{}", summary);
    }
}

async fn video(
    orchestrator: &ApiOrchestrator,
    video_id: &str,
    file: PathBuf,
    language: Option<String>,
    as_json: bool,
) -> ExitCode {
    let outcome = match orchestrator
        .run_one(video_id, &file, language.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Caption sync aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let success = outcome.is_success();
    let report = match &outcome {
        Outcome::Success {
            resource_id,
            language,
        } => json!({ "success": true, "video_id": resource_id, "language": language }),
        Outcome::Failure {
            step,
            resource_id,
            filename,
            error,
        } => json!({
            "success": false,
            "video_id": resource_id,
            "filename": filename,
            "step": step,
            "error": error.to_string(),
        }),
    };

    if as_json {
        println!("{}", report);
    } else {
        match outcome {
            Outcome::Success {
                resource_id,
                language,
            } => println!("Synced {} caption for {}", language, resource_id),
            Outcome::Failure {
                step,
                resource_id,
                error,
                ..
            } => println!("FAILED {} at {}: {}", resource_id, step, error),
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn tracks(orchestrator: &ApiOrchestrator, video_id: &str, as_json: bool) -> ExitCode {
    let tracks = match orchestrator.list_tracks(video_id).await {
        Ok(tracks) => tracks,
        Err(e) => {
            error!("Failed to list captions: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if as_json {
        match serde_json::to_string_pretty(&tracks) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to encode tracks: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else if tracks.is_empty() {
        println!("{} has no captions", video_id);
    } else {
        for track in &tracks {
            let name = track
                .metadata
                .get("languageName")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            println!("{}\t{}", track.language, name);
        }
    }
    ExitCode::SUCCESS
}
