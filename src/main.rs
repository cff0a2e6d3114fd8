mod api;
mod cli;
mod config;
mod download;
mod error;
mod ident;
mod job;
mod orchestrator;
mod resolve;
mod storage;
mod ui;

use anyhow::{Result, bail};
use clap::Parser;

use api::EffectsClient;
use cli::{Cli, Command};
use config::VecartConfig;
use download::{DownloadManager, DownloadOutcome};
use orchestrator::PipelineOrchestrator;
use storage::StorageClient;
use ui::{TerminalUi, UiSink};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = VecartConfig::load()?;
    if let Some(effect) = cli.effect {
        config.effect_id = effect;
    }
    if let Some(max_polls) = cli.max_polls {
        config.max_polls = max_polls;
    }

    let ui = TerminalUi::new();

    match cli.command {
        Command::Generate {
            image,
            output,
            no_download,
        } => {
            if config.user_id.is_empty() {
                bail!("no caller identity configured; set VECART_USER_ID or `user_id` in vecart.toml");
            }

            let api = EffectsClient::new(
                config.api_base_url.clone(),
                config.user_id.clone(),
                config.effect_id.clone(),
            );
            let storage = StorageClient::new(
                config.project_id.clone(),
                config.upload_auth_base_url.clone(),
                config.assets_base_url.clone(),
            );
            let mut orchestrator = PipelineOrchestrator::new(
                api,
                storage,
                config.poll_config(),
                config.effect_id.clone(),
            );

            // Failures are already surfaced to the user through the sink.
            if orchestrator.on_file_selected(&image, &ui).await.is_err() {
                std::process::exit(1);
            }
            let Ok(mut record) = orchestrator.on_generate(&ui).await else {
                std::process::exit(1);
            };

            if !no_download {
                let dest = match output {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                match orchestrator.on_download(&dest, &ui).await {
                    Ok(DownloadOutcome::Saved(path)) => {
                        record.saved_to = Some(path.display().to_string());
                    }
                    Ok(DownloadOutcome::ManualFallback) => {}
                    Err(_) => std::process::exit(1),
                }
            }

            if cli.verbose {
                ui.print_record(&record);
            }
        }

        Command::Download { url, output } => {
            let dest = match output {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let downloads = DownloadManager::new();
            ui.loading("DOWNLOADING...");
            let outcome = downloads.download(&url, None, &dest, &ui).await;
            ui.idle();
            if let DownloadOutcome::Saved(path) = outcome {
                println!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}
