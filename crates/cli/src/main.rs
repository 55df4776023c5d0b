//! `faceswap` -- run face-swap jobs from the terminal.
//!
//! Configuration comes from the environment (see
//! `faceswap_client::config::ClientConfig`); a `.env` file is honoured.

mod cli;
mod display;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use faceswap_client::api::FaceSwapApi;
use faceswap_client::channel::NotificationChannel;
use faceswap_client::client::PushClient;
use faceswap_client::config::ClientConfig;
use faceswap_core::job::JobState;
use faceswap_pipeline::controller::JobController;
use faceswap_pipeline::download::download_artifact;
use faceswap_pipeline::stage::JobInput;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use display::ConsoleDisplay;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faceswap_cli=info,faceswap_pipeline=info,faceswap_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::JobFailed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let api = FaceSwapApi::new(&config)?;

    match cli.command {
        Command::Quota => {
            let quota = api.quota().await?;
            println!("Remaining credit: {}", quota.credit);
            Ok(())
        }
        Command::Image(args) => {
            let input = args.to_input().await?;
            run_job(&config, api, input, args.download).await
        }
        Command::Video(args) => run_job(&config, api, args.to_input(), args.download).await,
    }
}

/// Run one job to completion, optionally saving the artifact.
async fn run_job(
    config: &ClientConfig,
    api: FaceSwapApi,
    input: JobInput,
    download_dir: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let callback_address = config.webhook_url()?.to_string();

    let (channel, events) = NotificationChannel::start(
        PushClient::new(config.push_url.clone()),
        config.reconnect.clone(),
    );

    let display = Arc::new(ConsoleDisplay::default());
    let controller = JobController::spawn(
        Arc::new(api),
        display.clone(),
        events,
        callback_address,
    );

    let outcome = drive(&controller, input).await;

    controller.shutdown().await;
    channel.shutdown().await;

    if outcome? != JobState::Completed {
        return Err(CliError::JobFailed);
    }

    if let (Some(dir), Some(artifact)) = (download_dir, display.artifact()) {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout * 10)
            .build()
            .map_err(faceswap_pipeline::error::DownloadError::from)?;
        let path = download_artifact(&client, &artifact, &dir).await?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

/// Start the job and wait until it completes, fails or is interrupted.
async fn drive(controller: &JobController, input: JobInput) -> Result<JobState, CliError> {
    let generation = controller.start(input).await?;
    tracing::debug!(generation, "Job started");

    tokio::select! {
        state = controller.wait_until_resting() => Ok(state),
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}
