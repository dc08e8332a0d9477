mod cli;
mod platform;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use listsweep_core::RunEnd;
use listsweep_engine::{
    BatchPipeline, CheckpointStore, Credentials, FileCheckpointStore, HttpRemoteClient,
    JobController, JobHandle, RemoteClient, StartRequest, TokioClock,
};
use sweep_logging::{level_for_verbosity, sweep_error, sweep_info, sweep_warn};

use cli::Cli;
use platform::settings::FileSettings;
use platform::status::{self, ConsoleStatus};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    platform::logging::initialize(
        cli.log_destination,
        level_for_verbosity(cli.verbose),
        &cli.log_file,
    );

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sweep_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = match &cli.settings {
        Some(path) => FileSettings::load(path)?,
        None => FileSettings::default(),
    };
    let mut settings = file.sweep_settings();
    if let Some(page_size) = cli.page_size {
        settings.page_size = page_size;
    }

    let store = Arc::new(FileCheckpointStore::new(&cli.state_dir, &cli.job_key));
    if cli.reset {
        store.clear()?;
        println!("Checkpoint {} cleared", store.path().display());
        return Ok(());
    }

    let Some(base_url) = cli.base_url.clone().or_else(|| file.base_url.clone()) else {
        bail!("no API base URL; pass --base-url, set LISTSWEEP_BASE_URL or add base_url to the settings file");
    };
    let Some(token) = cli.token.clone() else {
        bail!("no API token; pass --token or set LISTSWEEP_TOKEN");
    };

    let remote = Arc::new(HttpRemoteClient::new(file.http_settings(base_url))?);
    remote
        .authenticate(&Credentials::bearer(token))
        .await
        .context("signing in")?;
    sweep_info!("Authenticated against the remote API");

    let pipeline = BatchPipeline::new(
        remote.clone(),
        store.clone(),
        &settings,
        Arc::new(TokioClock),
        Arc::new(ConsoleStatus::new()),
    )?;
    let mut controller = JobController::new(pipeline);

    let resume = !cli.fresh && controller.has_resumable_checkpoint(cli.mode)?;
    let saved = if resume {
        controller
            .saved_checkpoint()?
            .filter(|checkpoint| checkpoint.resumable_for(cli.mode, cli.target.as_deref()))
    } else {
        None
    };
    if let Some(checkpoint) = &saved {
        println!(
            "Resuming {} run saved at {}: {} already processed",
            checkpoint.mode,
            checkpoint.saved_at,
            checkpoint.processed_ids.len()
        );
    }

    let mut target = cli.target.clone();
    if target.is_none() && cli.mode.requires_target() && saved.is_none() {
        if let Some(name) = &cli.create_collection {
            let id = remote
                .create_collection(name, cli.description.as_deref(), cli.private)
                .await
                .with_context(|| format!("creating collection {name:?}"))?;
            println!("Created collection {name:?} with id {id}");
            target = Some(id);
        }
    }

    let mut request = StartRequest::new(cli.mode);
    if let Some(target) = target {
        request = request.with_target(target);
    }
    if cli.fresh {
        request = request.fresh();
    }

    tokio::spawn(stop_on_interrupt(controller.handle()));

    let end = controller.start(request).await?;
    println!("{}", status::summary(&controller.progress_snapshot()));
    match end {
        RunEnd::Completed => println!("Done."),
        RunEnd::Stopped | RunEnd::Paused => println!(
            "Progress saved to {}; run again to resume.",
            store.path().display()
        ),
    }
    Ok(())
}

/// First Ctrl-C stops after the current item; a second one exits at once.
async fn stop_on_interrupt(handle: JobHandle) {
    if tokio::signal::ctrl_c().await.is_err() {
        sweep_warn!("Cannot listen for Ctrl-C; interrupting will not save progress");
        return;
    }
    println!("Stopping after the current item; press Ctrl-C again to quit now.");
    handle.stop();

    if tokio::signal::ctrl_c().await.is_ok() {
        sweep_warn!("Second interrupt; exiting without waiting for the checkpoint");
        std::process::exit(130);
    }
}
