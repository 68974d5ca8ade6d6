//! hvor daemon entry point.

use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use hvor_core::init_tracing;
use hvor_server::{
    ApiState, Cli, Ingestor, Scheduler, SchedulerConfig, ServerConfig, ServerError, ServerResult,
    ShutdownHandle, SnapshotStore, build_router,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServerConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.tracing_config()) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "hvor failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> ServerResult<()> {
    let source = config.feed.build_source()?;
    info!(source = source.name(), "Loading calendar");

    let store = SnapshotStore::new();
    let ingestor = Ingestor::new(source, store.clone());

    // Never serve without a page.
    ingestor.refresh_and_publish().await?;

    let shutdown = ShutdownHandle::new();
    shutdown.listen_for_signals();

    let scheduler = Scheduler::new(SchedulerConfig::new(config.refresh_period));
    let scheduler_state = scheduler.state();
    let scheduler = scheduler.spawn(
        move || {
            let ingestor = ingestor.clone();
            async move { ingestor.refresh_and_publish().await.map(|_| ()) }
        },
        shutdown.signal(),
    );

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| ServerError::bind(&config.listen_addr, e))?;
    info!(
        addr = %config.listen_addr,
        tokens = config.tokens.len(),
        "Listening"
    );

    let app = build_router(ApiState::new(store, config.tokens).with_scheduler(scheduler_state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.signal().wait())
        .await?;

    scheduler.stop();
    scheduler.join().await;

    info!("hvor stopped");
    Ok(())
}
