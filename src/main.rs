use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platform_advisor::config::AdvisorConfig;
use platform_advisor::cycle::CycleSnapshot;
use platform_advisor::queue::{AssignmentError, AssignmentPolicy};
use platform_advisor::report;
use platform_advisor::server::{AppState, build_router};
use platform_advisor::store::{JsonDirStore, StoreError};

/// Dispatch recommendations and platform queues for a section controller
#[derive(Parser)]
#[command(name = "platform-advisor")]
#[command(about = "Ranks waiting trains and suggests platforms for them")]
struct Cli {
    /// Directory holding trains.json, platforms.json and overrides.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Assignment policy for queues (round_robin or fixed)
    #[arg(long, global = true)]
    assignment: Option<AssignmentPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the top recommendations for the current data
    Recommend,

    /// Print per-platform queues
    Queues,

    /// Serve recommendations and queues over HTTP
    Serve {
        /// Bind address
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platform_advisor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AdvisorConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(policy) = cli.assignment {
        config.assignment = policy;
    }

    let result = match cli.command {
        Command::Recommend => recommend(&config),
        Command::Queues => queues(&config),
        Command::Serve { listen } => {
            if let Some(addr) = listen {
                config.listen = addr;
            }
            serve(config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "platform-advisor failed");
            ExitCode::FAILURE
        }
    }
}

fn recommend(config: &AdvisorConfig) -> Result<(), CliError> {
    let store = JsonDirStore::new(&config.data_dir);
    let snapshot = CycleSnapshot::load(&store)?;

    print!("{}", report::format_header(&snapshot));
    print!("{}", report::format_recommendations(&snapshot.recommendations()));
    Ok(())
}

fn queues(config: &AdvisorConfig) -> Result<(), CliError> {
    let store = JsonDirStore::new(&config.data_dir);
    let snapshot = CycleSnapshot::load(&store)?;
    let board = snapshot.queues(config.assignment.strategy(), &Default::default())?;

    print!("{}", report::format_header(&snapshot));
    print!("{}", report::format_queues(&board));
    Ok(())
}

async fn serve(config: AdvisorConfig) -> Result<(), CliError> {
    let app_state = AppState::new(JsonDirStore::new(&config.data_dir), config.assignment);
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(
        addr = %config.listen,
        data_dir = %config.data_dir.display(),
        assignment = %config.assignment,
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
