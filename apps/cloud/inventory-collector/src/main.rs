//! Inventory Collector
//!
//! Discovers RDS instances across the configured AWS accounts and regions,
//! estimates their month-to-date cost and serves the stored inventory as
//! reports. Runs as a one-shot collection, a scheduled job or an API server.

use axum::{Router, middleware, routing::get};
use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_cloud_resources::{
    InMemoryResourceRepository, PgResourceRepository, ReportService, ResourceRepository, handlers,
};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

mod collector;
mod config;
mod providers;
mod shutdown;

use collector::InventoryCollector;
use config::Config;

type SharedRepository = Arc<dyn ResourceRepository>;

#[derive(Parser)]
#[command(name = "inventory-collector")]
#[command(about = "Collect RDS inventory and month-to-date cost estimates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-time collection
    Collect {
        /// Configured account names to collect. Defaults to all.
        #[arg(short, long, value_delimiter = ',')]
        accounts: Option<Vec<String>>,

        /// Regions to collect. Defaults to configured regions.
        #[arg(short = 'R', long, value_delimiter = ',')]
        regions: Option<Vec<String>>,
    },

    /// Run as a scheduled service
    Schedule {
        /// Cron expression for scheduling. Defaults to COLLECT_CRON.
        #[arg(short, long)]
        cron: Option<String>,
    },

    /// Serve the report API and Prometheus metrics
    Serve {
        /// Also collect on the configured schedule
        #[arg(long)]
        collect: bool,
    },

    /// Print a grouped resource count (provider, account, service or region)
    Report {
        #[arg(short, long, default_value = "region")]
        field: String,
    },
}

async fn open_repository(config: &Config) -> Result<SharedRepository> {
    match &config.database {
        Some(database) => {
            info!("Connecting to database...");
            let repository = PgResourceRepository::connect(database)
                .await
                .wrap_err("Database connection failed")?;
            repository.ensure_schema().await?;
            Ok(Arc::new(repository))
        }
        None => {
            warn!("DATABASE_URL not set, keeping inventory in memory");
            Ok(Arc::new(InMemoryResourceRepository::new()))
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn serve(
    config: &Config,
    repository: SharedRepository,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let app = Router::new()
        .merge(handlers::router(ReportService::new(repository)))
        .route("/metrics", get(observability::metrics_handler))
        .route("/health", get(health))
        .layer(middleware::from_fn(observability::track_requests));

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "Report API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let environment = Environment::from_env();
    init_tracing(&environment);

    observability::init_metrics()?;

    let shutdown = shutdown::shutdown_channel();

    let repository = open_repository(&config).await?;
    let collector = InventoryCollector::new(
        config.clone(),
        ReportService::new(Arc::clone(&repository)),
    );

    match cli.command {
        Commands::Collect { accounts, regions } => {
            info!("Starting one-time inventory collection");

            let result = collector
                .collect(accounts.as_deref(), regions.as_deref(), shutdown)
                .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Schedule { cron } => {
            let cron = cron.unwrap_or_else(|| config.collect_cron.clone());
            collector.run_scheduled(&cron, shutdown).await?;
        }

        Commands::Serve { collect } => {
            if collect {
                let collector = collector.clone();
                let cron = config.collect_cron.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = collector.run_scheduled(&cron, shutdown).await {
                        tracing::error!(error = %e, "Scheduler stopped");
                    }
                });
            }

            serve(&config, repository, shutdown).await?;
        }

        Commands::Report { field } => {
            let groups = collector.reports().breakdown(&field).await?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }

    Ok(())
}
