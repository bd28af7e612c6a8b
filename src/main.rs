use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use covid_dash::service::importer::{self, FeedSource, ImportOptions};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "covid-dash", about = "COVID-19 dataset importer and dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import the Our World in Data CSV feed into the database
    Import {
        /// Feed URL or local CSV path (defaults to the configured data_url)
        #[arg(long)]
        source: Option<String>,
    },
    /// Serve the JSON API and chart views
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = &covid_dash::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel
    );

    let storage = covid_dash::db::open(&cfg.basic.database_url).await?;

    match cli.command {
        Command::Import { source } => {
            let source = source
                .as_deref()
                .map(FeedSource::parse)
                .unwrap_or_else(|| FeedSource::Remote(cfg.import.data_url.clone()));
            let client = reqwest::Client::builder().build()?;
            let summary =
                importer::run(&storage, &client, &source, ImportOptions::from(&cfg.import)).await?;
            info!(
                rows_imported = summary.rows_imported,
                rows_skipped = summary.rows_skipped,
                "Successfully imported COVID-19 data"
            );
        }
        Command::Serve => {
            let state = covid_dash::router::DashState::new(storage);
            let app = covid_dash::router::dash_router(state);

            let addr = cfg.basic.listen_addr.as_str();
            let listener = TcpListener::bind(addr).await?;
            info!("HTTP server listening on {}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("shutdown signal received");
                })
                .await?;
        }
    }
    Ok(())
}
