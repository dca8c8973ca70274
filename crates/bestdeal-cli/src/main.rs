mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bestdeal")]
#[command(about = "Compare grocery prices across quick-commerce platforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every enabled platform and print the aggregate result as JSON
    Search {
        /// Product to look for, e.g. "onion"
        query: String,
        /// Delivery location; resolved from the public IP when omitted
        #[arg(long)]
        location: Option<String>,
        /// Comma-separated site keys overriding `BESTDEAL_SOURCES`
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,
    },
    /// Print the location the geolocation services report
    Locate {
        /// Address to look up instead of this machine's public IP
        #[arg(long)]
        ip: Option<String>,
    },
    /// List the platforms this build can scrape
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bestdeal_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            query,
            location,
            sources,
        } => {
            let config = commands::with_source_override(config, sources);
            commands::run_search(&config, &query, location.as_deref()).await
        }
        Commands::Locate { ip } => commands::run_locate(&config, ip.as_deref()).await,
        Commands::Sources => {
            commands::run_sources(&config);
            Ok(())
        }
    }
}
