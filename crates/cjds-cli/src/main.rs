mod catalog;
mod orders;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogArgs;
use crate::orders::{OrderCommands, ShippingArgs};

#[derive(Debug, Parser)]
#[command(name = "cjds-cli")]
#[command(about = "CJ Dropshipping catalog, shipping and order client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exchange the API key for an access token and report success
    Auth,
    /// Search the product catalog
    Products(CatalogArgs),
    /// List best-selling products
    Trending {
        /// Number of products to return
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Print canonical products instead of the vendor shape
        #[arg(long)]
        normalized: bool,
    },
    /// Show a single product
    Product {
        /// Vendor product id
        pid: String,
        /// Print the canonical product instead of the vendor shape
        #[arg(long)]
        normalized: bool,
    },
    /// Look up several products one after another, pausing between requests
    Lookup {
        /// Vendor product ids
        #[arg(required = true)]
        pids: Vec<String>,
    },
    /// List product categories
    Categories,
    /// Quote shipping for a cart
    Shipping(ShippingArgs),
    /// Create and inspect orders
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cjds_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let client = cjds_client::CjClient::from_config(&config)?;

    match cli.command {
        Commands::Auth => {
            client.authenticate().await?;
            println!("authenticated against {}", config.base_url);
        }
        Commands::Products(args) => catalog::run_products(&client, &args).await?,
        Commands::Trending { limit, normalized } => {
            catalog::run_trending(&client, limit, normalized).await?;
        }
        Commands::Product { pid, normalized } => {
            catalog::run_product(&client, &pid, normalized).await?;
        }
        Commands::Lookup { pids } => {
            catalog::run_lookup(&client, &pids, config.lookup_delay_ms).await?;
        }
        Commands::Categories => catalog::run_categories(&client).await?,
        Commands::Shipping(args) => orders::run_shipping(&client, args).await?,
        Commands::Order { command } => orders::run_order(&client, command).await?,
    }

    Ok(())
}

/// Writes `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
