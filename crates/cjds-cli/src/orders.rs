//! Shipping quote and order command handlers.

use std::path::PathBuf;

use anyhow::Context;
use cjds_client::{CjClient, OrderRequest, ShippingItem, ShippingRequest};
use clap::{Args, Subcommand};

use crate::print_json;

#[derive(Debug, Args)]
pub struct ShippingArgs {
    /// Destination country code, e.g. US
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub province: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    /// Cart line as PID:QUANTITY; repeat for several products
    #[arg(long = "item", required = true, value_parser = parse_item)]
    pub items: Vec<ShippingItem>,
}

/// Sub-commands available under `order`.
#[derive(Debug, Subcommand)]
pub enum OrderCommands {
    /// Submit an order described by a JSON file
    Create {
        /// Path to the order JSON (orderNumber, shippingAddress, products, ...)
        #[arg(long)]
        file: PathBuf,
    },
    /// Show the vendor's record for an order
    Show {
        /// Caller-supplied order number
        order_number: String,
    },
}

/// Parses a `PID:QUANTITY` cart line.
pub(crate) fn parse_item(raw: &str) -> Result<ShippingItem, String> {
    let (pid, quantity) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PID:QUANTITY, got \"{raw}\""))?;
    if pid.is_empty() {
        return Err(format!("missing product id in \"{raw}\""));
    }
    let quantity = quantity
        .parse::<u32>()
        .map_err(|e| format!("invalid quantity in \"{raw}\": {e}"))?;
    Ok(ShippingItem {
        pid: pid.to_owned(),
        quantity,
    })
}

pub(crate) async fn run_shipping(client: &CjClient, args: ShippingArgs) -> anyhow::Result<()> {
    let request = ShippingRequest {
        products: args.items,
        country: args.country,
        province: args.province,
        city: args.city,
    };
    let quote = client.calculate_shipping_cost(&request).await?;
    tracing::info!(cost = %quote.cost, currency = %quote.currency, "shipping quote");
    print_json(&quote)
}

pub(crate) async fn run_order(client: &CjClient, command: OrderCommands) -> anyhow::Result<()> {
    match command {
        OrderCommands::Create { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read order file {}", file.display()))?;
            let order: OrderRequest = serde_json::from_str(&raw)
                .with_context(|| format!("order file {} is not a valid order", file.display()))?;
            let result = client.create_order(&order).await?;
            print_json(&result)
        }
        OrderCommands::Show { order_number } => {
            let detail = client.get_order_details(&order_number).await?;
            print_json(&detail)
        }
    }
}
