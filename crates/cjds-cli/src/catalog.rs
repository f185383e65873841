//! Product catalog command handlers.
//!
//! `lookup` is the only multi-request command. It pauses `lookup_delay_ms`
//! between product lookups and records per-product failures without aborting.

use std::time::Duration;

use cjds_client::{transform_product, transform_products, CjClient, ProductQuery, RawProduct};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::print_json;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Free-text search
    #[arg(long)]
    pub keyword: Option<String>,
    /// Vendor category id
    #[arg(long)]
    pub category: Option<String>,
    /// Vendor sort key, e.g. sellQuantity_desc
    #[arg(long)]
    pub sort: Option<String>,
    /// 1-based page number
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
    #[arg(long)]
    pub price_min: Option<Decimal>,
    #[arg(long)]
    pub price_max: Option<Decimal>,
    /// Print canonical products instead of the vendor shape
    #[arg(long)]
    pub normalized: bool,
}

impl CatalogArgs {
    pub(crate) fn to_query(&self) -> ProductQuery {
        ProductQuery {
            page_num: self.page,
            page_size: self.page_size,
            category_id: self.category.clone(),
            keyword: self.keyword.clone(),
            sort_by: self.sort.clone(),
            price_min: self.price_min,
            price_max: self.price_max,
        }
    }
}

pub(crate) async fn run_products(client: &CjClient, args: &CatalogArgs) -> anyhow::Result<()> {
    let page = client.get_products(&args.to_query()).await?;
    tracing::info!(
        count = page.products.len(),
        total = page.total,
        page = page.page_num,
        "product search complete"
    );
    if args.normalized {
        print_json(&page.into_canonical())
    } else {
        print_json(&page)
    }
}

pub(crate) async fn run_trending(
    client: &CjClient,
    limit: u32,
    normalized: bool,
) -> anyhow::Result<()> {
    let products = client.get_trending_products(limit).await?;
    print_products(products, normalized)
}

pub(crate) async fn run_product(
    client: &CjClient,
    pid: &str,
    normalized: bool,
) -> anyhow::Result<()> {
    let product = client.get_product_details(pid).await?;
    if normalized {
        print_json(&transform_product(product))
    } else {
        print_json(&product)
    }
}

/// Result of one product lookup in a `lookup` run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LookupOutcome {
    pub pid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<cjds_core::CanonicalProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub(crate) async fn run_lookup(
    client: &CjClient,
    pids: &[String],
    delay_ms: u64,
) -> anyhow::Result<()> {
    let mut outcomes = Vec::with_capacity(pids.len());
    for (idx, pid) in pids.iter().enumerate() {
        if idx > 0 && delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        let outcome = match client.get_product_details(pid).await {
            Ok(product) => LookupOutcome {
                pid: pid.clone(),
                product: Some(transform_product(product)),
                error: None,
            },
            Err(e) => {
                tracing::warn!(pid = %pid, error = %e, "product lookup failed, continuing");
                LookupOutcome {
                    pid: pid.clone(),
                    product: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    tracing::info!(requested = pids.len(), failed, "lookup run complete");
    print_json(&outcomes)?;
    if failed == pids.len() {
        anyhow::bail!("all {failed} product lookups failed");
    }
    Ok(())
}

pub(crate) async fn run_categories(client: &CjClient) -> anyhow::Result<()> {
    let categories = client.get_categories().await?;
    print_json(&categories)
}

fn print_products(products: Vec<RawProduct>, normalized: bool) -> anyhow::Result<()> {
    if normalized {
        print_json(&transform_products(products))
    } else {
        print_json(&products)
    }
}
