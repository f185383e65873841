use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A CJ catalog product in the shape the dashboard renders, independent of
/// the vendor's wire schema.
///
/// Built once by the client's normalizer and never mutated afterwards.
/// `price` and `original_price` are never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    /// Vendor product id (`pid`).
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub image_url: String,
    /// Gallery images in vendor order; at least the primary image when one exists.
    pub images: Vec<String>,
    pub description: String,
    pub category: String,
    pub supplier: String,
    /// Parsed from the vendor's `sellQuantity`, which doubles as units sold.
    pub stock_quantity: u64,
    /// Weight in grams as reported by the vendor.
    pub weight: f64,
    /// Free-text delivery window, e.g. `"7-15"`.
    pub shipping_time: String,
    pub variants: Vec<CanonicalVariant>,
}

/// One purchasable variant of a [`CanonicalProduct`]. Variants have no
/// identity outside their product's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVariant {
    /// Vendor variant id (`vid`).
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: u64,
    pub sku: String,
    /// Attribute map decoded from the vendor `variantKey`, e.g. `{"color": "Black"}`.
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
