//! Normalization from raw CJ product JSON to [`cjds_core::CanonicalProduct`].
//!
//! Normalization never fails: the dashboard must always get something it can
//! render. Numeric fields go through a lenient prefix parser that reports a
//! [`Parsed`] tag, and defaulted fields collapse to zero at the boundary.

use std::collections::BTreeMap;
use std::str::FromStr;

use cjds_core::{CanonicalProduct, CanonicalVariant};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::{RawProduct, RawVariant};

/// Outcome of parsing a vendor numeric string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    /// Absent, blank, or not numeric.
    Defaulted,
}

impl<T> Parsed<T> {
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            Parsed::Defaulted => None,
        }
    }
}

impl<T: Default> Parsed<T> {
    /// Collapses to the value, or `T::default()` with a debug event naming the field.
    fn or_default(self, pid: &str, field: &'static str, raw: &str) -> T {
        match self {
            Parsed::Value(v) => v,
            Parsed::Defaulted => {
                if !raw.is_empty() {
                    tracing::debug!(pid, field, raw, "unparseable numeric field, using 0");
                }
                T::default()
            }
        }
    }
}

/// Returns the longest leading `[+-]digits[.digits][e[+-]digits]` run of
/// `raw`, after leading whitespace, rewritten without a `+` sign or a bare
/// dot (`"+.5e2"` becomes `"0.5e2"`). `None` when there is no digit in it.
fn numeric_prefix(raw: &str) -> Option<String> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = start;
    let mut digits = 0;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }

    let mantissa = s[start..end].trim_end_matches('.');
    let mut number = String::with_capacity(end + 8);
    if negative {
        number.push('-');
    }
    if mantissa.starts_with('.') {
        number.push('0');
    }
    number.push_str(mantissa);

    // An exponent marker only counts when digits follow it: "3e" reads as 3.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            number.push('e');
            number.push_str(&s[end + 1..exp_end]);
        }
    }
    Some(number)
}

fn leading_decimal(raw: &str) -> Option<Decimal> {
    let number = numeric_prefix(raw)?;
    if number.contains('e') {
        Decimal::from_scientific(&number).ok()
    } else {
        Decimal::from_str(&number).ok()
    }
}

/// Parses a price the way a lenient float parser would: `"12.50 -- 15.00"`
/// reads as `12.50`, `"2.5e3"` as `2500`, `"abc"` does not parse. Negative
/// values, and magnitudes `Decimal` cannot hold, are defaulted.
#[must_use]
pub fn parse_decimal(raw: &str) -> Parsed<Decimal> {
    match leading_decimal(raw) {
        Some(d) if d.is_zero() => Parsed::Value(Decimal::ZERO),
        Some(d) if d.is_sign_negative() => Parsed::Defaulted,
        Some(d) => Parsed::Value(d),
        None => Parsed::Defaulted,
    }
}

/// Parses an integer count, truncating any fractional part (`"12.9"` → `12`).
/// Negative and overflowing values are defaulted.
#[must_use]
pub fn parse_count(raw: &str) -> Parsed<u64> {
    match leading_decimal(raw) {
        Some(d) if d.is_zero() => Parsed::Value(0),
        Some(d) if d.is_sign_negative() => Parsed::Defaulted,
        Some(d) => d.trunc().to_u64().map_or(Parsed::Defaulted, Parsed::Value),
        None => Parsed::Defaulted,
    }
}

/// Parses a weight as `f64`. Negative weights are defaulted.
#[must_use]
pub fn parse_weight(raw: &str) -> Parsed<f64> {
    let Some(prefix) = numeric_prefix(raw) else {
        return Parsed::Defaulted;
    };
    match f64::from_str(&prefix) {
        Ok(w) if w.is_finite() && w >= 0.0 => Parsed::Value(w),
        _ => Parsed::Defaulted,
    }
}

/// Decodes a `variantKey` JSON object into a string map.
///
/// Non-string values are stringified. Malformed JSON, or JSON that is not an
/// object, yields an empty map.
#[must_use]
pub fn parse_attributes(variant_key: &str) -> BTreeMap<String, String> {
    if variant_key.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_json::from_str::<Value>(variant_key) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        Ok(_) | Err(_) => {
            tracing::debug!(variant_key, "variantKey is not a JSON object, using empty attributes");
            BTreeMap::new()
        }
    }
}

/// Converts a vendor product into its canonical shape. Infallible.
#[must_use]
pub fn transform_product(raw: RawProduct) -> CanonicalProduct {
    let pid = raw.pid;
    let price = parse_decimal(&raw.sell_price).or_default(&pid, "sellPrice", &raw.sell_price);
    let original_price =
        parse_decimal(&raw.original_price).or_default(&pid, "originalPrice", &raw.original_price);
    let stock_quantity =
        parse_count(&raw.sell_quantity).or_default(&pid, "sellQuantity", &raw.sell_quantity);
    let weight = parse_weight(&raw.weight).or_default(&pid, "weight", &raw.weight);

    let name = if raw.product_name_en.trim().is_empty() {
        raw.product_name
    } else {
        raw.product_name_en
    };

    let images = match raw.product_images {
        Some(images) if !images.is_empty() => images,
        _ if !raw.product_image.is_empty() => vec![raw.product_image.clone()],
        _ => Vec::new(),
    };

    let variants = raw
        .variants
        .into_iter()
        .map(|v| transform_variant(v, &pid))
        .collect();

    CanonicalProduct {
        id: pid,
        name,
        price,
        original_price,
        image_url: raw.product_image,
        images,
        description: raw.description,
        category: raw.category_name,
        supplier: raw.supplier_name,
        stock_quantity,
        weight,
        shipping_time: raw.shipping_time,
        variants,
    }
}

/// Normalizes a list of products, preserving order.
#[must_use]
pub fn transform_products(raw: Vec<RawProduct>) -> Vec<CanonicalProduct> {
    raw.into_iter().map(transform_product).collect()
}

fn transform_variant(raw: RawVariant, pid: &str) -> CanonicalVariant {
    let price = parse_decimal(&raw.variant_sell_price).or_default(
        pid,
        "variantSellPrice",
        &raw.variant_sell_price,
    );
    let stock_quantity = parse_count(&raw.variant_quantity).or_default(
        pid,
        "variantQuantity",
        &raw.variant_quantity,
    );
    let attributes = parse_attributes(&raw.variant_key);
    let image = raw.variant_image.filter(|i| !i.trim().is_empty());

    CanonicalVariant {
        id: raw.vid,
        name: raw.variant_name,
        price,
        stock_quantity,
        sku: raw.variant_sku,
        attributes,
        image,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
