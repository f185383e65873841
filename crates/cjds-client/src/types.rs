//! CJ Dropshipping v2 wire types.
//!
//! Every endpoint wraps its payload in the same `{result, message, data}`
//! envelope; [`ApiResponse`] captures that generically. `result: false` is the
//! only reliable failure signal, so `data` is never trusted before the client
//! has checked it.
//!
//! ## Observed quirks
//!
//! - Prices, quantities and weights arrive as decimal strings on most
//!   endpoints and as JSON numbers on others. Fields that the normalizer parses
//!   are kept as raw strings here and accept either form.
//! - `productImages` is usually an array but older listings send a
//!   JSON-encoded array inside a string.
//! - `variants` may be absent or `null` on list responses.
//! - Unmodelled vendor fields are retained in `extra` so callers can still
//!   read them from the raw shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level envelope for all CJ API responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result: bool,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub message: String,
    pub data: Option<T>,
}

// ---------------------------------------------------------------------------
// authentication/getAccessToken
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
    #[serde(default)]
    pub access_token: Option<String>,
}

// ---------------------------------------------------------------------------
// product/list, product/query
// ---------------------------------------------------------------------------

/// Payload of `product/list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListData {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub list: Vec<RawProduct>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub total: u64,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub page_num: u64,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub page_size: u64,
}

/// A product exactly as the vendor describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub pid: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub product_name: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub product_name_en: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub sell_price: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub original_price: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub product_image: String,
    /// `None` when the vendor omitted the gallery entirely.
    #[serde(
        default,
        deserialize_with = "de::string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub category_name: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub supplier_name: String,
    /// String-encoded integer; the vendor uses it for both units sold and stock.
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub sell_quantity: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub weight: String,
    /// Free-text delivery window.
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub shipping_time: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub variants: Vec<RawVariant>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A purchasable variant as the vendor describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub vid: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub variant_name: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub variant_sell_price: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub variant_quantity: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub variant_sku: String,
    /// JSON-encoded attribute map, e.g. `{"color":"Black","size":"L"}`.
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub variant_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_image: Option<String>,
}

// ---------------------------------------------------------------------------
// product/getCategory
// ---------------------------------------------------------------------------

/// A vendor category node. The tree shape varies between API revisions, so
/// only the identifying fields are modelled and the rest kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// logistic/freightCalculate
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreightData {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub logistics: Vec<Value>,
    #[serde(default)]
    pub min_cost: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

// ---------------------------------------------------------------------------
// shopping/order/createOrder
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedData {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub order_number: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub order_status: String,
}

/// Tolerant field deserializers for the vendor's loosely-typed JSON.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accepts a string, number, or bool; `null` becomes an empty string.
    pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// Accepts a non-negative integer or an integer string; anything else is `0`.
    pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    /// Treats an explicit `null` the same as a missing field.
    pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Accepts an array of strings or a string holding a JSON array.
    ///
    /// A plain non-empty string becomes a one-element list; `null` is `None`.
    pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => None,
            Value::Array(items) => Some(items.into_iter().filter_map(into_string).collect()),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(Vec::new())
                } else if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                    Some(items.into_iter().filter_map(into_string).collect())
                } else {
                    Some(vec![trimmed.to_owned()])
                }
            }
            _ => None,
        })
    }

    fn into_string(value: Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
