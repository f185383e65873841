//! Freight quotes via `logistic/freightCalculate`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{CjClient, Replay};
use crate::error::CjError;
use crate::normalize::{parse_decimal, Parsed};
use crate::types::{ApiResponse, FreightData};

pub(crate) const FREIGHT_PATH: &str = "api2.0/v1/logistic/freightCalculate";

/// All CJ stock ships from the Chinese warehouse.
const ORIGIN_COUNTRY: &str = "CN";
const DEFAULT_CURRENCY: &str = "USD";

/// One cart line to quote. `quantity` is forwarded to the vendor as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingItem {
    pub pid: String,
    pub quantity: u32,
}

/// A cart and its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRequest {
    pub products: Vec<ShippingItem>,
    /// Destination country code, e.g. `"US"`.
    pub country: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreightBody<'a> {
    products: &'a [ShippingItem],
    start_country: &'static str,
    end_country: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_province: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_city: Option<&'a str>,
}

impl<'a> FreightBody<'a> {
    fn from_request(request: &'a ShippingRequest) -> Self {
        Self {
            products: &request.products,
            start_country: ORIGIN_COUNTRY,
            end_country: &request.country,
            end_province: request.province.as_deref(),
            end_city: request.city.as_deref(),
        }
    }
}

/// Cheapest freight cost plus every logistics option the vendor offered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub cost: Decimal,
    pub currency: String,
    /// Vendor logistics options, unfiltered and unmodelled.
    pub logistics: Vec<Value>,
}

impl CjClient {
    /// Quotes shipping for a cart from `CN` to the requested destination.
    ///
    /// # Errors
    ///
    /// - [`CjError::ShippingCalculation`] if the vendor reports `result: false`.
    /// - [`CjError::Authentication`] if a token had to be obtained and the exchange failed.
    /// - [`CjError::Http`] on network failure.
    /// - [`CjError::Deserialize`] if the response does not match the expected shape.
    pub async fn calculate_shipping_cost(
        &self,
        request: &ShippingRequest,
    ) -> Result<ShippingQuote, CjError> {
        let body = FreightBody::from_request(request);
        let url = self.build_url(FREIGHT_PATH, &[]);
        let context = format!("logistic/freightCalculate(country={})", request.country);

        let response = self.post_json(&url, &body, &context, Replay::Once).await?;
        Self::check_result(&response, CjError::ShippingCalculation)?;

        let envelope: ApiResponse<FreightData> = Self::decode(response, &context)?;
        let data = envelope.data.ok_or_else(|| {
            CjError::ShippingCalculation("response carried no freight data".to_owned())
        })?;
        Ok(quote_from_freight(data))
    }
}

/// Uses the vendor's `minCost`, or the cheapest `logisticPrice` among the
/// options when `minCost` is missing or unreadable.
fn quote_from_freight(data: FreightData) -> ShippingQuote {
    let min_cost = data
        .min_cost
        .as_ref()
        .and_then(|v| numeric_value(v).value());
    let cost = min_cost
        .or_else(|| {
            data.logistics
                .iter()
                .filter_map(|option| option.get("logisticPrice"))
                .filter_map(|price| numeric_value(price).value())
                .min()
        })
        .unwrap_or(Decimal::ZERO);
    let currency = data
        .currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

    ShippingQuote {
        cost,
        currency,
        logistics: data.logistics,
    }
}

fn numeric_value(value: &Value) -> Parsed<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => Parsed::Defaulted,
    }
}
