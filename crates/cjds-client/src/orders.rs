//! Order submission and lookup.
//!
//! The vendor exposes no idempotency key. `order_number` is the only handle a
//! caller has on duplicates, so [`CjClient::create_order`] is never sent twice
//! by this client, not even after a token rejection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{CjClient, Replay};
use crate::error::CjError;
use crate::types::{ApiResponse, OrderCreatedData};

pub(crate) const CREATE_ORDER_PATH: &str = "api2.0/v1/shopping/order/createOrder";
pub(crate) const ORDER_DETAIL_PATH: &str = "api2.0/v1/shopping/order/getOrderDetail";

/// Recipient address and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub country: String,
    /// ISO 3166-1 alpha-2, e.g. `"US"`.
    pub country_code: String,
    pub province: String,
    pub city: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub pid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vid: Option<String>,
    pub quantity: u32,
}

/// An order as submitted to `createOrder`. Serializes to the vendor body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Caller-generated; must be unique per vendor account.
    pub order_number: String,
    pub shipping_address: ShippingAddress,
    pub products: Vec<OrderLine>,
    /// Logistics option name chosen from a shipping quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: String,
    pub order_number: String,
    /// Vendor status string, e.g. `"CREATED"`; not a closed set.
    pub status: String,
}

impl CjClient {
    /// Submits an order.
    ///
    /// # Errors
    ///
    /// - [`CjError::OrderCreation`] if the vendor reports `result: false` or
    ///   returns no order data.
    /// - [`CjError::Unauthorized`] if the vendor rejected the access token;
    ///   the token is dropped but the order is not resent.
    /// - [`CjError::Authentication`], [`CjError::Http`], [`CjError::Deserialize`]
    ///   as for the other gateway calls.
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderResult, CjError> {
        let url = self.build_url(CREATE_ORDER_PATH, &[]);
        let context = format!("shopping/order/createOrder(orderNumber={})", order.order_number);
        tracing::info!(
            order_number = %order.order_number,
            lines = order.products.len(),
            "submitting CJ order"
        );

        let body = self.post_json(&url, order, &context, Replay::Never).await?;
        Self::check_result(&body, CjError::OrderCreation)?;

        let envelope: ApiResponse<OrderCreatedData> = Self::decode(body, &context)?;
        let data = envelope
            .data
            .ok_or_else(|| CjError::OrderCreation("response carried no order data".to_owned()))?;

        let order_number = if data.order_number.is_empty() {
            order.order_number.clone()
        } else {
            data.order_number
        };
        Ok(OrderResult {
            order_id: data.order_id,
            order_number,
            status: data.order_status,
        })
    }

    /// Fetches the vendor's order record (status, tracking) as-is.
    ///
    /// # Errors
    ///
    /// - [`CjError::OrderLookup`] if the vendor reports `result: false`.
    /// - [`CjError::Authentication`], [`CjError::Http`], [`CjError::Deserialize`]
    ///   as for the other gateway calls.
    pub async fn get_order_details(&self, order_number: &str) -> Result<Value, CjError> {
        let url = self.build_url(ORDER_DETAIL_PATH, &[("orderNumber", order_number.to_owned())]);
        let context = format!("shopping/order/getOrderDetail(orderNumber={order_number})");
        let body = self.get_json(&url, &context).await?;
        Self::check_result(&body, CjError::OrderLookup)?;

        let envelope: ApiResponse<Value> = Self::decode(body, &context)?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
