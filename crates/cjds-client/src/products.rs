//! Product query endpoints: search, detail, categories and trending.

use cjds_core::CanonicalProduct;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::client::CjClient;
use crate::error::CjError;
use crate::normalize::transform_products;
use crate::types::{ApiResponse, ProductListData, RawCategory, RawProduct};

pub(crate) const PRODUCT_LIST_PATH: &str = "api2.0/v1/product/list";
pub(crate) const PRODUCT_QUERY_PATH: &str = "api2.0/v1/product/query";
pub(crate) const CATEGORY_PATH: &str = "api2.0/v1/product/getCategory";

const DEFAULT_PAGE_NUM: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort order used for "trending": descending units sold.
pub const TRENDING_SORT: &str = "sellQuantity_desc";

/// Filters for `product/list`. Unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// 1-based page number; `1` when unset.
    pub page_num: Option<u32>,
    /// Page size; `20` when unset.
    pub page_size: Option<u32>,
    pub category_id: Option<String>,
    pub keyword: Option<String>,
    pub sort_by: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

impl ProductQuery {
    /// Query parameters in the vendor's documented order. Blank strings count
    /// as unset so the vendor never receives `keyword=` and the like.
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "pageNum",
                self.page_num.unwrap_or(DEFAULT_PAGE_NUM).to_string(),
            ),
            (
                "pageSize",
                self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string(),
            ),
        ];
        let text = [
            ("categoryId", &self.category_id),
            ("keyword", &self.keyword),
            ("sortBy", &self.sort_by),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                params.push((key, v.to_owned()));
            }
        }
        if let Some(min) = self.price_min {
            params.push(("priceMin", min.normalize().to_string()));
        }
        if let Some(max) = self.price_max {
            params.push(("priceMax", max.normalize().to_string()));
        }
        params
    }
}

/// One page of `product/list` results, still in vendor shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<RawProduct>,
    pub total: u64,
    pub page_num: u64,
    pub page_size: u64,
}

impl ProductPage {
    /// Normalizes every product on the page.
    #[must_use]
    pub fn into_canonical(self) -> Vec<CanonicalProduct> {
        transform_products(self.products)
    }
}

impl CjClient {
    /// Searches the catalog with the given filters.
    ///
    /// # Errors
    ///
    /// - [`CjError::ProductFetch`] if the vendor reports `result: false`.
    /// - [`CjError::Authentication`] if a token had to be obtained and the exchange failed.
    /// - [`CjError::Http`] on network failure.
    /// - [`CjError::Deserialize`] if the response does not match the expected shape.
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, CjError> {
        let url = self.build_url(PRODUCT_LIST_PATH, &query.to_params());
        let body = self.get_json(&url, "product/list").await?;
        Self::check_result(&body, CjError::ProductFetch)?;

        let envelope: ApiResponse<ProductListData> = Self::decode(body, "product/list")?;
        let data = envelope
            .data
            .ok_or_else(|| CjError::ProductFetch("response carried no product list".to_owned()))?;

        tracing::debug!(
            count = data.list.len(),
            total = data.total,
            page_num = data.page_num,
            "fetched CJ product page"
        );
        Ok(ProductPage {
            products: data.list,
            total: data.total,
            page_num: data.page_num,
            page_size: data.page_size,
        })
    }

    /// Fetches a single product by vendor id.
    ///
    /// No batching: callers looking up several ids pace the calls themselves.
    ///
    /// # Errors
    ///
    /// Same as [`CjClient::get_products`].
    pub async fn get_product_details(&self, pid: &str) -> Result<RawProduct, CjError> {
        let url = self.build_url(PRODUCT_QUERY_PATH, &[("pid", pid.to_owned())]);
        let context = format!("product/query(pid={pid})");
        let body = self.get_json(&url, &context).await?;
        Self::check_result(&body, CjError::ProductFetch)?;

        let envelope: ApiResponse<RawProduct> = Self::decode(body, &context)?;
        envelope
            .data
            .ok_or_else(|| CjError::ProductFetch(format!("no product data for pid {pid}")))
    }

    /// Lists the vendor's product categories. Not cached.
    ///
    /// # Errors
    ///
    /// - [`CjError::CategoryFetch`] if the vendor reports `result: false`.
    /// - [`CjError::Authentication`], [`CjError::Http`], [`CjError::Deserialize`]
    ///   as for [`CjClient::get_products`].
    pub async fn get_categories(&self) -> Result<Vec<RawCategory>, CjError> {
        let url = self.build_url(CATEGORY_PATH, &[]);
        let body = self.get_json(&url, "product/getCategory").await?;
        Self::check_result(&body, CjError::CategoryFetch)?;

        let envelope: ApiResponse<Vec<RawCategory>> = Self::decode(body, "product/getCategory")?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// The first `limit` products ordered by units sold, descending.
    ///
    /// # Errors
    ///
    /// Same as [`CjClient::get_products`].
    pub async fn get_trending_products(&self, limit: u32) -> Result<Vec<RawProduct>, CjError> {
        let query = ProductQuery {
            page_size: Some(limit),
            sort_by: Some(TRENDING_SORT.to_owned()),
            ..ProductQuery::default()
        };
        Ok(self.get_products(&query).await?.products)
    }
}
