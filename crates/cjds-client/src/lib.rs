pub mod client;
pub mod error;
pub mod logistics;
pub mod normalize;
pub mod orders;
pub mod products;
pub mod session;
pub mod types;

pub use client::CjClient;
pub use error::CjError;
pub use logistics::{ShippingItem, ShippingQuote, ShippingRequest};
pub use normalize::{transform_product, transform_products};
pub use orders::{OrderLine, OrderRequest, OrderResult, ShippingAddress};
pub use products::{ProductPage, ProductQuery, TRENDING_SORT};
pub use session::{AccessToken, AuthSession};
pub use types::{RawCategory, RawProduct, RawVariant};
