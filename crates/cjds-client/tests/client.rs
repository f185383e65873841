//! Integration tests for `CjClient` using wiremock HTTP mocks.
//!
//! Each test stands up its own mock vendor, so mock expectations
//! (`.expect(n)`) double as assertions on how many requests were made.

use cjds_client::{
    CjClient, CjError, OrderLine, OrderRequest, ProductQuery, ShippingAddress, ShippingItem,
    ShippingRequest,
};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH: &str = "/api2.0/v1/authentication/getAccessToken";
const LIST: &str = "/api2.0/v1/product/list";
const QUERY: &str = "/api2.0/v1/product/query";
const CATEGORY: &str = "/api2.0/v1/product/getCategory";
const FREIGHT: &str = "/api2.0/v1/logistic/freightCalculate";
const CREATE_ORDER: &str = "/api2.0/v1/shopping/order/createOrder";
const ORDER_DETAIL: &str = "/api2.0/v1/shopping/order/getOrderDetail";

fn test_client(base_url: &str) -> CjClient {
    CjClient::with_base_url("test-key", 5, base_url).expect("client construction should not fail")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 200,
        "result": true,
        "message": "Success",
        "data": data
    }))
}

fn rejected(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 1_600_200,
        "result": false,
        "message": message,
        "data": null
    }))
}

fn raw_product(pid: &str) -> serde_json::Value {
    json!({
        "pid": pid,
        "productNameEn": format!("Product {pid}"),
        "sellPrice": "9.99",
        "productImage": format!("https://cf.cjdropshipping.com/{pid}.jpg"),
        "sellQuantity": "12"
    })
}

fn product_list(pids: &[&str]) -> serde_json::Value {
    json!({
        "list": pids.iter().map(|p| raw_product(p)).collect::<Vec<_>>(),
        "total": pids.len(),
        "pageNum": 1,
        "pageSize": 20
    })
}

async fn mount_auth(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(AUTH))
        .and(header("CJ-Access-Token", "test-key"))
        .respond_with(ok(json!({
            "accessToken": token,
            "accessTokenExpiryDate": "2030-01-01T00:00:00+08:00"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}

fn sample_order() -> OrderRequest {
    OrderRequest {
        order_number: "NX-1001".to_owned(),
        shipping_address: ShippingAddress {
            name: "Ada Lovelace".to_owned(),
            phone: "+1 555 0100".to_owned(),
            email: "ada@example.com".to_owned(),
            country: "United States".to_owned(),
            country_code: "US".to_owned(),
            province: "TX".to_owned(),
            city: "Austin".to_owned(),
            address: "1 Main St".to_owned(),
            address2: None,
            zip: "73301".to_owned(),
        },
        products: vec![OrderLine {
            pid: "P1".to_owned(),
            vid: Some("V1".to_owned()),
            quantity: 1,
        }],
        logistics: Some("CJPacket".to_owned()),
        remark: None,
    }
}

// ---------------------------------------------------------------------------
// Token manager
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_returns_and_caches_token() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;

    let client = test_client(&server.uri());
    let token = client.authenticate().await.expect("should authenticate");

    assert_eq!(token.as_str(), "tok-1");
    assert_eq!(client.session().current().await, Some(token));
}

#[tokio::test]
async fn token_is_reused_across_gateway_calls() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .and(header("CJ-Access-Token", "tok-1"))
        .respond_with(ok(product_list(&["P1"])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CATEGORY))
        .and(header("CJ-Access-Token", "tok-1"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.authenticate().await.unwrap();
    client.get_products(&ProductQuery::default()).await.unwrap();
    client.get_products(&ProductQuery::default()).await.unwrap();
    client.get_categories().await.unwrap();
}

#[tokio::test]
async fn clearing_the_token_forces_a_new_exchange() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 2).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .respond_with(ok(product_list(&[])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.get_products(&ProductQuery::default()).await.unwrap();
    client.clear_token().await;
    assert!(client.session().current().await.is_none());
    client.get_products(&ProductQuery::default()).await.unwrap();
}

#[tokio::test]
async fn concurrent_cold_start_authenticates_once() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .respond_with(ok(product_list(&["P1"])))
        .expect(5)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let query = ProductQuery::default();
    let results =
        futures::future::join_all((0..5).map(|_| client.get_products(&query))).await;

    assert!(results.iter().all(Result::is_ok), "all calls should succeed");
}

#[tokio::test]
async fn authentication_rejection_carries_vendor_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(rejected("Invalid API key"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_categories().await.unwrap_err();

    assert!(
        matches!(err, CjError::Authentication(ref m) if m == "Invalid API key"),
        "expected Authentication error, got: {err:?}"
    );
    assert!(requests_to(&server, CATEGORY).await.is_empty());
}

#[tokio::test]
async fn authentication_without_token_field_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ok(json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, CjError::Authentication(_)), "got: {err:?}");
    assert!(client.session().current().await.is_none());
}

#[tokio::test]
async fn http_401_on_token_exchange_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_products(&ProductQuery::default()).await.unwrap_err();

    assert!(matches!(err, CjError::Authentication(_)), "got: {err:?}");
    assert!(requests_to(&server, LIST).await.is_empty());
}

#[tokio::test]
async fn http_401_replaces_token_and_repeats_lookup_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ok(json!({"accessToken": "tok-1"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ok(json!({"accessToken": "tok-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(header("CJ-Access-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(header("CJ-Access-Token", "tok-2"))
        .respond_with(ok(raw_product("P1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let product = client.get_product_details("P1").await.expect("retry should succeed");

    assert_eq!(product.pid, "P1");
    assert_eq!(
        client.session().current().await.map(|t| t.as_str().to_owned()),
        Some("tok-2".to_owned())
    );
}

// ---------------------------------------------------------------------------
// Product query gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_query_sends_only_page_defaults() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .respond_with(ok(product_list(&[])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.get_products(&ProductQuery::default()).await.unwrap();

    let requests = requests_to(&server, LIST).await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("pageNum=1&pageSize=20"));
}

#[tokio::test]
async fn keyword_search_sends_exact_parameters_and_returns_raw_products() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .and(query_param("keyword", "earbuds"))
        .respond_with(ok(json!({
            "list": [raw_product("P1"), raw_product("P2"), raw_product("P3")],
            "total": 3,
            "pageNum": 1,
            "pageSize": 5
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let query = ProductQuery {
        keyword: Some("earbuds".to_owned()),
        page_size: Some(5),
        ..ProductQuery::default()
    };
    let page = client.get_products(&query).await.expect("should parse page");

    assert_eq!(page.products.len(), 3);
    assert_eq!(page.total, 3);
    assert_eq!(page.page_size, 5);
    assert_eq!(page.products[0].sell_price, "9.99");

    let requests = requests_to(&server, LIST).await;
    assert_eq!(
        requests[0].url.query(),
        Some("pageNum=1&pageSize=5&keyword=earbuds")
    );

    let canonical = page.into_canonical();
    assert_eq!(canonical[2].id, "P3");
    assert_eq!(canonical[2].price, Decimal::new(999, 2));
}

#[tokio::test]
async fn trending_sorts_by_units_sold() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .and(query_param("sortBy", "sellQuantity_desc"))
        .respond_with(ok(product_list(&["P1", "P2"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let products = client.get_trending_products(10).await.unwrap();

    assert_eq!(products.len(), 2);
    let requests = requests_to(&server, LIST).await;
    assert_eq!(
        requests[0].url.query(),
        Some("pageNum=1&pageSize=10&sortBy=sellQuantity_desc")
    );
}

#[tokio::test]
async fn product_details_returns_raw_product() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("pid", "P42"))
        .respond_with(ok(json!({
            "pid": "P42",
            "productNameEn": "Phone Case",
            "sellPrice": 3.5,
            "variants": [{
                "vid": "V1",
                "variantSellPrice": "3.50",
                "variantKey": "{\"color\":\"Red\"}"
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let product = client.get_product_details("P42").await.unwrap();

    assert_eq!(product.pid, "P42");
    assert_eq!(product.variants.len(), 1);
    let canonical = cjds_client::transform_product(product);
    assert_eq!(canonical.price, Decimal::new(35, 1));
    assert_eq!(
        canonical.variants[0].attributes.get("color").map(String::as_str),
        Some("Red")
    );
}

#[tokio::test]
async fn categories_keep_vendor_fields() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(CATEGORY))
        .respond_with(ok(json!([
            {"categoryFirstName": "Electronics", "categoryFirstList": []},
            {"categoryId": "C2", "categoryName": "Toys"}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client.get_categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].extra["categoryFirstName"], "Electronics");
    assert_eq!(categories[1].category_name.as_deref(), Some("Toys"));
    assert!(requests_to(&server, CATEGORY).await[0].url.query().is_none());
}

// ---------------------------------------------------------------------------
// Shipping estimator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shipping_quote_posts_cart_from_cn() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("POST"))
        .and(path(FREIGHT))
        .and(body_partial_json(json!({
            "startCountry": "CN",
            "endCountry": "US",
            "endProvince": "TX",
            "products": [{"pid": "P1", "quantity": 3}]
        })))
        .respond_with(ok(json!({
            "minCost": 4.2,
            "currency": "USD",
            "logistics": [
                {"logisticName": "CJPacket", "logisticPrice": 4.2},
                {"logisticName": "DHL", "logisticPrice": 19.0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let quote = client
        .calculate_shipping_cost(&ShippingRequest {
            products: vec![ShippingItem {
                pid: "P1".to_owned(),
                quantity: 3,
            }],
            country: "US".to_owned(),
            province: Some("TX".to_owned()),
            city: None,
        })
        .await
        .unwrap();

    assert_eq!(quote.cost, Decimal::new(42, 1));
    assert_eq!(quote.currency, "USD");
    assert_eq!(quote.logistics.len(), 2);
    let body: serde_json::Value =
        serde_json::from_slice(&requests_to(&server, FREIGHT).await[0].body).unwrap();
    assert!(body.get("endCity").is_none());
}

#[tokio::test]
async fn shipping_quote_reauthenticates_after_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ok(json!({"accessToken": "tok-1"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AUTH))
        .respond_with(ok(json!({"accessToken": "tok-2"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FREIGHT))
        .and(header("CJ-Access-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FREIGHT))
        .and(header("CJ-Access-Token", "tok-2"))
        .and(body_partial_json(json!({"endCountry": "DE"})))
        .respond_with(ok(json!({"minCost": "5.10", "logistics": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let quote = client
        .calculate_shipping_cost(&ShippingRequest {
            products: vec![ShippingItem {
                pid: "P1".to_owned(),
                quantity: 1,
            }],
            country: "DE".to_owned(),
            province: None,
            city: None,
        })
        .await
        .expect("replayed quote should succeed");

    assert_eq!(quote.cost, Decimal::new(510, 2));
    assert_eq!(requests_to(&server, AUTH).await.len(), 2);
}

// ---------------------------------------------------------------------------
// Order submission gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_order_returns_result() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("POST"))
        .and(path(CREATE_ORDER))
        .and(body_partial_json(json!({
            "orderNumber": "NX-1001",
            "products": [{"pid": "P1", "vid": "V1", "quantity": 1}]
        })))
        .respond_with(ok(json!({
            "orderId": "210711100018043276",
            "orderNumber": "NX-1001",
            "orderStatus": "CREATED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.create_order(&sample_order()).await.unwrap();

    assert_eq!(result.order_id, "210711100018043276");
    assert_eq!(result.order_number, "NX-1001");
    assert_eq!(result.status, "CREATED");
}

#[tokio::test]
async fn create_order_is_not_resent_after_401() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("POST"))
        .and(path(CREATE_ORDER))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.create_order(&sample_order()).await.unwrap_err();

    assert!(matches!(err, CjError::Unauthorized { .. }), "got: {err:?}");
    assert!(client.session().current().await.is_none());
}

#[tokio::test]
async fn order_details_pass_through_vendor_payload() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(ORDER_DETAIL))
        .and(query_param("orderNumber", "NX-1001"))
        .respond_with(ok(json!({
            "orderNum": "NX-1001",
            "orderStatus": "SHIPPED",
            "trackNumber": "CJ123456789CN"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let detail = client.get_order_details("NX-1001").await.unwrap();

    assert_eq!(detail["trackNumber"], "CJ123456789CN");
    assert_eq!(detail["orderStatus"], "SHIPPED");
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_operation_surfaces_vendor_rejection_message() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    for (verb, endpoint) in [
        ("GET", LIST),
        ("GET", QUERY),
        ("GET", CATEGORY),
        ("POST", FREIGHT),
        ("POST", CREATE_ORDER),
        ("GET", ORDER_DETAIL),
    ] {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(rejected("quota exceeded"))
            .mount(&server)
            .await;
    }

    let client = test_client(&server.uri());
    let shipping = ShippingRequest {
        products: vec![ShippingItem {
            pid: "P1".to_owned(),
            quantity: 1,
        }],
        country: "US".to_owned(),
        province: None,
        city: None,
    };

    let errors = vec![
        client
            .get_products(&ProductQuery::default())
            .await
            .unwrap_err(),
        client.get_product_details("P1").await.unwrap_err(),
        client.get_trending_products(5).await.unwrap_err(),
        client.get_categories().await.unwrap_err(),
        client.calculate_shipping_cost(&shipping).await.unwrap_err(),
        client.create_order(&sample_order()).await.unwrap_err(),
        client.get_order_details("NX-1001").await.unwrap_err(),
    ];

    assert!(matches!(errors[0], CjError::ProductFetch(_)));
    assert!(matches!(errors[1], CjError::ProductFetch(_)));
    assert!(matches!(errors[2], CjError::ProductFetch(_)));
    assert!(matches!(errors[3], CjError::CategoryFetch(_)));
    assert!(matches!(errors[4], CjError::ShippingCalculation(_)));
    assert!(matches!(errors[5], CjError::OrderCreation(_)));
    assert!(matches!(errors[6], CjError::OrderLookup(_)));
    for err in &errors {
        let msg = err.to_string();
        assert!(
            msg.contains("quota exceeded"),
            "expected vendor message in error, got: {msg}"
        );
    }
}

#[tokio::test]
async fn non_2xx_envelope_still_reports_vendor_message() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "result": false,
            "message": "pid is required"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_product_details("").await.unwrap_err();

    assert!(matches!(err, CjError::ProductFetch(ref m) if m == "pid is required"), "got: {err:?}");
}

#[tokio::test]
async fn non_2xx_without_envelope_is_unexpected_status() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 1).await;
    Mock::given(method("GET"))
        .and(path(CATEGORY))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_categories().await.unwrap_err();

    assert!(
        matches!(err, CjError::UnexpectedStatus { status: 502, .. }),
        "got: {err:?}"
    );
}
