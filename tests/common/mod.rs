#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use donation_portal::cms::{CmsError, CmsService, ContentSource, ContentType, EntryCollection};
use donation_portal::config::OrgConfig;
use donation_portal::mailer::Mailer;
use donation_portal::payments::{GatewayError, Order, OrderRequest, PaymentGateway};
use donation_portal::receipt::{LinkSigner, ReceiptAssets, ReceiptStore};
use donation_portal::routes::site::DEFAULT_INDEX;
use donation_portal::tasks::BackgroundTasks;
use donation_portal::{build_router, AppState, PaymentKeys};

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_secret";

/// Records created orders and answers lookups from them.
#[derive(Default)]
pub struct FakeGateway {
    pub orders: Mutex<HashMap<String, Order>>,
    pub fail_create: bool,
    /// Creation time stamped on new orders; now when unset.
    pub created_at: Option<i64>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, req: &OrderRequest) -> Result<Order, GatewayError> {
        if self.fail_create {
            return Err(GatewayError::Rejected { status: 400, message: "bad key".to_string() });
        }
        let mut orders = self.orders.lock().expect("orders lock");
        let order = Order {
            id: format!("order_test_{}", orders.len() + 1),
            amount: req.amount,
            currency: req.currency.clone(),
            receipt: Some(req.receipt.clone()),
            created_at: Some(self.created_at.unwrap_or_else(|| chrono::Utc::now().timestamp())),
        };
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError> {
        self.orders
            .lock()
            .expect("orders lock")
            .get(order_id)
            .cloned()
            .ok_or(GatewayError::Rejected { status: 404, message: "not found".to_string() })
    }

    async fn fetch_payment_method(&self, _payment_id: &str) -> Result<Option<String>, GatewayError> {
        Ok(Some("upi".to_string()))
    }
}

/// Serves canned collections keyed by content type id; anything else is a 503.
#[derive(Default)]
pub struct FakeSource {
    pub collections: HashMap<&'static str, Value>,
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn entries(&self, content_type: ContentType) -> Result<EntryCollection, CmsError> {
        match self.collections.get(content_type.id()) {
            Some(v) => Ok(serde_json::from_value(v.clone()).unwrap_or_default()),
            None => Err(CmsError::Status(503)),
        }
    }
}

pub fn org() -> OrgConfig {
    OrgConfig {
        name: "Seva Foundation".to_string(),
        address: "12 MG Road, Pune 411001".to_string(),
        registration_no: "MH/2015/0042".to_string(),
        pan: "AAATS1234Q".to_string(),
        exemption_no: "CIT(E)/80G/2019/77".to_string(),
        signatory: "R. Kulkarni".to_string(),
        logo_path: None,
        signature_path: None,
        receipt_prefix: "SEVA".to_string(),
        include_certificate: false,
    }
}

pub fn state(gateway: Arc<FakeGateway>, source: FakeSource) -> AppState {
    AppState {
        gateway,
        keys: PaymentKeys { key_id: KEY_ID.to_string(), key_secret: KEY_SECRET.to_string() },
        cms: CmsService::new(Arc::new(source)),
        receipts: ReceiptStore::in_memory().expect("memory store"),
        links: LinkSigner::new("link-secret", 1),
        mailer: Mailer::disabled(),
        tasks: BackgroundTasks::new(),
        org: Arc::new(org()),
        assets: Arc::new(ReceiptAssets::default()),
        http: reqwest::Client::new(),
        // Nothing listens here; geocoding calls fail fast.
        geocoder_base: "http://127.0.0.1:9".to_string(),
        index_template: Arc::new(DEFAULT_INDEX.to_string()),
        static_dir: "static".to_string(),
    }
}

pub fn app() -> Router {
    build_router(state(Arc::new(FakeGateway::default()), FakeSource::default()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("response")
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX).await.expect("body").to_vec()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}
