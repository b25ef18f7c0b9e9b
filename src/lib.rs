//! Server for a non-profit's website: donations through a hosted payment
//! gateway, PDF receipts, CMS-backed event and gallery listings, and
//! multi-step intake forms for material, food and volunteer offers.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod cms;
pub mod config;
pub mod error;
pub mod forms;
pub mod mailer;
pub mod payments;
pub mod receipt;
pub mod routes;
pub mod tasks;
pub mod telemetry;
pub mod validation;

use cms::CmsService;
use config::OrgConfig;
use mailer::Mailer;
use payments::PaymentGateway;
use receipt::{LinkSigner, ReceiptAssets, ReceiptStore};
use tasks::BackgroundTasks;

/// Credentials the server needs after the order exists: the public key for the
/// checkout widget and the secret for signature checks.
#[derive(Clone)]
pub struct PaymentKeys {
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub keys: PaymentKeys,
    pub cms: CmsService,
    pub receipts: ReceiptStore,
    pub links: LinkSigner,
    pub mailer: Mailer,
    pub tasks: BackgroundTasks,
    pub org: Arc<OrgConfig>,
    pub assets: Arc<ReceiptAssets>,
    pub http: reqwest::Client,
    pub geocoder_base: String,
    pub index_template: Arc<String>,
    pub static_dir: String,
}

pub fn build_router(state: AppState) -> Router {
    let assets_dir = format!("{}/assets", state.static_dir);
    Router::new()
        .route("/", get(routes::site::serve_index))
        .route("/index.html", get(routes::site::serve_index))
        .route("/health", get(routes::site::health_check))
        .route("/api/create-order", post(routes::payments::create_order))
        .route("/api/verify-payment", post(routes::payments::verify_payment))
        .route("/api/receipts/{id}", get(routes::receipts::download_receipt))
        .route("/api/events", get(routes::content::list_events))
        .route("/api/past-events", get(routes::content::list_past_events))
        .route("/api/gallery", get(routes::content::list_gallery))
        .route("/api/forms/{kind}", get(routes::forms::describe_form))
        .route("/api/forms/{kind}/step", post(routes::forms::navigate_step))
        .route("/api/forms/{kind}/submit", post(routes::forms::submit_form))
        .route("/api/geocode/reverse", get(routes::geocode::reverse))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .fallback(get(routes::site::spa_fallback))
        .layer(from_fn(routes::site::cache_control))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'; script-src 'self' https://checkout.razorpay.com; frame-src https://api.razorpay.com https://checkout.razorpay.com; img-src 'self' data: https://images.ctfassets.net; connect-src 'self' https://api.razorpay.com https://lumberjack.razorpay.com; style-src 'self' 'unsafe-inline';"),
        ))
        .with_state(state)
}
