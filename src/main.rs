use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;

use donation_portal::cms::{CmsService, ContentfulClient};
use donation_portal::config::AppConfig;
use donation_portal::mailer::Mailer;
use donation_portal::payments::RazorpayGateway;
use donation_portal::receipt::{LinkSigner, ReceiptAssets, ReceiptStore};
use donation_portal::routes::site::DEFAULT_INDEX;
use donation_portal::tasks::BackgroundTasks;
use donation_portal::{build_router, telemetry, AppState, PaymentKeys};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if it exists
    dotenvy::dotenv().ok();

    telemetry::init();
    tracing::info!("Starting donation portal...");

    let config = AppConfig::from_env()?;

    let gateway = RazorpayGateway::new(&config.razorpay, config.upstream_timeout)?;
    let cms = CmsService::new(Arc::new(ContentfulClient::new(&config.cms, config.upstream_timeout)?));
    let receipts = ReceiptStore::from_config(&config.storage)?;
    let mailer = Mailer::from_config(config.smtp.as_ref())?;
    let assets = ReceiptAssets::load(&config.org);
    let http = reqwest::Client::builder().timeout(config.upstream_timeout).build()?;

    let index_path = format!("{}/index.html", config.static_dir);
    let index_template = match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("{} unavailable ({}), serving built-in page", index_path, e);
            DEFAULT_INDEX.to_string()
        }
    };

    let tasks = BackgroundTasks::new();
    let state = AppState {
        gateway: Arc::new(gateway),
        keys: PaymentKeys {
            key_id: config.razorpay.key_id.clone(),
            key_secret: config.razorpay.key_secret.clone(),
        },
        cms,
        receipts,
        links: LinkSigner::new(config.links.secret.clone(), config.links.ttl_hours),
        mailer,
        tasks: tasks.clone(),
        org: Arc::new(config.org.clone()),
        assets: Arc::new(assets),
        http,
        geocoder_base: config.geocoder_base.clone(),
        index_template: Arc::new(index_template),
        static_dir: config.static_dir.clone(),
    };

    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    let app = build_router(state)
        .layer(cors_layer(&config))
        .layer(GovernorLayer::new(governor_config));

    let addr = config.server_addr;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Requests are done; let queued confirmation mail finish.
    tasks.drain(config.upstream_timeout).await;
    tracing::info!("shutdown complete");

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid ALLOWED_ORIGINS entry: {}", o);
                None
            }
        })
        .collect();
    if origins.is_empty() && !config.is_production() {
        origins = vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ];
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
