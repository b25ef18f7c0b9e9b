use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse},
};

use crate::payments::inject_checkout_script;
use crate::AppState;

/// Used when no `index.html` exists under the static dir.
pub const DEFAULT_INDEX: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ORG_NAME}}</title>
</head>
<body>
  <div id="app" data-checkout-key="{{RAZORPAY_KEY_ID}}"></div>
</body>
</html>
"#;

pub fn render_index(template: &str, org_name: &str, key_id: &str) -> String {
    let html = template
        .replace("{{ORG_NAME}}", org_name)
        .replace("{{RAZORPAY_KEY_ID}}", key_id);
    inject_checkout_script(&html).into_owned()
}

pub async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    Html(render_index(&state.index_template, &state.org.name, &state.keys.key_id))
}

pub async fn spa_fallback(State(state): State<AppState>, req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path();
    if path.starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }
    serve_index(State(state)).await.into_response()
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn cache_control(req: Request<Body>, next: Next) -> impl IntoResponse {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;
    if response.headers().contains_key(header::CACHE_CONTROL) {
        return response;
    }

    let value = if path.starts_with("/assets/") && response.status() == StatusCode::OK {
        "public, max-age=86400"
    } else if path.starts_with("/api/") {
        "no-store"
    } else {
        "no-cache"
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    response
}
