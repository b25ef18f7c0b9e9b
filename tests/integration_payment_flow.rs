mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::{body_bytes, body_json, get, post_json, send, FakeGateway, FakeSource, KEY_ID, KEY_SECRET};
use donation_portal::build_router;
use donation_portal::payments::signature::expected_signature;

fn donor() -> serde_json::Value {
    json!({
        "name": "Asha Verma",
        "email": "asha@example.com",
        "phone": "9876543210",
        "pan": "ABCDE1234F",
        "donation_type": "Education"
    })
}

#[tokio::test]
async fn create_order_returns_checkout_configuration() {
    let app = common::app();
    let resp = send(&app, post_json("/api/create-order", &json!({ "amount": 500, "donor": donor() }))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["amount"], 50_000);
    assert_eq!(body["order"]["currency"], "INR");
    assert!(body["order"]["receipt"].as_str().expect("receipt").starts_with("rcpt_"));
    assert_eq!(body["checkout"]["key"], KEY_ID);
    assert_eq!(body["checkout"]["order_id"], body["order"]["id"]);
    assert_eq!(body["checkout"]["prefill"]["email"], "asha@example.com");
}

#[tokio::test]
async fn create_order_rejects_out_of_range_amounts() {
    let app = common::app();
    for amount in [0.0, 0.5, 100_001.0] {
        let resp = send(&app, post_json("/api/create-order", &json!({ "amount": amount }))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "amount {}", amount);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["fields"][0]["field"], "amount");
    }
}

#[tokio::test]
async fn create_order_reports_every_invalid_donor_field() {
    let app = common::app();
    let bad = json!({ "name": "", "email": "asha@", "phone": "12345", "pan": "abcde1234f" });
    let resp = send(&app, post_json("/api/create-order", &json!({ "amount": 100, "donor": bad }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "email", "phone", "pan"]);
}

#[tokio::test]
async fn create_order_rejects_foreign_currency() {
    let app = common::app();
    let resp = send(&app, post_json("/api/create-order", &json!({ "amount": 100, "currency": "usd" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gateway_rejection_maps_to_bad_gateway() {
    let gateway = Arc::new(FakeGateway { fail_create: true, ..Default::default() });
    let app = build_router(common::state(gateway, FakeSource::default()));
    let resp = send(&app, post_json("/api/create-order", &json!({ "amount": 100 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["error"], "gateway_rejected");
}

#[tokio::test]
async fn tampered_signature_is_not_verified() {
    let app = common::app();
    let resp = send(
        &app,
        post_json(
            "/api/verify-payment",
            &json!({
                "razorpay_order_id": "order_test_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": "00ff",
                "email": "asha@example.com",
                "amount": 500
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["verified"], false);
    assert_eq!(body["success"], false);
}

/// 2026-10-02T09:30:00Z
const ORDER_CREATED_AT: i64 = 1_790_933_400;

fn app_with_order_time() -> axum::Router {
    let gateway = Arc::new(FakeGateway { created_at: Some(ORDER_CREATED_AT), ..Default::default() });
    build_router(common::state(gateway, FakeSource::default()))
}

async fn signed_verification(app: &axum::Router, payment_id: &str, extra: serde_json::Value) -> serde_json::Value {
    let created = body_json(send(app, post_json("/api/create-order", &json!({ "amount": 1500, "donor": donor() }))).await).await;
    let order_id = created["order"]["id"].as_str().expect("order id").to_string();
    let signature = expected_signature(&order_id, payment_id, KEY_SECRET).expect("signature");
    let mut body = json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": payment_id,
        "razorpay_signature": signature,
    });
    for (k, v) in extra.as_object().expect("object") {
        body[k] = v.clone();
    }
    body
}

#[tokio::test]
async fn verified_payment_produces_downloadable_receipt() {
    let app = app_with_order_time();

    let created = body_json(send(&app, post_json("/api/create-order", &json!({ "amount": 1500, "donor": donor() }))).await).await;
    let order_id = created["order"]["id"].as_str().expect("order id").to_string();
    let payment_id = "pay_N5x1";
    let signature = expected_signature(&order_id, payment_id, KEY_SECRET).expect("signature");

    let resp = send(
        &app,
        post_json(
            "/api/verify-payment",
            &json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": payment_id,
                "razorpay_signature": signature,
                "notes": { "name": "Asha Verma", "pan": "abcde1234f" },
                // Ignored: the gateway's order amount wins.
                "amount": 1,
                "email": "asha@example.com",
                "contact": "9876543210",
                // Ignored: the receipt is dated by the gateway's order.
                "created_at": "2019-03-31T10:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["verified"], true);
    assert_eq!(body["payment_id"], payment_id);
    let number = body["receipt_number"].as_str().expect("receipt number");
    assert!(number.starts_with("SEVA-20261002-"));

    let url = body["receipt_url"].as_str().expect("receipt url").to_string();
    let resp = send(&app, get(&url)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    let pdf = body_bytes(resp).await;
    assert!(pdf.starts_with(b"%PDF"));

    let (path, _) = url.split_once('?').expect("query");
    let resp = send(&app, get(&format!("{}?token=forged", path))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = send(&app, get(path)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verification_falls_back_to_client_amount_when_order_unknown() {
    let app = common::app();
    let signature = expected_signature("order_elsewhere", "pay_2", KEY_SECRET).expect("signature");
    let base = json!({
        "razorpay_order_id": "order_elsewhere",
        "razorpay_payment_id": "pay_2",
        "razorpay_signature": signature,
        "email": "asha@example.com"
    });

    let resp = send(&app, post_json("/api/verify-payment", &base)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut with_amount = base.clone();
    with_amount["amount"] = json!(250);
    let resp = send(&app, post_json("/api/verify-payment", &with_amount)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["verified"], true);
}

#[tokio::test]
async fn client_date_on_fallback_is_clamped_to_today() {
    let app = common::app();
    let signature = expected_signature("order_elsewhere", "pay_3", KEY_SECRET).expect("signature");
    let body = json!({
        "razorpay_order_id": "order_elsewhere",
        "razorpay_payment_id": "pay_3",
        "razorpay_signature": signature,
        "email": "asha@example.com",
        "amount": 250,
        "created_at": "2099-01-01T00:00:00Z"
    });
    let resp = send(&app, post_json("/api/verify-payment", &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let today = chrono::Utc::now().format("%Y%m%d").to_string();
    let number = body_json(resp).await["receipt_number"].as_str().expect("receipt number").to_string();
    assert!(number.starts_with(&format!("SEVA-{}-", today)), "{}", number);
}

#[tokio::test]
async fn verification_rejects_invalid_pan_before_issuing_receipt() {
    let app = app_with_order_time();
    let body = signed_verification(
        &app,
        "pay_badpan",
        json!({
            "notes": { "name": "Asha Verma", "pan": "NOTAPAN" },
            "email": "asha@example.com",
            "created_at": "2019-03-31T10:00:00Z"
        }),
    )
    .await;
    let resp = send(&app, post_json("/api/verify-payment", &body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["fields"][0]["field"], "pan");
    assert!(body.get("receipt_url").is_none());
}

#[tokio::test]
async fn verification_rejects_invalid_email() {
    let app = app_with_order_time();
    let body = signed_verification(&app, "pay_bademail", json!({ "email": "not-an-email" })).await;
    let resp = send(&app, post_json("/api/verify-payment", &body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["fields"][0]["field"], "email");
}

#[tokio::test]
async fn invalid_contact_is_left_off_the_receipt_without_failing() {
    let app = app_with_order_time();
    let body = signed_verification(&app, "pay_badphone", json!({ "email": "asha@example.com", "contact": "12" })).await;
    let resp = send(&app, post_json("/api/verify-payment", &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["verified"], true);
    assert!(body["receipt_number"].as_str().expect("receipt number").starts_with("SEVA-20261002-"));
}

#[tokio::test]
async fn receipt_for_unknown_id_is_not_found_even_with_valid_token() {
    let state = common::state(Arc::new(FakeGateway::default()), FakeSource::default());
    let url = state.links.url("0000000000000000").expect("url");
    let app = build_router(state);
    let resp = send(&app, get(&url)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
