use std::collections::BTreeMap;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::mailer;
use crate::payments::{
    method_label, new_order_reference, verify_signature, CheckoutOptions, DonorPrefill,
    OrderRequest, DEFAULT_CURRENCY,
};
use crate::receipt::{self, ReceiptData};
use crate::validation::{is_valid_email, is_valid_pan, is_valid_phone, validate_amount, Checker};
use crate::AppState;

/// Donor details collected by the donation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonorDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub donation_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DonorDetails {
    fn check(&self, c: &mut Checker) {
        c.required(&self.name, "name")
            .check(is_valid_email(&self.email), "email", "Please enter a valid email address")
            .check(is_valid_phone(&self.phone), "phone", "Please enter a valid 10-digit phone number");
        if let Some(pan) = self.pan.as_deref().filter(|p| !p.trim().is_empty()) {
            c.check(is_valid_pan(pan), "pan", "Please enter a valid PAN (e.g. ABCDE1234F)");
        }
    }

    fn notes(&self) -> BTreeMap<String, String> {
        let mut notes = BTreeMap::new();
        notes.insert("name".to_string(), self.name.trim().to_string());
        notes.insert("email".to_string(), self.email.trim().to_string());
        notes.insert("phone".to_string(), self.phone.trim().to_string());
        let optional = [
            ("pan", &self.pan),
            ("address", &self.address),
            ("donation_type", &self.donation_type),
            ("message", &self.message),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                notes.insert(key.to_string(), v.to_string());
            }
        }
        notes
    }
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub amount: f64, // rupees
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub donor: Option<DonorDetails>,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let amount = validate_amount(req.amount)?;
    let mut c = Checker::new();
    if let Some(donor) = &req.donor {
        donor.check(&mut c);
    }
    c.finish()?;

    let currency = req
        .currency
        .as_deref()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    if currency != DEFAULT_CURRENCY {
        return Err(ApiError::BadRequest(format!("Unsupported currency {}", currency)));
    }

    let order_req = OrderRequest {
        amount,
        currency,
        receipt: req
            .receipt
            .filter(|r| !r.trim().is_empty() && r.len() <= 40)
            .unwrap_or_else(new_order_reference),
    };
    let order = state.gateway.create_order(&order_req).await?;

    let donor = req.donor.unwrap_or_default();
    let prefill = DonorPrefill {
        name: donor.name.trim().to_string(),
        email: donor.email.trim().to_string(),
        contact: donor.phone.trim().to_string(),
    };
    let notes = if donor.name.is_empty() { BTreeMap::new() } else { donor.notes() };
    let checkout = CheckoutOptions::for_order(&order, &state.keys.key_id, &state.org.name, prefill, notes);

    Ok((
        StatusCode::OK,
        AxumJson(json!({ "success": true, "order": order, "checkout": checkout })),
    ))
}

/// Notes echoed back from checkout; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentNotes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub donation_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(default)]
    pub notes: PaymentNotes,
    #[serde(default)]
    pub amount: Option<f64>, // rupees
    pub email: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Day the gateway recorded the order, in UTC.
fn order_date(created_at: Option<i64>, today: NaiveDate) -> NaiveDate {
    created_at
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.date_naive())
        .unwrap_or(today)
}

/// Client-reported timestamp, used only when the gateway order is unavailable.
/// Never later than `today`.
fn client_date(created_at: Option<&str>, today: NaiveDate) -> NaiveDate {
    created_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc).date_naive().min(today))
        .unwrap_or(today)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = req.razorpay_order_id.trim().to_string();
    let payment_id = req.razorpay_payment_id.trim().to_string();

    if !verify_signature(&order_id, &payment_id, &req.razorpay_signature, &state.keys.key_secret) {
        tracing::warn!(%order_id, %payment_id, "payment signature mismatch");
        return Ok((
            StatusCode::BAD_REQUEST,
            AxumJson(json!({
                "success": false,
                "verified": false,
                "error": "signature_mismatch",
                "message": "Payment verification failed",
            })),
        ));
    }
    tracing::info!(%order_id, %payment_id, "payment verified");

    let notes = req.notes;
    let email = req.email.trim().to_string();
    let pan = non_empty(notes.pan).map(|p| p.to_uppercase());
    let mut c = Checker::new();
    c.check(is_valid_email(&email), "email", "Please enter a valid email address");
    if let Some(pan) = &pan {
        c.check(is_valid_pan(pan), "pan", "Please enter a valid PAN (e.g. ABCDE1234F)");
    }
    if let Err(errors) = c.finish() {
        tracing::warn!(%order_id, %payment_id, "verified payment carries invalid donor details");
        return Err(errors.into());
    }

    // The gateway's order is authoritative for amount and date; the client's
    // values are a fallback.
    let today = Utc::now().date_naive();
    let (amount_paise, date) = match state.gateway.fetch_order(&order_id).await {
        Ok(order) => (order.amount, order_date(order.created_at, today)),
        Err(e) => {
            tracing::warn!("Order lookup failed, using client amount: {}", e);
            match req.amount.map(validate_amount) {
                Some(Ok(paise)) => (paise, client_date(req.created_at.as_deref(), today)),
                _ => return Err(ApiError::BadRequest("Missing or invalid amount".to_string())),
            }
        }
    };

    let payment_method = match state.gateway.fetch_payment_method(&payment_id).await {
        Ok(method) => method_label(method.as_deref().unwrap_or("")),
        Err(e) => {
            tracing::warn!("Payment method lookup failed: {}", e);
            method_label("")
        }
    };

    let data = ReceiptData {
        receipt_number: receipt::receipt_number(&state.org.receipt_prefix, date, &payment_id),
        date,
        donor_name: non_empty(notes.name).unwrap_or_else(|| "Donor".to_string()),
        email,
        phone: non_empty(req.contact).filter(|p| is_valid_phone(p)),
        pan,
        address: non_empty(notes.address),
        amount_paise,
        payment_method,
        payment_id: payment_id.clone(),
        order_id: order_id.clone(),
        donation_type: non_empty(notes.donation_type),
    };
    let receipt_id = receipt::receipt_id(&payment_id);

    let pdf = {
        let (data, org, assets) = (data.clone(), state.org.clone(), state.assets.clone());
        match tokio::task::spawn_blocking(move || receipt::generate_receipt(&data, &org, &assets)).await {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(e)) => {
                tracing::error!(%payment_id, "Receipt generation failed: {}", e);
                None
            }
            Err(e) => {
                tracing::error!(%payment_id, "Receipt task panicked: {}", e);
                None
            }
        }
    };

    let mut receipt_url = None;
    if let Some(bytes) = &pdf {
        match state.receipts.put(&receipt_id, bytes.clone()).await {
            Ok(()) => match state.links.url(&receipt_id) {
                Ok(url) => receipt_url = Some(url),
                Err(e) => tracing::error!("Receipt link signing failed: {}", e),
            },
            Err(e) => tracing::error!(%receipt_id, "Receipt storage failed: {}", e),
        }
    }

    let receipt_number = pdf.as_ref().map(|_| data.receipt_number.clone());
    let mailer = state.mailer.clone();
    let org = state.org.clone();
    let mail_data = data;
    let mail_url = receipt_url.clone();
    state.tasks.spawn(async move {
        let donor_mail = mailer::donor_confirmation(&mail_data, &org, pdf.as_deref(), mail_url.as_deref());
        if let Err(e) = mailer.send(&donor_mail).await {
            tracing::error!(receipt = %mail_data.receipt_number, "Donor email failed: {}", e);
        }
        if let Some(admin) = mailer.admin_email() {
            let admin_mail = mailer::admin_notification(&mail_data, admin, pdf.as_deref());
            if let Err(e) = mailer.send(&admin_mail).await {
                tracing::error!(receipt = %mail_data.receipt_number, "Admin email failed: {}", e);
            }
        }
    });

    Ok((
        StatusCode::OK,
        AxumJson(json!({
            "success": true,
            "verified": true,
            "payment_id": payment_id,
            "order_id": order_id,
            "receipt_number": receipt_number,
            "receipt_url": receipt_url,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_date_reads_gateway_timestamp() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        // 2026-03-05T04:30:00Z
        assert_eq!(order_date(Some(1_772_685_000), today), NaiveDate::from_ymd_opt(2026, 3, 5).expect("date"));
        assert_eq!(order_date(None, today), today);
    }

    #[test]
    fn client_date_is_never_in_the_future() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        assert_eq!(
            client_date(Some("2026-03-05T10:00:00+05:30"), today),
            NaiveDate::from_ymd_opt(2026, 3, 5).expect("date")
        );
        assert_eq!(client_date(Some("2031-01-01T00:00:00Z"), today), today);
        assert_eq!(client_date(Some("garbage"), today), today);
    }

    #[test]
    fn donor_notes_skip_blank_optionals() {
        let donor = DonorDetails {
            name: " Asha ".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            pan: Some("  ".to_string()),
            address: None,
            donation_type: Some("Education".to_string()),
            message: None,
        };
        let notes = donor.notes();
        assert_eq!(notes.get("name").map(String::as_str), Some("Asha"));
        assert!(!notes.contains_key("pan"));
        assert_eq!(notes.get("donation_type").map(String::as_str), Some("Education"));
    }

    #[test]
    fn donor_check_flags_lowercase_pan() {
        let donor = DonorDetails {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            pan: Some("abcde1234f".to_string()),
            ..Default::default()
        };
        let mut c = Checker::new();
        donor.check(&mut c);
        let errs = c.finish().unwrap_err();
        assert_eq!(errs.0[0].field, "pan");
    }
}
