//! Payment gateway boundary.
//!
//! The hosted checkout runs in the browser; the server only creates orders,
//! hands the browser a ready-made checkout configuration and verifies the
//! signature the gateway returns on success.

pub mod checkout;
pub mod razorpay;
pub mod signature;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use checkout::{inject_checkout_script, CheckoutOptions, DonorPrefill, CHECKOUT_SCRIPT_SRC};
pub use razorpay::RazorpayGateway;
pub use signature::verify_signature;

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Minor units (paise).
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    /// Unix seconds, as reported by the gateway.
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, req: &OrderRequest) -> Result<Order, GatewayError>;

    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError>;

    /// Payment method reported by the gateway (`upi`, `card`, ...), if known.
    async fn fetch_payment_method(&self, payment_id: &str) -> Result<Option<String>, GatewayError>;
}

/// Human label for a gateway payment method code.
pub fn method_label(method: &str) -> String {
    match method.to_ascii_lowercase().as_str() {
        "upi" => "UPI".to_string(),
        "card" => "Card".to_string(),
        "netbanking" => "Net Banking".to_string(),
        "wallet" => "Wallet".to_string(),
        "emi" => "EMI".to_string(),
        "" => "Online".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Online".to_string(),
            }
        }
    }
}

/// Short unique reference sent as the order `receipt` when the caller gives none.
pub fn new_order_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("rcpt_{}", &id[..12])
}
