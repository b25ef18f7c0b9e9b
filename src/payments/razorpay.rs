use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{GatewayError, Order, OrderRequest, PaymentGateway};
use crate::config::RazorpayConfig;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    method: Option<String>,
}

fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base: String,
}

impl RazorpayGateway {
    pub fn new(cfg: &RazorpayConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("DonationPortal/1.0")
            .build()?;
        Ok(Self {
            client,
            key_id: cfg.key_id.clone(),
            key_secret: cfg.key_secret.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn rejected(resp: reqwest::Response) -> GatewayError {
        let status = resp.status().as_u16();
        let message = match resp.json::<ErrorEnvelope>().await {
            Ok(env) if !env.error.description.is_empty() => env.error.description,
            _ => "unexpected response".to_string(),
        };
        GatewayError::Rejected { status, message }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, req: &OrderRequest) -> Result<Order, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": req.amount,
                "currency": req.currency,
                "receipt": req.receipt,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = Self::rejected(resp).await;
            tracing::error!("Order creation rejected: {}", err);
            return Err(err);
        }
        let order: Order = resp.json().await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "order created");
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/orders/{}", self.api_base, encode(order_id)))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn fetch_payment_method(&self, payment_id: &str) -> Result<Option<String>, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/payments/{}", self.api_base, encode(payment_id)))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        let payment: PaymentEntity = resp.json().await?;
        Ok(payment.method)
    }
}
