use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use opendal::Operator;
use serde::{Deserialize, Serialize};

use super::ReceiptError;
use crate::config::StorageConfig;

/// Receipt PDFs keyed by receipt id, on whatever backend the operator points at.
#[derive(Clone)]
pub struct ReceiptStore {
    op: Operator,
}

fn key(id: &str) -> String {
    format!("receipts/{}.pdf", id)
}

impl ReceiptStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    pub fn from_config(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let op = match cfg {
            StorageConfig::Fs { root } => {
                Operator::new(opendal::services::Fs::default().root(root))?.finish()
            }
            StorageConfig::S3 { endpoint, bucket, region, access_key_id, secret_access_key } => {
                Operator::new(
                    opendal::services::S3::default()
                        .endpoint(endpoint)
                        .bucket(bucket)
                        .region(region)
                        .access_key_id(access_key_id)
                        .secret_access_key(secret_access_key),
                )?
                .finish()
            }
        };
        Ok(Self::new(op))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Operator::new(opendal::services::Memory::default())?.finish()))
    }

    /// Object path a receipt is written to, relative to the backend root.
    pub fn object_path(id: &str) -> String {
        key(id)
    }

    pub async fn put(&self, id: &str, pdf: Vec<u8>) -> Result<(), ReceiptError> {
        self.op.write(&key(id), pdf).await?;
        Ok(())
    }

    /// Returns `None` when no receipt exists for `id`.
    pub async fn get(&self, id: &str) -> Result<Option<Vec<u8>>, ReceiptError> {
        match self.op.read(&key(id)).await {
            Ok(buf) => Ok(Some(buf.to_vec())),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkClaims {
    sub: String,
    exp: usize,
}

/// Issues and checks the tokens that gate receipt downloads.
#[derive(Clone)]
pub struct LinkSigner {
    secret: String,
    ttl: Duration,
}

impl LinkSigner {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self { secret: secret.into(), ttl: Duration::hours(ttl_hours) }
    }

    pub fn issue(&self, receipt_id: &str) -> Result<String, ReceiptError> {
        let exp = (Utc::now() + self.ttl).timestamp();
        let claims = LinkClaims { sub: receipt_id.to_string(), exp: exp as usize };
        Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))?)
    }

    /// Returns true only for an unexpired token minted for `receipt_id`.
    pub fn verify(&self, token: &str, receipt_id: &str) -> bool {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        match decode::<LinkClaims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation) {
            Ok(data) => data.claims.sub == receipt_id,
            Err(e) => {
                tracing::warn!("Receipt link rejected: {}", e);
                false
            }
        }
    }

    pub fn url(&self, receipt_id: &str) -> Result<String, ReceiptError> {
        Ok(format!("/api/receipts/{}?token={}", receipt_id, self.issue(receipt_id)?))
    }
}
