//! Donation receipts: PDF layout, deterministic numbering, storage and signed links.
//!
//! A receipt is derived from a verified payment and written once. Re-verifying the
//! same payment produces the same receipt id, so the stored object is replaced
//! rather than duplicated.

pub mod canvas;
pub mod layout;
pub mod store;
pub mod words;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::OrgConfig;
use canvas::PdfCanvas;
use layout::{A4_HEIGHT, A4_WIDTH};

pub use store::{LinkSigner, ReceiptStore};
pub use words::{amount_in_words, amount_in_words_paise, format_inr};

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error("image could not be decoded: {0}")]
    Image(String),
    #[error("storage: {0}")]
    Storage(#[from] opendal::Error),
    #[error("receipt link: {0}")]
    Link(#[from] jsonwebtoken::errors::Error),
}

/// Final, already validated values printed on a receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptData {
    pub receipt_number: String,
    pub date: NaiveDate,
    pub donor_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub pan: Option<String>,
    pub address: Option<String>,
    pub amount_paise: u64,
    pub payment_method: String,
    pub payment_id: String,
    pub order_id: String,
    pub donation_type: Option<String>,
}

/// Optional decorative images. Absent or unreadable files leave the field `None`.
#[derive(Debug, Clone, Default)]
pub struct ReceiptAssets {
    pub logo: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
}

fn read_asset(path: &Option<String>, what: &str) -> Option<Vec<u8>> {
    let path = path.as_deref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("Receipt {} not available at {}: {}", what, path, e);
            None
        }
    }
}

impl ReceiptAssets {
    pub fn load(org: &OrgConfig) -> Self {
        Self {
            logo: read_asset(&org.logo_path, "logo"),
            signature: read_asset(&org.signature_path, "signature"),
        }
    }
}

/// Stable identifier for the receipt of a payment.
pub fn receipt_id(payment_id: &str) -> String {
    let hash = blake3::hash(payment_id.as_bytes()).to_hex().to_string();
    hash[..16].to_string()
}

pub fn receipt_number(prefix: &str, date: NaiveDate, payment_id: &str) -> String {
    let id = receipt_id(payment_id);
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), id[..8].to_uppercase())
}

/// Renders the receipt (and the certificate page when enabled) to PDF bytes.
pub fn generate_receipt(
    data: &ReceiptData,
    org: &OrgConfig,
    assets: &ReceiptAssets,
) -> Result<Vec<u8>, ReceiptError> {
    let title = format!("Donation Receipt {}", data.receipt_number);
    let mut canvas = PdfCanvas::new(&title, A4_WIDTH, A4_HEIGHT)?;
    layout::draw_receipt(&mut canvas, data, org, assets);
    if org.include_certificate {
        layout::draw_certificate(&mut canvas, data, org);
    }
    canvas.into_bytes()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_org() -> OrgConfig {
        OrgConfig {
            name: "Seva Foundation".to_string(),
            address: "12 MG Road, Pune 411001".to_string(),
            registration_no: "MH/2015/0042".to_string(),
            pan: "AAATS1234Q".to_string(),
            exemption_no: "CIT(E)/80G/2019/77".to_string(),
            signatory: "R. Kulkarni, Treasurer".to_string(),
            logo_path: None,
            signature_path: None,
            receipt_prefix: "REC".to_string(),
            include_certificate: true,
        }
    }

    pub(crate) fn sample_data() -> ReceiptData {
        let date = NaiveDate::from_ymd_opt(2026, 10, 2).expect("date");
        ReceiptData {
            receipt_number: receipt_number("REC", date, "pay_N5x1"),
            date,
            donor_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("9876543210".to_string()),
            pan: Some("ABCDE1234F".to_string()),
            address: Some("Flat 4, Lake View Apartments, Baner, Pune".to_string()),
            amount_paise: 150_000,
            payment_method: "UPI".to_string(),
            payment_id: "pay_N5x1".to_string(),
            order_id: "order_N5w9".to_string(),
            donation_type: Some("General".to_string()),
        }
    }

    #[test]
    fn receipt_ids_are_deterministic() {
        assert_eq!(receipt_id("pay_123"), receipt_id("pay_123"));
        assert_ne!(receipt_id("pay_123"), receipt_id("pay_124"));
        assert_eq!(receipt_id("pay_123").len(), 16);
    }

    #[test]
    fn receipt_number_embeds_date_and_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 26).expect("date");
        let number = receipt_number("SF", date, "pay_abc");
        assert!(number.starts_with("SF-20260126-"));
        assert_eq!(number.len(), "SF-20260126-".len() + 8);
    }

    #[test]
    fn renders_pdf_without_assets() {
        let mut org = sample_org();
        org.logo_path = Some("/nonexistent/logo.png".to_string());
        let assets = ReceiptAssets::load(&org);
        assert!(assets.logo.is_none());
        let pdf = generate_receipt(&sample_data(), &org, &assets).expect("pdf");
        assert!(pdf.starts_with(b"%PDF"));
    }
}
