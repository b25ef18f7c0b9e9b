//! Renders a sample receipt with the organisation settings from the environment,
//! so logo, signature and wording can be checked without taking a payment.
//!
//! Usage: receipt_preview [RECEIPT_ROOT] [AMOUNT_RUPEES]
//!
//! The PDF is written through the filesystem receipt store, so it lands at
//! `<root>/receipts/<id>.pdf` exactly where the server would put it.

use std::env;
use std::path::Path;

use chrono::Utc;
use donation_portal::config::{OrgConfig, StorageConfig, DEFAULT_RECEIPT_ROOT};
use donation_portal::receipt::{self, ReceiptAssets, ReceiptData, ReceiptStore};
use donation_portal::validation::validate_amount;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if it exists
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let root = args
        .next()
        .or_else(|| env::var("RECEIPT_DIR").ok())
        .unwrap_or_else(|| DEFAULT_RECEIPT_ROOT.to_string());
    let amount: f64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 2500.0,
    };
    let amount_paise = validate_amount(amount)?;

    let org = OrgConfig::from_env();
    let assets = ReceiptAssets::load(&org);
    println!("Organisation: {}", org.name);
    println!(
        "Logo: {}, signature: {}",
        if assets.logo.is_some() { "loaded" } else { "missing" },
        if assets.signature.is_some() { "loaded" } else { "missing" }
    );

    let date = Utc::now().date_naive();
    let payment_id = format!("pay_preview_{}", date.format("%Y%m%d"));
    let data = ReceiptData {
        receipt_number: receipt::receipt_number(&org.receipt_prefix, date, &payment_id),
        date,
        donor_name: "Sample Donor".to_string(),
        email: "donor@example.com".to_string(),
        phone: Some("9876543210".to_string()),
        pan: Some("ABCDE1234F".to_string()),
        address: Some("221 Sample Street, Pune, Maharashtra 411001".to_string()),
        amount_paise,
        payment_method: "UPI".to_string(),
        payment_id: payment_id.clone(),
        order_id: "order_preview".to_string(),
        donation_type: Some("General Donation".to_string()),
    };

    let pdf = receipt::generate_receipt(&data, &org, &assets)?;

    let id = receipt::receipt_id(&payment_id);
    let size = pdf.len();
    let store = ReceiptStore::from_config(&StorageConfig::Fs { root: root.clone() })?;
    store.put(&id, pdf).await?;

    let path = Path::new(&root).join(ReceiptStore::object_path(&id));
    println!("Receipt {} written to {} ({} bytes)", data.receipt_number, path.display(), size);
    Ok(())
}
