use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const MIN_DONATION_RUPEES: f64 = 1.0;
pub const MAX_DONATION_RUPEES: f64 = 100_000.0;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"));
static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("pan regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError { field, message: message.into() }])
    }
}

/// Collects field errors while walking a form.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError { field, message: message.to_string() });
        }
        self
    }

    pub fn required(&mut self, value: &str, field: &'static str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "This field is required")
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// PAN must already be upper case; lower-case input is rejected, not normalised.
pub fn is_valid_pan(pan: &str) -> bool {
    PAN_RE.is_match(pan.trim())
}

/// Guards a donation amount in rupees and returns it in paise.
pub fn validate_amount(rupees: f64) -> Result<u64, ValidationErrors> {
    if !rupees.is_finite() || rupees < MIN_DONATION_RUPEES {
        return Err(ValidationErrors::single("amount", "Minimum donation amount is ₹1"));
    }
    if rupees > MAX_DONATION_RUPEES {
        return Err(ValidationErrors::single(
            "amount",
            "Maximum donation amount is ₹1,00,000",
        ));
    }
    Ok((rupees * 100.0).round() as u64)
}

/// Dedupes comma separated tokens, keeping the first spelling seen.
/// Comparison ignores case and surrounding whitespace; empty tokens are dropped.
pub fn clean_text(input: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    let mut out: Vec<&str> = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let key = token.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(token);
    }
    out.join(", ")
}
