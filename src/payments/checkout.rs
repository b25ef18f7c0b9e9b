use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Order;

pub const CHECKOUT_SCRIPT_SRC: &str = "https://checkout.razorpay.com/v1/checkout.js";
const THEME_COLOUR: &str = "#D9541A";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonorPrefill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnabledMethods {
    pub card: bool,
    pub upi: bool,
    pub netbanking: bool,
    pub wallet: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Theme {
    pub color: String,
}

/// Everything the browser passes to the checkout widget constructor.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: DonorPrefill,
    pub notes: BTreeMap<String, String>,
    pub theme: Theme,
    pub method: EnabledMethods,
}

impl CheckoutOptions {
    pub fn for_order(
        order: &Order,
        key_id: &str,
        org_name: &str,
        donor: DonorPrefill,
        notes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            key: key_id.to_string(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: org_name.to_string(),
            description: format!("Donation to {}", org_name),
            order_id: order.id.clone(),
            prefill: donor,
            notes,
            theme: Theme { color: THEME_COLOUR.to_string() },
            method: EnabledMethods { card: true, upi: true, netbanking: true, wallet: true },
        }
    }
}

/// Adds the checkout `<script>` to a page once; a page that already loads it is
/// returned untouched.
pub fn inject_checkout_script(html: &str) -> Cow<'_, str> {
    if html.contains(CHECKOUT_SCRIPT_SRC) {
        return Cow::Borrowed(html);
    }
    let tag = format!("<script src=\"{}\" async></script>", CHECKOUT_SCRIPT_SRC);
    match html.find("</head>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..at]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[at..]);
            Cow::Owned(out)
        }
        None => Cow::Owned(format!("{}\n{}", tag, html)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_injected_once() {
        let page = "<html><head><title>Donate</title></head><body></body></html>";
        let once = inject_checkout_script(page).into_owned();
        let twice = inject_checkout_script(&once).into_owned();
        assert_eq!(once, twice);
        assert_eq!(twice.matches("<script").count(), 1);
        assert!(once.find(CHECKOUT_SCRIPT_SRC) < once.find("</head>"));
    }

    #[test]
    fn headless_fragment_gets_script_prepended() {
        let out = inject_checkout_script("<div>donate</div>");
        assert!(out.starts_with("<script"));
    }

    #[test]
    fn options_mirror_order() {
        let order = Order {
            id: "order_9".to_string(),
            amount: 50_000,
            currency: "INR".to_string(),
            receipt: Some("rcpt_1".to_string()),
            created_at: None,
        };
        let donor = DonorPrefill {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            contact: "9876543210".to_string(),
        };
        let opts = CheckoutOptions::for_order(&order, "rzp_test_1", "Seva Foundation", donor.clone(), BTreeMap::new());
        assert_eq!(opts.order_id, "order_9");
        assert_eq!(opts.amount, 50_000);
        assert_eq!(opts.prefill, donor);
        let json = serde_json::to_value(&opts).expect("json");
        assert_eq!(json["method"]["upi"], true);
        assert_eq!(json["theme"]["color"], THEME_COLOUR);
    }
}
