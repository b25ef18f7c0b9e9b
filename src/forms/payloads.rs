use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FormKind;
use crate::validation::{clean_text, is_valid_email, is_valid_phone, Checker, ValidationErrors};

const MATERIAL_ITEMS: &[(&str, &str)] = &[
    ("clothes", "Clothes"),
    ("books", "Books"),
    ("stationery", "Stationery"),
    ("toys", "Toys"),
    ("furniture", "Furniture"),
    ("electronics", "Electronics"),
    ("utensils", "Kitchen utensils"),
    ("blankets", "Blankets"),
    ("other", "Other"),
];

const FOOD_TYPES: &[(&str, &str)] = &[
    ("cooked", "Cooked meals"),
    ("dry_rations", "Dry rations"),
    ("produce", "Fruits & vegetables"),
    ("packaged", "Packaged food"),
    ("beverages", "Beverages"),
];

const VOLUNTEER_INTERESTS: &[(&str, &str)] = &[
    ("teaching", "Teaching & mentoring"),
    ("events", "Event management"),
    ("fundraising", "Fundraising"),
    ("healthcare", "Healthcare camps"),
    ("digital", "Digital & social media"),
    ("food_distribution", "Food distribution"),
];

const AVAILABILITY: &[(&str, &str)] = &[
    ("weekdays", "Weekdays"),
    ("weekends", "Weekends"),
    ("evenings", "Evenings"),
    ("flexible", "Flexible"),
];

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed submission: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pickup {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MaterialSubmission {
    contact: Contact,
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    other_items: String,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    pickup: Pickup,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FoodSubmission {
    contact: Contact,
    #[serde(default)]
    food_types: Vec<String>,
    #[serde(default)]
    food_items: String,
    #[serde(default)]
    servings: Option<u32>,
    #[serde(default)]
    prepared_at: Option<String>,
    #[serde(default)]
    pickup: Pickup,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VolunteerSubmission {
    contact: Contact,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default)]
    skills: String,
    #[serde(default)]
    availability: Vec<String>,
    #[serde(default)]
    hours_per_week: Option<u32>,
    #[serde(default)]
    motivation: Option<String>,
}

/// Submission with checkbox keys replaced by their labels and free text cleaned.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IntakePayload {
    Material {
        contact: Contact,
        items: Vec<&'static str>,
        other_items: String,
        condition: Option<String>,
        pickup: Pickup,
        notes: Option<String>,
    },
    Food {
        contact: Contact,
        food_types: Vec<&'static str>,
        food_items: String,
        servings: Option<u32>,
        prepared_at: Option<String>,
        pickup: Pickup,
        notes: Option<String>,
    },
    Volunteer {
        contact: Contact,
        city: Option<String>,
        interests: Vec<&'static str>,
        skills: String,
        availability: Vec<&'static str>,
        hours_per_week: Option<u32>,
        motivation: Option<String>,
    },
}

fn labels(selected: &[String], options: &'static [(&'static str, &'static str)]) -> (Vec<&'static str>, Vec<String>) {
    let mut out = Vec::new();
    let mut unknown = Vec::new();
    for key in selected {
        match options.iter().find(|(k, _)| *k == key.as_str()) {
            Some((_, label)) if !out.contains(label) => out.push(*label),
            Some(_) => {}
            None => unknown.push(key.clone()),
        }
    }
    (out, unknown)
}

fn check_contact(c: &mut Checker, contact: &Contact) {
    c.required(&contact.name, "contact.name")
        .check(is_valid_email(&contact.email), "contact.email", "Please enter a valid email address")
        .check(is_valid_phone(&contact.phone), "contact.phone", "Please enter a valid 10-digit phone number");
}

fn trimmed(contact: Contact) -> Contact {
    Contact {
        name: contact.name.trim().to_string(),
        email: contact.email.trim().to_string(),
        phone: contact.phone.trim().to_string(),
    }
}

pub fn build_payload(kind: FormKind, body: Value) -> Result<IntakePayload, PayloadError> {
    let mut c = Checker::new();
    let payload = match kind {
        FormKind::Material => {
            let s: MaterialSubmission = serde_json::from_value(body)?;
            check_contact(&mut c, &s.contact);
            let (items, unknown) = labels(&s.items, MATERIAL_ITEMS);
            c.check(!items.is_empty(), "items", "Select at least one item")
                .check(unknown.is_empty(), "items", "Unknown item selected")
                .required(&s.pickup.address, "pickup.address");
            IntakePayload::Material {
                contact: trimmed(s.contact),
                items,
                other_items: clean_text(&s.other_items),
                condition: s.condition,
                pickup: s.pickup,
                notes: s.notes,
            }
        }
        FormKind::Food => {
            let s: FoodSubmission = serde_json::from_value(body)?;
            check_contact(&mut c, &s.contact);
            let (food_types, unknown) = labels(&s.food_types, FOOD_TYPES);
            c.check(!food_types.is_empty(), "food_types", "Select at least one food type")
                .check(unknown.is_empty(), "food_types", "Unknown food type selected")
                .check(s.servings.map_or(true, |n| n > 0), "servings", "Servings must be positive")
                .required(&s.pickup.address, "pickup.address");
            IntakePayload::Food {
                contact: trimmed(s.contact),
                food_types,
                food_items: clean_text(&s.food_items),
                servings: s.servings,
                prepared_at: s.prepared_at,
                pickup: s.pickup,
                notes: s.notes,
            }
        }
        FormKind::Volunteer => {
            let s: VolunteerSubmission = serde_json::from_value(body)?;
            check_contact(&mut c, &s.contact);
            let (interests, unknown_interests) = labels(&s.interests, VOLUNTEER_INTERESTS);
            let (availability, unknown_slots) = labels(&s.availability, AVAILABILITY);
            c.check(!interests.is_empty(), "interests", "Select at least one area of interest")
                .check(unknown_interests.is_empty(), "interests", "Unknown interest selected")
                .check(!availability.is_empty(), "availability", "Select your availability")
                .check(unknown_slots.is_empty(), "availability", "Unknown availability selected");
            IntakePayload::Volunteer {
                contact: trimmed(s.contact),
                city: s.city,
                interests,
                skills: clean_text(&s.skills),
                availability,
                hours_per_week: s.hours_per_week,
                motivation: s.motivation,
            }
        }
    };
    c.finish()?;
    Ok(payload)
}
