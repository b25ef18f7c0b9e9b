//! Multi-step intake forms for material, food and volunteer donations.

pub mod payloads;

use serde::{Deserialize, Serialize};

pub use payloads::{build_payload, IntakePayload, PayloadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Material,
    Food,
    Volunteer,
}

impl FormKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "material" => Some(FormKind::Material),
            "food" => Some(FormKind::Food),
            "volunteer" => Some(FormKind::Volunteer),
            _ => None,
        }
    }

    pub fn steps(self) -> &'static [&'static str] {
        match self {
            FormKind::Material => &["Your details", "Items", "Pickup", "Review"],
            FormKind::Food => &["Your details", "Food details", "Pickup", "Review"],
            FormKind::Volunteer => &["About you", "Interests", "Availability", "Review"],
        }
    }

    pub fn wizard(self) -> Wizard {
        Wizard::new(self.steps().len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Next,
    Back,
}

/// Linear step index; never leaves `[0, total - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wizard {
    step: usize,
    total: usize,
}

impl Wizard {
    pub fn new(total: usize) -> Self {
        Self { step: 0, total: total.max(1) }
    }

    /// Positions the wizard at `step`, clamped into range.
    pub fn at(mut self, step: usize) -> Self {
        self.step = step.min(self.total - 1);
        self
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn next(&mut self) {
        if self.step + 1 < self.total {
            self.step += 1;
        }
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn apply(&mut self, action: StepAction) {
        match action {
            StepAction::Next => self.next(),
            StepAction::Back => self.back(),
        }
    }

    pub fn is_first(&self) -> bool {
        self.step == 0
    }

    pub fn is_last(&self) -> bool {
        self.step == self.total - 1
    }
}
