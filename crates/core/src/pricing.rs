//! Display-only price estimate for the Details and Recap steps.
//!
//! The platform recomputes the authoritative total when the order is
//! created; nothing here is binding.

use serde::Serialize;

use crate::menu::Menu;

/// Label shown next to every client-side estimate.
pub const ESTIMATE_DISCLAIMER: &str = "Estimation indicative, le total définitif est calculé à la validation";

/// A non-authoritative price estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub unit_price: f64,
    pub person_count: u32,
    pub total: f64,
}

impl Estimate {
    /// Total formatted with two decimals, e.g. `"136.50"`.
    pub fn display_total(&self) -> String {
        format_price(self.total)
    }
}

/// `menu.price_per_person * person_count`.
pub fn estimate(menu: &Menu, person_count: u32) -> Estimate {
    Estimate {
        unit_price: menu.price_per_person,
        person_count,
        total: menu.price_per_person * f64::from(person_count),
    }
}

/// Format an amount with exactly two decimals.
pub fn format_price(amount: f64) -> String {
    format!("{amount:.2}")
}
