//! Catalog menus as consumed by the order wizard.
//!
//! Menus are owned by the platform API; the wizard only reads them. The
//! wire shape uses camelCase keys (`pricePerPerson`, `minPersons`, ...).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Default page size requested from `GET /api/menus`.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A catalog menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in euros, per guest.
    pub price_per_person: f64,
    /// Smallest number of guests the menu can be ordered for.
    pub min_persons: u32,
    /// Remaining orderable quantity. Zero means sold out.
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
}

impl Menu {
    /// Whether the menu can currently be ordered.
    pub fn is_available(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Reject selection of a sold-out menu.
    pub fn ensure_orderable(&self) -> Result<(), CoreError> {
        if !self.is_available() {
            return Err(CoreError::Validation(format!(
                "Menu '{}' is out of stock",
                self.title
            )));
        }
        Ok(())
    }

    /// The person minimum, never lower than one guest.
    pub fn effective_min_persons(&self) -> u32 {
        self.min_persons.max(1)
    }
}

/// Catalog filters, serialized as the `GET /api/menus` query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_persons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of the menu catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPage {
    pub items: Vec<Menu>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl MenuPage {
    /// Number of pages needed to list `total` items.
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    /// Find a menu on this page by id.
    pub fn find(&self, id: DbId) -> Option<&Menu> {
        self.items.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
pub(crate) fn sample_menu(id: DbId, price: f64, min_persons: u32) -> Menu {
    Menu {
        id,
        title: format!("Menu {id}"),
        description: String::new(),
        price_per_person: price,
        min_persons,
        stock_quantity: 5,
        themes: vec![],
        diets: vec![],
        allergens: vec![],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
