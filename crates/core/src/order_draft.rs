//! The in-progress order held by the wizard.
//!
//! [`OrderDraft`] is an immutable record: every edit goes through
//! [`OrderDraft::apply`] with a [`DraftAction`] and yields a new draft. This
//! keeps step validity a pure function of the draft.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::menu::Menu;
use crate::pricing::{self, Estimate};

/// Person minimum for a custom request.
pub const CUSTOM_MIN_PERSONS: u32 = 1;

/// What the customer is ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MenuChoice {
    #[default]
    Unselected,
    /// A menu picked from the catalog.
    Catalog(Menu),
    /// A free-text request for a custom menu.
    Custom { description: String },
}

/// Where and when the order is delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryDetails {
    pub address: String,
    pub city: String,
    pub date: Option<NaiveDate>,
    /// 24-hour `HH:MM`, validated by the Delivery step.
    pub hour: String,
}

impl DeliveryDetails {
    /// Address line sent to the platform (`address, city`).
    pub fn full_address(&self) -> String {
        let address = self.address.trim();
        let city = self.city.trim();
        if city.is_empty() {
            address.to_string()
        } else {
            format!("{address}, {city}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub choice: MenuChoice,
    pub delivery: DeliveryDetails,
    pub person_count: u32,
    pub instructions: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            choice: MenuChoice::Unselected,
            delivery: DeliveryDetails::default(),
            person_count: CUSTOM_MIN_PERSONS,
            instructions: String::new(),
        }
    }
}

/// Edits the wizard can make to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    /// Pick a catalog menu. Resets the person count to the menu minimum.
    SelectMenu(Menu),
    /// Switch to a custom request, keeping any description already typed.
    ChooseCustom,
    SetCustomDescription(String),
    SetAddress(String),
    SetCity(String),
    SetDate(Option<NaiveDate>),
    SetHour(String),
    /// Values below the minimum are clamped to it.
    SetPersonCount(u32),
    IncrementPersons,
    /// No-op at the minimum.
    DecrementPersons,
    SetInstructions(String),
}

impl OrderDraft {
    /// Apply one action and return the resulting draft.
    pub fn apply(&self, action: DraftAction) -> Result<Self, CoreError> {
        let mut next = self.clone();
        match action {
            DraftAction::SelectMenu(menu) => {
                menu.ensure_orderable()?;
                next.person_count = menu.effective_min_persons();
                next.choice = MenuChoice::Catalog(menu);
            }
            DraftAction::ChooseCustom => {
                if !matches!(next.choice, MenuChoice::Custom { .. }) {
                    next.choice = MenuChoice::Custom {
                        description: String::new(),
                    };
                }
                next.person_count = next.person_count.max(CUSTOM_MIN_PERSONS);
            }
            DraftAction::SetCustomDescription(description) => {
                next.choice = MenuChoice::Custom { description };
                next.person_count = next.person_count.max(CUSTOM_MIN_PERSONS);
            }
            DraftAction::SetAddress(address) => next.delivery.address = address,
            DraftAction::SetCity(city) => next.delivery.city = city,
            DraftAction::SetDate(date) => next.delivery.date = date,
            DraftAction::SetHour(hour) => next.delivery.hour = hour,
            DraftAction::SetPersonCount(count) => {
                next.person_count = count.max(next.min_persons());
            }
            DraftAction::IncrementPersons => {
                next.person_count = next.person_count.saturating_add(1);
            }
            DraftAction::DecrementPersons => {
                if next.can_decrement() {
                    next.person_count -= 1;
                }
            }
            DraftAction::SetInstructions(instructions) => next.instructions = instructions,
        }
        Ok(next)
    }

    /// Smallest allowed person count for the current choice.
    pub fn min_persons(&self) -> u32 {
        match &self.choice {
            MenuChoice::Catalog(menu) => menu.effective_min_persons(),
            _ => CUSTOM_MIN_PERSONS,
        }
    }

    /// Whether the decrement control is enabled.
    pub fn can_decrement(&self) -> bool {
        self.person_count > self.min_persons()
    }

    pub fn selected_menu(&self) -> Option<&Menu> {
        match &self.choice {
            MenuChoice::Catalog(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn custom_description(&self) -> Option<&str> {
        match &self.choice {
            MenuChoice::Custom { description } => Some(description.as_str()),
            _ => None,
        }
    }

    /// Price estimate for a catalog menu. Custom requests are priced by the
    /// caterer, so there is nothing to estimate.
    pub fn estimate(&self) -> Option<Estimate> {
        self.selected_menu()
            .map(|menu| pricing::estimate(menu, self.person_count))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
