//! Order wizard steps, their guards, and the flow controller.
//!
//! The wizard is linear: `MenuSelection → Delivery → Details → Recap`.
//! Moving forward is one step at a time and only when the current step's
//! predicate holds; moving back to any earlier step is always allowed.
//! Recap is where the order is submitted (see
//! [`crate::submission::SubmissionGate`]).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::menu::Menu;
use crate::order_draft::{DraftAction, MenuChoice, OrderDraft};
use crate::submission::{PendingOrder, Reference};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum length of a custom request description, in characters.
pub const MIN_CUSTOM_REQUEST_LEN: usize = 10;

/// Minimum length of a delivery address, in characters.
pub const MIN_ADDRESS_LEN: usize = 5;

/// 24-hour `HH:MM`.
pub const HOUR_PATTERN: &str = r"^([01][0-9]|2[0-3]):[0-5][0-9]$";

static HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HOUR_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The four steps of the order wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    MenuSelection,
    Delivery,
    Details,
    Recap,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

impl Step {
    /// Convert a 1-based step number to a `Step`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::MenuSelection),
            2 => Ok(Self::Delivery),
            3 => Ok(Self::Details),
            4 => Ok(Self::Recap),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::MenuSelection => 1,
            Self::Delivery => 2,
            Self::Details => 3,
            Self::Recap => 4,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::MenuSelection => "Choix du menu",
            Self::Delivery => "Livraison",
            Self::Details => "Détails",
            Self::Recap => "Récapitulatif",
        }
    }

    /// The following step, `None` from Recap.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::MenuSelection => Some(Self::Delivery),
            Self::Delivery => Some(Self::Details),
            Self::Details => Some(Self::Recap),
            Self::Recap => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Whether `hour` is a 24-hour `HH:MM` time.
pub fn is_valid_hour(hour: &str) -> bool {
    HOUR_RE.is_match(hour.trim())
}

/// Check the predicate that gates leaving `step`.
pub fn validate_step(step: Step, draft: &OrderDraft) -> Result<(), CoreError> {
    match step {
        Step::MenuSelection => match &draft.choice {
            MenuChoice::Catalog(_) => Ok(()),
            MenuChoice::Custom { description }
                if description.trim().chars().count() >= MIN_CUSTOM_REQUEST_LEN =>
            {
                Ok(())
            }
            MenuChoice::Custom { .. } => Err(CoreError::Validation(format!(
                "Describe your custom request in at least {MIN_CUSTOM_REQUEST_LEN} characters"
            ))),
            MenuChoice::Unselected => Err(CoreError::Validation(
                "Select a menu or describe a custom request".to_string(),
            )),
        },
        Step::Delivery => {
            let delivery = &draft.delivery;
            if delivery.address.trim().chars().count() < MIN_ADDRESS_LEN {
                return Err(CoreError::Validation(format!(
                    "Delivery address must be at least {MIN_ADDRESS_LEN} characters"
                )));
            }
            if delivery.date.is_none() {
                return Err(CoreError::Validation(
                    "A delivery date is required".to_string(),
                ));
            }
            if !is_valid_hour(&delivery.hour) {
                return Err(CoreError::Validation(format!(
                    "Delivery hour '{}' is not a valid HH:MM time",
                    delivery.hour
                )));
            }
            Ok(())
        }
        // The reducer clamps the count, so this only fails on a hand-built draft.
        Step::Details => {
            if draft.person_count < draft.min_persons() {
                return Err(CoreError::Validation(format!(
                    "At least {} guests are required",
                    draft.min_persons()
                )));
            }
            Ok(())
        }
        Step::Recap => Ok(()),
    }
}

/// Boolean form of [`validate_step`].
pub fn step_is_valid(step: Step, draft: &OrderDraft) -> bool {
    validate_step(step, draft).is_ok()
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, dismissible message for the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Wizard state: the current step, the draft, and submission status.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFlow {
    step: Step,
    draft: OrderDraft,
    submitting: bool,
    completed: Option<Reference>,
    notice: Option<Notice>,
}

impl Default for OrderFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFlow {
    pub fn new() -> Self {
        Self {
            step: Step::MenuSelection,
            draft: OrderDraft::default(),
            submitting: false,
            completed: None,
            notice: None,
        }
    }

    /// Rebuild a wizard from a parked draft.
    ///
    /// The menu is looked up again in `catalog`; if it is gone or sold out
    /// the customer is sent back to menu selection with a notice. The flow
    /// lands on the furthest step whose predecessors are all valid.
    pub fn restore(pending: &PendingOrder, catalog: &[Menu]) -> Self {
        let mut flow = Self::new();
        let mut draft = OrderDraft::default();

        if let Some(menu_id) = pending.menu_id {
            match catalog.iter().find(|m| m.id == menu_id) {
                Some(menu) => match draft.apply(DraftAction::SelectMenu(menu.clone())) {
                    Ok(next) => draft = next,
                    Err(_) => flow.notify(NoticeLevel::Error, "Le menu choisi n'est plus disponible"),
                },
                None => flow.notify(NoticeLevel::Error, "Le menu choisi n'est plus disponible"),
            }
        } else if let Some(description) = &pending.custom_request {
            draft = draft.with(DraftAction::SetCustomDescription(description.clone()));
        }

        draft = draft
            .with(DraftAction::SetAddress(pending.delivery_address.clone()))
            .with(DraftAction::SetCity(pending.delivery_city.clone()))
            .with(DraftAction::SetDate(pending.delivery_date))
            .with(DraftAction::SetHour(pending.delivery_hour.clone()))
            .with(DraftAction::SetPersonCount(pending.person_count))
            .with(DraftAction::SetInstructions(pending.instructions.clone()));

        flow.draft = draft;
        while let Some(next) = flow.step.next() {
            if !step_is_valid(flow.step, &flow.draft) {
                break;
            }
            flow.step = next;
        }
        flow
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The reference of the placed order, once submission succeeded.
    pub fn completed(&self) -> Option<&Reference> {
        self.completed.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
        });
    }

    fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.completed.is_some() {
            return Err(CoreError::Conflict("This order was already placed".to_string()));
        }
        if self.submitting {
            return Err(CoreError::Conflict("A submission is already in progress".to_string()));
        }
        Ok(())
    }

    /// Apply an edit to the draft.
    pub fn dispatch(&mut self, action: DraftAction) -> Result<(), CoreError> {
        self.ensure_editable()?;
        self.draft = self.draft.apply(action)?;
        Ok(())
    }

    /// Whether the current step's predicate holds and a next step exists.
    pub fn can_advance(&self) -> bool {
        self.step.next().is_some() && step_is_valid(self.step, &self.draft)
    }

    /// Advance one step. Fails when the current step is invalid or final.
    pub fn advance(&mut self) -> Result<Step, CoreError> {
        self.ensure_editable()?;
        let Some(next) = self.step.next() else {
            return Err(CoreError::Validation(format!(
                "{} is the final step",
                self.step.label()
            )));
        };
        validate_step(self.step, &self.draft)?;
        self.step = next;
        Ok(next)
    }

    /// Go back to `target`, which must not be ahead of the current step.
    pub fn back_to(&mut self, target: Step) -> Result<(), CoreError> {
        self.ensure_editable()?;
        if target > self.step {
            return Err(CoreError::Validation(format!(
                "Cannot jump ahead from {} to {}",
                self.step.label(),
                target.label()
            )));
        }
        self.step = target;
        Ok(())
    }

    // ---- submission hooks, driven by the gate ----

    /// Mark a submission as started and return the draft to submit.
    pub(crate) fn begin_submission(&mut self) -> Result<&OrderDraft, CoreError> {
        self.ensure_editable()?;
        if self.step != Step::Recap {
            return Err(CoreError::Validation(format!(
                "Orders are submitted from the {} step",
                Step::Recap.label()
            )));
        }
        for step in [Step::MenuSelection, Step::Delivery, Step::Details] {
            validate_step(step, &self.draft)?;
        }
        self.submitting = true;
        self.notice = None;
        Ok(&self.draft)
    }

    pub(crate) fn submission_succeeded(&mut self, reference: Reference) {
        self.submitting = false;
        self.draft = OrderDraft::default();
        self.notify(NoticeLevel::Info, format!("Merci ! Votre {reference} est enregistrée"));
        self.completed = Some(reference);
    }

    pub(crate) fn submission_failed(&mut self, message: String) {
        self.submitting = false;
        self.notify(NoticeLevel::Error, message);
    }

    pub(crate) fn submission_deferred(&mut self, message: String) {
        self.submitting = false;
        self.notify(NoticeLevel::Info, message);
    }

    /// The submission was dropped before an outcome was recorded.
    pub(crate) fn submission_abandoned(&mut self) {
        if self.submitting {
            self.submitting = false;
            self.notify(NoticeLevel::Error, "La commande n'a pas pu être envoyée, veuillez réessayer");
        }
    }
}

impl OrderDraft {
    /// Apply an action that cannot fail, for restoration.
    fn with(self, action: DraftAction) -> Self {
        match self.apply(action) {
            Ok(next) => next,
            Err(_) => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
