//! Custom-menu brief and the chat-driven field extractor.
//!
//! A [`Brief`] is a draft of a customer's custom-menu request. It is filled
//! from chat exchanges with the AI assistant by [`extract`], edited by hand,
//! and finally forwarded verbatim as contact-ticket text.
//!
//! Extraction is a monotonic fill: each [`ExtractionRule`] only writes a
//! field that is still empty, and the rules run in declaration order, so the
//! first matching rule for a field wins. Captured numbers are kept as display
//! strings (`"80 personnes"`, `"45€/personne"`); callers needing numeric values
//! must re-parse them.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Brief
// ---------------------------------------------------------------------------

/// Fields of a [`Brief`], in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BriefField {
    EventType,
    GuestCount,
    Budget,
    Date,
    DietaryNeeds,
    Allergies,
    Preferences,
    AiProposal,
    AdditionalNotes,
}

impl BriefField {
    /// Every field, in ticket rendering order.
    pub const ALL: [BriefField; 9] = [
        Self::EventType,
        Self::GuestCount,
        Self::Budget,
        Self::Date,
        Self::DietaryNeeds,
        Self::Allergies,
        Self::Preferences,
        Self::AiProposal,
        Self::AdditionalNotes,
    ];

    /// Label used when the brief is rendered as ticket text.
    pub fn label(self) -> &'static str {
        match self {
            Self::EventType => "Type d'événement",
            Self::GuestCount => "Nombre de convives",
            Self::Budget => "Budget",
            Self::Date => "Date",
            Self::DietaryNeeds => "Régimes alimentaires",
            Self::Allergies => "Allergies",
            Self::Preferences => "Préférences",
            Self::AiProposal => "Proposition de menu",
            Self::AdditionalNotes => "Notes complémentaires",
        }
    }
}

/// Draft of a custom-menu request. All fields start empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub event_type: String,
    pub guest_count: String,
    pub budget: String,
    pub date: String,
    pub dietary_needs: String,
    pub allergies: String,
    pub preferences: String,
    pub ai_proposal: String,
    pub additional_notes: String,
}

impl Brief {
    pub fn get(&self, field: BriefField) -> &str {
        match field {
            BriefField::EventType => &self.event_type,
            BriefField::GuestCount => &self.guest_count,
            BriefField::Budget => &self.budget,
            BriefField::Date => &self.date,
            BriefField::DietaryNeeds => &self.dietary_needs,
            BriefField::Allergies => &self.allergies,
            BriefField::Preferences => &self.preferences,
            BriefField::AiProposal => &self.ai_proposal,
            BriefField::AdditionalNotes => &self.additional_notes,
        }
    }

    fn slot_mut(&mut self, field: BriefField) -> &mut String {
        match field {
            BriefField::EventType => &mut self.event_type,
            BriefField::GuestCount => &mut self.guest_count,
            BriefField::Budget => &mut self.budget,
            BriefField::Date => &mut self.date,
            BriefField::DietaryNeeds => &mut self.dietary_needs,
            BriefField::Allergies => &mut self.allergies,
            BriefField::Preferences => &mut self.preferences,
            BriefField::AiProposal => &mut self.ai_proposal,
            BriefField::AdditionalNotes => &mut self.additional_notes,
        }
    }

    /// Manual edit. Unlike extraction, this overwrites whatever is there.
    pub fn set(&mut self, field: BriefField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    pub fn is_filled(&self, field: BriefField) -> bool {
        !self.get(field).trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        BriefField::ALL.iter().all(|f| !self.is_filled(*f))
    }

    /// Render the filled fields as contact-ticket text, one `Label : value`
    /// line per field. The AI proposal is appended as its own block.
    pub fn to_ticket_description(&self) -> String {
        let mut lines: Vec<String> = BriefField::ALL
            .iter()
            .filter(|f| **f != BriefField::AiProposal && self.is_filled(**f))
            .map(|f| format!("{} : {}", f.label(), self.get(*f).trim()))
            .collect();

        if self.is_filled(BriefField::AiProposal) {
            lines.push(String::new());
            lines.push(format!("{} :", BriefField::AiProposal.label()));
            lines.push(self.ai_proposal.trim().to_string());
        }

        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Extraction rules
// ---------------------------------------------------------------------------

/// Builds the stored display value from a successful match.
pub type Transform = fn(&Captures<'_>) -> String;

/// One `(field, pattern, transform)` entry. Patterns run against lowercased
/// text.
pub struct ExtractionRule {
    pub field: BriefField,
    pub pattern: &'static str,
    pub transform: Transform,
}

fn first_group(caps: &Captures<'_>) -> String {
    caps.get(1).map_or(String::new(), |m| m.as_str().trim().to_string())
}

fn capitalized(caps: &Captures<'_>) -> String {
    let raw = first_group(caps);
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => raw,
    }
}

fn guests(caps: &Captures<'_>) -> String {
    format!("{} personnes", first_group(caps))
}

fn budget_per_person(caps: &Captures<'_>) -> String {
    format!("{}€/personne", first_group(caps))
}

fn budget_total(caps: &Captures<'_>) -> String {
    format!("{}€", first_group(caps))
}

/// Ordered extraction rules. Order matters: for a field with several rules
/// the first one that matches wins, and later rules never overwrite it.
pub const EXTRACTION_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        field: BriefField::EventType,
        pattern: r"\b(mariage|anniversaire|baptême|bapteme|communion|séminaire|seminaire|cocktail|gala|réception|reception|conférence|conference|soirée d'entreprise|repas d'entreprise|fête|fete|brunch|buffet)\b",
        transform: capitalized,
    },
    ExtractionRule {
        field: BriefField::GuestCount,
        pattern: r"\b([0-9]+)\s*(?:personnes?|convives?|invités?|invites?|pers\b)",
        transform: guests,
    },
    ExtractionRule {
        field: BriefField::Budget,
        pattern: r"([0-9]+(?:[.,][0-9]+)?)\s*(?:€|euros?)\s*(?:/|par)\s*(?:personnes?|pers\b|convives?|tête|tete)",
        transform: budget_per_person,
    },
    ExtractionRule {
        field: BriefField::Budget,
        pattern: r"budget[^0-9]{0,20}([0-9]+(?:[.,][0-9]+)?)\s*(?:€|euros?)",
        transform: budget_total,
    },
    ExtractionRule {
        field: BriefField::Date,
        pattern: r"\b([0-9]{1,2}(?:er)?\s+(?:janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre)(?:\s+[0-9]{4})?)",
        transform: first_group,
    },
    ExtractionRule {
        field: BriefField::Date,
        pattern: r"\b([0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4})\b",
        transform: first_group,
    },
    ExtractionRule {
        field: BriefField::DietaryNeeds,
        pattern: r"\b(végétarien(?:ne)?s?|vegetarien(?:ne)?s?|végan(?:e)?s?|vegan(?:e)?s?|halal|casher|kasher|sans gluten|sans lactose|sans porc)\b",
        transform: first_group,
    },
    ExtractionRule {
        field: BriefField::Allergies,
        pattern: r"allergi(?:es?|ques?)\s+(?:aux|au|à\s+la|à\s+l'|à)\s*([^,.;!?\n]+)",
        transform: first_group,
    },
    ExtractionRule {
        field: BriefField::Allergies,
        pattern: r"\bsans\s+(arachides?|fruits à coque|crustacés|fruits de mer|œufs?|oeufs?)\b",
        transform: first_group,
    },
];

struct CompiledRule {
    field: BriefField,
    regex: Regex,
    transform: Transform,
}

/// Compiled once, reused forever.
static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    EXTRACTION_RULES
        .iter()
        .map(|rule| CompiledRule {
            field: rule.field,
            regex: Regex::new(rule.pattern).expect("valid extraction regex"),
            transform: rule.transform,
        })
        .collect()
});

/// Literal marker the assistant uses when it lays out a menu.
pub const PROPOSAL_MARKER: &str = "MENU";

/// At least one of these must accompany [`PROPOSAL_MARKER`].
pub const PROPOSAL_COMPANIONS: [&str; 3] = ["ENTRÉE", "PLAT", "convives"];

/// Whether an assistant reply looks like a menu proposal. Case-sensitive:
/// a lowercase "menu" in conversation does not count.
pub fn is_menu_proposal(assistant_reply: &str) -> bool {
    assistant_reply.contains(PROPOSAL_MARKER)
        && PROPOSAL_COMPANIONS
            .iter()
            .any(|marker| assistant_reply.contains(marker))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Fill the still-empty fields of `brief` from one chat exchange.
///
/// Returns the updated brief; fields that were already filled are returned
/// unchanged.
pub fn extract(brief: &Brief, user_message: &str, assistant_reply: &str) -> Brief {
    let text = format!("{user_message}\n{assistant_reply}").to_lowercase();
    let mut next = brief.clone();

    for rule in COMPILED_RULES.iter() {
        if next.is_filled(rule.field) {
            continue;
        }
        if let Some(caps) = rule.regex.captures(&text) {
            let value = (rule.transform)(&caps);
            if !value.is_empty() {
                next.set(rule.field, value);
            }
        }
    }

    if !next.is_filled(BriefField::AiProposal) && is_menu_proposal(assistant_reply) {
        next.set(BriefField::AiProposal, assistant_reply.trim());
    }

    next
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
