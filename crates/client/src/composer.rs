//! AI-assisted custom-menu brief composer.
//!
//! Relays the customer's messages to the platform assistant, runs the brief
//! extractor on every exchange, and forwards the finished brief as a contact
//! ticket.

use validator::Validate;
use vitegourmand_core::brief::{self, Brief, BriefField};
use vitegourmand_core::submission::Reference;

use crate::api::{ApiClient, ApiError, ContactRequest};

/// Ticket title for custom-menu briefs.
pub const BRIEF_TICKET_TITLE: &str = "Demande de menu sur mesure";

/// Errors from the brief composer.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid contact details: {0}")]
    InvalidContact(#[from] validator::ValidationErrors),

    #[error("The brief is empty")]
    EmptyBrief,
}

/// Who the caterer should get back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    Customer(String),
    Assistant(String),
}

pub struct BriefComposer {
    api: ApiClient,
    conversation_id: Option<String>,
    brief: Brief,
    transcript: Vec<ChatTurn>,
}

impl BriefComposer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            conversation_id: None,
            brief: Brief::default(),
            transcript: Vec::new(),
        }
    }

    pub fn brief(&self) -> &Brief {
        &self.brief
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Send a message to the assistant and fold the exchange into the brief.
    /// Returns the assistant's reply.
    ///
    /// On failure nothing changes, so the customer can resend.
    pub async fn send(&mut self, message: &str) -> Result<String, ApiError> {
        let reply = self
            .api
            .chat(message, self.conversation_id.as_deref())
            .await?;

        self.brief = brief::extract(&self.brief, message, &reply.message);
        self.conversation_id = Some(reply.conversation_id);
        self.transcript.push(ChatTurn::Customer(message.to_string()));
        self.transcript.push(ChatTurn::Assistant(reply.message.clone()));

        tracing::debug!(
            conversation_id = ?self.conversation_id,
            event_type = %self.brief.event_type,
            guest_count = %self.brief.guest_count,
            "Brief updated from chat"
        );
        Ok(reply.message)
    }

    /// Manual edit; overrides anything the extractor filled.
    pub fn edit(&mut self, field: BriefField, value: impl Into<String>) {
        self.brief.set(field, value);
    }

    /// Build the ticket for the current brief.
    pub fn ticket(&self, contact: &ContactDetails) -> Result<ContactRequest, ComposerError> {
        if self.brief.is_empty() {
            return Err(ComposerError::EmptyBrief);
        }

        let title = match self.brief.event_type.trim() {
            "" => BRIEF_TICKET_TITLE.to_string(),
            event => format!("{BRIEF_TICKET_TITLE} - {event}"),
        };

        let request = ContactRequest {
            name: contact.name.trim().to_string(),
            email: contact.email.trim().to_string(),
            phone: contact
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            title,
            description: self.brief.to_ticket_description(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Forward the brief as a contact ticket. On success the brief and the
    /// conversation are reset.
    pub async fn submit(&mut self, contact: &ContactDetails) -> Result<Reference, ComposerError> {
        let request = self.ticket(contact)?;
        let ticket_number = self.api.create_contact(&request).await?;

        self.brief = Brief::default();
        self.conversation_id = None;
        self.transcript.clear();
        Ok(Reference::Ticket(ticket_number))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            name: "Julie Martin".into(),
            email: "julie@example.fr".into(),
            phone: Some("  ".into()),
        }
    }

    fn composer() -> BriefComposer {
        // Never contacted by these tests.
        BriefComposer::new(ApiClient::new("http://127.0.0.1:9"))
    }

    #[test]
    fn empty_brief_cannot_be_ticketed() {
        assert_matches!(composer().ticket(&contact()), Err(ComposerError::EmptyBrief));
    }

    #[test]
    fn ticket_title_includes_event_type() {
        let mut composer = composer();
        composer.edit(BriefField::EventType, "Mariage");
        composer.edit(BriefField::GuestCount, "80 personnes");

        let request = composer.ticket(&contact()).unwrap();
        assert_eq!(request.title, "Demande de menu sur mesure - Mariage");
        assert_eq!(
            request.description,
            "Type d'événement : Mariage\nNombre de convives : 80 personnes"
        );
        assert_eq!(request.phone, None);
    }

    #[test]
    fn invalid_email_is_rejected_before_sending() {
        let mut composer = composer();
        composer.edit(BriefField::AdditionalNotes, "Cocktail en terrasse");
        let bad = ContactDetails {
            email: "julie.example.fr".into(),
            ..contact()
        };
        assert_matches!(composer.ticket(&bad), Err(ComposerError::InvalidContact(_)));
    }
}
