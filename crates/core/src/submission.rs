//! Account-gated order submission.
//!
//! [`SubmissionGate::submit`] is the only path from a finished wizard to
//! `POST /api/orders`. Without a live session it never calls the backend:
//! the draft is parked in a [`PendingDraftStore`] and the caller is told
//! where to send the customer to log in. After login,
//! [`SubmissionGate::resume`] rebuilds the wizard from the parked draft.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::menu::Menu;
use crate::order_draft::{MenuChoice, OrderDraft};
use crate::order_flow::OrderFlow;
use crate::session::{live_token, SessionProvider};
use crate::types::{DbId, Timestamp};

/// Prefix of `specialInstructions` for custom-menu orders.
pub const CUSTOM_REQUEST_PREFIX: &str = "Menu sur mesure";

/// HTTP status the platform uses for an expired or revoked session.
const STATUS_UNAUTHORIZED: u16 = 401;

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// What the customer gets back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum Reference {
    Order(String),
    Ticket(String),
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order(n) => write!(f, "commande n° {n}"),
            Self::Ticket(n) => write!(f, "demande n° {n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// Body of `POST /api/orders`.
///
/// Prices are informative: the platform recomputes the total from its own
/// menu data. Custom requests carry no `menuId` and zero prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub delivery_date: NaiveDate,
    pub delivery_hour: String,
    pub delivery_address: String,
    pub person_number: u32,
    pub menu_price: f64,
    pub total_price: f64,
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl OrderRequest {
    /// Build the payload for a finished draft.
    pub fn from_draft(draft: &OrderDraft) -> Result<Self, CoreError> {
        let delivery_date = draft.delivery.date.ok_or_else(|| {
            CoreError::Validation("A delivery date is required".to_string())
        })?;
        let instructions = non_blank(&draft.instructions);

        let (menu_id, special_instructions, menu_price, total_price) = match &draft.choice {
            MenuChoice::Catalog(menu) => {
                let total = menu.price_per_person * f64::from(draft.person_count);
                (
                    Some(menu.id),
                    instructions,
                    menu.price_per_person,
                    round_cents(total),
                )
            }
            MenuChoice::Custom { description } => {
                let mut text = format!("{CUSTOM_REQUEST_PREFIX} : {}", description.trim());
                if let Some(extra) = instructions {
                    text.push('\n');
                    text.push_str(&extra);
                }
                (None, Some(text), 0.0, 0.0)
            }
            MenuChoice::Unselected => {
                return Err(CoreError::Validation(
                    "Select a menu or describe a custom request".to_string(),
                ));
            }
        };

        Ok(Self {
            menu_id,
            special_instructions,
            delivery_date,
            delivery_hour: draft.delivery.hour.trim().to_string(),
            delivery_address: draft.delivery.full_address(),
            person_number: draft.person_count,
            menu_price,
            total_price,
        })
    }
}

// ---------------------------------------------------------------------------
// Pending drafts
// ---------------------------------------------------------------------------

/// A draft parked while the customer logs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub menu_id: Option<DbId>,
    #[serde(default)]
    pub custom_request: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_hour: String,
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_city: String,
    pub person_count: u32,
    #[serde(default)]
    pub instructions: String,
    pub saved_at: Timestamp,
}

impl PendingOrder {
    pub fn from_draft(draft: &OrderDraft, saved_at: Timestamp) -> Self {
        Self {
            menu_id: draft.selected_menu().map(|m| m.id),
            custom_request: draft.custom_description().map(str::to_string),
            delivery_date: draft.delivery.date,
            delivery_hour: draft.delivery.hour.clone(),
            delivery_address: draft.delivery.address.clone(),
            delivery_city: draft.delivery.city.clone(),
            person_count: draft.person_count,
            instructions: draft.instructions.clone(),
            saved_at,
        }
    }
}

/// Transient storage for a [`PendingOrder`].
pub trait PendingDraftStore: Send + Sync {
    /// Park a draft, replacing any previous one.
    fn save(&self, pending: &PendingOrder) -> Result<(), CoreError>;

    /// The parked draft, left in place.
    fn load(&self) -> Result<Option<PendingOrder>, CoreError>;

    /// Drop the parked draft. Succeeds when there is none.
    fn discard(&self) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// Transport failure reported by an [`OrderBackend`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The request never got a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The platform answered with a non-2xx status.
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// The platform's order endpoint.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// `POST /api/orders`. Returns the order number.
    async fn create_order(&self, token: &str, request: &OrderRequest)
        -> Result<String, BackendError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a submission did not produce a reference. Every variant is
/// recoverable: the wizard keeps the draft.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No live session. The draft was parked; send the customer to
    /// `redirect_to`.
    #[error("Authentication required")]
    Unauthenticated { redirect_to: String },

    /// A submission is already in flight, or the order was already placed.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server rejected the order ({status}): {message}")]
    ServerRejection { status: u16, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    /// Text for the dismissible notice shown in the wizard.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Unauthenticated { .. } => {
                "Connectez-vous pour finaliser votre commande".to_string()
            }
            Self::Conflict(msg) => msg.clone(),
            Self::Network(_) => {
                "Impossible de joindre le serveur, veuillez réessayer".to_string()
            }
            Self::ServerRejection { message, .. } => message.clone(),
            Self::Internal(_) => "Une erreur inattendue est survenue".to_string(),
        }
    }
}

impl From<CoreError> for SubmitError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<BackendError> for SubmitError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(msg) => Self::Network(msg),
            BackendError::Rejected { status, message } => {
                Self::ServerRejection { status, message }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Resets the flow's in-flight flag if `submit` is dropped before the
/// backend answers.
struct InFlight<'a> {
    flow: &'a mut OrderFlow,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flow.submission_abandoned();
    }
}

pub struct SubmissionGate<B, S, P> {
    backend: B,
    sessions: S,
    pending: P,
    auth_redirect: String,
}

impl<B, S, P> SubmissionGate<B, S, P>
where
    B: OrderBackend,
    S: SessionProvider,
    P: PendingDraftStore,
{
    /// * `auth_redirect` - Where to send the customer when no session exists.
    pub fn new(backend: B, sessions: S, pending: P, auth_redirect: impl Into<String>) -> Self {
        Self {
            backend,
            sessions,
            pending,
            auth_redirect: auth_redirect.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit the wizard's draft.
    ///
    /// On success the flow completes and its draft is cleared. On any error
    /// the draft is left as it was so the customer can retry.
    pub async fn submit(&self, flow: &mut OrderFlow) -> Result<Reference, SubmitError> {
        let draft = flow.begin_submission()?.clone();
        let mut in_flight = InFlight { flow };
        let flow = &mut *in_flight.flow;

        let Some(token) = live_token(&self.sessions, Utc::now()) else {
            return Err(self.park(flow, &draft));
        };

        let request = match OrderRequest::from_draft(&draft) {
            Ok(request) => request,
            Err(err) => {
                let err = SubmitError::from(err);
                flow.submission_failed(err.user_message());
                return Err(err);
            }
        };

        tracing::info!(
            menu_id = ?request.menu_id,
            person_number = request.person_number,
            delivery_date = %request.delivery_date,
            "Submitting order"
        );

        match self.backend.create_order(&token, &request).await {
            Ok(order_number) => {
                tracing::info!(%order_number, "Order accepted");
                let reference = Reference::Order(order_number);
                flow.submission_succeeded(reference.clone());
                if let Err(err) = self.pending.discard() {
                    tracing::warn!(error = %err, "Failed to clear parked order");
                }
                Ok(reference)
            }
            Err(BackendError::Rejected { status, .. }) if status == STATUS_UNAUTHORIZED => {
                tracing::warn!("Session rejected by the platform, asking for login");
                Err(self.park(flow, &draft))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Order submission failed");
                let err = SubmitError::from(err);
                flow.submission_failed(err.user_message());
                Err(err)
            }
        }
    }

    /// Park the draft and produce the redirect error. A storage failure is
    /// reported instead, since the customer would otherwise lose the draft.
    fn park(&self, flow: &mut OrderFlow, draft: &OrderDraft) -> SubmitError {
        let pending = PendingOrder::from_draft(draft, Utc::now());
        if let Err(err) = self.pending.save(&pending) {
            tracing::error!(error = %err, "Failed to park pending order");
            let err = SubmitError::from(err);
            flow.submission_failed(err.user_message());
            return err;
        }

        tracing::info!(redirect_to = %self.auth_redirect, "No session, order parked until login");
        let err = SubmitError::Unauthenticated {
            redirect_to: self.auth_redirect.clone(),
        };
        flow.submission_deferred(err.user_message());
        err
    }

    /// Rebuild the wizard from a parked draft, if one exists.
    ///
    /// The parked draft is consumed once its menu is found in `catalog`
    /// (or it has none). Otherwise it stays parked so a later resume with
    /// a complete catalog still sees the menu; a successful submit clears it.
    pub fn resume(&self, catalog: &[Menu]) -> Result<Option<OrderFlow>, SubmitError> {
        let Some(pending) = self.pending.load()? else {
            return Ok(None);
        };

        let menu_resolved = pending
            .menu_id
            .is_none_or(|id| catalog.iter().any(|m| m.id == id));
        if menu_resolved {
            self.pending.discard()?;
            tracing::info!("Resuming parked order");
        } else {
            tracing::warn!(menu_id = ?pending.menu_id, "Parked menu missing from catalog, order kept parked");
        }
        Ok(Some(OrderFlow::restore(&pending, catalog)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;
    use crate::menu::sample_menu;
    use crate::order_draft::DraftAction;
    use crate::order_flow::{NoticeLevel, Step};

    // -- test doubles --

    struct RecordingBackend {
        calls: AtomicUsize,
        last: Mutex<Option<OrderRequest>>,
        reply: Result<String, BackendError>,
    }

    impl RecordingBackend {
        fn replying(reply: Result<String, BackendError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply,
            }
        }
    }

    #[async_trait]
    impl OrderBackend for RecordingBackend {
        async fn create_order(
            &self,
            _token: &str,
            request: &OrderRequest,
        ) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            self.reply.clone()
        }
    }

    /// Never answers.
    struct HangingBackend;

    #[async_trait]
    impl OrderBackend for HangingBackend {
        async fn create_order(
            &self,
            _token: &str,
            _request: &OrderRequest,
        ) -> Result<String, BackendError> {
            std::future::pending().await
        }
    }

    struct Token(Option<&'static str>);

    impl SessionProvider for Token {
        fn token(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[derive(Default)]
    struct MemoryStore(Mutex<Option<PendingOrder>>);

    impl PendingDraftStore for MemoryStore {
        fn save(&self, pending: &PendingOrder) -> Result<(), CoreError> {
            *self.0.lock().unwrap() = Some(pending.clone());
            Ok(())
        }

        fn load(&self) -> Result<Option<PendingOrder>, CoreError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn discard(&self) -> Result<(), CoreError> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    struct BrokenStore;

    impl PendingDraftStore for BrokenStore {
        fn save(&self, _pending: &PendingOrder) -> Result<(), CoreError> {
            Err(CoreError::Internal("disk full".into()))
        }

        fn load(&self) -> Result<Option<PendingOrder>, CoreError> {
            Ok(None)
        }

        fn discard(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn catalog() -> Vec<Menu> {
        vec![sample_menu(4, 45.5, 10)]
    }

    fn flow_at_recap() -> OrderFlow {
        let mut flow = OrderFlow::new();
        flow.dispatch(DraftAction::SelectMenu(catalog()[0].clone())).unwrap();
        flow.advance().unwrap();
        flow.dispatch(DraftAction::SetAddress("12 quai des Chartrons".into())).unwrap();
        flow.dispatch(DraftAction::SetCity("Bordeaux".into())).unwrap();
        flow.dispatch(DraftAction::SetDate(Some(date()))).unwrap();
        flow.dispatch(DraftAction::SetHour("19:30".into())).unwrap();
        flow.advance().unwrap();
        flow.dispatch(DraftAction::SetPersonCount(12)).unwrap();
        flow.advance().unwrap();
        assert_eq!(flow.step(), Step::Recap);
        flow
    }

    fn gate<B: OrderBackend, S: SessionProvider, P: PendingDraftStore>(
        backend: B,
        sessions: S,
        pending: P,
    ) -> SubmissionGate<B, S, P> {
        SubmissionGate::new(backend, sessions, pending, "/login?redirect=/commande")
    }

    // -- payload --

    #[test]
    fn catalog_payload_carries_prices() {
        let flow = flow_at_recap();
        let request = OrderRequest::from_draft(flow.draft()).unwrap();

        assert_eq!(request.menu_id, Some(4));
        assert_eq!(request.special_instructions, None);
        assert_eq!(request.delivery_address, "12 quai des Chartrons, Bordeaux");
        assert_eq!(request.person_number, 12);
        assert_eq!(request.menu_price, 45.5);
        assert_eq!(request.total_price, 546.0);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["menuId"], 4);
        assert_eq!(value["deliveryDate"], "2026-06-15");
        assert_eq!(value["deliveryHour"], "19:30");
        assert!(value.get("specialInstructions").is_none());
    }

    #[test]
    fn custom_payload_uses_special_instructions() {
        let draft = OrderDraft::default()
            .apply(DraftAction::SetCustomDescription("Buffet végétarien pour 30".into()))
            .unwrap()
            .apply(DraftAction::SetDate(Some(date())))
            .unwrap()
            .apply(DraftAction::SetInstructions("Livraison par l'entrée de service".into()))
            .unwrap();

        let request = OrderRequest::from_draft(&draft).unwrap();
        assert_eq!(request.menu_id, None);
        assert_eq!(
            request.special_instructions.as_deref(),
            Some("Menu sur mesure : Buffet végétarien pour 30\nLivraison par l'entrée de service")
        );
        assert_eq!(request.total_price, 0.0);
    }

    #[test]
    fn payload_requires_a_date() {
        let draft = OrderDraft::default()
            .apply(DraftAction::SelectMenu(sample_menu(1, 10.0, 1)))
            .unwrap();
        assert_matches!(OrderRequest::from_draft(&draft), Err(CoreError::Validation(_)));
    }

    // -- gate --

    #[tokio::test]
    async fn submit_without_session_never_calls_backend() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-1".into())),
            Token(None),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();

        let result = gate.submit(&mut flow).await;

        assert_matches!(
            result,
            Err(SubmitError::Unauthenticated { ref redirect_to }) if redirect_to == "/login?redirect=/commande"
        );
        assert_eq!(gate.backend.calls.load(Ordering::SeqCst), 0);
        assert!(!flow.is_submitting());

        let parked = gate.pending.0.lock().unwrap().clone().unwrap();
        assert_eq!(parked.menu_id, Some(4));
        assert_eq!(parked.delivery_date, Some(date()));
        assert_eq!(parked.delivery_hour, "19:30");
        assert_eq!(parked.delivery_address, "12 quai des Chartrons");
        assert_eq!(parked.person_count, 12);
    }

    #[tokio::test]
    async fn parked_order_resumes_at_recap() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-1".into())),
            Token(None),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();
        let _ = gate.submit(&mut flow).await;

        let resumed = gate.resume(&catalog()).unwrap().unwrap();
        assert_eq!(resumed.step(), Step::Recap);
        assert_eq!(resumed.draft(), flow.draft());

        // Consumed.
        assert!(gate.resume(&catalog()).unwrap().is_none());
    }

    #[tokio::test]
    async fn successful_submit_clears_draft() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-2026-0042".into())),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();

        let reference = gate.submit(&mut flow).await.unwrap();

        assert_eq!(reference, Reference::Order("CMD-2026-0042".into()));
        assert_eq!(flow.completed(), Some(&reference));
        assert_eq!(flow.draft(), &OrderDraft::default());
        assert_eq!(gate.backend.calls.load(Ordering::SeqCst), 1);
        let sent = gate.backend.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.person_number, 12);
    }

    #[tokio::test]
    async fn completed_flow_cannot_resubmit() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-3".into())),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();
        gate.submit(&mut flow).await.unwrap();

        assert_matches!(gate.submit(&mut flow).await, Err(SubmitError::Conflict(_)));
        assert_eq!(gate.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn network_failure_preserves_draft() {
        let gate = gate(
            RecordingBackend::replying(Err(BackendError::Network("connection refused".into()))),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();
        let before = flow.draft().clone();

        assert_matches!(gate.submit(&mut flow).await, Err(SubmitError::Network(_)));
        assert_eq!(flow.draft(), &before);
        assert_eq!(flow.step(), Step::Recap);
        assert!(!flow.is_submitting());
        assert!(flow.notice().is_some());
    }

    #[tokio::test]
    async fn server_rejection_surfaces_message() {
        let gate = gate(
            RecordingBackend::replying(Err(BackendError::Rejected {
                status: 400,
                message: "Stock insuffisant".into(),
            })),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();

        let err = gate.submit(&mut flow).await.unwrap_err();
        assert_matches!(err, SubmitError::ServerRejection { status: 400, .. });
        assert_eq!(flow.notice().unwrap().message, "Stock insuffisant");
    }

    #[tokio::test]
    async fn server_side_401_parks_draft() {
        let gate = gate(
            RecordingBackend::replying(Err(BackendError::Rejected {
                status: 401,
                message: "Token expired".into(),
            })),
            Token(Some("stale-token")),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();

        assert_matches!(
            gate.submit(&mut flow).await,
            Err(SubmitError::Unauthenticated { .. })
        );
        assert!(gate.pending.0.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn failing_store_is_reported() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-1".into())),
            Token(None),
            BrokenStore,
        );
        let mut flow = flow_at_recap();

        assert_matches!(gate.submit(&mut flow).await, Err(SubmitError::Internal(_)));
        assert_eq!(flow.step(), Step::Recap);
    }

    #[tokio::test]
    async fn submit_before_recap_is_a_validation_error() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-1".into())),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut flow = OrderFlow::new();

        assert_matches!(gate.submit(&mut flow).await, Err(SubmitError::Validation(_)));
        assert_eq!(gate.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropped_submission_leaves_flow_editable() {
        let gate = gate(HangingBackend, Token(Some("session-token")), MemoryStore::default());
        let mut flow = flow_at_recap();
        let before = flow.draft().clone();

        let outcome =
            tokio::time::timeout(Duration::from_millis(50), gate.submit(&mut flow)).await;

        assert!(outcome.is_err());
        assert!(!flow.is_submitting());
        assert_eq!(flow.draft(), &before);
        assert_eq!(flow.notice().unwrap().level, NoticeLevel::Error);
        flow.back_to(Step::Details).unwrap();
        flow.dispatch(DraftAction::IncrementPersons).unwrap();
        assert_eq!(flow.draft().person_count, 13);
    }

    // -- resume --

    #[tokio::test]
    async fn resume_keeps_draft_parked_until_menu_is_found() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-1".into())),
            Token(None),
            MemoryStore::default(),
        );
        let mut flow = flow_at_recap();
        let _ = gate.submit(&mut flow).await;

        let partial = gate.resume(&[]).unwrap().unwrap();
        assert_eq!(partial.step(), Step::MenuSelection);
        assert!(gate.pending.0.lock().unwrap().is_some());

        let resumed = gate.resume(&catalog()).unwrap().unwrap();
        assert_eq!(resumed.step(), Step::Recap);
        assert_eq!(resumed.draft().selected_menu().map(|m| m.id), Some(4));
        assert!(gate.resume(&catalog()).unwrap().is_none());
    }

    #[tokio::test]
    async fn successful_submit_clears_parked_draft() {
        let gate = gate(
            RecordingBackend::replying(Ok("CMD-5".into())),
            Token(Some("session-token")),
            MemoryStore::default(),
        );
        let mut parked = flow_at_recap();
        gate.pending
            .save(&PendingOrder::from_draft(parked.draft(), Utc::now()))
            .unwrap();

        gate.submit(&mut parked).await.unwrap();

        assert!(gate.pending.0.lock().unwrap().is_none());
    }

    #[test]
    fn reference_display() {
        assert_eq!(Reference::Order("42".into()).to_string(), "commande n° 42");
        assert_eq!(Reference::Ticket("T-7".into()).to_string(), "demande n° T-7");
    }
}
