//! REST client for the platform API.
//!
//! Covers the four endpoints the order workflow uses (menu catalog, AI
//! assistant chat, contact tickets, orders) using [`reqwest`]. Successful
//! payloads arrive in a `{ "data": ... }` envelope; error bodies carry a
//! human-readable `error` or `message` field.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;
use vitegourmand_core::menu::{Menu, MenuFilter, MenuPage, DEFAULT_PAGE_SIZE};
use vitegourmand_core::submission::{BackendError, OrderBackend, OrderRequest};

/// HTTP client for the platform API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the platform API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("Platform API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Error body: `{ "error": ..., "code": ... }` or `{ "message": ... }`,
/// where `message` may be a list of validation messages.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message {
            match message {
                serde_json::Value::String(s) => return Some(s),
                serde_json::Value::Array(items) => {
                    let parts: Vec<String> = items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    if !parts.is_empty() {
                        return Some(parts.join("; "));
                    }
                }
                _ => {}
            }
        }
        self.error
    }
}

/// Order and ticket numbers come back either as strings or as integers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// Reply of `POST /api/ai-agent/chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub conversation_id: String,
    pub message: String,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct TicketCreated {
    #[serde(deserialize_with = "string_or_number")]
    ticket_number: String,
}

#[derive(Debug, Deserialize)]
struct OrderCreated {
    #[serde(deserialize_with = "string_or_number")]
    order_number: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl ApiClient {
    /// Create a new API client.
    ///
    /// * `base_url` - Platform base URL, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// List catalog menus.
    ///
    /// Sends `GET /api/menus` with the filter as query string.
    pub async fn list_menus(&self, filter: &MenuFilter) -> Result<MenuPage, ApiError> {
        let response = self
            .client
            .get(self.url("/api/menus"))
            .query(filter)
            .send()
            .await?;

        let page: MenuPage = Self::parse_data(response).await?;
        tracing::debug!(count = page.items.len(), total = page.total, "Fetched menus");
        Ok(page)
    }

    /// Fetch every catalog menu matching `filter`, page by page.
    ///
    /// `filter.page` is ignored; `filter.limit` sets the page size.
    pub async fn all_menus(&self, filter: &MenuFilter) -> Result<Vec<Menu>, ApiError> {
        let mut filter = MenuFilter {
            limit: Some(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            ..filter.clone()
        };
        let mut menus = Vec::new();
        let mut page = 1;

        loop {
            filter.page = Some(page);
            let result = self.list_menus(&filter).await?;
            let last = result.items.is_empty() || u64::from(page) >= result.page_count();
            menus.extend(result.items);
            if last {
                break;
            }
            page += 1;
        }
        Ok(menus)
    }

    /// Send one message to the AI assistant.
    ///
    /// Sends `POST /api/ai-agent/chat`. Pass the `conversation_id` of the
    /// previous reply to continue a conversation.
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let body = ChatRequest {
            message,
            conversation_id,
        };

        let response = self
            .client
            .post(self.url("/api/ai-agent/chat"))
            .json(&body)
            .send()
            .await?;

        Self::parse_data(response).await
    }

    /// Open a contact ticket. Returns the ticket number.
    ///
    /// Sends `POST /api/contact`.
    pub async fn create_contact(&self, request: &ContactRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/api/contact"))
            .json(request)
            .send()
            .await?;

        let created: TicketCreated = Self::parse_data(response).await?;
        tracing::info!(ticket_number = %created.ticket_number, "Contact ticket created");
        Ok(created.ticket_number)
    }

    /// Place an order. Returns the order number.
    ///
    /// Sends `POST /api/orders` with the session token as bearer.
    pub async fn create_order(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/api/orders"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let created: OrderCreated = Self::parse_data(response).await?;
        Ok(created.order_number)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure, the error
    /// body is decoded into a message when possible.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(body);

        tracing::warn!(status = status.as_u16(), %message, "Platform API returned an error");
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse the `data` member of a successful JSON response.
    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<DataResponse<T>>().await?;
        Ok(envelope.data)
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(e) => BackendError::Network(e.to_string()),
            ApiError::Api { status, message } => BackendError::Rejected { status, message },
        }
    }
}

#[async_trait]
impl OrderBackend for ApiClient {
    async fn create_order(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<String, BackendError> {
        Ok(ApiClient::create_order(self, token, request).await?)
    }
}
