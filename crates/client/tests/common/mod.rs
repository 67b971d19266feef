//! In-process mock of the platform API used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vitegourmand_client::api::ApiClient;

/// Order number handed out by the mock for every accepted order.
pub const ORDER_NUMBER: u64 = 1042;

/// Ticket number handed out by the mock for every contact request.
pub const TICKET_NUMBER: &str = "TCK-2026-0007";

/// An order as received by the mock, with its bearer token.
#[derive(Debug, Clone)]
pub struct ReceivedOrder {
    pub token: String,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub menu_queries: Mutex<Vec<HashMap<String, String>>>,
    pub chats: Mutex<Vec<Value>>,
    pub contacts: Mutex<Vec<Value>>,
    pub orders: Mutex<Vec<ReceivedOrder>>,
    /// When set, `POST /api/orders` answers with this status and body.
    pub order_rejection: Mutex<Option<(StatusCode, Value)>>,
    /// Scripted assistant replies, consumed in order.
    pub assistant_replies: Mutex<Vec<String>>,
}

pub struct MockPlatform {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockPlatform {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    pub fn reject_orders(&self, status: StatusCode, body: Value) {
        *self.state.order_rejection.lock().unwrap() = Some((status, body));
    }

    pub fn script_replies(&self, replies: &[&str]) {
        *self.state.assistant_replies.lock().unwrap() =
            replies.iter().rev().map(|r| r.to_string()).collect();
    }

    pub fn orders(&self) -> Vec<ReceivedOrder> {
        self.state.orders.lock().unwrap().clone()
    }

    pub fn contacts(&self) -> Vec<Value> {
        self.state.contacts.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<Value> {
        self.state.chats.lock().unwrap().clone()
    }

    pub fn menu_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.menu_queries.lock().unwrap().clone()
    }
}

/// Start the mock on an ephemeral port.
pub async fn spawn_platform() -> MockPlatform {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/menus", get(list_menus))
        .route("/api/ai-agent/chat", post(chat))
        .route("/api/contact", post(create_contact))
        .route("/api/orders", post(create_order))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPlatform {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Catalog served by the mock.
pub fn catalog() -> Value {
    json!([
        {
            "id": 1,
            "title": "Menu de Noël",
            "description": "Foie gras, chapon, bûche",
            "pricePerPerson": 45.5,
            "minPersons": 6,
            "stockQuantity": 10,
            "themes": ["Noël"],
            "diets": ["Classique"],
            "allergens": ["Gluten", "Lait"]
        },
        {
            "id": 2,
            "title": "Menu Végétarien",
            "description": "Velouté, risotto, tarte fine",
            "pricePerPerson": 32.0,
            "minPersons": 4,
            "stockQuantity": 0,
            "themes": ["Classique"],
            "diets": ["Végétarien"],
            "allergens": []
        }
    ])
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_menus(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(12);
    state.menu_queries.lock().unwrap().push(query);

    let all = catalog().as_array().cloned().unwrap_or_default();
    let items: Vec<Value> = all.iter().skip((page - 1) * limit).take(limit).cloned().collect();
    Json(json!({
        "data": { "items": items, "total": all.len(), "page": page, "limit": limit }
    }))
}

async fn chat(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    let conversation_id = body
        .get("conversationId")
        .and_then(Value::as_str)
        .unwrap_or("conv-1")
        .to_string();
    state.chats.lock().unwrap().push(body);
    let message = state
        .assistant_replies
        .lock()
        .unwrap()
        .pop()
        .unwrap_or_else(|| "Pouvez-vous préciser ?".to_string());
    Json(json!({ "data": { "conversationId": conversation_id, "message": message } }))
}

async fn create_contact(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str).unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": ["email must be an email"] })),
        )
            .into_response();
    }
    state.contacts.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "ticket_number": TICKET_NUMBER } })),
    )
        .into_response()
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response();
    };

    if let Some((status, body)) = state.order_rejection.lock().unwrap().clone() {
        return (status, Json(body)).into_response();
    }

    state.orders.lock().unwrap().push(ReceivedOrder { token, body });
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "order_number": ORDER_NUMBER } })),
    )
        .into_response()
}
