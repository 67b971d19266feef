//! HTTP client and local storage for the Vite & Gourmand order workflow.
//!
//! Wires the pure workflow in `vitegourmand_core` to the platform API
//! ([`api::ApiClient`]) and to files on disk (session token, parked order).

pub mod api;
pub mod composer;
pub mod config;
pub mod pending_store;
pub mod session;
