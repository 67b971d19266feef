//! Domain logic for the Vite & Gourmand order-request workflow.
//!
//! Everything in this crate is free of HTTP concerns. The order wizard,
//! the brief extractor and the pricing estimator are pure; the submission
//! gate reaches the platform only through the [`submission::OrderBackend`]
//! seam.

pub mod brief;
pub mod error;
pub mod menu;
pub mod order_draft;
pub mod order_flow;
pub mod pricing;
pub mod session;
pub mod submission;
pub mod types;
