//! Developer portal management service integration
//!
//! The portal agent owns developer records, apps, keys, and product
//! subscriptions. This module exposes it behind the [`PortalApi`] trait;
//! gateway routes and MCP tools consume the trait so tests can swap in
//! fakes.

pub mod client;
pub mod models;

pub use client::{PortalApi, PortalClient};
pub use models::{PortalEnvelope, PortalErrorBody};
