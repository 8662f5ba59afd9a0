//! API hub catalog access.
//!
//! A narrow adapter over the external API hub's REST surface: list published
//! APIs, walk their versions, and resolve deployment and spec detail. One
//! long-lived client is built at startup and shared as `Arc<dyn ApiHub>`;
//! nothing in here holds catalog state.

pub mod client;
pub mod models;

pub use client::{ApiHub, ApiHubClient};
pub use models::{HubApi, HubDeployment, HubSpecContents, HubVersion, SpecRef};

use thiserror::Error;

/// Failure reported by the hub or the portal management service.
///
/// `code` carries the upstream HTTP status so gateway handlers can forward it
/// verbatim; transport-level failures (connect, timeout, bad JSON) use 502.
/// No local translation happens anywhere between here and the response.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("upstream error {code}: {message}")]
pub struct UpstreamError {
    pub code: u16,
    pub message: String,
}

impl UpstreamError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The request never produced an upstream status at all.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(502, message)
    }
}
