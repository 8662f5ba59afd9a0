//! API Hub Portal Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod auth;
pub mod cache;
pub mod config;
pub mod hub;
pub mod mcp;
pub mod portal;
pub mod server;

// Re-export commonly used types for convenience
pub use auth::{JwksVerifier, TokenVerifier, VerifiedUser};
pub use cache::{CatalogCache, CatalogSnapshot};
pub use hub::{ApiHub, ApiHubClient, UpstreamError};
pub use portal::{PortalApi, PortalClient};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
