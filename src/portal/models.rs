//! Wire models for the developer portal management service.

use serde::Deserialize;
use serde_json::Value;

/// Every portal response is an envelope carrying either `data` or
/// `error`, independent of the HTTP status.
#[derive(Debug, Deserialize)]
pub struct PortalEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<PortalErrorBody>,
}

/// Error half of the envelope. `code` is an HTTP status chosen by the
/// portal service and is forwarded to gateway callers verbatim.
#[derive(Debug, Deserialize)]
pub struct PortalErrorBody {
    pub code: u16,
    pub message: String,
}
