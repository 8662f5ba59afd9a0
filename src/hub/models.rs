//! Wire models for the external API hub service.
//!
//! These types mirror the JSON returned by the hub's REST surface. Only the
//! fields the server inspects are typed; everything else rides along in a
//! flattened map so responses forwarded to clients keep the full upstream
//! shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Catalog Entities
// =============================================================================

/// A published API from the hub's collection listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubApi {
    /// Full resource name, `projects/{p}/locations/{l}/apis/{id}`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining upstream fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A version of an API. `name` is unique across the whole catalog, so it
/// doubles as the cache key.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubVersion {
    /// Full resource name, `{api}/versions/{id}`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Resource names of the deployments attached to this version.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deployments: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resolved detail for a deployment reference.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDeployment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a spec document, as listed under a version.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRef {
    /// Full resource name, `{version}/specs/{id}`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The payload of a spec document, fetched via the `:contents` verb.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubSpecContents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Base64-encoded document body, forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// List Envelopes
// =============================================================================

/// Envelope of the `apis` collection listing.
#[derive(Debug, Deserialize)]
pub struct ListApisResponse {
    #[serde(default)]
    pub apis: Vec<HubApi>,
}

/// Envelope of the `versions` listing under an API.
#[derive(Debug, Deserialize)]
pub struct ListVersionsResponse {
    #[serde(default)]
    pub versions: Vec<HubVersion>,
}

/// Envelope of the `specs` listing under a version.
#[derive(Debug, Deserialize)]
pub struct ListSpecsResponse {
    #[serde(default)]
    pub specs: Vec<SpecRef>,
}
