use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use serde::Serialize;

/// Production API hub endpoint.
pub const DEFAULT_HUB_URL: &str = "https://apihub.googleapis.com";

/// JWK set for Google-issued identity tokens.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Settings handed to the browser frontend via `GET /config`.
///
/// Keys that were never configured stay off the wire so the frontend can
/// distinguish "not set" from "empty".
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apigee_agent_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments accepted by the binary; most of
/// them also carry environment variable fallbacks for container deploys.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub project_id: Option<String>,
    pub region: Option<String>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub hub_url: Option<String>,
    pub portal_url: Option<String>,
    pub upstream_timeout_sec: u64,
    pub jwks_url: Option<String>,
    pub token_issuer: Option<String>,
    pub token_audience: Option<String>,
    pub session_idle_timeout_sec: Option<u64>,
    pub service_url: Option<String>,
    pub apigee_agent_url: Option<String>,
    pub auth_api_key: Option<String>,
    pub auth_domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub project_id: String,
    pub region: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Upstream endpoints
    pub hub_url: String,
    pub portal_url: String,
    pub upstream_timeout_sec: u64,

    // Identity token verification
    pub jwks_url: String,
    pub token_issuer: String,
    pub token_audience: String,

    /// Agent sessions idle longer than this get swept. None disables sweeping.
    pub session_idle_timeout_sec: Option<u64>,

    pub client_config: ClientConfig,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments.
    /// Settings derivable from the project id default accordingly.
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let project_id = match &cli.project_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => bail!("project id must be specified via --project-id or PROJECT_ID"),
        };

        let region = match &cli.region {
            Some(region) if !region.is_empty() => region.clone(),
            _ => bail!("region must be specified via --region or REGION"),
        };

        if cli.port == 0 {
            bail!("port must be non-zero");
        }

        if cli.upstream_timeout_sec == 0 {
            bail!("upstream timeout must be non-zero");
        }

        if cli.session_idle_timeout_sec == Some(0) {
            bail!("session idle timeout must be non-zero when set");
        }

        let hub_url = cli
            .hub_url
            .clone()
            .unwrap_or_else(|| DEFAULT_HUB_URL.to_string());

        let portal_url = cli.portal_url.clone().unwrap_or_else(|| {
            format!(
                "https://apigee.googleapis.com/v1/organizations/{}",
                project_id
            )
        });

        let jwks_url = cli
            .jwks_url
            .clone()
            .unwrap_or_else(|| DEFAULT_JWKS_URL.to_string());

        let token_issuer = cli
            .token_issuer
            .clone()
            .unwrap_or_else(|| format!("https://securetoken.google.com/{}", project_id));

        let token_audience = cli
            .token_audience
            .clone()
            .unwrap_or_else(|| project_id.clone());

        let client_config = ClientConfig {
            service_url: cli.service_url.clone(),
            apigee_agent_url: cli.apigee_agent_url.clone(),
            auth_api_key: cli.auth_api_key.clone(),
            auth_domain: cli.auth_domain.clone(),
        };

        Ok(Self {
            project_id,
            region,
            port: cli.port,
            logging_level: cli.logging_level.clone(),
            frontend_dir_path: cli.frontend_dir_path.clone(),
            hub_url,
            portal_url,
            upstream_timeout_sec: cli.upstream_timeout_sec,
            jwks_url,
            token_issuer,
            token_audience,
            session_idle_timeout_sec: cli.session_idle_timeout_sec,
            client_config,
        })
    }
}
