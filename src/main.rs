use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use apihub_portal::auth::{JwksVerifier, TokenVerifier};
use apihub_portal::cache::CatalogCache;
use apihub_portal::config::{AppConfig, CliConfig};
use apihub_portal::hub::{ApiHub, ApiHubClient};
use apihub_portal::mcp::create_mcp_state;
use apihub_portal::portal::{PortalApi, PortalClient};
use apihub_portal::server::{run_server, RequestsLoggingLevel, ServerConfig};

/// How often the idle-session sweeper wakes up.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
struct CliArgs {
    /// Cloud project hosting the API hub catalog.
    #[clap(long, env = "GCLOUD_PROJECT")]
    pub project_id: Option<String>,

    /// Location of the catalog, e.g. "europe-west1".
    #[clap(long, env = "GCLOUD_REGION")]
    pub region: Option<String>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long, env = "FRONTEND_DIR")]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the API hub service.
    #[clap(long, env = "API_HUB_URL")]
    pub hub_url: Option<String>,

    /// Base URL of the portal management service. Defaults to the hosted
    /// service for the configured project.
    #[clap(long, env = "APIGEE_URL")]
    pub portal_url: Option<String>,

    /// Timeout in seconds for upstream requests.
    #[clap(long, default_value_t = 30)]
    pub upstream_timeout_sec: u64,

    /// JWK set URL for identity token verification.
    #[clap(long, env = "JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Expected issuer of identity tokens. Defaults to the project issuer.
    #[clap(long, env = "TOKEN_ISSUER")]
    pub token_issuer: Option<String>,

    /// Expected audience of identity tokens. Defaults to the project id.
    #[clap(long, env = "TOKEN_AUDIENCE")]
    pub token_audience: Option<String>,

    /// Sweep agent sessions idle for more than this many seconds.
    /// Sessions live until explicitly terminated when unset.
    #[clap(long, env = "SESSION_IDLE_TIMEOUT_SEC")]
    pub session_idle_timeout_sec: Option<u64>,

    /// Public URL of this service, exposed to the frontend.
    #[clap(long, env = "SERVICE_URL")]
    pub service_url: Option<String>,

    /// URL of the conversational agent, exposed to the frontend.
    #[clap(long, env = "APIGEE_AGENT_URL")]
    pub apigee_agent_url: Option<String>,

    /// Auth API key, exposed to the frontend.
    #[clap(long, env = "AUTH_API_KEY")]
    pub auth_api_key: Option<String>,

    /// Auth domain, exposed to the frontend.
    #[clap(long, env = "AUTH_DOMAIN")]
    pub auth_domain: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Container platforms expose the project and region under either name.
    let cli = CliConfig {
        project_id: cli_args
            .project_id
            .or_else(|| std::env::var("PROJECT_ID").ok()),
        region: cli_args.region.or_else(|| std::env::var("REGION").ok()),
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        hub_url: cli_args.hub_url,
        portal_url: cli_args.portal_url,
        upstream_timeout_sec: cli_args.upstream_timeout_sec,
        jwks_url: cli_args.jwks_url,
        token_issuer: cli_args.token_issuer,
        token_audience: cli_args.token_audience,
        session_idle_timeout_sec: cli_args.session_idle_timeout_sec,
        service_url: cli_args.service_url,
        apigee_agent_url: cli_args.apigee_agent_url,
        auth_api_key: cli_args.auth_api_key,
        auth_domain: cli_args.auth_domain,
    };
    let config = AppConfig::resolve(&cli)?;

    info!(
        "Starting with project {} and region {}",
        config.project_id, config.region
    );

    let hub: Arc<dyn ApiHub> = Arc::new(ApiHubClient::new(
        config.hub_url.clone(),
        &config.project_id,
        &config.region,
        config.upstream_timeout_sec,
    ));

    let portal: Arc<dyn PortalApi> = Arc::new(PortalClient::new(
        &config.portal_url,
        Duration::from_secs(config.upstream_timeout_sec),
    ));

    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwksVerifier::new(
        &config.jwks_url,
        &config.token_issuer,
        &config.token_audience,
    ));

    let cache = Arc::new(CatalogCache::new(hub.clone()));
    info!("Building initial catalog snapshot...");
    cache.spawn_refresh();

    let mcp_state = create_mcp_state();

    // Spawn background task sweeping idle agent sessions if enabled
    if let Some(idle_secs) = config.session_idle_timeout_sec {
        let sessions = mcp_state.sessions.clone();
        let max_idle = chrono::Duration::seconds(idle_secs as i64);

        info!("Session sweeping enabled: max idle {}s", idle_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let swept = sessions.prune_idle(max_idle).await;
                if swept > 0 {
                    info!("Swept {} idle agent sessions", swept);
                }
            }
        });
    }

    info!("Ready to serve at port {}!", config.port);
    let server_config = ServerConfig {
        port: config.port,
        requests_logging_level: config.logging_level,
        frontend_dir_path: config.frontend_dir_path,
        client_config: config.client_config,
    };
    run_server(server_config, hub, portal, cache, verifier, mcp_state).await
}
