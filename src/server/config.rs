use super::RequestsLoggingLevel;
use crate::config::ClientConfig;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Settings handed to the browser frontend via `GET /config`.
    pub client_config: ClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            frontend_dir_path: None,
            client_config: ClientConfig::default(),
        }
    }
}
