pub mod authorize;
pub mod config;
mod http_layers;
pub mod portal_routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
