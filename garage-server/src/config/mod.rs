//! Configuration and dependency initialization for the migration server.
mod dependencies;
mod server_config;

pub use dependencies::Dependencies;
pub use server_config::ServerConfig;
