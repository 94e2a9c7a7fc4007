//! # Garage Server
//!
//! HTTP surface of the migration: a status endpoint telling whether a
//! PostgreSQL backend is configured, and an import endpoint that migrates an
//! embedded store file from the import directory into it.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency wiring
//! - [`files`]: Resolution of import file names to paths
//! - [`server`]: Router, handlers and caller authentication
//! - [`errors`]: Error types for the server

pub mod config;
pub mod errors;
pub mod files;
pub mod server;

pub use config::{Dependencies, ServerConfig};
pub use errors::{ResolveError, ServerError};
pub use files::{DirectoryResolver, FileResolver};
pub use server::{create_app, run_server, AppState, Caller};
