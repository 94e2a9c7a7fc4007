//! Error types for the migration server.
mod resolve;
mod server;

pub use resolve::ResolveError;
pub use server::ServerError;
