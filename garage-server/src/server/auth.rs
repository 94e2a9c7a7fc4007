//! Caller identity.
//!
//! An outer authentication layer may attach a [`Caller`] to each request. When
//! an admin token is configured, [`authenticate`] also recognizes
//! `Authorization: Bearer <token>` as the root caller.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::AppState;

/// The authenticated user making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub name: String,
    pub is_root: bool,
}

impl Caller {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: true,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: false,
        }
    }
}

/// Marks requests bearing the admin token as coming from the root caller.
/// A caller already attached by an outer layer is left alone.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if request.extensions().get::<Caller>().is_none() {
        if let Some(token) = state.admin_token.as_deref() {
            let presented = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "));
            if presented == Some(token) {
                debug!("Admin token accepted");
                request.extensions_mut().insert(Caller::root("admin-token"));
            }
        }
    }
    next.run(request).await
}
