use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

pub use crate::auth::AuthUser;

/// Resolve the current customer through the guard chain and attach it to
/// the request as an `AuthUser` extension
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = match state.guards.resolve_user(request.headers()) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Authentication failed for {}: {}", request.uri().path(), e);
            return ApiError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}
