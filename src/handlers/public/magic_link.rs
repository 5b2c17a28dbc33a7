// handlers/public/magic_link.rs - POST /auth/magic-link handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::magic_link::MagicLink;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
    /// Overrides the configured link lifetime
    pub hours: Option<u32>,
}

/// POST /auth/magic-link - Issue a sign-in link for a customer email
///
/// Expected Input:
/// ```json
/// { "email": "customer@example.com", "hours": 2 }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJlIjoiY3VzdG9tZXJAZXhhbXBsZS5jb20i...",
///     "url": "https://app.example.com/magic-link?t=eyJlIjoi...",
///     "expires_at": 1735689600
///   }
/// }
/// ```
///
/// 404 when no office has an active customer with that email.
pub async fn magic_link_post(
    State(state): State<AppState>,
    payload: Result<Json<MagicLinkRequest>, JsonRejection>,
) -> ApiResult<MagicLink> {
    let Json(request) = payload?;

    let email = request.email.trim();
    validate_email_format(email).map_err(|msg| ApiError::field_error("email", msg))?;

    if request.hours == Some(0) {
        return Err(ApiError::field_error("hours", "Must be a positive integer"));
    }

    let link = state.generator.link(email, request.hours).await?;

    Ok(ApiResponse::created(link))
}

/// Basic shape check before hitting the customer directory
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("a@b.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("no-at-sign").is_err());
        assert!(validate_email_format("two@@signs").is_err());
        assert!(validate_email_format("@b.com").is_err());
        assert!(validate_email_format("a b@c.com").is_err());
    }
}
