use axum::Extension;

use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/user - Identity resolved for the current request
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "email": "customer@example.com",
///     "method": "magic_link",
///     "subject": null,
///     "expires_at": 1735689600
///   }
/// }
/// ```
pub async fn user_get(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
