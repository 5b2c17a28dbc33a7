use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Portal Auth",
            "version": version,
            "description": "Customer portal authentication: magic links and JWT guards",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "magic_link": "POST /auth/magic-link (public - link issuance)",
                "user": "GET /api/user (protected - JWT or magic link)",
            }
        }
    }))
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "status": "ok",
                "timestamp": chrono::Utc::now(),
            }
        })),
    )
}
