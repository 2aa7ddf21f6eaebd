//! Route handlers served behind the gate.

pub mod health;
pub mod pages;
pub mod root;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

// fallback for anything the gate let through that has no route
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
