use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: `{ success: true, message, data? }`.
pub fn ok(message: &str, data: impl Serialize) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "data": data
    }))
}

pub fn ok_message(message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message
    }))
}
