use actix_web::{http::{header, StatusCode}, HttpResponse};

pub fn json_error(status: StatusCode, error: &str, details: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": error,
        "details": details
    }))
}

/// 428 carrying the prompt the caller must accept with `?confirm=true`.
pub fn confirmation_required(prompt: &str) -> HttpResponse {
    json_error(StatusCode::PRECONDITION_REQUIRED, "confirmation_required", prompt)
}

pub fn too_many_requests(retry_after_secs: u64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, retry_after_secs.to_string()))
        .json(serde_json::json!({
            "error": "Too many messages from this address. Please try again later.",
            "retry_after_secs": retry_after_secs
        }))
}
