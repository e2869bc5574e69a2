//! The uniform JSON envelope returned by every endpoint.
//!
//! Every response body is `{"status": "Success"|"Failed", "message": ..., "data": ...}`
//! with the actual outcome carried by the HTTP status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// The wire-level response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// `"Success"` or `"Failed"`.
    pub status: &'static str,
    /// Human-readable outcome description.
    pub message: String,
    /// Endpoint-specific payload; `[]` when there is nothing to return.
    pub data: Value,
}

impl Envelope {
    /// Build a success envelope.
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: "Success",
            message: message.into(),
            data,
        }
    }

    /// Build a failure envelope.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: "Failed",
            message: message.into(),
            data: Value::Array(vec![]),
        }
    }
}

/// A successful handler response: an envelope plus its HTTP status code.
#[derive(Debug)]
pub struct ApiResponse {
    code: StatusCode,
    body: Option<Envelope>,
}

impl ApiResponse {
    /// 200 OK with a payload.
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            code: StatusCode::OK,
            body: Some(Envelope::success(message, to_value(data))),
        }
    }

    /// 201 Created with a payload.
    pub fn created(message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            code: StatusCode::CREATED,
            body: Some(Envelope::success(message, to_value(data))),
        }
    }

    /// 204 No Content; no body at all.
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            code: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.code, Json(body)).into_response(),
            None => self.code.into_response(),
        }
    }
}

fn to_value(data: impl Serialize) -> Value {
    serde_json::to_value(data).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = Envelope::success("Cart updated successfully", json!([]));
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(
            value,
            json!({
                "status": "Success",
                "message": "Cart updated successfully",
                "data": []
            })
        );
    }

    #[test]
    fn test_failed_envelope_has_empty_data() {
        let envelope = Envelope::failed("Product not found");
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["status"], "Failed");
        assert_eq!(value["data"], json!([]));
    }

    #[test]
    fn test_response_status_codes() {
        assert_eq!(
            ApiResponse::success("ok", json!([])).into_response().status(),
            StatusCode::OK
        );
        assert_eq!(
            ApiResponse::created("ok", json!([])).into_response().status(),
            StatusCode::CREATED
        );
        assert_eq!(
            ApiResponse::no_content().into_response().status(),
            StatusCode::NO_CONTENT
        );
    }
}
