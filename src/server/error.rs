//! Mapping of gateway failures onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::{GatewayError, ValidationError};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "validation_error",
                    field: Some(e.field),
                    message: e.message,
                },
            ),
            GatewayError::Pipeline(e) => {
                tracing::warn!("Pipeline failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "pipeline_error",
                        field: None,
                        message: e.to_string(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Name of the field a body rejection complains about, if serde said.
fn rejected_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next().filter(|f| !f.is_empty())
}

/// Any unusable request body is a validation failure.
pub fn rejection_to_error(rejection: JsonRejection) -> GatewayError {
    let message = rejection.body_text();
    let field = rejected_field(&message).unwrap_or("body").to_string();
    ValidationError::new(field, message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_rejected_field() {
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: missing field `text` at line 1 column 2"),
            Some("text")
        );
        assert_eq!(rejected_field("EOF while parsing"), None);
    }

    #[tokio::test]
    async fn test_validation_maps_to_422() {
        let err: GatewayError = ValidationError::new("text", "must not be empty").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["field"], "text");
        assert_eq!(json["message"], "must not be empty");
    }

    #[tokio::test]
    async fn test_pipeline_maps_to_500() {
        let err: GatewayError = PipelineError::TextTooLong {
            length: 20,
            max_length: 10,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "pipeline_error");
        assert!(json.get("field").is_none());
        assert!(json["message"].as_str().unwrap().contains("exceeds maximum"));
    }
}
