use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum InsightError {
    #[error("missing required configuration: {key}")]
    MissingConfiguration { key: &'static str },

    #[error("invalid configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to start service: {0}")]
    ServiceStartup(std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] tiberius::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty product code list for column {0}")]
    EmptyCodeList(&'static str),
}

impl IntoResponse for InsightError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            InsightError::EmptyCodeList(_) => {
                let body = ApiErrorBody {
                    code: "INVALID_QUERY".to_string(),
                    message: "cip_list and gen_list must each contain at least one code."
                        .to_string(),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            // Never echo connection details or SQL errors to the client.
            InsightError::Database(_)
            | InsightError::Io(_)
            | InsightError::Csv(_)
            | InsightError::Json(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            // Startup-only variants; a handler should never produce these.
            InsightError::MissingConfiguration { .. }
            | InsightError::Config(_)
            | InsightError::ServiceStartup(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
