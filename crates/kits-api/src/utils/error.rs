use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::sheets::SheetsError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("{error} for \"{sheet_name}\": {source}")]
    Integration {
        error: &'static str,
        sheet_name: String,
        #[source]
        source: SheetsError,
    },
}

impl ApiError {
    pub fn integration<'a>(
        error: &'static str,
        sheet_name: &'a str,
    ) -> impl FnOnce(SheetsError) -> Self + 'a {
        move |source| ApiError::Integration {
            error,
            sheet_name: sheet_name.to_string(),
            source,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidRequest(msg) => {
                tracing::warn!("Invalid request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: msg,
                        details: None,
                    },
                )
            }
            ApiError::InvalidQuery(rejection) => {
                tracing::warn!("Invalid query string: {}", rejection.body_text());
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Invalid query string".to_string(),
                        details: Some(rejection.body_text()),
                    },
                )
            }
            ApiError::Integration {
                error,
                sheet_name,
                source,
            } => {
                tracing::error!("{} for \"{}\": {}", error, sheet_name, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: error.to_string(),
                        details: Some(source.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
