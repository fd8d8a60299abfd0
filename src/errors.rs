use axum::response::IntoResponse;
use reqwest::StatusCode;
use thiserror::Error;

use crate::external::chart_analyzer::AnalysisError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Db(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            // Transport failures and upstream rejections are gateway errors;
            // a reply that breaks the output contract is our 500.
            AppError::Analysis(err) => match &err {
                AnalysisError::Network(_) | AnalysisError::Upstream { .. } => {
                    (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
                }
                AnalysisError::Contract(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
                }
            },
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}
