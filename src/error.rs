use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::i18n::{translate, Locale, MessageKey};

/// Failures of the account flows, recovered at the request boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(MessageKey),
    #[error("email or username already registered")]
    DuplicateAccount,
    #[error("otp mismatch")]
    OtpMismatch,
    #[error("no pending registration")]
    SessionExpired,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("reset token invalid or expired")]
    InvalidOrExpiredToken,
    #[error("no account found")]
    NotFound,
    #[error("email dispatch failed: {detail}")]
    EmailDispatch { key: MessageKey, detail: String },
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::OtpMismatch => StatusCode::BAD_REQUEST,
            AppError::SessionExpired
            | AppError::InvalidCredentials
            | AppError::InvalidOrExpiredToken
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::EmailDispatch { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing text. Internal causes are never included.
    pub fn message(&self, locale: Locale) -> String {
        let key = match self {
            AppError::Validation(key) => *key,
            AppError::DuplicateAccount => MessageKey::AccountExists,
            AppError::OtpMismatch => MessageKey::OtpMismatch,
            AppError::SessionExpired => MessageKey::SessionExpired,
            AppError::InvalidCredentials => MessageKey::InvalidCredentials,
            AppError::InvalidOrExpiredToken => MessageKey::ResetLinkInvalid,
            AppError::NotFound => MessageKey::AccountNotFound,
            AppError::EmailDispatch { key, detail } => {
                return format!("{}: {}", translate(locale, *key), detail);
            }
            AppError::Unauthenticated => MessageKey::LoginRequired,
            AppError::Internal(_) => MessageKey::ServerError,
        };
        translate(locale, key)
    }

    pub fn localize(self, locale: Locale) -> ApiError {
        ApiError {
            error: self,
            locale,
        }
    }
}

/// An `AppError` bound to the locale it will be rendered in.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub locale: Locale,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self.error {
            error!(error = ?e, "request failed");
        }
        let status = self.error.status();
        let body = json!({
            "success": false,
            "error": self.error.message(self.locale),
        });
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, turning a rejection into the usual error envelope.
pub fn accept_json<T>(payload: Result<Json<T>, JsonRejection>, locale: Locale) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!(error = %rejection, "malformed request body");
            Err(AppError::Validation(MessageKey::InvalidRequest).localize(locale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_do_not_leak_their_cause() {
        let err = AppError::Internal(anyhow::anyhow!("UNIQUE constraint failed: users.email"));
        let msg = err.message(Locale::En);
        assert!(!msg.contains("UNIQUE"));
        assert_eq!(msg, "Something went wrong. Please try again.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn email_dispatch_surfaces_provider_detail() {
        let err = AppError::EmailDispatch {
            key: MessageKey::OtpSendFailed,
            detail: "SendGrid not configured".into(),
        };
        assert_eq!(err.message(Locale::En), "Could not send OTP: SendGrid not configured");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::OtpMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidOrExpiredToken.status(), StatusCode::UNAUTHORIZED);
    }
}
