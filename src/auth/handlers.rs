use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, DashboardResponse, ForgotPasswordRequest, MessageResponse,
            RegisterRequest, RegisterResponse, ResetPasswordRequest, SigninRequest,
            VerifyOtpRequest,
        },
        jwt::AuthUser,
        repo_types::User,
        services::{self, Session},
    },
    error::{accept_json, ApiError, AppError},
    i18n::{translate, Lang, Locale, MessageKey},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify_otp", post(verify_otp))
        .route("/signin", post(signin))
        .route("/forgot-password", post(forgot_password))
        .route(
            "/reset-password/:token",
            get(check_reset_link).post(reset_password),
        )
        .route("/logout", get(logout))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

fn message(locale: Locale, key: MessageKey) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: translate(locale, key),
    })
}

fn session_response(session: Session) -> Json<AuthResponse> {
    Json(AuthResponse {
        success: true,
        access_token: session.access_token,
        username: session.username,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    let registration_id = services::register(&state, req)
        .await
        .map_err(|e| e.localize(locale))?;
    Ok(Json(RegisterResponse {
        success: true,
        registration_id,
        message: translate(locale, MessageKey::OtpSent),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    let session = services::verify_otp(&state, &req.registration_id, &req.otp)
        .await
        .map_err(|e| e.localize(locale))?;
    Ok(session_response(session))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    let session = services::signin(&state, &req.username, &req.password)
        .await
        .map_err(|e| e.localize(locale))?;
    Ok(session_response(session))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    services::forgot_password(&state, &req.email)
        .await
        .map_err(|e| e.localize(locale))?;
    Ok(message(locale, MessageKey::ResetLinkSent))
}

/// Lets a client check a reset link before asking for the new password.
#[instrument(skip(state, token))]
pub async fn check_reset_link(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::check_reset_token(&state, &token).map_err(|e| e.localize(locale))?;
    Ok(message(locale, MessageKey::ResetLinkValid))
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(token): Path<String>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    services::reset_password(&state, &token, &req.new_password, &req.confirm_password)
        .await
        .map_err(|e| e.localize(locale))?;
    Ok(message(locale, MessageKey::PasswordResetSuccess))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AuthUser(username): AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let user = User::find_by_username(&state.db, &username)
        .await
        .map_err(|e| AppError::from(e).localize(locale))?
        .ok_or_else(|| AppError::Unauthenticated.localize(locale))?;

    Ok(Json(DashboardResponse {
        success: true,
        username: user.username,
        fullname: user.fullname,
        state: user.state,
    }))
}

/// Sessions are bearer tokens, so there is nothing to clear server-side.
pub async fn logout(Lang(locale): Lang) -> Json<MessageResponse> {
    message(locale, MessageKey::LoggedOut)
}
