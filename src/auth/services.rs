use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::RegisterRequest,
        jwt::JwtKeys,
        password::{check_strength, hash_password, verify_password, MIN_PASSWORD_LEN},
        pending::{generate_otp, PendingRegistration},
        repo_types::{CreateUserError, NewUser, User},
    },
    error::AppError,
    i18n::MessageKey,
    mail::{otp_email, reset_email},
    state::AppState,
};

/// A freshly established session.
#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub access_token: String,
}

/// Validate the form, park it as a pending registration and email the OTP.
///
/// The pending entry is stored before the email is attempted, so a send failure
/// still leaves it in place until it expires.
pub async fn register(state: &AppState, mut req: RegisterRequest) -> Result<Uuid, AppError> {
    req.fullname = req.fullname.trim().to_string();
    req.email = req.email.trim().to_string();
    req.username = req.username.trim().to_string();
    req.contact = req.contact.trim().to_string();

    if [&req.fullname, &req.email, &req.username, &req.password, &req.contact]
        .iter()
        .any(|f| f.is_empty())
    {
        return Err(AppError::Validation(MessageKey::FillRequiredFields));
    }
    check_strength(&req.password).map_err(AppError::Validation)?;

    let password_hash = hash_password(&req.password)?;
    let otp = generate_otp();
    let entry = PendingRegistration {
        fullname: req.fullname,
        email: req.email.clone(),
        username: req.username.clone(),
        password_hash,
        state: Some(req.state.trim().to_string()).filter(|s| !s.is_empty()),
        contact: req.contact,
        otp: otp.clone(),
        created_at: OffsetDateTime::now_utc(),
    };
    let registration_id = state.pending.insert(entry).await;
    info!(%registration_id, username = %req.username, "registration pending");

    if let Err(e) = state.mailer.send(otp_email(&req.email, &otp)).await {
        warn!(error = %e, %registration_id, "otp email failed");
        return Err(AppError::EmailDispatch {
            key: MessageKey::OtpSendFailed,
            detail: e.to_string(),
        });
    }
    Ok(registration_id)
}

/// Check the OTP against the pending registration and create the account.
///
/// On a duplicate email or username the pending entry is kept so the caller can retry.
pub async fn verify_otp(
    state: &AppState,
    registration_id: &str,
    otp: &str,
) -> Result<Session, AppError> {
    let id = Uuid::parse_str(registration_id.trim()).map_err(|_| AppError::SessionExpired)?;
    let pending = state.pending.get(id).await.ok_or(AppError::SessionExpired)?;

    let otp = otp.trim();
    if otp.is_empty() {
        return Err(AppError::Validation(MessageKey::OtpRequired));
    }
    if otp != pending.otp {
        warn!(registration_id = %id, "otp mismatch");
        return Err(AppError::OtpMismatch);
    }

    let new_user = NewUser {
        fullname: &pending.fullname,
        email: &pending.email,
        username: &pending.username,
        password_hash: &pending.password_hash,
        state: pending.state.as_deref(),
        contact: &pending.contact,
        otp: &pending.otp,
    };
    let user = match User::create(&state.db, &new_user).await {
        Ok(u) => u,
        Err(CreateUserError::Duplicate) => {
            warn!(registration_id = %id, "email or username already registered");
            return Err(AppError::DuplicateAccount);
        }
        Err(CreateUserError::Db(e)) => {
            error!(error = %e, "create user failed");
            return Err(AppError::Internal(e.into()));
        }
    };

    state.pending.remove(id).await;
    info!(user_id = user.id, username = %user.username, "user registered");
    open_session(state, user.username)
}

/// Exact-credential sign in. Unknown user and wrong password look the same to the caller.
pub async fn signin(state: &AppState, username: &str, password: &str) -> Result<Session, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(MessageKey::CredentialsRequired));
    }

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        warn!(%username, "signin unknown username");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = user.id, "signin invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, %username, "user signed in");
    open_session(state, user.username)
}

fn open_session(state: &AppState, username: String) -> Result<Session, AppError> {
    let access_token = JwtKeys::new(&state.config.jwt).sign_session(&username)?;
    Ok(Session {
        username,
        access_token,
    })
}

/// Email a signed, time-limited reset link. Nothing is stored server-side.
pub async fn forgot_password(state: &AppState, email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::Validation(MessageKey::EmailRequired));
    }
    let Some(user) = User::find_by_email(&state.db, email).await? else {
        return Err(AppError::NotFound);
    };

    let token = JwtKeys::new(&state.config.jwt).sign_reset(&user.email)?;
    let link = format!(
        "{}/reset-password/{}",
        state.config.base_url.trim_end_matches('/'),
        token
    );
    let message = reset_email(
        &user.email,
        &user.fullname,
        &link,
        state.config.jwt.reset_token_expiry_secs,
    );
    if let Err(e) = state.mailer.send(message).await {
        warn!(error = %e, user_id = user.id, "reset email failed");
        return Err(AppError::EmailDispatch {
            key: MessageKey::ResetLinkSendFailed,
            detail: e.to_string(),
        });
    }
    info!(user_id = user.id, "password reset link sent");
    Ok(())
}

/// Email bound to a reset token, if its signature and age check out.
pub fn check_reset_token(state: &AppState, token: &str) -> Result<String, AppError> {
    JwtKeys::new(&state.config.jwt)
        .verify_reset(token)
        .map_err(|e| {
            warn!(error = %e, "reset token rejected");
            AppError::InvalidOrExpiredToken
        })
}

/// Set a new password for the token's email.
///
/// Tokens are not consumed: the same token keeps working until it expires.
pub async fn reset_password(
    state: &AppState,
    token: &str,
    new_password: &str,
    confirm: &str,
) -> Result<(), AppError> {
    let email = check_reset_token(state, token)?;

    if new_password.is_empty() || confirm.is_empty() {
        return Err(AppError::Validation(MessageKey::PasswordFieldsRequired));
    }
    if new_password != confirm {
        return Err(AppError::Validation(MessageKey::PasswordsDoNotMatch));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(MessageKey::ResetPasswordTooShort));
    }

    let hash = hash_password(new_password)?;
    if !User::update_password(&state.db, &email, &hash).await? {
        return Err(AppError::NotFound);
    }
    info!(%email, "password reset");
    Ok(())
}
