use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
    error::{ApiError, AppError},
    i18n::Lang,
    state::AppState,
};

const ISSUER: &str = "cropbuddy";

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            session_ttl: Duration::minutes(cfg.session_ttl_minutes),
            reset_ttl: Duration::seconds(cfg.reset_token_expiry_secs),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::PasswordReset => self.reset_ttl,
        }
    }

    pub(crate) fn sign_at(&self, sub: &str, kind: TokenKind, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let exp = issued_at + self.ttl(kind);
        let claims = Claims {
            sub: sub.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: ISSUER.to_string(),
            aud: kind.audience().to_string(),
            kind,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(kind = ?kind, "jwt signed");
        Ok(token)
    }

    fn verify(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[kind.audience()]);
        validation.set_issuer(&[ISSUER]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != kind {
            anyhow::bail!("token kind mismatch");
        }
        // Age is re-checked so a shortened window also applies to tokens already issued.
        let age = OffsetDateTime::now_utc().unix_timestamp() - data.claims.iat;
        if age > self.ttl(kind).whole_seconds() {
            anyhow::bail!("token too old");
        }
        debug!(kind = ?kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn sign_session(&self, username: &str) -> anyhow::Result<String> {
        self.sign_at(username, TokenKind::Session, OffsetDateTime::now_utc())
    }

    /// Returns the username the session belongs to.
    pub fn verify_session(&self, token: &str) -> anyhow::Result<String> {
        Ok(self.verify(token, TokenKind::Session)?.sub)
    }

    pub fn sign_reset(&self, email: &str) -> anyhow::Result<String> {
        self.sign_at(email, TokenKind::PasswordReset, OffsetDateTime::now_utc())
    }

    /// Returns the email the reset token is bound to.
    pub fn verify_reset(&self, token: &str) -> anyhow::Result<String> {
        Ok(self.verify(token, TokenKind::PasswordReset)?.sub)
    }
}

/// Username of the signed-in caller, from `Authorization: Bearer <session token>`.
pub struct AuthUser(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Lang(locale) = Lang::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        let unauthenticated = || AppError::Unauthenticated.localize(locale);

        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .ok_or_else(unauthenticated)?;

        match keys.verify_session(token) {
            Ok(username) => Ok(AuthUser(username)),
            Err(e) => {
                warn!(error = %e, "invalid or expired session token");
                Err(unauthenticated())
            }
        }
    }
}
