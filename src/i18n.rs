//! User-facing messages, keyed by locale and a typed message key.
//!
//! Bundles are embedded at compile time and parsed once on first use.

use std::{collections::HashMap, convert::Infallible};

use axum::{extract::FromRequestParts, http::request::Parts};
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Hi,
}

impl Locale {
    /// Resolve a language tag such as `hi-IN`; anything unknown is English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "hi" => Locale::Hi,
            _ => Locale::En,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    FillRequiredFields,
    PasswordTooShort,
    PasswordNeedsLetter,
    PasswordNeedsNumber,
    OtpSent,
    OtpSendFailed,
    SessionExpired,
    OtpRequired,
    OtpMismatch,
    AccountExists,
    CredentialsRequired,
    InvalidCredentials,
    EmailRequired,
    AccountNotFound,
    ResetLinkSent,
    ResetLinkSendFailed,
    ResetLinkInvalid,
    ResetLinkValid,
    PasswordFieldsRequired,
    PasswordsDoNotMatch,
    ResetPasswordTooShort,
    PasswordResetSuccess,
    LoggedOut,
    LoginRequired,
    InvalidRequest,
    ServerError,
}

#[cfg(test)]
impl MessageKey {
    pub const ALL: [MessageKey; 26] = [
        MessageKey::FillRequiredFields,
        MessageKey::PasswordTooShort,
        MessageKey::PasswordNeedsLetter,
        MessageKey::PasswordNeedsNumber,
        MessageKey::OtpSent,
        MessageKey::OtpSendFailed,
        MessageKey::SessionExpired,
        MessageKey::OtpRequired,
        MessageKey::OtpMismatch,
        MessageKey::AccountExists,
        MessageKey::CredentialsRequired,
        MessageKey::InvalidCredentials,
        MessageKey::EmailRequired,
        MessageKey::AccountNotFound,
        MessageKey::ResetLinkSent,
        MessageKey::ResetLinkSendFailed,
        MessageKey::ResetLinkInvalid,
        MessageKey::ResetLinkValid,
        MessageKey::PasswordFieldsRequired,
        MessageKey::PasswordsDoNotMatch,
        MessageKey::ResetPasswordTooShort,
        MessageKey::PasswordResetSuccess,
        MessageKey::LoggedOut,
        MessageKey::LoginRequired,
        MessageKey::InvalidRequest,
        MessageKey::ServerError,
    ];
}

type Bundle = HashMap<MessageKey, String>;

fn parse_bundle(locale: Locale, raw: &str) -> Bundle {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        error!(error = %e, ?locale, "translation bundle is malformed");
        Bundle::new()
    })
}

lazy_static! {
    static ref BUNDLES: HashMap<Locale, Bundle> = HashMap::from([
        (Locale::En, parse_bundle(Locale::En, include_str!("../translations/en.json"))),
        (Locale::Hi, parse_bundle(Locale::Hi, include_str!("../translations/hi.json"))),
    ]);
}

/// Look up a message, falling back to English and then to the key name.
pub fn translate(locale: Locale, key: MessageKey) -> String {
    BUNDLES
        .get(&locale)
        .and_then(|b| b.get(&key))
        .or_else(|| BUNDLES.get(&Locale::En).and_then(|b| b.get(&key)))
        .cloned()
        .unwrap_or_else(|| format!("{key:?}"))
}

/// Request locale taken from the first `Accept-Language` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lang(pub Locale);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split([',', ';']).next())
            .map(Locale::from_tag)
            .unwrap_or_default();
        Ok(Lang(locale))
    }
}
