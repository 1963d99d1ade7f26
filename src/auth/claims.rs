use serde::{Deserialize, Serialize};

/// Purpose a token was issued for; a token of one kind never verifies as another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    PasswordReset,
}

impl TokenKind {
    pub fn audience(self) -> &'static str {
        match self {
            TokenKind::Session => "cropbuddy-session",
            TokenKind::PasswordReset => "password-reset",
        }
    }
}

/// JWT payload shared by session and reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // username (session) or email (reset)
    pub iat: i64,       // issued at (unix timestamp)
    pub exp: i64,       // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience, one per kind
    pub kind: TokenKind // token type
}
