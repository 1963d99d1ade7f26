use serde::Serialize;
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 hash, never exposed in JSON
    pub state: Option<String>,
    pub contact: String,
    #[serde(skip_serializing)]
    pub otp: Option<String>, // OTP the account was verified with
}

/// Fields of an account about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub fullname: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub state: Option<&'a str>,
    pub contact: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email or username already registered")]
    Duplicate,
    #[error("insert user: {0}")]
    Db(#[from] sqlx::Error),
}
