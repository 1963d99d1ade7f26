use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_AGMARKNET_API_BASE: &str =
    "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub session_ttl_minutes: i64,
    pub reset_token_expiry_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from_email: Option<String>,
    pub sendgrid_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    pub base_url: String,
    pub pending_registration_ttl_secs: i64,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub price_api: PriceApiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("SECRET_KEY").context("SECRET_KEY must be set")?,
            session_ttl_minutes: parse_var("SESSION_TTL_MINUTES").unwrap_or(60),
            reset_token_expiry_secs: parse_var("RESET_TOKEN_EXPIRY").unwrap_or(3600),
        };
        let mail = MailConfig {
            from_email: non_empty_var("FROM_EMAIL"),
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
        };
        let price_api = PriceApiConfig {
            base_url: std::env::var("AGMARKNET_API_BASE")
                .unwrap_or_else(|_| DEFAULT_AGMARKNET_API_BASE.into()),
            api_key: non_empty_var("AGMARKNET_API_KEY"),
            timeout_secs: parse_var("PRICE_API_TIMEOUT_SECS").unwrap_or(10),
        };
        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/cropbuddy.db".into()),
            base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            pending_registration_ttl_secs: parse_var("PENDING_REGISTRATION_TTL_SECS")
                .unwrap_or(600),
            jwt,
            mail,
            price_api,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            base_url: "http://localhost:8080".into(),
            pending_registration_ttl_secs: 600,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                session_ttl_minutes: 5,
                reset_token_expiry_secs: 3600,
            },
            mail: MailConfig {
                from_email: None,
                sendgrid_api_key: None,
            },
            price_api: PriceApiConfig {
                base_url: "http://127.0.0.1:9".into(),
                api_key: None,
                timeout_secs: 1,
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

// Blank values count as unset so a half-filled .env disables the feature.
fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_unparsable_values_count_as_unset() {
        std::env::set_var("CROPBUDDY_TEST_BLANK", "   ");
        std::env::set_var("CROPBUDDY_TEST_NUM", " 42 ");
        std::env::set_var("CROPBUDDY_TEST_BAD_NUM", "forty");

        assert_eq!(non_empty_var("CROPBUDDY_TEST_BLANK"), None);
        assert_eq!(non_empty_var("CROPBUDDY_TEST_NUM").as_deref(), Some("42"));
        assert_eq!(parse_var::<i64>("CROPBUDDY_TEST_NUM"), Some(42));
        assert_eq!(parse_var::<i64>("CROPBUDDY_TEST_BAD_NUM"), None);
        assert_eq!(parse_var::<i64>("CROPBUDDY_TEST_UNSET"), None);
    }
}
