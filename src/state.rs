use crate::auth::pending::PendingRegistrations;
use crate::config::AppConfig;
use crate::mail::{Mailer, SendGridMailer};
use crate::mandi::client::PriceApi;
use sqlx::SqlitePool;
use std::{path::Path, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub pending: PendingRegistrations,
    pub prices: Arc<PriceApi>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = crate::db::open_pool(Path::new(&config.database_path)).await?;

        let http = reqwest::Client::new();
        let mailer = Arc::new(SendGridMailer::new(http.clone(), &config.mail)) as Arc<dyn Mailer>;

        Ok(Self::from_parts(db, config, mailer, http))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        mailer: Arc<dyn Mailer>,
        http: reqwest::Client,
    ) -> Self {
        let pending = PendingRegistrations::new(config.pending_registration_ttl_secs);
        let prices = Arc::new(PriceApi::new(http, &config.price_api));
        Self {
            db,
            config,
            mailer,
            pending,
            prices,
        }
    }

    /// In-memory database, test config and the given mailer.
    #[cfg(test)]
    pub async fn fake_with(mailer: Arc<dyn Mailer>, config: AppConfig) -> Self {
        let db = crate::db::open_pool_in_memory()
            .await
            .expect("in-memory database");
        Self::from_parts(db, Arc::new(config), mailer, reqwest::Client::new())
    }

    #[cfg(test)]
    pub async fn fake() -> (Self, crate::mail::testing::RecordingMailer) {
        let mailer = crate::mail::testing::RecordingMailer::default();
        let state = Self::fake_with(Arc::new(mailer.clone()), AppConfig::for_tests()).await;
        (state, mailer)
    }
}
