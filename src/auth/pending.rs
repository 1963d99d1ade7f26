use std::{collections::HashMap, sync::Arc};

use rand::Rng;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Registration waiting for its OTP. Never written to the database.
#[derive(Clone)]
pub struct PendingRegistration {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub state: Option<String>,
    pub contact: String,
    pub otp: String,
    pub created_at: OffsetDateTime,
}

/// Short-lived pending registrations keyed by registration id.
#[derive(Clone)]
pub struct PendingRegistrations {
    entries: Arc<Mutex<HashMap<Uuid, PendingRegistration>>>,
    ttl: Duration,
}

impl PendingRegistrations {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    fn is_live(&self, entry: &PendingRegistration, now: OffsetDateTime) -> bool {
        now - entry.created_at < self.ttl
    }

    pub async fn insert(&self, entry: PendingRegistration) -> Uuid {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| self.is_live(e, now));
        entries.insert(id, entry);
        id
    }

    /// Live entry for `id`; expired entries are dropped on access.
    pub async fn get(&self, id: Uuid) -> Option<PendingRegistration> {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.lock().await;
        match entries.get(&id) {
            Some(e) if self.is_live(e, now) => Some(e.clone()),
            Some(_) => {
                entries.remove(&id);
                None
            }
            None => None,
        }
    }

    pub async fn remove(&self, id: Uuid) {
        self.entries.lock().await.remove(&id);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Four-digit numeric OTP.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(created_at: OffsetDateTime) -> PendingRegistration {
        PendingRegistration {
            fullname: "Harpreet Kaur".into(),
            email: "h@example.in".into(),
            username: "harpreet".into(),
            password_hash: "hash".into(),
            state: Some("Punjab".into()),
            contact: "9876543210".into(),
            otp: "1234".into(),
            created_at,
        }
    }

    #[test]
    fn otp_is_four_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 4);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(otp.as_bytes()[0], b'0');
        }
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = PendingRegistrations::new(600);
        let id = store.insert(entry(OffsetDateTime::now_utc())).await;
        assert_eq!(store.get(id).await.unwrap().username, "harpreet");
        assert!(store.get(Uuid::new_v4()).await.is_none());
        store.remove(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned_and_get_purged() {
        let store = PendingRegistrations::new(600);
        let stale = OffsetDateTime::now_utc() - Duration::seconds(601);
        let old = store.insert(entry(stale)).await;
        assert!(store.get(old).await.is_none());

        store.insert(entry(stale)).await;
        store.insert(entry(OffsetDateTime::now_utc())).await;
        assert_eq!(store.len().await, 1);
    }
}
