use crate::auth::repo_types::{CreateUserError, NewUser, User};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, fullname, email, username, password, state, contact, otp";

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a verified account. Unique-constraint hits are reported as `Duplicate`.
    pub async fn create(db: &SqlitePool, new: &NewUser<'_>) -> Result<User, CreateUserError> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (fullname, email, username, password, state, contact, otp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.fullname)
        .bind(new.email)
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.state)
        .bind(new.contact)
        .bind(new.otp)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(CreateUserError::Duplicate),
            Err(e) => Err(CreateUserError::Db(e)),
        }
    }

    /// Replace the password hash for an email. Returns false when no account matched.
    pub async fn update_password(
        db: &SqlitePool,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let done = sqlx::query("UPDATE users SET password = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_pool_in_memory;

    fn new_user<'a>(email: &'a str, username: &'a str) -> NewUser<'a> {
        NewUser {
            fullname: "Harpreet Kaur",
            email,
            username,
            password_hash: "hash",
            state: Some("Punjab"),
            contact: "9876543210",
            otp: "1234",
        }
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let db = open_pool_in_memory().await.unwrap();
        let created = User::create(&db, &new_user("h@example.in", "harpreet")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.otp.as_deref(), Some("1234"));

        let by_name = User::find_by_username(&db, "harpreet").await.unwrap().unwrap();
        assert_eq!(by_name.email, "h@example.in");
        let by_email = User::find_by_email(&db, "h@example.in").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(User::find_by_username(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_or_username_is_reported() {
        let db = open_pool_in_memory().await.unwrap();
        User::create(&db, &new_user("h@example.in", "harpreet")).await.unwrap();

        let same_email = User::create(&db, &new_user("h@example.in", "other")).await;
        assert!(matches!(same_email, Err(CreateUserError::Duplicate)));
        let same_name = User::create(&db, &new_user("other@example.in", "harpreet")).await;
        assert!(matches!(same_name, Err(CreateUserError::Duplicate)));
    }

    #[tokio::test]
    async fn update_password_reports_missing_account() {
        let db = open_pool_in_memory().await.unwrap();
        User::create(&db, &new_user("h@example.in", "harpreet")).await.unwrap();

        assert!(User::update_password(&db, "h@example.in", "new-hash").await.unwrap());
        let user = User::find_by_email(&db, "h@example.in").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(!User::update_password(&db, "ghost@example.in", "x").await.unwrap());
    }
}
