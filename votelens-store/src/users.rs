use crate::{decode_err, store_err, Store};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;
use votelens_common::{Result, VotelensError};

/// Account record. The hash never leaves the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_from_row(r: &SqliteRow) -> Result<User> {
    let id: String = r.try_get("id").map_err(store_err)?;
    Ok(User {
        id: Uuid::parse_str(&id).map_err(|e| decode_err("user", e))?,
        full_name: r.try_get("full_name").map_err(store_err)?,
        email: r.try_get("email").map_err(store_err)?,
        password_hash: r.try_get("password_hash").map_err(store_err)?,
        created_at: r.try_get("created_at").map_err(store_err)?,
    })
}

impl Store {
    /// Insert a user; a second account for the same email is rejected.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            full_name: new.full_name.trim().to_string(),
            email: normalize_email(&new.email),
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "store.user.created");
                Ok(user)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::info!("store.user.duplicate_email");
                Err(VotelensError::InvalidInput(
                    "An account with this email already exists".into(),
                ))
            }
            Err(e) => Err(store_err(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
