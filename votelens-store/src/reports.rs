use crate::{decode_err, store_err, Store};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;
use votelens_common::{Result, VotelensError};

/// Saved search result with an expiry and an optional password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub query: String,
    pub payload: Value,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Report {
    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub query: String,
    pub payload: Value,
    pub password_hash: Option<String>,
    pub ttl: Duration,
}

fn report_from_row(r: &SqliteRow) -> Result<Report> {
    let id: String = r.try_get("id").map_err(store_err)?;
    let payload: String = r.try_get("payload").map_err(store_err)?;
    Ok(Report {
        id: Uuid::parse_str(&id).map_err(|e| decode_err("report", e))?,
        query: r.try_get("query").map_err(store_err)?,
        payload: serde_json::from_str(&payload).map_err(|e| decode_err("report", e))?,
        password_hash: r.try_get("password_hash").map_err(store_err)?,
        created_at: r.try_get("created_at").map_err(store_err)?,
        expires_at: r.try_get("expires_at").map_err(store_err)?,
    })
}

impl Store {
    /// Persist a report; expired rows are purged in the same call.
    pub async fn insert_report(&self, new: NewReport) -> Result<Report> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(new.ttl)
            .map_err(|e| VotelensError::InvalidInput(format!("report ttl out of range: {e}")))?;
        let report = Report {
            id: Uuid::new_v4(),
            query: new.query,
            payload: new.payload,
            password_hash: new.password_hash,
            created_at: now,
            expires_at: now + ttl,
        };
        let purged = self.purge_expired_reports(now).await?;

        sqlx::query(
            r#"
            INSERT INTO reports (id, query, payload, password_hash, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(report.id.to_string())
        .bind(&report.query)
        .bind(report.payload.to_string())
        .bind(report.password_hash.as_deref())
        .bind(report.created_at)
        .bind(report.expires_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        tracing::info!(
            report_id = %report.id,
            protected = report.is_protected(),
            expires_at = %report.expires_at,
            purged,
            "store.report.inserted"
        );
        Ok(report)
    }

    /// Live report by id; expired reports read as absent.
    pub async fn get_report(&self, id: Uuid) -> Result<Option<Report>> {
        let row = sqlx::query(
            r#"
            SELECT id, query, payload, password_hash, created_at, expires_at
            FROM reports WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let report = report_from_row(&row)?;
        if report.is_expired_at(Utc::now()) {
            tracing::debug!(report_id = %id, "store.report.expired");
            return Ok(None);
        }
        Ok(Some(report))
    }

    pub async fn purge_expired_reports(&self, now: DateTime<Utc>) -> Result<u64> {
        let done = sqlx::query("DELETE FROM reports WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(done.rows_affected())
    }
}
