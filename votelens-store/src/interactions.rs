use crate::{decode_err, store_err, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;
use votelens_common::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub mode: String,
    pub content: String,
}

/// One what-if question with its per-mode answers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub question: String,
    pub responses: Vec<InteractionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn interaction_from_row(r: &SqliteRow) -> Result<Interaction> {
    let id: String = r.try_get("id").map_err(store_err)?;
    let responses: String = r.try_get("responses").map_err(store_err)?;
    Ok(Interaction {
        id: Uuid::parse_str(&id).map_err(|e| decode_err("interaction", e))?,
        question: r.try_get("question").map_err(store_err)?,
        responses: serde_json::from_str(&responses).map_err(|e| decode_err("interaction", e))?,
        created_at: r.try_get("created_at").map_err(store_err)?,
        updated_at: r.try_get("updated_at").map_err(store_err)?,
    })
}

impl Store {
    pub async fn insert_interaction(
        &self,
        question: &str,
        responses: Vec<InteractionResponse>,
    ) -> Result<Interaction> {
        let now = Utc::now();
        let interaction = Interaction {
            id: Uuid::new_v4(),
            question: question.trim().to_string(),
            responses,
            created_at: now,
            updated_at: now,
        };
        let encoded = serde_json::to_string(&interaction.responses)
            .map_err(|e| decode_err("interaction", e))?;
        sqlx::query(
            r#"
            INSERT INTO interactions (id, question, responses, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(interaction.id.to_string())
        .bind(&interaction.question)
        .bind(encoded)
        .bind(interaction.created_at)
        .bind(interaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        tracing::info!(
            interaction_id = %interaction.id,
            modes = interaction.responses.len(),
            "store.interaction.inserted"
        );
        Ok(interaction)
    }

    /// Newest first.
    pub async fn recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, responses, created_at, updated_at
            FROM interactions
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.iter().map(interaction_from_row).collect()
    }
}
