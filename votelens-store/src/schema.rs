use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id            TEXT PRIMARY KEY,
      full_name     TEXT NOT NULL,
      email         TEXT NOT NULL UNIQUE,
      password_hash TEXT NOT NULL,
      created_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interactions (
      id          TEXT PRIMARY KEY,
      question    TEXT NOT NULL,
      responses   TEXT NOT NULL,
      created_at  TEXT NOT NULL,
      updated_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_interactions_created ON interactions(created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS reports (
      id            TEXT PRIMARY KEY,
      query         TEXT NOT NULL,
      payload       TEXT NOT NULL,
      password_hash TEXT NULL,
      created_at    TEXT NOT NULL,
      expires_at    TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reports_expires ON reports(expires_at)",
];

/// Create tables and indexes; safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in STATEMENTS {
        sqlx::query(stmt).execute(pool).await?;
    }
    tracing::debug!(statements = STATEMENTS.len(), "store.migrate.done");
    Ok(())
}
