//! SQLite persistence for users, what-if interactions and saved reports.
//!
//! All access goes through [`Store`], a cheap-to-clone handle around a
//! [`SqlitePool`]. [`Store::shared`] memoizes one pool per process;
//! [`Store::in_memory`] gives tests an isolated database.
//!
//! ```no_run
//! # async fn demo() -> votelens_common::Result<()> {
//! let store = votelens_store::Store::in_memory().await?;
//! assert!(store.recent_interactions(20).await?.is_empty());
//! # Ok(()) }
//! ```

mod interactions;
mod reports;
pub mod schema;
mod users;

pub use interactions::{Interaction, InteractionResponse};
pub use reports::{NewReport, Report};
pub use users::{NewUser, User};

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::OnceCell;
use votelens_common::{Result, VotelensError};

static SHARED_POOL: OnceCell<SqlitePool> = OnceCell::const_new();

#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open a new pool at `url` and create the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(store_err)?;
        schema::migrate(&pool).await.map_err(store_err)?;
        tracing::info!(url = %redact_url(url), max_connections, "store.connected");
        Ok(Self { pool })
    }

    /// Process-wide pool; the first caller's `url` wins.
    pub async fn shared(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SHARED_POOL
            .get_or_try_init(|| async {
                Store::connect(url, max_connections)
                    .await
                    .map(|s| s.pool)
            })
            .await?;
        Ok(Self { pool: pool.clone() })
    }

    /// Private in-memory database. Not memoized.
    pub async fn in_memory() -> Result<Self> {
        // A single connection that never idles out keeps the database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(store_err)?;
        schema::migrate(&pool).await.map_err(store_err)?;
        Ok(Self { pool })
    }
}

pub(crate) fn store_err(e: sqlx::Error) -> VotelensError {
    VotelensError::Store(e.to_string())
}

pub(crate) fn decode_err(what: &str, e: impl std::fmt::Display) -> VotelensError {
    VotelensError::Store(format!("corrupt {what} row: {e}"))
}

fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
