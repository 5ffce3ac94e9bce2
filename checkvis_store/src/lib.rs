#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use checkvis_core::AssociationRepo;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use std::path::Path;
use tracing::{error, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_commands (
    user_id INTEGER NOT NULL,
    word TEXT NOT NULL,
    case_number TEXT NOT NULL,
    PRIMARY KEY (user_id, word)
)";

const UPSERT: &str =
    "INSERT OR REPLACE INTO user_commands (user_id, word, case_number) VALUES (?1, ?2, ?3)";

const SELECT: &str = "SELECT case_number FROM user_commands WHERE user_id = ?1 AND word = ?2";

/// SQLite-backed word -> case number mapping.
///
/// Every operation opens its own connection and closes it before returning;
/// no handle is shared between calls.
#[derive(Debug, Clone)]
pub struct AssociationStore {
    options: SqliteConnectOptions,
}

impl AssociationStore {
    /// Open (creating if needed) the database at `path` and ensure the table exists.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        info!("Opening association store: {}", path.display());

        let store = Self {
            options: SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        };

        let mut conn = store.connect().await?;
        let created = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
        conn.close().await?;
        created?;

        info!("Association store initialized");
        Ok(store)
    }

    async fn connect(&self) -> sqlx::Result<SqliteConnection> {
        SqliteConnection::connect_with(&self.options).await
    }

    async fn try_put(&self, user_id: i64, word: &str, case_number: &str) -> sqlx::Result<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(UPSERT)
            .bind(user_id)
            .bind(word)
            .bind(case_number)
            .execute(&mut conn)
            .await;
        conn.close().await?;
        result.map(|_| ())
    }

    async fn try_get(&self, user_id: i64, word: &str) -> sqlx::Result<Option<String>> {
        let mut conn = self.connect().await?;
        let result = sqlx::query_scalar::<_, String>(SELECT)
            .bind(user_id)
            .bind(word)
            .fetch_optional(&mut conn)
            .await;
        conn.close().await?;
        result
    }
}

#[async_trait]
impl AssociationRepo for AssociationStore {
    async fn put(&self, user_id: i64, word: &str, case_number: &str) -> bool {
        match self.try_put(user_id, word, case_number).await {
            Ok(()) => true,
            Err(e) => {
                error!("SQLite error: {e}");
                false
            }
        }
    }

    async fn get(&self, user_id: i64, word: &str) -> Option<String> {
        match self.try_get(user_id, word).await {
            Ok(case_number) => case_number,
            Err(e) => {
                error!("SQLite error: {e}");
                None
            }
        }
    }
}
