//! SQLite storage
//!
//! The notes live in a single `notes` table, created by the embedded migrations

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notes::Note;
use crate::utils::env_var_or_else;

use super::CreateNoteValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// Migrator to run migrations on open
static MIGRATOR: Migrator = sqlx::migrate!();

/// Database used when `DATABASE_URL` is not set
const DEFAULT_DATABASE_URL: &str = "sqlite://quick-notes.db";

/// SQLite configuration
#[derive(Clone, Debug)]
pub enum Config {
    /// Detect configuration from environment
    DetectConfig,

    /// Connect to the given database URL
    Url(String),

    /// Use existing connection
    ExistingConnection(SqlitePool),
}

/// SQLite storage
#[derive(Clone, Debug)]
pub struct Sqlite {
    /// Pool of connections
    connection_pool: SqlitePool,

    /// Held by every write, at most one write transaction is open at a time
    write_lock: Arc<Mutex<()>>,
}

/// Row version of a note
#[derive(FromRow)]
struct SqliteNote {
    id: String,
    title: String,
    content: String,
    pinned: bool,
    created_at: i64,
    updated_at: i64,
    context_url: Option<String>,
    context_title: Option<String>,
    context_favicon: Option<String>,
}

impl SqliteNote {
    /// Create note from row version
    fn into_note(self) -> Result<Note> {
        let id = Uuid::parse_str(&self.id).map_err(read_failed)?;

        Ok(Note {
            id,
            title: self.title,
            content: self.content,
            pinned: self.pinned,
            created_at: self.created_at,
            updated_at: self.updated_at,
            context_url: self.context_url,
            context_title: self.context_title,
            context_favicon: self.context_favicon,
        })
    }
}

impl Sqlite {
    /// Connect to a database, creating the file when missing
    async fn connect(database_url: &str) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(unavailable)?
            .create_if_missing(true);

        // every connection to an in-memory database gets its own database
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        pool_options.connect_with(options).await.map_err(unavailable)
    }
}

#[async_trait]
impl Storage for Sqlite {
    type Options = Config;

    async fn open(config: &Config) -> Result<Self> {
        let connection_pool = match config {
            Config::DetectConfig => {
                let database_url =
                    env_var_or_else("DATABASE_URL", || DEFAULT_DATABASE_URL.to_string());

                Self::connect(&database_url).await?
            }
            Config::Url(database_url) => Self::connect(database_url).await?,
            Config::ExistingConnection(pool) => pool.clone(),
        };

        MIGRATOR.run(&connection_pool).await.map_err(unavailable)?;

        Ok(Self {
            connection_pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn find_all_notes(&self) -> Result<Vec<Note>> {
        sqlx::query_as::<_, SqliteNote>(
            r"
            SELECT *
            FROM notes
            ORDER BY pinned DESC, updated_at DESC
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(read_failed)?
        .into_iter()
        .map(SqliteNote::into_note)
        .collect()
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        sqlx::query_as::<_, SqliteNote>(
            r"
            SELECT *
            FROM notes
            WHERE id = ?
            LIMIT 1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(read_failed)?
        .map(SqliteNote::into_note)
        .transpose()
    }

    async fn create_note(&self, values: CreateNoteValues<'_>) -> Result<Note> {
        let note = values.into_note();

        let _write = self.write_lock.lock().await;

        sqlx::query(
            r"
            INSERT INTO notes (
                id,
                title,
                content,
                pinned,
                created_at,
                updated_at,
                context_url,
                context_title,
                context_favicon
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(note.id.to_string())
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.pinned)
        .bind(note.created_at)
        .bind(note.updated_at)
        .bind(&note.context_url)
        .bind(&note.context_title)
        .bind(&note.context_favicon)
        .execute(&self.connection_pool)
        .await
        .map_err(write_failed)?;

        Ok(note)
    }

    async fn update_note(&self, id: &Uuid, values: &UpdateNoteValues<'_>) -> Result<Option<Note>> {
        let _write = self.write_lock.lock().await;

        let mut transaction = self.connection_pool.begin().await.map_err(write_failed)?;

        let current = sqlx::query_as::<_, SqliteNote>(
            r"
            SELECT *
            FROM notes
            WHERE id = ?
            LIMIT 1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(read_failed)?;

        // dropping the transaction rolls it back
        let Some(current) = current else {
            return Ok(None);
        };

        let mut note = current.into_note()?;
        values.apply(&mut note);

        sqlx::query(
            r"
            UPDATE notes
            SET title = ?,
                content = ?,
                pinned = ?,
                updated_at = ?,
                context_url = ?,
                context_title = ?,
                context_favicon = ?
            WHERE id = ?
            ",
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.pinned)
        .bind(note.updated_at)
        .bind(&note.context_url)
        .bind(&note.context_title)
        .bind(&note.context_favicon)
        .bind(note.id.to_string())
        .execute(&mut *transaction)
        .await
        .map_err(write_failed)?;

        transaction.commit().await.map_err(write_failed)?;

        Ok(Some(note))
    }

    async fn delete_note(&self, id: &Uuid) -> Result<bool> {
        let _write = self.write_lock.lock().await;

        let result = sqlx::query(
            r"
            DELETE FROM notes
            WHERE id = ?
            ",
        )
        .bind(id.to_string())
        .execute(&self.connection_pool)
        .await
        .map_err(write_failed)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map any error into a storage unavailable error
fn unavailable<E: ToString>(err: E) -> Error {
    Error::StorageUnavailable(err.to_string())
}

/// Map any error into a read failed error
fn read_failed<E: ToString>(err: E) -> Error {
    Error::StorageReadFailed(err.to_string())
}

/// Map any error into a write failed error
fn write_failed<E: ToString>(err: E) -> Error {
    Error::StorageWriteFailed(err.to_string())
}
