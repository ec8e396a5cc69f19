//! All things related to the storage of notes

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::notes::Note;
use crate::notes::NoteContext;

pub use memory::Memory;
pub use sqlite::Config as SqliteConfig;
pub use sqlite::Sqlite;

mod memory;
mod sqlite;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// The storage could not be opened
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Reading from an open storage failed
    #[error("Storage read failed: {0}")]
    StorageReadFailed(String),

    /// Writing to an open storage failed
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    /// An import payload is not a JSON array of note objects
    #[error("Import parse error: {0}")]
    ImportParseError(String),

    /// Notes could not be serialized for an export
    #[error("Export failed: {0}")]
    Export(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a Note
pub struct CreateNoteValues<'a> {
    /// Title of the note
    pub title: &'a str,

    /// Content of the note
    ///
    /// Rich text markup, stored as is
    pub content: &'a str,

    /// Optional context of the page the note was taken on
    pub context: Option<&'a NoteContext>,
}

/// Values to update a Note
///
/// Only the fields that are set are changed, context fields can be cleared with `Some(None)`
#[derive(Debug, Default)]
pub struct UpdateNoteValues<'a> {
    /// New title of the note
    pub title: Option<&'a str>,

    /// New content of the note
    pub content: Option<&'a str>,

    /// Pin or unpin the note
    pub pinned: Option<bool>,

    /// New context URL
    pub context_url: Option<Option<&'a str>>,

    /// New context page title
    pub context_title: Option<Option<&'a str>>,

    /// New context favicon
    pub context_favicon: Option<Option<&'a str>>,
}

impl UpdateNoteValues<'_> {
    /// Merge the values onto a note and refresh its `updated_at`
    pub fn apply(&self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title.to_string();
        }

        if let Some(content) = self.content {
            note.content = content.to_string();
        }

        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }

        if let Some(context_url) = self.context_url {
            note.context_url = context_url.map(ToString::to_string);
        }

        if let Some(context_title) = self.context_title {
            note.context_title = context_title.map(ToString::to_string);
        }

        if let Some(context_favicon) = self.context_favicon {
            note.context_favicon = context_favicon.map(ToString::to_string);
        }

        note.updated_at = next_updated_at(note.updated_at);
    }
}

impl CreateNoteValues<'_> {
    /// Build a fresh note from the values
    fn into_note(self) -> Note {
        let now = now();

        Note {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            content: self.content.to_string(),
            pinned: false,
            created_at: now,
            updated_at: now,
            context_url: self.context.map(|context| context.url.clone()),
            context_title: self.context.and_then(|context| context.title.clone()),
            context_favicon: self.context.and_then(|context| context.favicon_uri.clone()),
        }
    }
}

/// Current time in milliseconds since the epoch
fn now() -> i64 {
    Utc::now().timestamp_millis()
}

/// Timestamp for a mutation of a record last updated at `previous`
///
/// Always later than `previous`, even within the same millisecond
fn next_updated_at(previous: i64) -> i64 {
    now().max(previous.saturating_add(1))
}

/// Storage with all supported operations
///
/// Operations are atomic for the single record they touch
#[async_trait]
pub trait Storage: Sized + Send + Sync + 'static {
    /// Options needed to open the storage
    type Options: Send + Sync + 'static;

    /// Open the storage, creating the notes collection and its indexes when missing
    async fn open(options: &Self::Options) -> Result<Self>;

    /// Find all notes, in no particular order
    async fn find_all_notes(&self) -> Result<Vec<Note>>;

    /// Find a single note by its ID
    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Create a note with a fresh ID
    async fn create_note(&self, values: CreateNoteValues<'_>) -> Result<Note>;

    /// Update a note
    ///
    /// `None` when the note does not exist (anymore)
    async fn update_note(&self, id: &Uuid, values: &UpdateNoteValues<'_>) -> Result<Option<Note>>;

    /// Permanently delete a note
    ///
    /// `true` when a note was removed
    async fn delete_note(&self, id: &Uuid) -> Result<bool>;
}
