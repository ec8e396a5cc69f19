//! The note store
//!
//! Owns the notes collection on top of a [`Storage`] backend and derives the listing order,
//! search results and exports from it

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::OnceCell;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::notes::Note;
use crate::notes::NoteContext;
use crate::storage::CreateNoteValues;
use crate::storage::Result;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;
use crate::transfer::ExportFormat;
use crate::transfer::parse_import;

/// Note store shared by all consumers
pub type SharedStore<S> = Arc<NoteStore<S>>;

/// Store of all notes
///
/// Constructed once, the backend is opened on first use and shared by all later operations
pub struct NoteStore<S: Storage> {
    /// Options to open the backend with
    options: S::Options,

    /// The backend, once opened
    storage: OnceCell<S>,

    /// Guard for callers that check the notes before creating one
    creating: Mutex<()>,
}

impl<S: Storage> NoteStore<S> {
    /// Create an unopened store
    pub fn new(options: S::Options) -> Self {
        Self {
            options,
            storage: OnceCell::new(),
            creating: Mutex::new(()),
        }
    }

    /// Open the backend
    ///
    /// Only the first call opens it, concurrent callers wait for that call and later callers
    /// get the same backend. A failed open is retried by the next call.
    pub async fn open(&self) -> Result<&S> {
        self.storage
            .get_or_try_init(|| S::open(&self.options))
            .await
    }

    /// Exclusive access for a check-then-create sequence
    ///
    /// Only callers taking the guard are serialized, plain creates and imports are not
    pub async fn lock_creating(&self) -> MutexGuard<'_, ()> {
        self.creating.lock().await
    }

    /// Create a note without context
    pub async fn create(&self, content: &str, title: &str) -> Result<Note> {
        self.create_with_context(content, title, None).await
    }

    /// Create a note, with the context of the page it was taken on
    pub async fn create_with_context(
        &self,
        content: &str,
        title: &str,
        context: Option<&NoteContext>,
    ) -> Result<Note> {
        let values = CreateNoteValues {
            title,
            content,
            context,
        };

        self.open().await?.create_note(values).await
    }

    /// Get a single note
    pub async fn get(&self, id: &Uuid) -> Result<Option<Note>> {
        self.open().await?.find_single_note_by_id(id).await
    }

    /// Update a note with the given values
    ///
    /// A missing note is not an error, `None` is returned instead: an update can race with a
    /// delete of the same note
    pub async fn update(&self, id: &Uuid, values: &UpdateNoteValues<'_>) -> Result<Option<Note>> {
        self.open().await?.update_note(id, values).await
    }

    /// Permanently delete a note
    ///
    /// `true` when the note existed
    pub async fn delete(&self, id: &Uuid) -> Result<bool> {
        self.open().await?.delete_note(id).await
    }

    /// Pin an unpinned note, or unpin a pinned one
    pub async fn toggle_pin(&self, id: &Uuid) -> Result<Option<Note>> {
        let Some(note) = self.get(id).await? else {
            return Ok(None);
        };

        let values = UpdateNoteValues {
            pinned: Some(!note.pinned),
            ..Default::default()
        };

        self.update(id, &values).await
    }

    /// All notes, pinned notes first, then the most recently updated
    pub async fn list(&self) -> Result<Vec<Note>> {
        let mut notes = self.open().await?.find_all_notes().await?;

        notes.sort_by(listing_order);

        Ok(notes)
    }

    /// Notes containing the query in their title, text, context URL or context title
    ///
    /// Case insensitive, a blank query matches all notes
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let notes = self.list().await?;

        if query.trim().is_empty() {
            return Ok(notes);
        }

        let query = fold(query);

        Ok(notes
            .into_iter()
            .filter(|note| matches(note, &query))
            .collect())
    }

    /// Export all notes
    pub async fn export_all(&self, format: ExportFormat) -> Result<String> {
        let notes = self.list().await?;

        format.render(&notes)
    }

    /// Import notes from a JSON document, returns the amount of created notes
    ///
    /// Every imported note is created as a new note; nothing is created when the document is
    /// invalid
    pub async fn import_all(&self, document: &str) -> Result<usize> {
        let imported = parse_import(document)?;

        for note in &imported {
            self.create(&note.content, &note.title).await?;
        }

        Ok(imported.len())
    }
}

/// Pinned notes first, then by `updated_at` descending, ID as tiebreak
fn listing_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Case and normalization insensitive version of some text
fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Whether any searchable field of the note contains the folded query
fn matches(note: &Note, query: &str) -> bool {
    let plain_text = note.plain_text();

    [
        Some(note.title.as_str()),
        Some(plain_text.as_str()),
        note.context_url.as_deref(),
        note.context_title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| fold(field).contains(query))
}
