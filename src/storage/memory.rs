//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notes::Note;

use super::CreateNoteValues;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All notes in storage
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    type Options = ();

    async fn open(_options: &()) -> Result<Self> {
        Ok(Self::new())
    }

    async fn find_all_notes(&self) -> Result<Vec<Note>> {
        Ok(self.notes.lock().await.values().cloned().collect())
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.get(id).cloned())
    }

    async fn create_note(&self, values: CreateNoteValues<'_>) -> Result<Note> {
        let note = values.into_note();

        self.notes.lock().await.insert(note.id, note.clone());

        Ok(note)
    }

    async fn update_note(&self, id: &Uuid, values: &UpdateNoteValues<'_>) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.get_mut(id).map(|note| {
            values.apply(note);

            note.clone()
        }))
    }

    async fn delete_note(&self, id: &Uuid) -> Result<bool> {
        Ok(self.notes.lock().await.remove(id).is_some())
    }
}
