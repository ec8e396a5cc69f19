use axum::Extension;
use axum::extract::Query;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::markup::plain_text;
use crate::notes::DEFAULT_TITLE;
use crate::notes::Note;
use crate::notes::NoteContext;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;
use crate::store::SharedStore;
use crate::tier::Tier;

use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::deserialize_nullable;
use super::parse_context;
use super::parse_title;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub preview: String,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub context_url: Option<String>,
    pub context_title: Option<String>,
    pub context_favicon: Option<String>,
    pub context_label: Option<String>,
}

impl NoteResponse {
    fn from_note(note: Note) -> Self {
        let preview = note.preview();
        let context_label = note.context_label();

        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            preview,
            pinned: note.pinned,
            created_at: note.created_at,
            updated_at: note.updated_at,
            context_url: note.context_url,
            context_title: note.context_title,
            context_favicon: note.context_favicon,
            context_label,
        }
    }

    fn from_note_multiple(notes: Vec<Note>) -> Vec<Self> {
        notes.into_iter().map(Self::from_note).collect::<Vec<Self>>()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Optional search query
    q: Option<String>,
}

pub async fn list<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    Extension(tier): Extension<Tier>,
    Query(query): Query<ListQuery>,
) -> Result<Success<Vec<NoteResponse>>, Error> {
    let notes = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => {
            tier.allows_search()?;

            store.search(q).await
        }
        _ => store.list().await,
    }
    .map_err(Error::from_storage)?;

    Ok(Success::ok(NoteResponse::from_note_multiple(notes)))
}

pub async fn single<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<NoteResponse>, Error> {
    get_note(&store, &note_id)
        .await
        .map(|note| Success::ok(NoteResponse::from_note(note)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteForm {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    content: Option<String>,

    /// Context of the current browser tab, when captured
    #[serde(default)]
    context: Option<NoteContext>,
}

pub async fn create<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    Extension(tier): Extension<Tier>,
    Form(form): Form<CreateNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let content = form.content.unwrap_or_default();
    tier.allows_note_length(plain_text(&content).chars().count())?;

    let title = form
        .title
        .as_deref()
        .map_or_else(|| DEFAULT_TITLE.to_string(), parse_title);

    let context = parse_context(form.context);

    // the count stays valid until the note is created
    let _creating = store.lock_creating().await;

    let note_count = store.list().await.map_err(Error::from_storage)?.len();
    tier.allows_new_note(note_count)?;

    let note = store
        .create_with_context(&content, &title, context.as_ref())
        .await
        .map_err(Error::from_storage)?;

    tracing::debug!("Created note {}", note.id);

    Ok(Success::created(NoteResponse::from_note(note)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteForm {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    content: Option<String>,

    #[serde(default)]
    pinned: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_nullable")]
    context_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_nullable")]
    context_title: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_nullable")]
    context_favicon: Option<Option<String>>,
}

pub async fn update<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    Extension(tier): Extension<Tier>,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<UpdateNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    if let Some(content) = &form.content {
        tier.allows_note_length(plain_text(content).chars().count())?;
    }

    let title = form.title.as_deref().map(parse_title);

    let values = UpdateNoteValues {
        title: title.as_deref(),
        content: form.content.as_deref(),
        pinned: form.pinned,
        context_url: form.context_url.as_ref().map(Option::as_deref),
        context_title: form.context_title.as_ref().map(Option::as_deref),
        context_favicon: form.context_favicon.as_ref().map(Option::as_deref),
    };

    let note = store
        .update(&note_id, &values)
        .await
        .map_err(Error::from_storage)?;

    if let Some(note) = note {
        Ok(Success::ok(NoteResponse::from_note(note)))
    } else {
        tracing::warn!("Note not found for update: {note_id}");

        Err(Error::not_found("Note not found"))
    }
}

pub async fn delete<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    let deleted = store
        .delete(&note_id)
        .await
        .map_err(Error::from_storage)?;

    if deleted {
        Ok(Success::<&'static str>::no_content())
    } else {
        Err(Error::not_found("Note not found"))
    }
}

pub async fn toggle_pin<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<NoteResponse>, Error> {
    store
        .toggle_pin(&note_id)
        .await
        .map_err(Error::from_storage)?
        .map_or_else(
            || Err(Error::not_found("Note not found")),
            |note| Ok(Success::ok(NoteResponse::from_note(note))),
        )
}

#[derive(Debug, Serialize)]
pub struct ClipboardResponse {
    text: String,
}

pub async fn clipboard<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<ClipboardResponse>, Error> {
    let note = get_note(&store, &note_id).await?;

    Ok(Success::ok(ClipboardResponse {
        text: note.clipboard_text(),
    }))
}

async fn get_note<S: Storage>(store: &SharedStore<S>, note_id: &Uuid) -> Result<Note, Error> {
    store
        .get(note_id)
        .await
        .map_err(Error::from_storage)?
        .map_or_else(|| Err(Error::not_found("Note not found")), Ok)
}
