use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::markup::plain_text;

/// Title given to notes created without one
pub const DEFAULT_TITLE: &str = "Untitled";

/// Title given to imported notes without one
pub const IMPORTED_TITLE: &str = "Imported";

/// Amount of plain text characters shown in a preview
const PREVIEW_LENGTH: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub context_url: Option<String>,
    pub context_title: Option<String>,
    pub context_favicon: Option<String>,
}

impl Note {
    /// Content without any markup
    pub fn plain_text(&self) -> String {
        plain_text(&self.content)
    }

    /// Short plain text preview of the content
    pub fn preview(&self) -> String {
        self.plain_text().chars().take(PREVIEW_LENGTH).collect()
    }

    /// Text put on the clipboard when copying a note
    ///
    /// The title is left out when it is the default one, the source URL is appended when known
    pub fn clipboard_text(&self) -> String {
        let text = self.plain_text();

        let mut clipboard_text = if !self.title.is_empty() && self.title != DEFAULT_TITLE {
            format!("{}\n\n{text}", self.title)
        } else {
            text
        };

        if let Some(context_url) = &self.context_url {
            clipboard_text.push_str("\n\nSource: ");
            clipboard_text.push_str(context_url);
        }

        clipboard_text
    }

    /// Human friendly name of the page the note was taken on
    ///
    /// Prefers the page title, then the host of the URL
    pub fn context_label(&self) -> Option<String> {
        let context_url = self.context_url.as_ref()?;

        if let Some(context_title) = self.context_title.as_ref().filter(|t| !t.is_empty()) {
            return Some(context_title.clone());
        }

        Some(domain(context_url))
    }
}

/// Context of the browser tab a note was taken on
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteContext {
    /// URL of the page
    pub url: String,

    /// Title of the page
    #[serde(default)]
    pub title: Option<String>,

    /// Favicon of the page, any URI
    #[serde(default)]
    pub favicon_uri: Option<String>,
}

/// Host of an URL without the `www.` prefix, or the URL itself when it can not be parsed
fn domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.replacen("www.", "", 1)))
        .unwrap_or_else(|| url.to_string())
}
