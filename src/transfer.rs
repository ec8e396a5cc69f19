//! Export and import document formats

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::notes::IMPORTED_TITLE;
use crate::notes::Note;
use crate::storage::Error;
use crate::storage::Result;

/// Separator between the notes of a text export
const NOTE_SEPARATOR: &str = "\n\n";

/// Supported export formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// All fields of all notes, pretty printed
    Json,

    /// One markdown document per note
    Markdown,

    /// One plain text block per note
    PlainText,
}

impl ExportFormat {
    /// File extension of an export
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::PlainText => "txt",
        }
    }

    /// Content type of an export
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
        }
    }

    /// Render the notes, in the given order
    pub fn render(self, notes: &[Note]) -> Result<String> {
        match self {
            Self::Json => {
                serde_json::to_string_pretty(notes).map_err(|err| Error::Export(err.to_string()))
            }
            Self::Markdown => Ok(join(notes, markdown)),
            Self::PlainText => Ok(join(notes, plain_text)),
        }
    }
}

/// Unknown export format
#[derive(Debug)]
pub struct UnknownFormat(String);

impl std::error::Error for UnknownFormat {}

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown export format: {}", self.0)
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(format: &str) -> core::result::Result<Self, Self::Err> {
        match format.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" | "plaintext" => Ok(Self::PlainText),
            _ => Err(UnknownFormat(format.to_string())),
        }
    }
}

fn join(notes: &[Note], render: fn(&Note) -> String) -> String {
    notes
        .iter()
        .map(render)
        .collect::<Vec<String>>()
        .join(NOTE_SEPARATOR)
}

fn markdown(note: &Note) -> String {
    let mut markdown = format!("# {}\n\n", note.title);

    if let Some(context_url) = &note.context_url {
        let label = note
            .context_title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(context_url);

        markdown.push_str(&format!("> Source: [{label}]({context_url})\n\n"));
    }

    markdown.push_str(&note.plain_text());
    markdown.push_str(&format!(
        "\n\n---\n*Created: {}*\n",
        format_timestamp(note.created_at)
    ));

    markdown
}

fn plain_text(note: &Note) -> String {
    let mut text = format!("=== {} ===\n", note.title);

    if let Some(context_url) = &note.context_url {
        text.push_str(&format!("Source: {context_url}\n"));
    }

    text.push_str(&note.plain_text());
    text.push('\n');

    text
}

/// Human readable UTC version of a timestamp in milliseconds
fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp).map_or_else(
        || timestamp.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

/// A note ready to be created from an import
#[derive(Debug, PartialEq, Eq)]
pub struct ImportedNote {
    /// Title, `Imported` when missing or empty
    pub title: String,

    /// Content, empty when missing
    pub content: String,
}

/// Parse an import document
///
/// The document must be a JSON array of objects. Their `title` and `content` are optional, a
/// missing or falsy value (`null`, `false`, `0`, `""`) gets the default and any other value is
/// used as text. Nothing is returned unless the whole document is valid.
pub fn parse_import(document: &str) -> Result<Vec<ImportedNote>> {
    let objects = serde_json::from_str::<Vec<Map<String, Value>>>(document)
        .map_err(|err| Error::ImportParseError(err.to_string()))?;

    Ok(objects
        .into_iter()
        .map(|mut object| ImportedNote {
            title: import_text(object.remove("title"))
                .unwrap_or_else(|| IMPORTED_TITLE.to_string()),
            content: import_text(object.remove("content")).unwrap_or_default(),
        })
        .collect())
}

/// Text of an imported field, `None` for missing and falsy values
fn import_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(number) if is_zero(&number) => None,
        Value::String(text) => Some(text),
        value => Some(value.to_string()),
    }
}

#[allow(clippy::float_cmp)] // `-0.0` and `0.0` are both zero
fn is_zero(number: &Number) -> bool {
    number.as_f64().is_some_and(|number| number == 0.0)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn note(title: &str, content: &str, context_url: Option<&str>) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            pinned: false,
            // 2024-03-01 12:30:00 UTC
            created_at: 1_709_296_200_000,
            updated_at: 1_709_296_200_000,
            context_url: context_url.map(ToString::to_string),
            context_title: None,
            context_favicon: None,
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::Json, "json".parse().unwrap());
        assert_eq!(ExportFormat::Markdown, "md".parse().unwrap());
        assert_eq!(ExportFormat::Markdown, "markdown".parse().unwrap());
        assert_eq!(ExportFormat::PlainText, "txt".parse().unwrap());
        assert_eq!(ExportFormat::PlainText, "plaintext".parse().unwrap());
        assert_eq!(ExportFormat::PlainText, "TXT".parse().unwrap());
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_plain_text_export() {
        let notes = vec![
            note("Test", "<b>Hello</b> world", None),
            note("Other", "<p>Second</p>", Some("https://example.com/")),
        ];

        let export = ExportFormat::PlainText.render(&notes).unwrap();

        assert_eq!(
            export,
            "=== Test ===\nHello world\n\n\n=== Other ===\nSource: https://example.com/\nSecond\n"
        );
    }

    #[test]
    fn test_markdown_export() {
        let mut with_context = note("Read later", "An <i>article</i>", Some("https://example.com/a"));
        with_context.context_title = Some("An article".to_string());

        let notes = vec![with_context, note("Bare", "Text", Some("https://example.com/b"))];

        let export = ExportFormat::Markdown.render(&notes).unwrap();

        assert_eq!(
            export,
            "# Read later\n\n\
             > Source: [An article](https://example.com/a)\n\n\
             An article\n\n---\n*Created: 2024-03-01 12:30 UTC*\n\
             \n\n\
             # Bare\n\n\
             > Source: [https://example.com/b](https://example.com/b)\n\n\
             Text\n\n---\n*Created: 2024-03-01 12:30 UTC*\n"
        );
    }

    #[test]
    fn test_json_export_contains_all_fields() {
        let notes = vec![note("Test", "<b>Hello</b>", None)];

        let export = ExportFormat::Json.render(&notes).unwrap();
        let value = serde_json::from_str::<Value>(&export).unwrap();

        let exported = value.as_array().unwrap()[0].as_object().unwrap();
        assert_eq!(exported["title"], "Test");
        assert_eq!(exported["content"], "<b>Hello</b>");
        assert_eq!(exported["pinned"], false);
        assert_eq!(exported["createdAt"], 1_709_296_200_000_i64);
        assert_eq!(exported["updatedAt"], 1_709_296_200_000_i64);
        assert!(exported["contextUrl"].is_null());
        assert!(exported.contains_key("contextTitle"));
        assert!(exported.contains_key("contextFavicon"));
        assert!(export.contains('\n'));
    }

    #[test]
    fn test_empty_export() {
        assert_eq!("[]", ExportFormat::Json.render(&[]).unwrap());
        assert_eq!("", ExportFormat::Markdown.render(&[]).unwrap());
        assert_eq!("", ExportFormat::PlainText.render(&[]).unwrap());
    }

    #[test]
    fn test_parse_import_defaults() {
        let imported = parse_import(
            r#"[
                {"title": "X", "content": "Y"},
                {"content": "<p>no title</p>"},
                {"title": ""},
                {"id": "kept-out", "title": "Z", "pinned": true, "extra": [1, 2]}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            imported,
            vec![
                ImportedNote {
                    title: "X".to_string(),
                    content: "Y".to_string(),
                },
                ImportedNote {
                    title: "Imported".to_string(),
                    content: "<p>no title</p>".to_string(),
                },
                ImportedNote {
                    title: "Imported".to_string(),
                    content: String::new(),
                },
                ImportedNote {
                    title: "Z".to_string(),
                    content: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_import_null_fields_use_defaults() {
        let imported = parse_import(r#"[{"title": null, "content": null}]"#).unwrap();

        assert_eq!(
            imported,
            vec![ImportedNote {
                title: "Imported".to_string(),
                content: String::new(),
            }]
        );
    }

    #[test]
    fn test_parse_import_rejects_invalid_documents() {
        for document in [
            "",
            "not json",
            r#"{"title": "X"}"#,
            r#"["X"]"#,
            r#"[[1, 2]]"#,
            r#"[{"title": "X"}, 5]"#,
            r#"[{"title": "X"}, null]"#,
        ] {
            let result = parse_import(document);
            assert!(
                matches!(result, Err(Error::ImportParseError(_))),
                "{document} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_import_loose_fields() {
        let imported = parse_import(
            r#"[
                {"title": 5, "content": "x"},
                {"title": false},
                {"title": 0, "content": 0},
                {"title": true, "content": 1.5},
                {"title": -0.0, "content": ["a", 1]}
            ]"#,
        )
        .unwrap();

        let imported = imported
            .iter()
            .map(|note| (note.title.as_str(), note.content.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            imported,
            vec![
                ("5", "x"),
                ("Imported", ""),
                ("Imported", ""),
                ("true", "1.5"),
                ("Imported", r#"["a",1]"#),
            ]
        );
    }

    #[test]
    fn test_parse_import_empty_array() {
        assert_eq!(Vec::<ImportedNote>::new(), parse_import("[]").unwrap());
    }
}
