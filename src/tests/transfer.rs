use axum::http::StatusCode;
use serde_json::Value;
use serde_json::json;

use crate::tests::helper;
use crate::tier::Tier;

#[tokio::test]
async fn test_export_plain_text() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    helper::create_note(&mut app, "Test", "<p>Hello world</p>").await;

    let (status_code, export, _) = helper::export(&mut app, "txt").await;
    assert_eq!(StatusCode::OK, status_code);
    let export = export.unwrap();
    assert_eq!(
        Some("text/plain; charset=utf-8".to_string()),
        export.content_type
    );
    assert_eq!(
        Some(r#"attachment; filename="quick-notes-export.txt""#.to_string()),
        export.content_disposition
    );
    assert_eq!("=== Test ===\nHello world\n", export.body);
}

#[tokio::test]
async fn test_export_markdown() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    helper::maybe_create_note_with_payload(
        &mut app,
        &json!({
            "title": "Article",
            "content": "Worth a read",
            "context": { "url": "https://example.com/a", "title": "Example" }
        }),
    )
    .await;

    let (status_code, export, _) = helper::export(&mut app, "markdown").await;
    assert_eq!(StatusCode::OK, status_code);
    let export = export.unwrap();
    assert_eq!(
        Some(r#"attachment; filename="quick-notes-export.md""#.to_string()),
        export.content_disposition
    );
    assert!(
        export
            .body
            .starts_with("# Article\n\n> Source: [Example](https://example.com/a)\n\nWorth a read\n\n---\n*Created: ")
    );
    assert!(export.body.ends_with(" UTC*\n"));
}

#[tokio::test]
async fn test_export_json_in_listing_order() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let first = helper::create_note(&mut app, "First", "One").await;
    helper::create_note(&mut app, "Second", "Two").await;
    helper::toggle_pin(&mut app, &first.id).await;

    let (status_code, export, _) = helper::export(&mut app, "JSON").await;
    assert_eq!(StatusCode::OK, status_code);
    let export = export.unwrap();
    assert_eq!(Some("application/json".to_string()), export.content_type);

    let exported = serde_json::from_str::<Value>(&export.body).unwrap();
    let exported = exported.as_array().unwrap();
    assert_eq!(2, exported.len());
    assert_eq!(Some("First"), exported[0]["title"].as_str());
    assert_eq!(Some(true), exported[0]["pinned"].as_bool());
    assert_eq!(Some("Second"), exported[1]["title"].as_str());
}

#[tokio::test]
async fn test_export_unknown_format() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let (status_code, export, error) = helper::export(&mut app, "pdf").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(export.is_none());
    assert_eq!("Unknown export format: pdf", error.unwrap().error);
}

#[tokio::test]
async fn test_export_without_notes() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let (_, export, _) = helper::export(&mut app, "txt").await;
    assert_eq!("", export.unwrap().body);

    let (_, export, _) = helper::export(&mut app, "json").await;
    assert_eq!("[]", export.unwrap().body);
}

#[tokio::test]
async fn test_import() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let document = r#"[
        { "title": "Imported one", "content": "First" },
        { "content": "No title" },
        { "title": "", "content": "Empty title", "pinned": true },
        {}
    ]"#;

    let (status_code, count, _) = helper::maybe_import(&mut app, document).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(Some(4), count);

    let (_, notes) = helper::list_notes(&mut app).await;
    let notes = notes.unwrap();
    assert_eq!(4, notes.len());
    assert!(notes.iter().all(|note| !note.pinned));

    let mut titles = notes
        .iter()
        .map(|note| note.title.as_str())
        .collect::<Vec<&str>>();
    titles.sort_unstable();
    assert_eq!(
        vec!["Imported", "Imported", "Imported", "Imported one"],
        titles
    );
    assert!(notes.iter().any(|note| note.content.is_empty()));
}

#[tokio::test]
async fn test_import_exported_notes() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let original = helper::create_note(&mut app, "Roundtrip", "<i>Kept</i> as is").await;

    let (_, export, _) = helper::export(&mut app, "json").await;
    let (status_code, count, _) = helper::maybe_import(&mut app, &export.unwrap().body).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(Some(1), count);

    let (_, notes) = helper::list_notes(&mut app).await;
    let notes = notes.unwrap();
    assert_eq!(2, notes.len());

    // imports are new notes
    let copy = notes.iter().find(|note| note.id != original.id).unwrap();
    assert_eq!(original.title, copy.title);
    assert_eq!(original.content, copy.content);
}

#[tokio::test]
async fn test_import_loose_fields() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    let (status_code, count, _) =
        helper::maybe_import(&mut app, r#"[{ "title": 5, "content": "x" }, { "title": false }]"#)
            .await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(Some(2), count);

    let (_, notes) = helper::list_notes(&mut app).await;
    let notes = notes.unwrap();
    assert!(notes.iter().any(|note| note.title == "5" && note.content == "x"));
    assert!(
        notes
            .iter()
            .any(|note| note.title == "Imported" && note.content.is_empty())
    );
}

#[tokio::test]
async fn test_invalid_import() {
    let mut app = helper::setup_test_app(Tier::Pro).await;

    for document in [
        "not json",
        r#"{ "title": "Not a list" }"#,
        r#"[{ "title": "Fine" }, "not an object"]"#,
        r#"[{ "title": "Fine" }, null]"#,
    ] {
        let (status_code, count, error) = helper::maybe_import(&mut app, document).await;
        assert_eq!(StatusCode::BAD_REQUEST, status_code, "{document} is accepted");
        assert_eq!(None, count);
        let error = error.unwrap();
        assert_eq!("Invalid import file", error.error);
        assert!(error.description.is_some());
    }

    let (_, notes) = helper::list_notes(&mut app).await;
    assert_eq!(Some(0), notes.map(|notes| notes.len()));
}
