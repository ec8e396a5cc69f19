//! Export and import of all notes

use axum::Extension;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::storage::Storage;
use crate::store::SharedStore;
use crate::tier::Tier;
use crate::transfer::ExportFormat;

use super::Error;
use super::PathParameters;
use super::Success;

/// Base name of export downloads
const EXPORT_FILE_NAME: &str = "quick-notes-export";

pub async fn export<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    Extension(tier): Extension<Tier>,
    PathParameters(format): PathParameters<String>,
) -> Result<Response, Error> {
    tier.allows_export()?;

    let format = format.parse::<ExportFormat>().map_err(Error::bad_request)?;

    let export = store
        .export_all(format)
        .await
        .map_err(Error::from_storage)?;

    let content_disposition = format!(
        r#"attachment; filename="{EXPORT_FILE_NAME}.{}""#,
        format.extension()
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, content_disposition),
        ],
        export,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    count: usize,
}

pub async fn import<S: Storage>(
    Extension(store): Extension<SharedStore<S>>,
    document: String,
) -> Result<Success<ImportResponse>, Error> {
    let count = store
        .import_all(&document)
        .await
        .map_err(Error::from_storage)?;

    tracing::info!("Imported {count} notes");

    Ok(Success::created(ImportResponse { count }))
}
