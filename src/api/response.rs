//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::storage::Error as StorageError;
use crate::tier::Tier;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: Option<V>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data: Some(data),
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data: Some(data),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            data: None,
        }
    }
}

#[derive(Serialize)]
struct DataWrapper<D>
where
    D: Serialize,
{
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        if let Some(data) = self.data {
            (self.status_code, Json(DataWrapper { data })).into_response()
        } else {
            self.status_code.into_response()
        }
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::FORBIDDEN,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    /// Map a note store error
    ///
    /// Invalid import files are the fault of the client, anything else is ours
    #[allow(clippy::needless_pass_by_value)] // used as `map_err` callback
    pub fn from_storage(err: StorageError) -> Self {
        match err {
            StorageError::ImportParseError(description) => {
                Self::bad_request("Invalid import file").with_description(description)
            }
            err => {
                tracing::error!("Note store failure: {err}");

                Self::internal_server_error(err)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper<D>
where
    D: Serialize,
{
    error: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<D>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}

impl Tier {
    /// Is there room for another note next to the existing ones
    pub fn allows_new_note(self, note_count: usize) -> Result<(), Error> {
        match self.limits().max_notes {
            Some(max_notes) if note_count >= max_notes => {
                tracing::debug!("Refusing note {}, limit is {max_notes}", note_count + 1);

                Err(Error::forbidden(format!("Free limit: {max_notes} notes")))
            }
            _ => Ok(()),
        }
    }

    /// Does the plain text of a note fit
    pub fn allows_note_length(self, char_count: usize) -> Result<(), Error> {
        match self.limits().max_chars_per_note {
            Some(max_chars) if char_count > max_chars => Err(Error::forbidden(format!(
                "Free limit: {max_chars} characters per note"
            ))),
            _ => Ok(()),
        }
    }

    /// Is searching allowed
    pub fn allows_search(self) -> Result<(), Error> {
        if self.limits().can_search {
            Ok(())
        } else {
            Err(Error::forbidden("Search is a Pro feature"))
        }
    }

    /// Is exporting allowed
    pub fn allows_export(self) -> Result<(), Error> {
        if self.limits().can_export {
            Ok(())
        } else {
            Err(Error::forbidden("Export is a Pro feature"))
        }
    }
}
