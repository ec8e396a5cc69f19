//! API request helpers

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::http::request::Parts;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::DeserializeOwned;

use crate::notes::DEFAULT_TITLE;
use crate::notes::NoteContext;

use super::Error;

/// URL prefixes of pages internal to the browser, never stored as note context
const INTERNAL_PAGE_PREFIXES: [&str; 4] = ["chrome://", "chrome-extension://", "edge://", "about:"];

/// Normalize a title entered by the user
///
/// Surrounding whitespace is trimmed, a blank title becomes `Untitled`
pub fn parse_title(title: &str) -> String {
    let title = title.trim();

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Keep a captured context only when it points to a regular page
pub fn parse_context(context: Option<NoteContext>) -> Option<NoteContext> {
    context.filter(|context| {
        !context.url.is_empty()
            && !INTERNAL_PAGE_PREFIXES
                .iter()
                .any(|prefix| context.url.starts_with(prefix))
    })
}

/// Deserialize a field that can be absent, `null` or a value
///
/// Absent fields use the default `None`, `null` becomes `Some(None)`
pub fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                let description = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);

                Err(Error::bad_request("JSON syntax error").with_description(description))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title() {
        assert_eq!(parse_title("  Groceries "), "Groceries".to_string());
        assert_eq!(parse_title(""), "Untitled".to_string());
        assert_eq!(parse_title(" \n "), "Untitled".to_string());
    }

    #[test]
    fn test_parse_context() {
        let context = |url: &str| NoteContext {
            url: url.to_string(),
            title: Some("Page".to_string()),
            favicon_uri: None,
        };

        let regular = context("https://www.example.com/");
        assert_eq!(Some(regular.clone()), parse_context(Some(regular)));

        assert_eq!(None, parse_context(Some(context("chrome://settings"))));
        assert_eq!(None, parse_context(Some(context("chrome-extension://abc/popup.html"))));
        assert_eq!(None, parse_context(Some(context("edge://newtab"))));
        assert_eq!(None, parse_context(Some(context("about:blank"))));
        assert_eq!(None, parse_context(Some(context(""))));
        assert_eq!(None, parse_context(None));
    }

    #[test]
    fn test_deserialize_nullable() {
        #[derive(Deserialize)]
        struct Values {
            #[serde(default, deserialize_with = "deserialize_nullable")]
            value: Option<Option<String>>,
        }

        let absent = serde_json::from_str::<Values>("{}").unwrap();
        assert_eq!(None, absent.value);

        let null = serde_json::from_str::<Values>(r#"{"value": null}"#).unwrap();
        assert_eq!(Some(None), null.value);

        let set = serde_json::from_str::<Values>(r#"{"value": "x"}"#).unwrap();
        assert_eq!(Some(Some("x".to_string())), set.value);
    }
}
