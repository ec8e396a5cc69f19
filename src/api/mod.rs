//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use request::Form;
pub use request::PathParameters;
pub use request::deserialize_nullable;
pub use request::parse_context;
pub use request::parse_title;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod notes;
mod request;
mod response;
mod transfer;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let notes = Router::new()
        .route("/", get(notes::list::<S>).post(notes::create::<S>))
        .route(
            "/{note}",
            get(notes::single::<S>)
                .patch(notes::update::<S>)
                .delete(notes::delete::<S>),
        )
        .route("/{note}/pin", post(notes::toggle_pin::<S>))
        .route("/{note}/clipboard", get(notes::clipboard::<S>));

    Router::new()
        .nest("/notes", notes)
        .route("/export/{format}", get(transfer::export::<S>))
        .route("/import", post(transfer::import::<S>))
}
