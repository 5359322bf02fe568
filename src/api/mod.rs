//! HTTP API
//!
//! Routes for the collection store, the shopping list and the patient queue.
//! All state is injected through [`AppState`], so tests can build isolated
//! routers over fresh stores.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::BasicAuth;
use crate::patients::PatientQueue;
use crate::shopping::ShoppingList;
use crate::store::CollectionStore;

pub mod collections;
pub mod error;
pub mod middleware;
pub mod patients;
pub mod shopping;

pub use error::{ApiError, ErrorResponse};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub collections: Arc<CollectionStore>,
    pub shopping: Arc<ShoppingList>,
    pub patients: Arc<PatientQueue>,
    /// `None` leaves every route open
    pub auth: Option<Arc<BasicAuth>>,
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/collections/{name}",
            put(collections::register_collection)
                .get(collections::list_items)
                .post(collections::create_item),
        )
        .route(
            "/collections/{name}/schema",
            get(collections::describe_collection),
        )
        .route(
            "/collections/{name}/{id}",
            put(collections::update_item).delete(collections::delete_item),
        )
        .route(
            "/items",
            get(shopping::list_items).post(shopping::append_item),
        )
        .route(
            "/items/{index}",
            put(shopping::replace_item)
                .patch(shopping::patch_item)
                .delete(shopping::remove_item),
        )
        .route("/patients/do-admiss", post(patients::admit_patient))
        .layer(from_fn_with_state(state.clone(), middleware::basic_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
