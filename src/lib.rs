use axum::{Router, middleware::from_fn_with_state};

use state::AppState;

pub mod account;
pub mod auth;
pub mod contact;
mod error;
pub mod group;
pub mod integration;
pub mod phone;
pub mod ride;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Every route requires a bearer token and sits under `/api`.
pub fn app(s: AppState) -> Router {
    let api = Router::new()
        .merge(account::api(s.clone()))
        .merge(group::api(s.clone()))
        .merge(ride::api(s.clone()))
        .merge(contact::api(s.clone()))
        .route_layer(from_fn_with_state(s, auth::middleware::authorize));

    Router::new().nest("/api", api)
}
