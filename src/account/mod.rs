use std::fmt::Display;
use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use repository::AccountRepository;
use service::AccountService;

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn AccountRepository + Send + Sync>;
pub type Service = Arc<dyn AccountService + Send + Sync>;

/// Externally issued by the identity provider.
#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Id> for mongodb::bson::Bson {
    fn from(id: Id) -> Self {
        mongodb::bson::Bson::String(id.0)
    }
}

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/me", get(handler::api::profile))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("account not found: {0:?}")]
    NotFound(Id),
    #[error("malformed account document {0:?}: missing {1}")]
    MalformedDocument(Id, &'static str),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MalformedDocument(..) | Error::_MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
