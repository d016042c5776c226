use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use repository::GroupRepository;
use service::GroupService;

use crate::{account, contact, state::AppState};

mod handler;
pub mod model;
pub mod mutation;
pub mod repository;
pub mod resolver;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn GroupRepository + Send + Sync>;
pub type Service = Arc<dyn GroupService + Send + Sync>;

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn random() -> Self {
        Self(mongodb::bson::oid::ObjectId::new().to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
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
        .route("/groups", get(handler::api::list))
        .route("/groups", post(handler::api::create))
        .route("/groups/{id}/contacts", post(handler::api::add_contacts))
        .route("/groups/{id}/participants/me", delete(handler::api::leave))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("group not found: {0:?}")]
    NotFound(Id),
    #[error("not a participant of group {0:?}")]
    NotMember(Id),
    #[error("group name is required")]
    MissingName,
    #[error("malformed group document {0:?}: missing {1}")]
    MalformedDocument(Id, &'static str),

    #[error(transparent)]
    _Account(#[from] account::Error),
    #[error(transparent)]
    _Contact(#[from] contact::Error),
    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NotMember(_) => StatusCode::FORBIDDEN,
            Error::MissingName => StatusCode::BAD_REQUEST,
            Error::_Account(e) => e.into(),
            Error::_Contact(e) => e.into(),
            Error::MalformedDocument(..) | Error::_MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
