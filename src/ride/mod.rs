use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use repository::RideRepository;
use service::RideService;

use crate::{group, state::AppState};

pub mod feed;
mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn RideRepository + Send + Sync>;
pub type Service = Arc<dyn RideService + Send + Sync>;

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn random() -> Self {
        Self(mongodb::bson::oid::ObjectId::new().to_hex())
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
        .route("/feed", get(handler::api::feed))
        .route("/rides", post(handler::api::publish))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("ride source is required")]
    MissingSource,
    #[error("ride destination is required")]
    MissingDestination,
    #[error("ride cost must be a non-negative number, got {0}")]
    InvalidCost(f64),
    #[error("malformed ride document {0:?}: missing {1}")]
    MalformedDocument(Id, &'static str),
    #[error("feed load aborted")]
    Aborted,

    #[error(transparent)]
    _Group(#[from] group::Error),
    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::MissingSource | Error::MissingDestination | Error::InvalidCost(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Aborted => StatusCode::SERVICE_UNAVAILABLE,
            Error::_Group(e) => e.into(),
            Error::MalformedDocument(..) | Error::_MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
