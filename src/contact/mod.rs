use std::fmt::Display;
use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use service::ContactService;

use crate::{account, state::AppState};

mod handler;
pub mod matcher;
pub mod model;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn ContactService + Send + Sync>;

/// Address-book entry id as reported by the device.
#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(transparent)]
pub struct Id(String);

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

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/contacts/match", post(handler::api::match_contacts))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("contact {0:?} has no phone number")]
    MissingPhone(Id),

    #[error(transparent)]
    _Account(#[from] account::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::MissingPhone(_) => StatusCode::BAD_REQUEST,
            Error::_Account(e) => e.into(),
        }
    }
}
