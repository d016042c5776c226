use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, error};
use serde_json::json;

use crate::{account, auth, contact, group, integration, ride};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _Account(#[from] account::Error),
    #[error(transparent)]
    _Group(#[from] group::Error),
    #[error(transparent)]
    _Ride(#[from] ride::Error),
    #[error(transparent)]
    _Contact(#[from] contact::Error),

    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Io(#[from] std::io::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::_Auth(e) => e.into(),
            Error::_Account(e) => e.into(),
            Error::_Group(e) => e.into(),
            Error::_Ride(e) => e.into(),
            Error::_Contact(e) => e.into(),
            Error::_Integration(_) | Error::_Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Backend failures are never described to the client.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);

        let message = if status.is_server_error() {
            error!("{self:?}");
            String::from("Something went wrong")
        } else {
            debug!("{self}");
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
