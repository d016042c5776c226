use axum::http::StatusCode;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::account;
use crate::integration::IdpConfig;

pub mod middleware;

type Result<T> = std::result::Result<T, Error>;

/// The authenticated caller. Passed explicitly into every operation that acts
/// on behalf of someone.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    account_id: account::Id,
}

impl Session {
    pub fn new(account_id: impl Into<account::Id>) -> Self {
        Self {
            account_id: account_id.into(),
        }
    }

    pub const fn account_id(&self) -> &account::Id {
        &self.account_id
    }

    pub fn is(&self, id: &account::Id) -> bool {
        self.account_id.eq(id)
    }
}

#[derive(Deserialize)]
struct TokenClaims {
    sub: account::Id,
}

pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(cfg: &IdpConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = cfg.issuer() {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(cfg.secret().as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<Session> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation)?;
        Ok(Session::new(data.claims.sub))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing bearer token")]
    Unauthorized,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl From<&Error> for StatusCode {
    fn from(_: &Error) -> Self {
        StatusCode::UNAUTHORIZED
    }
}
