//! Image resource store: objects live under `profile/` or `groupPic/` plus a
//! lowercase key and are served over plain HTTP.

use std::fmt::Display;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Serialize;

use super::Result;
use crate::group;

#[derive(Clone)]
pub struct Config {
    base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:9000/carpool"),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn env() -> Result<Self> {
        Ok(Self::new(super::var("STORAGE_BASE_URL")?))
    }

    pub fn connect(&self) -> Result<HttpImageStore> {
        Ok(HttpImageStore {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            http: super::init_http_client()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Profile(String),
    Group(group::Id),
}

impl ImageKey {
    pub fn profile(email: &str) -> Self {
        Self::Profile(email.to_owned())
    }

    pub fn path(&self) -> String {
        match self {
            ImageKey::Profile(email) => format!("profile/{}", email.trim().to_lowercase()),
            ImageKey::Group(id) => format!("groupPic/{}", id.as_str().to_lowercase()),
        }
    }
}

impl Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// A resolved image reference. Failing to resolve is never an error, the
/// client renders its bundled placeholder instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Picture {
    Url(String),
    Placeholder,
}

#[async_trait]
pub trait ImageStore {
    async fn resolve(&self, key: &ImageKey) -> Picture;
}

/// Checks objects with an unsigned `HEAD` request against `STORAGE_BASE_URL`
/// and hands that same URL to clients. The bucket must allow anonymous reads:
/// a private bucket answers 401/403 for every key, so every picture falls
/// back to the placeholder.
pub struct HttpImageStore {
    base_url: String,
    http: reqwest::Client,
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn resolve(&self, key: &ImageKey) -> Picture {
        let url = format!("{}/{}", self.base_url, key.path());

        match self.http.head(&url).send().await {
            Ok(res) => picture_at(key, url, res.status()),
            Err(e) => {
                warn!("failed to resolve image {key}: {e:?}");
                Picture::Placeholder
            }
        }
    }
}

fn picture_at(key: &ImageKey, url: String, status: StatusCode) -> Picture {
    match status {
        s if s.is_success() => Picture::Url(url),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!("image store denied anonymous read of {key}: {status}");
            Picture::Placeholder
        }
        _ => {
            debug!("no image at {key}: {status}");
            Picture::Placeholder
        }
    }
}
