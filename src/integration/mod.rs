use std::env;
use std::fs::File;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use dotenv::dotenv;
use log::{LevelFilter, warn};
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

pub mod cache;
pub mod db;
pub mod storage;

type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidEnv(&'static str, String),
    #[error("failed to initialize logger: {0}")]
    Logger(String),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
    #[error(transparent)]
    _Redis(#[from] redis::RedisError),
    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    _Io(#[from] std::io::Error),
}

pub(crate) fn var(key: &'static str) -> Result<String> {
    env::var(key).map_err(|_| Error::MissingEnv(key))
}

pub(crate) fn parse_var<T: FromStr>(key: &'static str) -> Result<T> {
    let raw = var(key)?;
    raw.parse().map_err(|_| Error::InvalidEnv(key, raw))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Env::Local => SocketAddr::from(([127, 0, 0, 1], 8000)),
            Env::Dev | Env::Stage | Env::Production => SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }

    pub fn allow_origin(&self) -> Result<AllowOrigin> {
        match self {
            Env::Local | Env::Dev => Ok(AllowOrigin::any()),
            Env::Stage | Env::Production => {
                let origins = var("ALLOW_ORIGIN")?
                    .split(',')
                    .map(|o| {
                        HeaderValue::from_str(o.trim())
                            .map_err(|_| Error::InvalidEnv("ALLOW_ORIGIN", o.to_owned()))
                    })
                    .collect::<Result<Vec<HeaderValue>>>()?;
                Ok(AllowOrigin::list(origins))
            }
        }
    }

    pub fn allow_methods(&self) -> AllowMethods {
        AllowMethods::any()
    }

    pub fn allow_headers(&self) -> AllowHeaders {
        AllowHeaders::any()
    }
}

impl FromStr for Env {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "stg" => Ok(Env::Stage),
            "prod" => Ok(Env::Production),
            other => Err(Error::InvalidEnv("ENV", other.to_owned())),
        }
    }
}

#[derive(Clone)]
pub struct IdpConfig {
    secret: String,
    issuer: Option<String>,
}

impl IdpConfig {
    pub fn new(secret: impl Into<String>, issuer: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer,
        }
    }

    pub fn env() -> Result<Self> {
        Ok(Self {
            secret: var("JWT_SECRET")?,
            issuer: var("JWT_ISSUER").ok(),
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,

    pub mongo: db::Config,
    pub redis: cache::Config,
    pub storage: storage::Config,

    pub idp: IdpConfig,
}

impl Config {
    pub fn env() -> Result<Self> {
        dotenv().ok();

        let env = match var("ENV") {
            Ok(e) => e.parse()?,
            Err(_) => Env::Local,
        };

        Ok(Self {
            env,
            mongo: db::Config::env().unwrap_or_else(|e| {
                warn!("MongoDB env is not configured ({e}), using defaults");
                db::Config::default()
            }),
            redis: cache::Config::env().unwrap_or_else(|e| {
                warn!("Redis env is not configured ({e}), using defaults");
                cache::Config::default()
            }),
            storage: storage::Config::env().unwrap_or_else(|e| {
                warn!("Storage env is not configured ({e}), using defaults");
                storage::Config::default()
            }),
            idp: IdpConfig::env()?,
        })
    }
}

pub fn init_logger() -> Result<()> {
    let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
    let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
    let log_file = env::var("SERVICE_NAME")
        .map(|pkg| format!("{pkg}.log"))
        .unwrap_or("service.log".into());

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level, simplelog::Config::default(), File::create(log_file)?),
    ])
    .map_err(|e| Error::Logger(e.to_string()))
}

pub fn init_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(5))
        .build()?;

    Ok(client)
}
