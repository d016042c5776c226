use std::fmt::Display;
use std::time::Duration;

use log::error;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Result;
use crate::account;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = super::var("REDIS_HOST")?;
        let port = super::parse_var("REDIS_PORT")?;
        let ttl = super::parse_var("ACCOUNT_CACHE_TTL")
            .map(Duration::from_secs)
            .unwrap_or(Config::default().ttl);
        Ok(Self { host, port, ttl })
    }

    pub async fn connect(&self) -> Result<Redis> {
        let con = redis::Client::open(format!("redis://{}:{}", self.host, self.port))?
            .get_connection_manager()
            .await?;

        Ok(Redis { con, ttl: self.ttl })
    }
}

#[derive(Clone, Debug)]
pub enum Key<'a> {
    Account(&'a account::Id),
}

impl Display for Key<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Account(id) => write!(f, "account:{id}"),
        }
    }
}

impl redis::ToRedisArgs for Key<'_> {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + redis::RedisWrite,
    {
        self.to_string().write_redis_args(out);
    }
}

#[derive(Clone)]
pub struct Redis {
    con: redis::aio::ConnectionManager,
    ttl: Duration,
}

impl Redis {
    pub async fn json_get<T: DeserializeOwned>(&self, key: Key<'_>) -> Option<T> {
        let mut con = self.con.clone();
        let raw: Option<String> = match con.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to read {key} from cache: {e:?}");
                return None;
            }
        };

        raw.and_then(|r| match serde_json::from_str(&r) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("failed to parse cached {key}: {e:?}");
                None
            }
        })
    }

    pub async fn json_set_ex<T: Serialize>(&self, key: Key<'_>, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to serialize {key}: {e:?}");
                return;
            }
        };

        let mut con = self.con.clone();
        let res: redis::RedisResult<()> = con.set_ex(&key, raw, self.ttl.as_secs()).await;
        if let Err(e) = res {
            error!("failed to cache {key}: {e:?}");
        }
    }

    pub async fn del(&self, key: Key<'_>) {
        let mut con = self.con.clone();
        let res: redis::RedisResult<()> = con.del(&key).await;
        if let Err(e) = res {
            error!("failed to evict {key}: {e:?}");
        }
    }
}
