use std::time::Duration;

use super::Result;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    db: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 27017,
            db: String::from("carpool"),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = super::var("MONGO_HOST")?;
        let port = super::parse_var("MONGO_PORT")?;
        let db = super::var("MONGO_DB")?;
        Ok(Self { host, port, db })
    }

    pub fn connect(&self) -> Result<mongodb::Database> {
        let options = mongodb::options::ClientOptions::builder()
            .hosts(vec![mongodb::options::ServerAddress::Tcp {
                host: self.host.clone(),
                port: Some(self.port),
            }])
            .server_selection_timeout(Some(Duration::from_secs(2)))
            .connect_timeout(Some(Duration::from_secs(5)))
            .build();

        let db = mongodb::Client::with_options(options).map(|client| client.database(&self.db))?;

        Ok(db)
    }
}
