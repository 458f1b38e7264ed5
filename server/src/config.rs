//! Server configuration, read from the environment.
//!
//! - `HOST`: interface to bind (default `127.0.0.1`)
//! - `PORT`: TCP port (default `3000`)
//! - `DATABASE_URL`: SQLite URL (default `sqlite://todos.db`; use
//!   `sqlite::memory:` for a throwaway database)

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://todos.db".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
