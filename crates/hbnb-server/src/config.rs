use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";
/// One year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `:memory:` keeps everything in RAM.
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// Admin seeded at startup when both are set.
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("HBNB_PORT", "5000")
            .parse()
            .context("HBNB_PORT must be a port number")?;
        let token_ttl_secs: i64 = var("HBNB_TOKEN_TTL_SECS", "3600")
            .parse()
            .context("HBNB_TOKEN_TTL_SECS must be a number of seconds")?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            anyhow::bail!("HBNB_TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}");
        }

        let admin = match (lookup("HBNB_ADMIN_EMAIL"), lookup("HBNB_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            host: var("HBNB_HOST", "0.0.0.0"),
            port,
            db_path: var("HBNB_DB_PATH", "hbnb.db"),
            jwt_secret: var("HBNB_JWT_SECRET", DEFAULT_JWT_SECRET),
            token_ttl_secs,
            admin,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}
