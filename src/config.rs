use anyhow::Context;

/// Which `UserStore` the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let store = match var("USER_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("unknown USER_STORE {other:?} (expected postgres or memory)"),
        };

        let database_url = var("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when USER_STORE=postgres");
        }

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("parse DATABASE_MAX_CONNECTIONS")?,
            None => 10,
        };
        let port = match var("APP_PORT") {
            Some(v) => v.parse().context("parse APP_PORT")?,
            None => 8080,
        };

        Ok(Self {
            store,
            database_url,
            max_connections,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let cfg = parse(&[("DATABASE_URL", "postgres://localhost/users")]).unwrap();
        assert_eq!(cfg.store, StoreBackend::Postgres);
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = parse(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn memory_store_needs_no_database() {
        let cfg = parse(&[("USER_STORE", "memory"), ("APP_PORT", "3000")]).unwrap();
        assert_eq!(cfg.store, StoreBackend::Memory);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&[("USER_STORE", "redis")]).is_err());
        assert!(parse(&[("USER_STORE", "memory"), ("APP_PORT", "http")]).is_err());
        assert!(parse(&[
            ("DATABASE_URL", "postgres://localhost/users"),
            ("DATABASE_MAX_CONNECTIONS", "-1"),
        ])
        .is_err());
    }
}
