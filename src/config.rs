use std::str::FromStr;

use anyhow::Context;

/// Argon2 cost settings used when hashing new passwords.
#[derive(Debug, Clone)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub realm: String,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let hash = HashConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", 19 * 1024)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", 2)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", 1)?,
        };
        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            realm: lookup("AUTH_REALM").unwrap_or_else(|| "personal-blog".into()),
            hash,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .expect("config should load");
        assert_eq!(cfg.database_url, "postgres://x");
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.realm, "personal-blog");
        assert_eq!(cfg.hash.memory_kib, 19 * 1024);
        assert_eq!(cfg.hash.iterations, 2);
        assert_eq!(cfg.hash.parallelism, 1);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("APP_PORT", "3000"),
            ("AUTH_REALM", "blog"),
            ("ARGON2_ITERATIONS", " 3 "),
        ]))
        .expect("config should load");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.realm, "blog");
        assert_eq!(cfg.hash.iterations, 3);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
