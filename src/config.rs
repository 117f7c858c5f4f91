use axum::http::HeaderName;
use std::env;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Header names the identity provider uses to pass the caller along.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user: HeaderName,
    pub email: HeaderName,
    pub image: HeaderName,
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            user: HeaderName::from_static("x-user-id"),
            email: HeaderName::from_static("x-user-email"),
            image: HeaderName::from_static("x-user-image"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub static_dir: Option<PathBuf>,
    pub identity_headers: IdentityHeaders,
}

impl Config {
    /// Reads the configuration from the process environment, after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let static_dir = lookup("STATIC_DIR").map(PathBuf::from);

        let defaults = IdentityHeaders::default();
        let identity_headers = IdentityHeaders {
            user: header_name(&lookup, "IDENTITY_USER_HEADER", defaults.user)?,
            email: header_name(&lookup, "IDENTITY_EMAIL_HEADER", defaults.email)?,
            image: header_name(&lookup, "IDENTITY_IMAGE_HEADER", defaults.image)?,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            static_dir,
            identity_headers,
        })
    }
}

fn header_name(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: HeaderName,
) -> Result<HeaderName, ConfigError> {
    match lookup(name) {
        Some(raw) => HeaderName::from_bytes(raw.as_bytes()).map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/reunion")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.max_connections, 5);
        assert!(config.static_dir.is_none());
        assert_eq!(config.identity_headers.user, "x-user-id");
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(config_from(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn rejects_invalid_values() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/reunion"),
            ("DB_MAX_CONNECTIONS", "lots"),
        ]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. })));

        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/reunion"),
            ("IDENTITY_USER_HEADER", "not a header"),
        ]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: "IDENTITY_USER_HEADER", .. })));
    }

    #[test]
    fn overrides_identity_headers() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/reunion"),
            ("IDENTITY_USER_HEADER", "x-clerk-user"),
        ])
        .unwrap();
        assert_eq!(config.identity_headers.user, "x-clerk-user");
        assert_eq!(config.identity_headers.email, "x-user-email");
    }
}
