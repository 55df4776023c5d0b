/// Relay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3008`).
    pub port: u16,
    /// Face-swap client id; used as the decryption IV.
    pub client_id: String,
    /// Face-swap client secret; used as the decryption key.
    pub client_secret: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var         | Default   |
    /// |-----------------|-----------|
    /// | `HOST`          | `0.0.0.0` |
    /// | `PORT`          | `3008`    |
    /// | `CLIENT_ID`     | required  |
    /// | `CLIENT_SECRET` | required  |
    /// | `CORS_ORIGINS`  | `*`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port_raw = lookup("PORT").unwrap_or_else(|| "3008".into());
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;

        let client_id = lookup("CLIENT_ID")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("CLIENT_ID"))?;
        let client_secret = lookup("CLIENT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("CLIENT_SECRET"))?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            client_id,
            client_secret,
            cors_origins,
        })
    }

    /// `true` when any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "0123456789abcdef"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3008);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn explicit_origins() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn credentials_are_required() {
        let err = RelayConfig::from_lookup(lookup(&[("CLIENT_ID", "id")])).unwrap_err();
        assert_matches!(err, ConfigError::Missing("CLIENT_SECRET"));

        let err = RelayConfig::from_lookup(lookup(&[("CLIENT_SECRET", "s")])).unwrap_err();
        assert_matches!(err, ConfigError::Missing("CLIENT_ID"));
    }

    #[test]
    fn bad_port() {
        let err = RelayConfig::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "s"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::InvalidPort(p) if p == "http");
    }
}
