//! Client configuration.
//!
//! A `ClientConfig` is built once and handed to `BlogApiClient::new`; the
//! client never mutates it and nothing is read from shared globals.

use serde::Deserialize;

/// Address of the hosted blog backend.
pub const DEFAULT_BASE_URL: &str =
    "https://mi-linux.wlv.ac.uk/~2315822/blog-platform-backend/public/api";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Send the session cookie jar with every request, not only with the
    /// operations that always require it (login, add comment).
    pub with_credentials: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            with_credentials: true,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    /// Layer defaults, an optional config file at `path` and `BLOG_API__*`
    /// environment variables (e.g. `BLOG_API__BASE_URL`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("with_credentials", defaults.with_credentials)?;
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix("BLOG_API")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if loaded.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "base_url must not be empty".to_string(),
            ));
        }
        Ok(Self::new(&loaded.base_url).with_credentials(loaded.with_credentials))
    }
}
