use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

pub const DEFAULT_WS_URL: &str = "wss://globedx.com/api/v1/ws";
pub const DEFAULT_REST_URL: &str = "https://globedx.com";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = "globe-client/0.1";

/// API credentials for authenticated channels and private REST endpoints
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub passphrase: Secret<String>,
    /// Base64-encoded HMAC secret
    pub secret: Secret<String>,
}

// Never expose secrets in serialization
impl Serialize for Credentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Credentials", 3)?;
        state.serialize_field("api_key", &self.api_key)?;
        state.serialize_field("passphrase", "[REDACTED]")?;
        state.serialize_field("secret", "[REDACTED]")?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CredentialsHelper {
            api_key: String,
            passphrase: String,
            secret: String,
        }

        let helper = CredentialsHelper::deserialize(deserializer)?;
        Ok(Self::new(helper.api_key, helper.passphrase, helper.secret))
    }
}

impl Credentials {
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        passphrase: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            passphrase: Secret::new(passphrase.into()),
            secret: Secret::new(secret.into()),
        }
    }

    /// Load credentials from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `GLOBE_API_KEY`)
    /// - `{PREFIX}_PASSPHRASE`
    /// - `{PREFIX}_SECRET`
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key = required_var(&format!("{}_API_KEY", prefix))?;
        let passphrase = required_var(&format!("{}_PASSPHRASE", prefix))?;
        let secret = required_var(&format!("{}_SECRET", prefix))?;

        Ok(Self::new(api_key, passphrase, secret))
    }

    /// Load credentials from a `.env` file and then the environment
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Same as [`Credentials::from_env_file`] with a custom file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        load_env_file(env_file_path)?;
        Self::from_env(prefix)
    }

    /// Whether all three parts are present
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty()
            && !self.passphrase.expose_secret().is_empty()
            && !self.secret.expose_secret().is_empty()
    }

    /// Get passphrase (use carefully - exposes secret)
    pub fn passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }

    /// Get the base64 secret (use carefully - exposes secret)
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// Client configuration: endpoints, handshake timeout and optional credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobeConfig {
    pub credentials: Option<Credentials>,
    pub ws_url: String,
    pub rest_url: String,
    pub connect_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            ws_url: DEFAULT_WS_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GlobeConfig {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::default()
        }
    }

    /// Configuration for public channels and endpoints only
    #[must_use]
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Build a configuration from environment variables
    ///
    /// Credentials are picked up when all of `{PREFIX}_API_KEY`,
    /// `{PREFIX}_PASSPHRASE` and `{PREFIX}_SECRET` are set; otherwise the
    /// configuration is read-only. `{PREFIX}_WS_URL` and `{PREFIX}_REST_URL`
    /// override the default endpoints.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix_upper = prefix.to_uppercase();
        let credentials = match Credentials::from_env(prefix) {
            Ok(credentials) => Some(credentials),
            Err(ConfigError::MissingEnvironmentVariable(_)) => None,
            Err(e) => return Err(e),
        };

        let mut config = Self {
            credentials,
            ..Self::default()
        };

        if let Ok(ws_url) = env::var(format!("{}_WS_URL", prefix_upper)) {
            config = config.ws_url(ws_url);
        }
        if let Ok(rest_url) = env::var(format!("{}_REST_URL", prefix_upper)) {
            config = config.rest_url(rest_url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a `.env` file, then build the configuration from the environment
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        load_env_file(".env")?;
        Self::from_env(prefix)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidConfiguration(format!(
                "WebSocket URL must use ws:// or wss://: {}",
                self.ws_url
            )));
        }
        if !(self.rest_url.starts_with("http://") || self.rest_url.starts_with("https://")) {
            return Err(ConfigError::InvalidConfiguration(format!(
                "REST URL must use http:// or https://: {}",
                self.rest_url
            )));
        }
        Ok(())
    }

    /// Check if this configuration has credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.as_ref().is_some_and(Credentials::is_complete)
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into();
        self
    }

    #[must_use]
    pub fn rest_url(mut self, rest_url: impl Into<String>) -> Self {
        self.rest_url = rest_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvironmentVariable(name.to_string()))
}

#[cfg(feature = "env-file")]
fn load_env_file(env_file_path: &str) -> Result<(), ConfigError> {
    match dotenv::from_path(env_file_path) {
        Ok(()) => Ok(()),
        // A missing file is fine, the process environment still applies
        Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::InvalidConfiguration(format!(
            "Failed to load .env file '{}': {}",
            env_file_path, e
        ))),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
