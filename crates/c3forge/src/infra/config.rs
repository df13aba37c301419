use std::fmt;

/// Environment variable holding the oracle credential.
pub const API_KEY_ENV: &str = "API_KEY";
/// Environment variable overriding the oracle model.
pub const MODEL_ENV: &str = "C3FORGE_MODEL";
/// Environment variable overriding the Gemini CLI executable.
pub const GEMINI_BIN_ENV: &str = "C3FORGE_GEMINI_BIN";

const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
const DEFAULT_GEMINI_BIN: &str = "gemini";

/// Configuration lookup failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` is not set")]
    MissingVariable(&'static str),
}

/// Settings consumed by the oracle transport.
///
/// A missing credential is not a startup error; it surfaces as an oracle
/// failure the first time a request is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct OracleConfig {
    api_key: Option<String>,
    /// Provider model identifier.
    pub model: String,
    /// Executable used to reach the provider.
    pub program: String,
}

impl OracleConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, treating blank values as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            api_key: read(API_KEY_ENV),
            model: read(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            program: read(GEMINI_BIN_ENV).unwrap_or_else(|| DEFAULT_GEMINI_BIN.to_string()),
        }
    }

    /// Returns the credential.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingVariable`] when no credential was
    /// configured.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingVariable(API_KEY_ENV))
    }
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("program", &self.program)
            .finish()
    }
}
