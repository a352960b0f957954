use thiserror::Error;

pub const ENV_REGION: &str = "AMAZON_REGION";
pub const ENV_TABLE: &str = "AMAZON_DYNAMODB_TABLE";
pub const ENV_API_KEY: &str = "API_KEY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Settings read once at cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    pub table: String,
    /// Expected caller key. `None` means every request is rejected.
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |k: &'static str| {
            lookup(k)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(k))
        };

        let region = required(ENV_REGION)?;
        let table = required(ENV_TABLE)?;
        let api_key = lookup(ENV_API_KEY).filter(|v| !v.is_empty());
        if api_key.is_none() {
            tracing::warn!("{ENV_API_KEY} environment variable is not set");
        }

        Ok(Self {
            region,
            table,
            api_key,
        })
    }
}
