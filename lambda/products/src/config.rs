//! Function configuration read from the Lambda environment.

/// Name of the table holding the products.
const TABLE_VAR: &str = "PRODUCTS_TABLE";
/// Optional region override; the SDK's default chain is used otherwise.
const REGION_VAR: &str = "PRODUCTS_TABLE_REGION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub table_name: String,
    pub region: Option<String>,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTable`] when `PRODUCTS_TABLE` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = lookup(TABLE_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingTable(TABLE_VAR))?;

        let region = lookup(REGION_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self { table_name, region })
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("{0} not set")]
    MissingTable(&'static str),
}
