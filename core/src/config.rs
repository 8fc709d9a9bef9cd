//! Manager options and their validation.
//!
//! Options are checked once, when a manager is built. A manager that exists
//! always holds a usable base URL.

use serde_json::Value;

use crate::error::ConfigError;

/// Options shared by every manager: where the API lives and which headers
/// go on each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
}

impl ManagerOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Check the invariants a manager relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidBaseUrl);
        }
        Ok(())
    }

    /// Read options from an untyped JSON document of the form
    /// `{"baseUrl": "...", "headers": {"name": "value"}}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or(ConfigError::MissingOptions)?;

        let base_url = match object.get("baseUrl") {
            None | Some(Value::Null) => return Err(ConfigError::MissingBaseUrl),
            Some(Value::String(url)) if !url.is_empty() => url.clone(),
            Some(_) => return Err(ConfigError::InvalidBaseUrl),
        };

        let headers = match object.get("headers") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, value)| match value {
                    Value::String(v) => Ok((name.clone(), v.clone())),
                    other => Err(ConfigError::InvalidHeaders(format!(
                        "header {name} must be a string, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ConfigError::InvalidHeaders(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        Ok(Self { base_url, headers })
    }

    /// Read options from the environment.
    ///
    /// Environment variables:
    /// - `MGMT_API_BASE_URL`: base URL of the API (required)
    /// - `MGMT_API_HEADERS`: extra headers as `name:value` pairs separated by `;`
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("MGMT_API_BASE_URL")
            .map_err(|e| ConfigError::Env(format!("MGMT_API_BASE_URL: {e}")))?;
        let headers = match std::env::var("MGMT_API_HEADERS") {
            Ok(raw) => parse_header_list(&raw)?,
            Err(_) => Vec::new(),
        };
        let options = Self { base_url, headers };
        options.validate()?;
        Ok(options)
    }
}

fn parse_header_list(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, value) = entry.split_once(':').ok_or_else(|| {
                ConfigError::Env(format!("invalid MGMT_API_HEADERS entry: {entry}"))
            })?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
