/// Runtime settings resolved from command-line flags and the environment
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::iam;

/// Environment variable holding the IBM Cloud API key
pub const API_KEY_ENV: &str = "IBMCLOUD_API_KEY";

/// Environment variable overriding the host CLI plugin directory
pub const PLUGIN_HOME_ENV: &str = "IBMCLOUD_HOME";

/// Resolved inputs for a token request
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub api_key: String,
    pub iam_endpoint: String,
}

impl TokenConfig {
    /// Resolve the API key and endpoint, flag first, environment second
    pub fn resolve(api_key: Option<String>, iam_endpoint: Option<String>) -> Result<Self> {
        let api_key = api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "API key not found. Pass --api-key or set {}",
                    API_KEY_ENV
                ))
            })?;

        let iam_endpoint =
            iam_endpoint.unwrap_or_else(|| iam::DEFAULT_IAM_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            iam_endpoint,
        })
    }
}

/// Resolve the plugin home directory, flag first, environment second
pub fn resolve_plugin_home(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var(PLUGIN_HOME_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}
