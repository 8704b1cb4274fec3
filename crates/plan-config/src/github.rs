//! GitHub tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default REST endpoint for github.com.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// API token sent as a bearer credential. Usually the CI-provided `GITHUB_TOKEN`.
    #[serde(default)]
    pub token: String,

    /// Target repository as `owner/name`.
    #[serde(default)]
    pub repository: String,

    /// REST API base URL (GitHub Enterprise installs override this).
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            repository: String::new(),
            api_url: default_api_url(),
        }
    }
}

impl GitHubConfig {
    /// Check if the repository and token are both set.
    pub fn is_configured(&self) -> bool {
        !self.repository.is_empty() && !self.token.is_empty()
    }

    /// Split `repository` into `(owner, name)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRepository`] when no repository is set and
    /// [`ConfigError::InvalidRepository`] when it is not of the form `owner/name`.
    pub fn owner_and_name(&self) -> Result<(&str, &str), ConfigError> {
        if self.repository.is_empty() {
            return Err(ConfigError::MissingRepository);
        }

        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(ConfigError::InvalidRepository {
                value: self.repository.clone(),
            }),
        }
    }
}
