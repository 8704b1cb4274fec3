//! # plan-config
//!
//! Layered configuration loading for plansync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PLANSYNC_*` prefix, `__` as separator)
//! 2. CI-provided `GITHUB_TOKEN`, `GITHUB_REPOSITORY`, `GITHUB_API_URL`
//! 3. An explicit `--config` file
//! 4. Project-level `.plansync/config.toml`
//! 5. User-level `~/.config/plansync/config.toml`
//! 6. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PLANSYNC_GITHUB__REPOSITORY` -> `github.repository`,
//! `PLANSYNC_SYNC__LABEL_PREFIX` -> `sync.label_prefix`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use plan_config::PlanConfig;
//!
//! let config = PlanConfig::load_with_dotenv(None).expect("config");
//! if config.github.is_configured() {
//!     println!("syncing into {}", config.github.repository);
//! }
//! ```

mod error;
mod github;
mod sync;

pub use error::ConfigError;
pub use github::{DEFAULT_API_URL, GitHubConfig};
pub use sync::{DEFAULT_LEDGER_PATH, SyncConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CI environment variables and the config keys they populate.
const CI_ENV_KEYS: [(&str, &str); 3] = [
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_REPOSITORY", "github.repository"),
    ("GITHUB_API_URL", "github.api_url"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl PlanConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be read or a value
    /// has the wrong type.
    pub fn load(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(extra_file).extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// A missing `.env` is not an error.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(extra_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment(extra_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".plansync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit file (the CLI checks that it exists)
        if let Some(path) = extra_file {
            figment = figment.merge(Toml::file_exact(path));
        }

        // Layer 4: Values injected by the CI host
        figment = figment.merge(Self::ci_env());

        // Layer 5: Environment variables (highest priority)
        figment.merge(Env::prefixed("PLANSYNC_").split("__"))
    }

    fn ci_env() -> Env {
        Env::raw()
            .filter(|key| {
                CI_ENV_KEYS
                    .iter()
                    .any(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
            })
            .map(|key| {
                CI_ENV_KEYS
                    .iter()
                    .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
                    .map_or_else(|| key.as_str().to_string(), |(_, target)| (*target).to_string())
                    .into()
            })
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plansync").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = PlanConfig::default();
        assert!(!config.github.is_configured());
        assert!(!config.sync.dry_run);
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: PlanConfig = PlanConfig::figment(None).extract()?;
            assert_eq!(config.sync.ledger_path, DEFAULT_LEDGER_PATH);
            assert!(config.sync.label_prefix.is_empty());
            Ok(())
        });
    }
}
