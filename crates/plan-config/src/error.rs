//! Errors raised while loading or validating plansync settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or environment value could not be read into [`PlanConfig`](crate::PlanConfig).
    #[error("failed to load plansync configuration: {0}")]
    Figment(#[from] figment::Error),

    /// `github.repository` is empty after every layer has been merged.
    #[error(
        "no GitHub repository configured; set GITHUB_REPOSITORY, PLANSYNC_GITHUB__REPOSITORY or github.repository"
    )]
    MissingRepository,

    /// `github.repository` is not `owner/name`.
    #[error("github.repository must be 'owner/name', got '{value}'")]
    InvalidRepository { value: String },
}
