use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Token used as `Authorization: Bearer` against the contents API
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    /// Target repository as `owner/repo`
    pub const NOTES_REPO: &str = "NOTES_REPO";
    pub const NOTES_BRANCH: &str = "NOTES_BRANCH";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    /// Base URL of the rendered site, e.g. "https://acme.github.io/notes"
    pub const NOTES_SITE_URL: &str = "NOTES_SITE_URL";
    pub const HTTP_TIMEOUT_SECS: &str = "NOTES_HTTP_TIMEOUT_SECS";
    pub const PORT: &str = "RESEARCH_NOTES_PORT";
}

/// Default values
pub mod defaults {
    pub const BRANCH: &str = "main";
    pub const GITHUB_API_URL: &str = "https://api.github.com";
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    pub const PORT: u16 = 9110;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub api_url: String,
    pub site_url: Option<String>,
    pub http_timeout: Duration,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = get(env_vars::GITHUB_TOKEN).ok_or(ConfigError::Missing(env_vars::GITHUB_TOKEN))?;
        let repo_value = get(env_vars::NOTES_REPO).ok_or(ConfigError::Missing(env_vars::NOTES_REPO))?;
        let (owner, repo) = parse_repo(&repo_value)?;

        let http_timeout = match get(env_vars::HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: env_vars::HTTP_TIMEOUT_SECS,
                    reason: format!("'{}' is not a number of seconds", raw),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
        };

        let port = match get(env_vars::PORT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: env_vars::PORT,
                reason: format!("'{}' is not a valid port", raw),
            })?,
            None => defaults::PORT,
        };

        Ok(Self {
            token,
            owner,
            repo,
            branch: get(env_vars::NOTES_BRANCH).unwrap_or_else(|| defaults::BRANCH.to_string()),
            api_url: get(env_vars::GITHUB_API_URL)
                .unwrap_or_else(|| defaults::GITHUB_API_URL.to_string()),
            site_url: get(env_vars::NOTES_SITE_URL),
            http_timeout,
            port,
        })
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn parse_repo(value: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: env_vars::NOTES_REPO,
        reason: format!("expected owner/repo, got '{}'", value),
    };

    let (owner, repo) = value.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
