//! Resolver configuration and the `quarry.toml` settings file.

use crate::repository::RepositoryConfig;
use crate::version::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default settings file name.
pub const SETTINGS_FILE: &str = "quarry.toml";

/// Maven Central, the repository every settings file falls back to.
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// JDK version profiles are activated against unless configured otherwise.
pub const DEFAULT_TARGET_JDK: &str = "1.8";

/// Errors that can occur when loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Options that shape descriptor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Version matched against `<activation><jdk>` profile constraints.
    pub target_jdk: Version,
}

impl ResolverConfig {
    /// Create a configuration targeting the given JDK version.
    #[must_use]
    pub fn new(target_jdk: Version) -> Self {
        Self { target_jdk }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            target_jdk: default_target_jdk(),
        }
    }
}

fn default_target_jdk() -> Version {
    Version::from_known(DEFAULT_TARGET_JDK)
}

/// One `[[repository]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySettings {
    /// `http://`, `https://`, `file://` URL or a filesystem path.
    pub url: String,
}

/// The complete quarry.toml settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Target JDK for profile activation.
    #[serde(default = "default_jdk")]
    pub jdk: String,

    /// User agent for HTTP repositories.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Repositories, consulted in order.
    #[serde(default = "default_repositories", rename = "repository")]
    pub repositories: Vec<RepositorySettings>,
}

fn default_jdk() -> String {
    DEFAULT_TARGET_JDK.to_string()
}

fn default_repositories() -> Vec<RepositorySettings> {
    let mut repositories = Vec::new();
    if let Some(local) = local_repository_dir() {
        repositories.push(RepositorySettings {
            url: local.display().to_string(),
        });
    }
    repositories.push(RepositorySettings {
        url: MAVEN_CENTRAL.to_string(),
    });
    repositories
}

/// The conventional local repository, `~/.m2/repository`.
fn local_repository_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(|home| PathBuf::from(home).join(".m2").join("repository"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jdk: default_jdk(),
            user_agent: None,
            timeout_secs: None,
            repositories: default_repositories(),
        }
    }
}

impl Settings {
    /// Load settings from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Version::parse(&self.jdk).map_err(|e| ConfigError::Invalid {
            field: "jdk",
            reason: e.to_string(),
        })?;

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "timeout must be positive".to_string(),
            });
        }

        if let Some(repo) = self.repositories.iter().find(|r| r.url.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "repository.url",
                reason: format!("empty url '{}'", repo.url),
            });
        }

        Ok(())
    }

    /// Resolver options derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `jdk` is not a valid version.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        let target_jdk = Version::parse(&self.jdk).map_err(|e| ConfigError::Invalid {
            field: "jdk",
            reason: e.to_string(),
        })?;
        Ok(ResolverConfig::new(target_jdk))
    }

    /// HTTP options derived from these settings.
    #[must_use]
    pub fn repository_config(&self) -> RepositoryConfig {
        let mut config = RepositoryConfig::default();
        if let Some(user_agent) = &self.user_agent {
            config.user_agent.clone_from(user_agent);
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout = std::time::Duration::from_secs(timeout);
        }
        config
    }

    /// Repository URLs in lookup order.
    pub fn repository_urls(&self) -> impl Iterator<Item = &str> {
        self.repositories.iter().map(|r| r.url.as_str())
    }
}
