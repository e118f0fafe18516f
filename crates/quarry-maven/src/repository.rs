//! Artifact repositories.
//!
//! This module provides:
//! - The [`Repository`] capability the descriptor engine fetches through
//! - A directory-layout backend ([`LocalRepository`])
//! - An HTTP backend ([`HttpRepository`])
//! - [`MavenClient`], which consults several repositories in order

use crate::config::Settings;
use crate::coordinate::Coordinate;
use crate::document::DocumentError;
use crate::metadata::{MavenMetadata, LOCAL_METADATA_FILE, METADATA_FILE};
use crate::version::Version;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during repository operations.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Network error during fetch.
    #[error("network error: {0}")]
    Network(String),

    /// The requested artifact directory does not exist.
    #[error("missing path '{path}'")]
    MissingPath { path: String },

    /// A repository URL cannot be served by any backend.
    #[error("invalid repository '{url}': {reason}")]
    InvalidRepository { url: String, reason: String },

    /// A repository index document is malformed.
    #[error("invalid repository metadata: {0}")]
    Metadata(#[from] DocumentError),
}

/// Source of descriptors and version listings.
pub trait Repository {
    /// Fetch the raw descriptor for a coordinate. `Ok(None)` means not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError>;

    /// List the published versions of an artifact, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingPath`] if the artifact is unknown.
    fn list_versions(&self, group_id: &str, artifact_id: &str)
        -> Result<Vec<Version>, RepositoryError>;

    /// Fetch the raw `maven-metadata.xml` index of an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn fetch_metadata(
        &self,
        _group_id: &str,
        _artifact_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(None)
    }
}

/// Relative directory of an artifact, e.g. `org/example/demo`.
fn artifact_dir(group_id: &str, artifact_id: &str) -> String {
    format!("{}/{}", group_id.replace('.', "/"), artifact_id)
}

fn sort_newest_first(versions: &mut Vec<Version>) {
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup();
}

/// Configuration for HTTP repositories.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("quarry/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(60),
        }
    }
}

/// A repository laid out on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Create a repository rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, RepositoryError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Repository for LocalRepository {
    fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        if coordinate.concrete_version().is_none() {
            return Ok(None);
        }
        let path = self.resolve(&coordinate.descriptor().path());
        debug!(path = %path.display(), "reading descriptor");
        Self::read_optional(&path)
    }

    fn list_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<Version>, RepositoryError> {
        let dir = self.resolve(&artifact_dir(group_id, artifact_id));
        if !dir.is_dir() {
            return Err(RepositoryError::MissingPath {
                path: dir.display().to_string(),
            });
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(version) = Version::parse(name) {
                    versions.push(version);
                }
            }
        }
        sort_newest_first(&mut versions);
        Ok(versions)
    }

    fn fetch_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        let dir = self.resolve(&artifact_dir(group_id, artifact_id));
        for file in [METADATA_FILE, LOCAL_METADATA_FILE] {
            if let Some(bytes) = Self::read_optional(&dir.join(file))? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

/// A remote repository served over HTTP.
pub struct HttpRepository {
    base_url: String,
    http_client: reqwest::blocking::Client,
}

impl HttpRepository {
    /// Create a repository client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a repository-relative path. A 404 is `Ok(None)`.
    fn download(&self, relative: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        let url = format!("{}/{}", self.base_url, relative.trim_start_matches('/'));
        debug!(%url, "fetching");

        let response = self
            .http_client
            .get(&url)
            .send()
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RepositoryError::Network(format!(
                "GET {url} failed with status {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| Some(b.to_vec()))
            .map_err(|e| RepositoryError::Network(e.to_string()))
    }
}

impl Repository for HttpRepository {
    fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        if coordinate.concrete_version().is_none() {
            return Ok(None);
        }
        self.download(&coordinate.descriptor().path())
    }

    fn list_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<Version>, RepositoryError> {
        let Some(bytes) = self.fetch_metadata(group_id, artifact_id)? else {
            return Err(RepositoryError::MissingPath {
                path: format!("{}/{}", self.base_url, artifact_dir(group_id, artifact_id)),
            });
        };
        Ok(MavenMetadata::parse(&bytes)?.sorted_versions())
    }

    fn fetch_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        self.download(&format!(
            "{}/{METADATA_FILE}",
            artifact_dir(group_id, artifact_id)
        ))
    }
}

/// An ordered set of repositories consulted as one.
#[derive(Default)]
pub struct MavenClient {
    repositories: Vec<Box<dyn Repository>>,
}

impl MavenClient {
    /// Create a client with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client from the repositories listed in settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository URL is not supported.
    pub fn from_settings(settings: &Settings) -> Result<Self, RepositoryError> {
        Self::from_urls(settings.repository_urls(), &settings.repository_config())
    }

    /// Build a client from repository URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository URL is not supported.
    pub fn from_urls<'a>(
        urls: impl IntoIterator<Item = &'a str>,
        config: &RepositoryConfig,
    ) -> Result<Self, RepositoryError> {
        let mut client = Self::new();
        for url in urls {
            client.push(Self::open(url, config)?);
        }
        Ok(client)
    }

    /// Open a single repository by URL or filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error for URLs with an unsupported scheme.
    pub fn open(url: &str, config: &RepositoryConfig) -> Result<Box<dyn Repository>, RepositoryError> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Box::new(HttpRepository::new(url, config)?));
        }
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Box::new(LocalRepository::new(path)));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            return Err(RepositoryError::InvalidRepository {
                url: url.to_string(),
                reason: format!("unsupported scheme '{scheme}'"),
            });
        }
        Ok(Box::new(LocalRepository::new(url)))
    }

    /// Append a repository to the lookup order.
    pub fn push(&mut self, repository: Box<dyn Repository>) {
        self.repositories.push(repository);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

impl Repository for MavenClient {
    fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        for repository in &self.repositories {
            if let Some(bytes) = repository.fetch_descriptor(coordinate)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }

    fn list_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<Version>, RepositoryError> {
        let mut versions = Vec::new();
        let mut found = false;
        for repository in &self.repositories {
            match repository.list_versions(group_id, artifact_id) {
                Ok(listed) => {
                    found = true;
                    versions.extend(listed);
                }
                Err(RepositoryError::MissingPath { path }) => {
                    debug!(%path, "artifact not in repository");
                }
                Err(e) => return Err(e),
            }
        }
        if !found {
            return Err(RepositoryError::MissingPath {
                path: artifact_dir(group_id, artifact_id),
            });
        }
        sort_newest_first(&mut versions);
        Ok(versions)
    }

    fn fetch_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        for repository in &self.repositories {
            if let Some(bytes) = repository.fetch_metadata(group_id, artifact_id)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}
