//! Maven dependency metadata for Quarry.
//!
//! This crate provides:
//! - Maven version parsing and ordering, version ranges and restrictions
//! - Artifact coordinates and repository layout paths
//! - Descriptor (POM) resolution: parents, properties, managed versions, profiles, dependencies
//! - Local and HTTP repository backends
//! - Settings file support (`quarry.toml`)

mod config;
mod coordinate;
mod document;
mod metadata;
mod pom;
mod range;
mod repository;
mod version;

pub use config::{
    ConfigError, RepositorySettings, ResolverConfig, Settings, DEFAULT_TARGET_JDK, MAVEN_CENTRAL,
    SETTINGS_FILE,
};
pub use coordinate::{Coordinate, DEFAULT_TYPE, DESCRIPTOR_TYPE};
pub use document::{DocumentError, DocumentTree, Element};
pub use metadata::{MavenMetadata, LOCAL_METADATA_FILE, METADATA_FILE};
pub use pom::{
    pick_version, pin_coordinate, replace_properties, Dependencies, DependencyManagement,
    Descriptor, Edge, ManagedDependency, ManagementKey, Properties, ResolveError, DEFAULT_SCOPE,
    DEFAULT_VERSION_SPEC, IMPORT_SCOPE, RELOCATION_SCOPE,
};
pub use range::{Restriction, VersionRange};
pub use repository::{
    HttpRepository, LocalRepository, MavenClient, Repository, RepositoryConfig, RepositoryError,
};
pub use version::{ParseError, Version};
