//! Descriptor (POM) resolution.
//!
//! A [`Descriptor`] lazily computes the effective build description of one coordinate: its
//! parent chain, property table, managed versions, active profiles and dependency set. Every
//! derived value is computed at most once per instance and cached for the instance's lifetime.
//! Parent and import descriptors are fetched through a [`Repository`] and owned by the
//! descriptor that requested them.
//!
//! A descriptor holds `OnceCell`s and is therefore not `Sync`; share one across threads only
//! behind external synchronization.

use crate::config::ResolverConfig;
use crate::coordinate::{Coordinate, DESCRIPTOR_TYPE};
use crate::document::{DocumentError, DocumentTree, Element};
use crate::range::VersionRange;
use crate::repository::{Repository, RepositoryError};
use crate::version::{ParseError, Version};
use regex::{Captures, Regex};
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Version spec used for dependencies that declare no version.
pub const DEFAULT_VERSION_SPEC: &str = "latest.release";

/// Scope used for dependencies that declare no scope.
pub const DEFAULT_SCOPE: &str = "compile";

/// Scope of bill-of-materials entries in `<dependencyManagement>`.
pub const IMPORT_SCOPE: &str = "import";

/// Scope of the edge created by `<distributionManagement><relocation>`.
pub const RELOCATION_SCOPE: &str = "relocation";

/// Upper bound on substitution passes in [`replace_properties`].
const MAX_SUBSTITUTION_PASSES: usize = 64;

/// Errors that can occur while resolving a descriptor.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("malformed descriptor for '{coordinate}': {source}")]
    Document {
        coordinate: String,
        #[source]
        source: DocumentError,
    },

    /// A required element is absent from the descriptor.
    #[error("descriptor '{coordinate}' is missing required field '{field}'")]
    MissingField {
        coordinate: String,
        field: &'static str,
    },

    /// No published version satisfies a version spec.
    #[error("no version of '{group_id}:{artifact_id}' satisfies '{spec}'")]
    MissingArtifact {
        group_id: String,
        artifact_id: String,
        spec: String,
    },

    /// A parent or import chain leads back to a descriptor already being resolved.
    #[error("circular descriptor reference: {cycle}")]
    CircularDescriptor { cycle: String },
}

/// Property name to raw value.
pub type Properties = BTreeMap<String, String>;

/// `(groupId, artifactId)` key of managed dependencies.
pub type ManagementKey = (String, String);

/// Managed dependencies by `(groupId, artifactId)`.
pub type DependencyManagement = BTreeMap<ManagementKey, ManagedDependency>;

/// Dependency edges grouped by scope.
pub type Dependencies = BTreeMap<String, BTreeSet<Edge>>;

/// A `<dependencyManagement>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedDependency {
    pub version: String,
    pub scope: Option<String>,
    pub optional: bool,
}

/// A dependency edge: target artifact, version spec, and whether it is required.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub required: bool,
}

impl Edge {
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            required,
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if !self.required {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(.*?)\}").expect("placeholder pattern is valid"))
}

/// Substitute `${key}` placeholders from `properties` until none remain or a pass changes
/// nothing.
///
/// Unknown keys are left as literal `${key}` text. If nothing was substituted the input is
/// returned verbatim; otherwise the result is whitespace-trimmed.
#[must_use]
pub fn replace_properties(text: &str, properties: &Properties) -> String {
    let pattern = placeholder_pattern();
    let mut current = text.to_string();

    for _ in 0..MAX_SUBSTITUTION_PASSES {
        if !pattern.is_match(&current) {
            break;
        }
        let next = pattern
            .replace_all(&current, |caps: &Captures<'_>| {
                properties
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }

    if current == text {
        text.to_string()
    } else {
        current.trim().to_string()
    }
}

fn is_alias(spec: &str) -> bool {
    ["latest", "release", "latest.release", "latest.integration"]
        .iter()
        .any(|alias| spec.eq_ignore_ascii_case(alias))
}

fn needs_listing(spec: &str) -> bool {
    is_alias(spec) || spec.contains(['[', ']', '(', ')', ','])
}

/// Choose a version for `spec` from candidates sorted newest-first.
///
/// `latest.release`/`release` pick the newest non-snapshot, `latest`/`latest.integration` the
/// newest of all, and anything else the newest contained in `spec` read as a version range.
///
/// # Errors
///
/// Returns an error if `spec` is not a valid version range.
pub fn pick_version(spec: &str, candidates: &[Version]) -> Result<Option<Version>, ParseError> {
    let spec = spec.trim();
    let picked = if spec.eq_ignore_ascii_case("latest.release") || spec.eq_ignore_ascii_case("release")
    {
        candidates.iter().find(|v| !v.is_snapshot())
    } else if spec.eq_ignore_ascii_case("latest") || spec.eq_ignore_ascii_case("latest.integration")
    {
        candidates.first()
    } else {
        VersionRange::parse(spec)?.select(candidates)
    };
    Ok(picked.cloned())
}

/// Pin a coordinate whose version is a range, an alias or absent to the newest matching
/// published version. A coordinate with a bare version is returned unchanged.
///
/// # Errors
///
/// Returns [`ResolveError::MissingArtifact`] when no published version satisfies the spec.
pub fn pin_coordinate(
    coordinate: &Coordinate,
    repository: &dyn Repository,
) -> Result<Coordinate, ResolveError> {
    let spec = coordinate
        .version()
        .map_or_else(|| DEFAULT_VERSION_SPEC.to_string(), ToString::to_string);
    if !needs_listing(&spec) {
        return Ok(coordinate.clone());
    }

    let missing = || ResolveError::MissingArtifact {
        group_id: coordinate.group_id().to_string(),
        artifact_id: coordinate.artifact_id().to_string(),
        spec: spec.clone(),
    };
    let candidates = match repository.list_versions(coordinate.group_id(), coordinate.artifact_id()) {
        Ok(candidates) => candidates,
        Err(RepositoryError::MissingPath { .. }) => return Err(missing()),
        Err(err) => return Err(err.into()),
    };
    let picked = pick_version(&spec, &candidates)?.ok_or_else(missing)?;
    debug!(%coordinate, version = %picked, "pinned coordinate");
    Ok(coordinate.with_version(picked))
}

/// Trimmed text of a child element, if present and non-empty.
fn child_text<'e>(element: &'e Element, path: &str) -> Option<&'e str> {
    element
        .find_text(path)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// The resolution state of one descriptor.
pub struct Descriptor<'r> {
    coordinate: Coordinate,
    text: Option<String>,
    repository: Option<&'r dyn Repository>,
    config: ResolverConfig,
    /// `group:artifact:version` keys of the descriptors that led here.
    lineage: Vec<String>,

    document: OnceCell<Element>,
    parent: OnceCell<Option<Box<Descriptor<'r>>>>,
    inherited_properties: OnceCell<Properties>,
    properties: OnceCell<Properties>,
    dependency_management: OnceCell<DependencyManagement>,
    active_profiles: OnceCell<Vec<usize>>,
    dependencies: OnceCell<Dependencies>,
}

impl<'r> Descriptor<'r> {
    /// Create a descriptor whose document is fetched from `repository`.
    #[must_use]
    pub fn new(coordinate: Coordinate, repository: &'r dyn Repository, config: ResolverConfig) -> Self {
        Self::build(coordinate, None, Some(repository), config, Vec::new())
    }

    /// Create a descriptor from already-fetched document text.
    ///
    /// `repository` is still used for parents, imports and version listings; without one,
    /// parents and imports resolve to synthesized documents.
    #[must_use]
    pub fn from_text(
        coordinate: Coordinate,
        text: impl Into<String>,
        repository: Option<&'r dyn Repository>,
        config: ResolverConfig,
    ) -> Self {
        Self::build(coordinate, Some(text.into()), repository, config, Vec::new())
    }

    fn build(
        coordinate: Coordinate,
        text: Option<String>,
        repository: Option<&'r dyn Repository>,
        config: ResolverConfig,
        lineage: Vec<String>,
    ) -> Self {
        Self {
            coordinate,
            text,
            repository,
            config,
            lineage,
            document: OnceCell::new(),
            parent: OnceCell::new(),
            inherited_properties: OnceCell::new(),
            properties: OnceCell::new(),
            dependency_management: OnceCell::new(),
            active_profiles: OnceCell::new(),
            dependencies: OnceCell::new(),
        }
    }

    /// Create a parent or import descriptor, refusing coordinates already in the lineage.
    fn child(&self, coordinate: Coordinate) -> Result<Self, ResolveError> {
        let key = coordinate.key();
        let mut lineage = self.lineage.clone();
        lineage.push(self.coordinate.key());
        if lineage.contains(&key) {
            lineage.push(key);
            return Err(ResolveError::CircularDescriptor {
                cycle: lineage.join(" -> "),
            });
        }
        Ok(Self::build(
            coordinate,
            None,
            self.repository,
            self.config.clone(),
            lineage,
        ))
    }

    #[must_use]
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn version_text(&self) -> String {
        self.coordinate
            .version()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// The parsed document, fetched on first use.
    ///
    /// A coordinate without a published descriptor gets a synthesized document carrying only
    /// its group, artifact and version.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or the descriptor is malformed.
    pub fn document(&self) -> Result<&Element, ResolveError> {
        if let Some(document) = self.document.get() {
            return Ok(document);
        }
        let document = self.load_document()?;
        Ok(self.document.get_or_init(|| document))
    }

    fn load_document(&self) -> Result<Element, ResolveError> {
        let parsed = match (&self.text, self.repository) {
            (Some(text), _) if !text.trim().is_empty() => Some(Element::parse(text)),
            (Some(_), _) | (None, None) => None,
            (None, Some(repository)) => {
                debug!(coordinate = %self.coordinate, "fetching descriptor");
                repository
                    .fetch_descriptor(&self.coordinate.descriptor())?
                    .filter(|bytes| !bytes.iter().all(u8::is_ascii_whitespace))
                    .map(|bytes| Element::parse_bytes(&bytes))
            }
        };

        match parsed {
            Some(result) => result.map_err(|source| ResolveError::Document {
                coordinate: self.coordinate.to_string(),
                source,
            }),
            None => {
                debug!(coordinate = %self.coordinate, "no descriptor, synthesizing one");
                Ok(Element::project(
                    self.coordinate.group_id(),
                    self.coordinate.artifact_id(),
                    &self.version_text(),
                ))
            }
        }
    }

    /// The parent descriptor declared by `<parent>`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent reference lacks a group, artifact or version, or if the
    /// parent chain is circular.
    pub fn parent(&self) -> Result<Option<&Descriptor<'r>>, ResolveError> {
        if let Some(parent) = self.parent.get() {
            return Ok(parent.as_deref());
        }
        let parent = self.load_parent()?.map(Box::new);
        Ok(self.parent.get_or_init(|| parent).as_deref())
    }

    fn load_parent(&self) -> Result<Option<Self>, ResolveError> {
        let Some(reference) = self.document()?.find("parent") else {
            return Ok(None);
        };
        let required = |path: &str, field: &'static str| {
            child_text(reference, path).ok_or_else(|| ResolveError::MissingField {
                coordinate: self.coordinate.to_string(),
                field,
            })
        };
        let group_id = required("groupId", "parent.groupId")?;
        let artifact_id = required("artifactId", "parent.artifactId")?;
        let version = Version::parse(required("version", "parent.version")?)?;

        let coordinate = Coordinate::new(group_id, artifact_id, DESCRIPTOR_TYPE, None)
            .with_version(version);
        debug!(coordinate = %self.coordinate, parent = %coordinate, "resolving parent");
        self.child(coordinate).map(Some)
    }

    /// Properties children inherit: parent table, built-ins, `<properties>`, prerequisites.
    fn inherited_properties(&self) -> Result<&Properties, ResolveError> {
        if let Some(properties) = self.inherited_properties.get() {
            return Ok(properties);
        }
        let properties = self.load_inherited_properties()?;
        Ok(self.inherited_properties.get_or_init(|| properties))
    }

    fn load_inherited_properties(&self) -> Result<Properties, ResolveError> {
        let parent = self.parent()?;
        let mut properties = match parent {
            Some(parent) => parent.inherited_properties()?.clone(),
            None => Properties::new(),
        };

        let own = [
            ("groupId", self.coordinate.group_id().to_string()),
            ("artifactId", self.coordinate.artifact_id().to_string()),
            ("version", self.version_text()),
        ];
        for (key, value) in own {
            properties.insert(format!("project.{key}"), value.clone());
            properties.insert(format!("pom.{key}"), value.clone());
            properties.insert(key.to_string(), value);
        }

        if let Some(parent) = parent {
            let coordinate = parent.coordinate();
            let inherited = [
                ("groupId", coordinate.group_id().to_string()),
                ("artifactId", coordinate.artifact_id().to_string()),
                ("version", parent.version_text()),
            ];
            for (key, value) in inherited {
                properties.insert(format!("project.parent.{key}"), value.clone());
                properties.insert(format!("parent.{key}"), value);
            }
        }

        let document = self.document()?;
        collect_properties(document, &mut properties);

        if let Some(prerequisites) = document.find("prerequisites") {
            for child in prerequisites.children() {
                let value = child.text().to_string();
                properties.insert(format!("project.prerequisites.{}", child.name()), value.clone());
                properties.insert(format!("prerequisites.{}", child.name()), value);
            }
        }

        Ok(properties)
    }

    /// The effective property table: inherited properties plus active profile properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or its parent chain cannot be resolved.
    pub fn properties(&self) -> Result<&Properties, ResolveError> {
        if let Some(properties) = self.properties.get() {
            return Ok(properties);
        }
        let mut properties = self.inherited_properties()?.clone();
        for profile in self.active_profiles()? {
            collect_properties(profile, &mut properties);
        }
        Ok(self.properties.get_or_init(|| properties))
    }

    /// Substitute `${...}` placeholders against the effective property table.
    ///
    /// # Errors
    ///
    /// Returns an error if the property table cannot be resolved.
    pub fn interpolate(&self, text: &str) -> Result<String, ResolveError> {
        Ok(replace_properties(text, self.properties()?))
    }

    /// Interpolated, trimmed text of a child element.
    fn field(&self, element: &Element, path: &str) -> Result<Option<String>, ResolveError> {
        match child_text(element, path) {
            Some(text) => Ok(Some(self.interpolate(text)?)),
            None => Ok(None),
        }
    }

    /// Profiles that apply to this descriptor, in declaration order.
    ///
    /// Profiles marked `activeByDefault` win as a group. Otherwise a profile is active when its
    /// `<activation><jdk>` constraint matches the configured target JDK.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be resolved.
    pub fn active_profiles(&self) -> Result<Vec<&Element>, ResolveError> {
        let profiles = self.document()?.find_all("profiles/profile");
        let indices = match self.active_profiles.get() {
            Some(indices) => indices,
            None => {
                let indices = self.select_profiles(&profiles);
                self.active_profiles.get_or_init(|| indices)
            }
        };
        Ok(indices
            .iter()
            .filter_map(|&index| profiles.get(index).copied())
            .collect())
    }

    fn select_profiles(&self, profiles: &[&Element]) -> Vec<usize> {
        let defaults: Vec<usize> = profiles
            .iter()
            .enumerate()
            .filter(|(_, profile)| {
                child_text(profile, "activation/activeByDefault")
                    .is_some_and(|value| value.eq_ignore_ascii_case("true"))
            })
            .map(|(index, _)| index)
            .collect();
        if !defaults.is_empty() {
            debug!(coordinate = %self.coordinate, count = defaults.len(), "default profiles active");
            return defaults;
        }

        profiles
            .iter()
            .enumerate()
            .filter(|(_, profile)| {
                child_text(profile, "activation/jdk").is_some_and(|spec| {
                    let id = child_text(profile, "id").unwrap_or("<unnamed>");
                    self.jdk_matches(id, spec)
                })
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn jdk_matches(&self, profile: &str, spec: &str) -> bool {
        let (negated, spec) = match spec.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, spec),
        };
        let mut spec = spec.to_string();
        if spec.starts_with(['[', '(']) && spec.ends_with(',') {
            spec.push(')');
        }

        let range = match VersionRange::parse(&spec) {
            Ok(range) => range,
            Err(err) => {
                warn!(coordinate = %self.coordinate, profile, error = %err, "ignoring profile with unparseable jdk activation");
                return false;
            }
        };
        let target = &self.config.target_jdk;
        let matched = match range.recommended() {
            Some(version) => version == target,
            None => range.contains(target),
        };
        debug!(coordinate = %self.coordinate, profile, matched = matched != negated, "jdk activation");
        matched != negated
    }

    /// Managed versions: parent table, then imports, then local entries, then active profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent chain or an imported descriptor cannot be resolved.
    pub fn dependency_management(&self) -> Result<&DependencyManagement, ResolveError> {
        if let Some(table) = self.dependency_management.get() {
            return Ok(table);
        }
        let table = self.load_dependency_management()?;
        Ok(self.dependency_management.get_or_init(|| table))
    }

    fn load_dependency_management(&self) -> Result<DependencyManagement, ResolveError> {
        let mut table = match self.parent()? {
            Some(parent) => parent.dependency_management()?.clone(),
            None => DependencyManagement::new(),
        };

        let mut blocks = vec![self.document()?];
        blocks.extend(self.active_profiles()?);

        for block in blocks {
            let entries = self.managed_entries(block)?;

            let mut imported = DependencyManagement::new();
            for ((group_id, artifact_id), entry) in &entries {
                if entry.scope.as_deref() != Some(IMPORT_SCOPE) {
                    continue;
                }
                let version = self.resolve_spec(group_id, artifact_id, &entry.version)?;
                let coordinate = Coordinate::new(group_id.as_str(), artifact_id.as_str(), DESCRIPTOR_TYPE, None)
                    .with_version(Version::parse(&version)?);
                debug!(coordinate = %self.coordinate, import = %coordinate, "importing managed dependencies");
                let bom = self.child(coordinate)?;
                imported.extend(bom.dependency_management()?.clone());
            }

            table.extend(imported);
            table.extend(entries);
        }

        Ok(table)
    }

    fn managed_entries(&self, block: &Element) -> Result<Vec<(ManagementKey, ManagedDependency)>, ResolveError> {
        let mut entries = Vec::new();
        for dependency in block.find_all("dependencyManagement/dependencies/dependency") {
            let group_id = self.field(dependency, "groupId")?;
            let artifact_id = self.field(dependency, "artifactId")?;
            let version = self.field(dependency, "version")?;
            let (Some(group_id), Some(artifact_id), Some(version)) = (group_id, artifact_id, version)
            else {
                warn!(
                    coordinate = %self.coordinate,
                    group_id = child_text(dependency, "groupId"),
                    artifact_id = child_text(dependency, "artifactId"),
                    "skipping managed dependency without groupId, artifactId or version"
                );
                continue;
            };
            let scope = self.field(dependency, "scope")?;
            let optional = self
                .field(dependency, "optional")?
                .is_some_and(|value| value.eq_ignore_ascii_case("true"));

            entries.push((
                (group_id, artifact_id),
                ManagedDependency {
                    version,
                    scope,
                    optional,
                },
            ));
        }
        Ok(entries)
    }

    /// Dependency edges by scope.
    ///
    /// Includes a `compile` edge to the parent, `import` edges for imported BOMs, direct
    /// dependencies with managed defaults applied, and a `relocation` edge when the descriptor
    /// is relocated. Active profiles contribute their own dependencies and relocations.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent chain or managed versions cannot be resolved.
    pub fn dependencies(&self) -> Result<&Dependencies, ResolveError> {
        if let Some(dependencies) = self.dependencies.get() {
            return Ok(dependencies);
        }
        let dependencies = self.load_dependencies()?;
        Ok(self.dependencies.get_or_init(|| dependencies))
    }

    fn load_dependencies(&self) -> Result<Dependencies, ResolveError> {
        let mut dependencies = Dependencies::new();
        let mut add = |scope: &str, edge: Edge| {
            dependencies.entry(scope.to_string()).or_default().insert(edge);
        };

        if let Some(parent) = self.parent()? {
            let coordinate = parent.coordinate();
            add(
                DEFAULT_SCOPE,
                Edge::new(coordinate.group_id(), coordinate.artifact_id(), parent.version_text(), true),
            );
        }

        let management = self.dependency_management()?;
        for ((group_id, artifact_id), entry) in management {
            if entry.scope.as_deref() == Some(IMPORT_SCOPE) {
                add(
                    IMPORT_SCOPE,
                    Edge::new(group_id.as_str(), artifact_id.as_str(), entry.version.as_str(), !entry.optional),
                );
            }
        }

        let mut blocks = vec![self.document()?];
        blocks.extend(self.active_profiles()?);

        for block in blocks {
            for dependency in block.find_all("dependencies/dependency") {
                let group_id = self.field(dependency, "groupId")?;
                let artifact_id = self.field(dependency, "artifactId")?;
                let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
                    warn!(
                        coordinate = %self.coordinate,
                        group_id = child_text(dependency, "groupId"),
                        artifact_id = child_text(dependency, "artifactId"),
                        "skipping dependency without groupId or artifactId"
                    );
                    continue;
                };
                let managed = management.get(&(group_id.clone(), artifact_id.clone()));

                let version = match self.field(dependency, "version")? {
                    Some(version) => version,
                    None => managed
                        .map_or(DEFAULT_VERSION_SPEC, |m| m.version.as_str())
                        .to_string(),
                };
                let scope = match self.field(dependency, "scope")? {
                    Some(scope) => scope,
                    None => managed
                        .and_then(|m| m.scope.as_deref())
                        .unwrap_or(DEFAULT_SCOPE)
                        .to_string(),
                };
                let optional = match self.field(dependency, "optional")? {
                    Some(value) => value.eq_ignore_ascii_case("true"),
                    None => managed.is_some_and(|m| m.optional),
                };

                add(&scope, Edge::new(group_id, artifact_id, version, !optional));
            }

            if let Some(relocation) = block.find("distributionManagement/relocation") {
                let group_id = self
                    .field(relocation, "groupId")?
                    .unwrap_or_else(|| self.coordinate.group_id().to_string());
                let artifact_id = self
                    .field(relocation, "artifactId")?
                    .unwrap_or_else(|| self.coordinate.artifact_id().to_string());
                let version = self
                    .field(relocation, "version")?
                    .unwrap_or_else(|| self.version_text());
                debug!(coordinate = %self.coordinate, %group_id, %artifact_id, %version, "relocated");
                add(RELOCATION_SCOPE, Edge::new(group_id, artifact_id, version, true));
            }
        }

        Ok(dependencies)
    }

    /// Resolve a version spec to a concrete version string.
    ///
    /// Ranges and aliases are resolved against the repository listing; bare versions pass
    /// through unchanged.
    fn resolve_spec(&self, group_id: &str, artifact_id: &str, spec: &str) -> Result<String, ResolveError> {
        if !needs_listing(spec) {
            return Ok(spec.to_string());
        }
        let missing = || ResolveError::MissingArtifact {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            spec: spec.to_string(),
        };
        let Some(repository) = self.repository else {
            return Err(missing());
        };
        let candidates = repository.list_versions(group_id, artifact_id)?;
        let picked = pick_version(spec, &candidates)?.ok_or_else(missing)?;
        debug!(%group_id, %artifact_id, %spec, version = %picked, "picked version");
        Ok(picked.to_string())
    }

    /// [`Self::dependencies`] with every range or alias replaced by a concrete version.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingArtifact`] when no published version satisfies a spec.
    pub fn resolved_dependencies(&self) -> Result<Dependencies, ResolveError> {
        let mut resolved = Dependencies::new();
        for (scope, edges) in self.dependencies()? {
            let set = resolved.entry(scope.clone()).or_default();
            for edge in edges {
                let version = self.resolve_spec(&edge.group_id, &edge.artifact_id, &edge.version)?;
                set.insert(Edge {
                    version,
                    ..edge.clone()
                });
            }
        }
        Ok(resolved)
    }

    /// Every dependency edge, across all scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependency set cannot be resolved.
    pub fn all_dependencies(&self) -> Result<BTreeSet<Edge>, ResolveError> {
        Ok(self.dependencies()?.values().flatten().cloned().collect())
    }

    /// Required edges needed to build the artifact: `compile`, `import` and `relocation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependency set cannot be resolved.
    pub fn build_dependencies(&self) -> Result<BTreeSet<Edge>, ResolveError> {
        let dependencies = self.dependencies()?;
        Ok([DEFAULT_SCOPE, IMPORT_SCOPE, RELOCATION_SCOPE]
            .iter()
            .filter_map(|scope| dependencies.get(*scope))
            .flatten()
            .filter(|edge| edge.required)
            .cloned()
            .collect())
    }
}

/// Read a `<properties>` block: `<property name=".." value=".."/>` or `<key>value</key>`.
fn collect_properties(element: &Element, properties: &mut Properties) {
    let Some(block) = element.find("properties") else {
        return;
    };
    for child in block.children() {
        if child.name() == "property" {
            if let Some(name) = child.attribute("name") {
                let value = child.attribute("value").unwrap_or_default();
                properties.insert(name.to_string(), value.to_string());
                continue;
            }
        }
        properties.insert(child.name().to_string(), child.text().to_string());
    }
}

impl std::fmt::Debug for Descriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("coordinate", &self.coordinate.to_string())
            .field("lineage", &self.lineage)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
