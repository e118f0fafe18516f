//! Artifact coordinates.
//!
//! A coordinate has the form `group:artifact[:type[:classifier]]:version`, where the version
//! field may be any [`VersionRange`] specification.

use crate::range::VersionRange;
use crate::version::{ParseError, Version};
use std::fmt;

/// Packaging type used when a coordinate omits it.
pub const DEFAULT_TYPE: &str = "jar";

/// Packaging type of descriptor documents.
pub const DESCRIPTOR_TYPE: &str = "pom";

/// Identity of an artifact, or of a family of artifacts when the version is a range.
///
/// Ordering is lexicographic over group, artifact, type, classifier and version. A missing
/// classifier sorts before any classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    packaging: String,
    classifier: Option<String>,
    version: Option<VersionRange>,
}

impl Coordinate {
    /// Parse a colon-separated coordinate with two to five fields.
    ///
    /// # Errors
    ///
    /// Fails on the wrong number of fields, empty ids, or an invalid version specification.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let error = |reason: &str| ParseError::Artifact {
            coordinate: text.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = text.trim().split(':').map(str::trim).collect();
        let (group_id, artifact_id, packaging, classifier, version) = match parts.as_slice() {
            [group, artifact] => (*group, *artifact, None, None, None),
            [group, artifact, version] => (*group, *artifact, None, None, Some(*version)),
            [group, artifact, packaging, version] => {
                (*group, *artifact, Some(*packaging), None, Some(*version))
            }
            [group, artifact, packaging, classifier, version] => (
                *group,
                *artifact,
                Some(*packaging),
                Some(*classifier),
                Some(*version),
            ),
            _ => return Err(error("expected group:artifact[:type[:classifier]]:version")),
        };

        if group_id.is_empty() {
            return Err(error("group id cannot be empty"));
        }
        if artifact_id.is_empty() {
            return Err(error("artifact id cannot be empty"));
        }

        let version = match version {
            Some(spec) => Some(VersionRange::parse(spec).map_err(|err| error(&err.to_string()))?),
            None => None,
        };

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            packaging: packaging
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_TYPE)
                .to_string(),
            classifier: classifier.filter(|c| !c.is_empty()).map(str::to_string),
            version,
        })
    }

    /// Build a coordinate from parts.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        packaging: impl Into<String>,
        version: Option<VersionRange>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            packaging: packaging.into(),
            classifier: None,
            version,
        }
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    #[must_use]
    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&VersionRange> {
        self.version.as_ref()
    }

    /// The concrete version, when the version field is a bare version.
    #[must_use]
    pub fn concrete_version(&self) -> Option<&Version> {
        self.version.as_ref().and_then(VersionRange::recommended)
    }

    /// The descriptor coordinate for this artifact: same identity, type `pom`, no classifier.
    #[must_use]
    pub fn descriptor(&self) -> Self {
        Self {
            packaging: DESCRIPTOR_TYPE.to_string(),
            classifier: None,
            ..self.clone()
        }
    }

    /// The same coordinate pinned to a concrete version.
    #[must_use]
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version: Some(VersionRange::from(version)),
            ..self.clone()
        }
    }

    /// `group:artifact:version` identity used to detect descriptor cycles.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.version {
            Some(version) => format!("{}:{}:{}", self.group_id, self.artifact_id, version),
            None => format!("{}:{}", self.group_id, self.artifact_id),
        }
    }

    /// Repository-relative path, e.g. `/org/example/lib/1.0/lib-1.0.jar`.
    ///
    /// Without a concrete version only the artifact directory is returned.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = format!(
            "/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id
        );
        if let Some(version) = self.concrete_version() {
            path.push_str(&format!("/{version}/{}-{version}", self.artifact_id));
            if let Some(classifier) = &self.classifier {
                path.push('-');
                path.push_str(classifier);
            }
            path.push('.');
            path.push_str(&self.packaging);
        }
        path
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        let Some(version) = &self.version else {
            return Ok(());
        };
        write!(f, ":{}", self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{version}")
    }
}

impl std::str::FromStr for Coordinate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(text: &str) -> Coordinate {
        Coordinate::parse(text).unwrap()
    }

    #[test]
    fn test_parse_arity() {
        let c = coord("foo:bar");
        assert_eq!(c.group_id(), "foo");
        assert_eq!(c.artifact_id(), "bar");
        assert_eq!(c.packaging(), "jar");
        assert!(c.classifier().is_none());
        assert!(c.version().is_none());

        let c = coord("foo:bar:1.0");
        assert_eq!(c.concrete_version(), Some(&Version::parse("1.0").unwrap()));

        let c = coord("foo:bar:pom:1.0");
        assert_eq!(c.packaging(), "pom");

        let c = coord("foo:bar:jar:sources:[1.0,2.0)");
        assert_eq!(c.classifier(), Some("sources"));
        assert!(c.concrete_version().is_none());
        assert_eq!(c.version().unwrap().to_string(), "[1.0,2.0)");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for text in ["foo", "a:b:c:d:e:f", ":bar:1.0", "foo::1.0", "foo:bar:[1.0"] {
            let err = Coordinate::parse(text).unwrap_err();
            assert!(matches!(err, ParseError::Artifact { .. }), "{text}: {err}");
        }
    }

    #[test]
    fn test_path() {
        assert_eq!(
            coord("foo.bar:baz:pkg:sources:1").path(),
            "/foo/bar/baz/1/baz-1-sources.pkg"
        );
        assert_eq!(coord("foo.bar:baz:1.0").path(), "/foo/bar/baz/1.0/baz-1.0.jar");
        assert_eq!(coord("foo.bar:baz").path(), "/foo/bar/baz");
        assert_eq!(coord("foo.bar:baz:[1.0,)").path(), "/foo/bar/baz");
    }

    #[test]
    fn test_display() {
        assert_eq!(coord("foo:bar").to_string(), "foo:bar");
        assert_eq!(coord("foo:bar:1.0").to_string(), "foo:bar:jar:1.0");
        assert_eq!(
            coord("foo:bar:war:tests:[1.0,2.0)").to_string(),
            "foo:bar:war:tests:[1.0,2.0)"
        );
    }

    #[test]
    fn test_ordering() {
        let mut coords = vec![
            coord("b:a:1"),
            coord("a:b:1"),
            coord("a:a:jar:sources:1"),
            coord("a:a:jar:1"),
            coord("a:a:jar:2"),
            coord("a:a:pom:1"),
            coord("a:a"),
        ];
        coords.sort();
        let rendered: Vec<String> = coords.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "a:a",
                "a:a:jar:1",
                "a:a:jar:2",
                "a:a:jar:sources:1",
                "a:a:pom:1",
                "a:b:jar:1",
                "b:a:jar:1",
            ]
        );
    }

    #[test]
    fn test_ordering_uses_version_semantics() {
        assert!(coord("a:a:1.0-SNAPSHOT") < coord("a:a:1.0"));
        assert!(coord("a:a:1.9") < coord("a:a:1.10"));
        assert_eq!(coord("a:a:1.0"), coord("a:a:1"));
    }

    #[test]
    fn test_descriptor_and_key() {
        let c = coord("foo:bar:jar:sources:1.0");
        let d = c.descriptor();
        assert_eq!(d.packaging(), "pom");
        assert!(d.classifier().is_none());
        assert_eq!(d.key(), "foo:bar:1.0");
        assert_eq!(coord("foo:bar").with_version(Version::parse("2").unwrap()).key(), "foo:bar:2");
    }
}
