//! Repository `maven-metadata.xml` index documents.

use crate::document::{DocumentError, DocumentTree, Element};
use crate::version::Version;

/// File name of the per-artifact index in remote repositories.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// File name of the per-artifact index written by local installs.
pub const LOCAL_METADATA_FILE: &str = "maven-metadata-local.xml";

/// Parsed artifact index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    /// Newest published version, snapshots included.
    pub latest: Option<String>,
    /// Newest published release.
    pub release: Option<String>,
    /// Published versions in file order.
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
}

impl MavenMetadata {
    /// Parse an index document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a well-formed document.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc = Element::parse_bytes(bytes)?;
        let text = |path: &str| {
            doc.find_text(path)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            group_id: text("groupId"),
            artifact_id: text("artifactId"),
            latest: text("versioning/latest"),
            release: text("versioning/release"),
            versions: doc
                .find_all("versioning/versions/version")
                .into_iter()
                .map(Element::text)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect(),
            last_updated: text("versioning/lastUpdated"),
        })
    }

    /// Listed versions parsed and sorted newest-first, duplicates removed.
    #[must_use]
    pub fn sorted_versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = self
            .versions
            .iter()
            .filter_map(|text| Version::parse(text).ok())
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        versions.dedup();
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
        <metadata>
          <groupId>org.example</groupId>
          <artifactId>demo</artifactId>
          <versioning>
            <latest>1.3.0-SNAPSHOT</latest>
            <release>1.2.2</release>
            <versions>
              <version>1.0.0</version>
              <version>1.2.2</version>
              <version>1.10.0-rc1</version>
              <version>1.3.0-SNAPSHOT</version>
            </versions>
            <lastUpdated>20240101010101</lastUpdated>
          </versioning>
        </metadata>
    ";

    #[test]
    fn test_parse_metadata() {
        let metadata = MavenMetadata::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(metadata.group_id.as_deref(), Some("org.example"));
        assert_eq!(metadata.artifact_id.as_deref(), Some("demo"));
        assert_eq!(metadata.latest.as_deref(), Some("1.3.0-SNAPSHOT"));
        assert_eq!(metadata.release.as_deref(), Some("1.2.2"));
        assert_eq!(metadata.versions.len(), 4);
        assert_eq!(metadata.last_updated.as_deref(), Some("20240101010101"));
    }

    #[test]
    fn test_sorted_versions_newest_first() {
        let metadata = MavenMetadata::parse(SAMPLE.as_bytes()).unwrap();
        let sorted: Vec<String> = metadata
            .sorted_versions()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(sorted, vec!["1.10.0-rc1", "1.3.0-SNAPSHOT", "1.2.2", "1.0.0"]);
    }

    #[test]
    fn test_empty_versioning() {
        let metadata = MavenMetadata::parse(b"<metadata><groupId>g</groupId></metadata>").unwrap();
        assert!(metadata.versions.is_empty());
        assert!(metadata.release.is_none());
    }
}
