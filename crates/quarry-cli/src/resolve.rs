//! Implementation of the `quarry resolve`, `properties`, `compare` and `path` commands.

use anyhow::{Context, Result};
use quarry_maven::{
    pin_coordinate, Coordinate, Dependencies, Descriptor, MavenClient, Properties,
    RepositorySettings, Settings, Version, SETTINGS_FILE,
};
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where descriptors come from.
#[derive(Debug, Default)]
pub struct SourceOptions {
    /// Explicit settings file.
    pub settings: Option<PathBuf>,
    /// Repositories replacing the configured ones.
    pub repositories: Vec<String>,
    /// Target JDK override.
    pub jdk: Option<String>,
}

impl SourceOptions {
    /// Load settings and apply command-line overrides.
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_path(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None if Path::new(SETTINGS_FILE).is_file() => Settings::from_path(SETTINGS_FILE)
                .with_context(|| format!("failed to load {SETTINGS_FILE}"))?,
            None => Settings::default(),
        };

        if !self.repositories.is_empty() {
            settings.repositories = self
                .repositories
                .iter()
                .map(|url| RepositorySettings { url: url.clone() })
                .collect();
        }
        if let Some(jdk) = &self.jdk {
            settings.jdk.clone_from(jdk);
        }
        Ok(settings)
    }
}

/// Options for the resolve and properties commands.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Coordinate to resolve.
    pub coordinate: String,
    /// Repository and JDK selection.
    pub source: SourceOptions,
    /// Pin ranges and aliases to concrete versions.
    pub resolved: bool,
    /// Emit JSON.
    pub json: bool,
}

/// Run `f` against a descriptor for the requested coordinate.
fn with_descriptor<T>(
    options: &ResolveOptions,
    f: impl FnOnce(&Descriptor<'_>) -> Result<T>,
) -> Result<T> {
    let settings = options.source.load_settings()?;
    let config = settings.resolver_config()?;
    let client = MavenClient::from_settings(&settings).context("failed to open repositories")?;
    debug!(repositories = client.len(), jdk = %config.target_jdk, "opened repositories");
    let coordinate = pin_coordinate(&Coordinate::parse(&options.coordinate)?, &client)?;
    debug!(%coordinate, "resolving descriptor");
    let descriptor = Descriptor::new(coordinate, &client, config);
    f(&descriptor)
}

/// Render the dependencies of a coordinate.
pub fn dependencies(options: &ResolveOptions) -> Result<String> {
    with_descriptor(options, |descriptor| {
        let dependencies = if options.resolved {
            descriptor.resolved_dependencies()?
        } else {
            descriptor.dependencies()?.clone()
        };
        render_dependencies(&dependencies, options.json)
    })
    .with_context(|| format!("failed to resolve {}", options.coordinate))
}

/// Render the effective properties of a coordinate.
pub fn properties(options: &ResolveOptions) -> Result<String> {
    with_descriptor(options, |descriptor| {
        render_properties(descriptor.properties()?, options.json)
    })
    .with_context(|| format!("failed to resolve {}", options.coordinate))
}

fn render_dependencies(dependencies: &Dependencies, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(dependencies)?);
    }
    if dependencies.is_empty() {
        return Ok("No dependencies.".to_string());
    }

    let mut out = String::new();
    for (scope, edges) in dependencies {
        writeln!(out, "{scope}:")?;
        for edge in edges {
            writeln!(out, "  {edge}")?;
        }
    }
    Ok(out.trim_end().to_string())
}

fn render_properties(properties: &Properties, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(properties)?);
    }
    let mut out = String::new();
    for (key, value) in properties {
        writeln!(out, "{key} = {value}")?;
    }
    Ok(out.trim_end().to_string())
}

/// Compare two versions, rendering `<`, `=` or `>`.
pub fn compare(left: &str, right: &str) -> Result<String> {
    let left = Version::parse(left)?;
    let right = Version::parse(right)?;
    let symbol = match left.cmp(&right) {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    Ok(format!("{left} {symbol} {right}"))
}

/// Repository-relative path of a coordinate.
pub fn path(coordinate: &str) -> Result<String> {
    Ok(Coordinate::parse(coordinate)?.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn options(root: &Path, coordinate: &str) -> ResolveOptions {
        ResolveOptions {
            coordinate: coordinate.to_string(),
            source: SourceOptions {
                settings: None,
                repositories: vec![root.display().to_string()],
                jdk: None,
            },
            resolved: false,
            json: false,
        }
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare("1.0", "1").unwrap(), "1.0 = 1");
        assert_eq!(compare("1.0-SNAPSHOT", "1.0").unwrap(), "1.0-SNAPSHOT < 1.0");
        assert_eq!(compare("1.10", "1.9").unwrap(), "1.10 > 1.9");
        assert!(compare("", "1").is_err());
    }

    #[test]
    fn test_path() {
        assert_eq!(
            path("foo.bar:baz:pkg:sources:1").unwrap(),
            "/foo/bar/baz/1/baz-1-sources.pkg"
        );
        assert!(path("foo").is_err());
    }

    #[test]
    fn test_dependencies_report() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "org/example/app/1.0/app-1.0.pom",
            r"<project>
  <properties><lib.version>2.1</lib.version></properties>
  <dependencies>
    <dependency><groupId>org.example</groupId><artifactId>lib</artifactId><version>${lib.version}</version></dependency>
    <dependency><groupId>org.example</groupId><artifactId>extra</artifactId><version>[1.0,2.0)</version><scope>test</scope><optional>true</optional></dependency>
  </dependencies>
</project>",
        );
        fs::create_dir_all(dir.path().join("org/example/extra/1.4")).unwrap();
        fs::create_dir_all(dir.path().join("org/example/extra/2.0")).unwrap();

        let mut opts = options(dir.path(), "org.example:app:1.0");
        assert_eq!(
            dependencies(&opts).unwrap(),
            "compile:\n  org.example:lib:2.1\ntest:\n  org.example:extra:[1.0,2.0) (optional)"
        );

        opts.resolved = true;
        assert_eq!(
            dependencies(&opts).unwrap(),
            "compile:\n  org.example:lib:2.1\ntest:\n  org.example:extra:1.4 (optional)"
        );

        opts.json = true;
        let json: serde_json::Value = serde_json::from_str(&dependencies(&opts).unwrap()).unwrap();
        assert_eq!(json["compile"][0]["artifact_id"], "lib");
        assert_eq!(json["test"][0]["required"], false);
    }

    #[test]
    fn test_ranged_coordinate_is_pinned() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "org/example/lib/1.5/lib-1.5.pom",
            "<project><dependencies><dependency><groupId>org.example</groupId><artifactId>core</artifactId><version>3</version></dependency></dependencies></project>",
        );
        fs::create_dir_all(dir.path().join("org/example/lib/1.0")).unwrap();
        fs::create_dir_all(dir.path().join("org/example/lib/2.0")).unwrap();

        let opts = options(dir.path(), "org.example:lib:[1.0,2.0)");
        assert_eq!(dependencies(&opts).unwrap(), "compile:\n  org.example:core:3");

        let opts = options(dir.path(), "org.example:lib:[3.0,)");
        let err = dependencies(&opts).unwrap_err();
        assert!(
            format!("{err:#}").contains("no version of 'org.example:lib' satisfies '[3.0,)'"),
            "{err:#}"
        );
    }

    #[test]
    fn test_properties_report() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "g/a/1/a-1.pom",
            "<project><properties><answer>42</answer></properties></project>",
        );
        let mut opts = options(dir.path(), "g:a:1");
        let text = properties(&opts).unwrap();
        assert!(text.contains("answer = 42"));
        assert!(text.contains("project.artifactId = a"));

        opts.json = true;
        let json: serde_json::Value = serde_json::from_str(&properties(&opts).unwrap()).unwrap();
        assert_eq!(json["version"], "1");
    }

    #[test]
    fn test_settings_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("custom.toml");
        fs::write(&settings_path, "jdk = \"11\"\n[[repository]]\nurl = \"/srv/maven\"\n").unwrap();

        let source = SourceOptions {
            settings: Some(settings_path.clone()),
            repositories: Vec::new(),
            jdk: None,
        };
        let settings = source.load_settings().unwrap();
        assert_eq!(settings.jdk, "11");
        assert_eq!(settings.repository_urls().collect::<Vec<_>>(), vec!["/srv/maven"]);

        let source = SourceOptions {
            settings: Some(settings_path),
            repositories: vec!["file:///other".to_string()],
            jdk: Some("17".to_string()),
        };
        let settings = source.load_settings().unwrap();
        assert_eq!(settings.jdk, "17");
        assert_eq!(settings.repository_urls().collect::<Vec<_>>(), vec!["file:///other"]);
    }

    #[test]
    fn test_missing_settings_file() {
        let source = SourceOptions {
            settings: Some(PathBuf::from("/nonexistent/quarry.toml")),
            ..SourceOptions::default()
        };
        assert!(source.load_settings().is_err());
    }
}
