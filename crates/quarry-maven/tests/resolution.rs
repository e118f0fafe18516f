//! End-to-end descriptor resolution against an on-disk repository.

use quarry_maven::{
    Coordinate, Descriptor, Edge, LocalRepository, MavenClient, Repository, ResolveError,
    ResolverConfig, Version,
};
use std::fs;
use std::path::Path;

fn publish(root: &Path, group: &str, artifact: &str, version: &str, pom: &str) {
    let dir = root
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{artifact}-{version}.pom")), pom).unwrap();
}

fn release(root: &Path, group: &str, artifact: &str, version: &str) {
    let dir = root
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(dir).unwrap();
}

const ROOT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.acme</groupId>
  <artifactId>acme-parent</artifactId>
  <version>5</version>
  <packaging>pom</packaging>
  <properties>
    <junit.version>4.13.2</junit.version>
    <slf4j.version>1.7.36</slf4j.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.acme</groupId>
        <artifactId>acme-bom</artifactId>
        <version>2.0.0</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
      <dependency>
        <groupId>junit</groupId>
        <artifactId>junit</artifactId>
        <version>${junit.version}</version>
        <scope>test</scope>
      </dependency>
      <dependency>
        <groupId>org.slf4j</groupId>
        <artifactId>slf4j-api</artifactId>
        <version>${slf4j.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;

const BOM_POM: &str = r"<project>
  <groupId>org.acme</groupId>
  <artifactId>acme-bom</artifactId>
  <version>2.0.0</version>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.acme</groupId>
        <artifactId>acme-core</artifactId>
        <version>2.0.0</version>
      </dependency>
      <dependency>
        <groupId>org.slf4j</groupId>
        <artifactId>slf4j-api</artifactId>
        <version>2.0.0</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>";

const APP_POM: &str = r"<project>
  <parent>
    <groupId>org.acme</groupId>
    <artifactId>acme-parent</artifactId>
    <version>5</version>
  </parent>
  <artifactId>acme-app</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>acme-core</artifactId>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
    </dependency>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>acme-plugins</artifactId>
      <version>[1.0,2.0)</version>
      <optional>true</optional>
    </dependency>
  </dependencies>
  <profiles>
    <profile>
      <id>java8</id>
      <activation><jdk>1.8</jdk></activation>
      <dependencies>
        <dependency>
          <groupId>org.acme</groupId>
          <artifactId>acme-compat</artifactId>
          <version>${project.version}</version>
        </dependency>
      </dependencies>
    </profile>
  </profiles>
</project>";

fn repository() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    publish(dir.path(), "org.acme", "acme-parent", "5", ROOT_POM);
    publish(dir.path(), "org.acme", "acme-bom", "2.0.0", BOM_POM);
    publish(dir.path(), "org.acme", "acme-app", "1.0", APP_POM);
    for version in ["1.0", "1.5", "2.0", "2.1-SNAPSHOT"] {
        release(dir.path(), "org.acme", "acme-plugins", version);
    }
    dir
}

fn app(repo: &dyn Repository, config: ResolverConfig) -> Descriptor<'_> {
    Descriptor::new(Coordinate::parse("org.acme:acme-app:1.0").unwrap(), repo, config)
}

#[test]
fn test_parent_chain_and_bom_import() {
    let dir = repository();
    let repo = LocalRepository::new(dir.path());
    let descriptor = app(&repo, ResolverConfig::default());

    let parent = descriptor.parent().unwrap().unwrap();
    assert_eq!(parent.coordinate().artifact_id(), "acme-parent");
    assert!(parent.parent().unwrap().is_none());

    let management = descriptor.dependency_management().unwrap();
    let core = &management[&("org.acme".to_string(), "acme-core".to_string())];
    assert_eq!(core.version, "2.0.0");
    // The parent's own entry wins over the imported one.
    let slf4j = &management[&("org.slf4j".to_string(), "slf4j-api".to_string())];
    assert_eq!(slf4j.version, "1.7.36");

    let dependencies = descriptor.dependencies().unwrap();
    let compile: Vec<String> = dependencies["compile"].iter().map(ToString::to_string).collect();
    assert_eq!(
        compile,
        vec![
            "org.acme:acme-compat:1.0",
            "org.acme:acme-core:2.0.0",
            "org.acme:acme-parent:5",
            "org.acme:acme-plugins:[1.0,2.0) (optional)",
            "org.slf4j:slf4j-api:1.7.36",
        ]
    );
    assert_eq!(
        dependencies["test"].iter().collect::<Vec<_>>(),
        vec![&Edge::new("junit", "junit", "4.13.2", true)]
    );
    assert_eq!(
        dependencies["import"].iter().collect::<Vec<_>>(),
        vec![&Edge::new("org.acme", "acme-bom", "2.0.0", true)]
    );
}

#[test]
fn test_resolved_versions_and_build_set() {
    let dir = repository();
    let repo = LocalRepository::new(dir.path());
    let descriptor = app(&repo, ResolverConfig::default());

    let resolved = descriptor.resolved_dependencies().unwrap();
    assert!(resolved["compile"].contains(&Edge::new("org.acme", "acme-plugins", "1.5", false)));

    let build = descriptor.build_dependencies().unwrap();
    assert!(build.contains(&Edge::new("org.acme", "acme-bom", "2.0.0", true)));
    assert!(build.contains(&Edge::new("org.acme", "acme-parent", "5", true)));
    assert!(!build.iter().any(|edge| edge.artifact_id == "acme-plugins"));
    assert!(!build.iter().any(|edge| edge.artifact_id == "junit"));
}

#[test]
fn test_profiles_follow_target_jdk() {
    let dir = repository();
    let repo = LocalRepository::new(dir.path());
    let descriptor = app(&repo, ResolverConfig::new(Version::parse("21").unwrap()));

    let all = descriptor.all_dependencies().unwrap();
    assert!(!all.iter().any(|edge| edge.artifact_id == "acme-compat"));
}

#[test]
fn test_client_over_local_repositories() {
    let dir = repository();
    let overlay = tempfile::tempdir().unwrap();
    release(overlay.path(), "org.acme", "acme-plugins", "1.9");

    let urls = [
        format!("file://{}", overlay.path().display()),
        dir.path().display().to_string(),
    ];
    let client = MavenClient::from_urls(urls.iter().map(String::as_str), &Default::default()).unwrap();
    let descriptor = app(&client, ResolverConfig::default());

    let resolved = descriptor.resolved_dependencies().unwrap();
    assert!(resolved["compile"].contains(&Edge::new("org.acme", "acme-plugins", "1.9", false)));
}

#[test]
fn test_missing_parent_field_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    publish(
        dir.path(),
        "org.acme",
        "broken",
        "1",
        "<project><parent><artifactId>p</artifactId><version>1</version></parent></project>",
    );
    let repo = LocalRepository::new(dir.path());
    let descriptor = Descriptor::new(
        Coordinate::parse("org.acme:broken:1").unwrap(),
        &repo,
        ResolverConfig::default(),
    );
    assert!(matches!(
        descriptor.dependencies(),
        Err(ResolveError::MissingField { field: "parent.groupId", .. })
    ));
}
