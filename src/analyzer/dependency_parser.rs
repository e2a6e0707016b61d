//! Flattens per-language dependency lists (already extracted by
//! [`crate::analyzer::language_detector`]) into the project-wide
//! [`crate::analyzer::DependencyMap`] exposed on [`crate::analyzer::ProjectAnalysis`].

use crate::analyzer::{AnalysisConfig, DependencyMap, DetectedLanguage};
use crate::error::Result;
use std::path::Path;

/// Builds the project-wide dependency map. Versions aren't re-resolved here:
/// manifests rarely pin exact versions for every entry, so each dependency is
/// recorded with whatever version constraint its manifest declared, or `"*"`
/// when the language detector couldn't recover one.
pub fn parse_dependencies(
    project_root: &Path,
    languages: &[DetectedLanguage],
    config: &AnalysisConfig,
) -> Result<DependencyMap> {
    let mut deps = DependencyMap::new();

    for language in languages {
        for name in &language.main_dependencies {
            let version = manifest_version(project_root, language, name)
                .unwrap_or_else(|| "*".to_string());
            deps.entry(name.clone()).or_insert(version);
        }
        if config.include_dev_dependencies {
            for name in &language.dev_dependencies {
                let version = manifest_version(project_root, language, name)
                    .unwrap_or_else(|| "*".to_string());
                deps.entry(name.clone()).or_insert(version);
            }
        }
    }

    Ok(deps)
}

/// Best-effort lookup of a pinned version string directly from the manifest
/// that declared `name`, falling back to `None` for manifest formats (like
/// `package.json`) where a TOML parse isn't applicable.
fn manifest_version(project_root: &Path, language: &DetectedLanguage, name: &str) -> Option<String> {
    if language.name != "Rust" {
        return None;
    }
    let cargo_toml = project_root.join("Cargo.toml");
    let content = std::fs::read_to_string(cargo_toml).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    let entry = value.get("dependencies")?.get(name)?;
    match entry {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Table(t) => t.get("version")?.as_str().map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(name: &str, main: &[&str], dev: &[&str]) -> DetectedLanguage {
        DetectedLanguage {
            name: name.to_string(),
            version: None,
            confidence: 0.9,
            files: Vec::new(),
            main_dependencies: main.iter().map(|s| s.to_string()).collect(),
            dev_dependencies: dev.iter().map(|s| s.to_string()).collect(),
            package_manager: None,
        }
    }

    #[test]
    fn excludes_dev_dependencies_by_default() {
        let languages = vec![lang("Go", &["gin"], &["testify"])];
        let config = AnalysisConfig::default();
        let deps = parse_dependencies(Path::new("."), &languages, &config).unwrap();
        assert!(deps.contains_key("gin"));
        assert!(!deps.contains_key("testify"));
    }

    #[test]
    fn includes_dev_dependencies_when_configured() {
        let languages = vec![lang("Go", &["gin"], &["testify"])];
        let mut config = AnalysisConfig::default();
        config.include_dev_dependencies = true;
        let deps = parse_dependencies(Path::new("."), &languages, &config).unwrap();
        assert!(deps.contains_key("testify"));
    }

    #[test]
    fn resolves_pinned_rust_version_from_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"x\"\n[dependencies]\nserde = { version = \"1.0.200\" }\ntokio = \"1.38\"\n",
        )
        .unwrap();
        let languages = vec![lang("Rust", &["serde", "tokio"], &[])];
        let config = AnalysisConfig::default();
        let deps = parse_dependencies(dir.path(), &languages, &config).unwrap();
        assert_eq!(deps.get("serde").unwrap(), "1.0.200");
        assert_eq!(deps.get("tokio").unwrap(), "1.38");
    }
}
