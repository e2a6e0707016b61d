//! Detects the programming languages present in a project from its manifest
//! files, independent of framework or dependency detail.

use crate::analyzer::{AnalysisConfig, DetectedLanguage};
use crate::common::file_utils::read_file_safe;
use crate::error::Result;
use std::path::{Path, PathBuf};

struct LanguageManifest {
    name: &'static str,
    package_manager: &'static str,
    manifest_file: &'static str,
}

const MANIFESTS: &[LanguageManifest] = &[
    LanguageManifest { name: "Rust", package_manager: "cargo", manifest_file: "Cargo.toml" },
    LanguageManifest { name: "JavaScript/TypeScript", package_manager: "npm", manifest_file: "package.json" },
    LanguageManifest { name: "Python", package_manager: "pip", manifest_file: "pyproject.toml" },
    LanguageManifest { name: "Python", package_manager: "pip", manifest_file: "requirements.txt" },
    LanguageManifest { name: "Go", package_manager: "go modules", manifest_file: "go.mod" },
    LanguageManifest { name: "Java/Kotlin", package_manager: "maven", manifest_file: "pom.xml" },
    LanguageManifest { name: "Java/Kotlin", package_manager: "gradle", manifest_file: "build.gradle" },
    LanguageManifest { name: "Java/Kotlin", package_manager: "gradle", manifest_file: "build.gradle.kts" },
];

/// Detects languages by matching collected file paths against known manifest
/// file names, then extracting a coarse dependency list from each manifest
/// found. `files` is expected to come from [`crate::common::file_utils::collect_project_files`].
pub fn detect_languages(
    files: &[PathBuf],
    config: &AnalysisConfig,
) -> Result<Vec<DetectedLanguage>> {
    let mut languages: Vec<DetectedLanguage> = Vec::new();

    for manifest in MANIFESTS {
        let Some(manifest_path) = files
            .iter()
            .find(|f| f.file_name().and_then(|n| n.to_str()) == Some(manifest.manifest_file))
        else {
            continue;
        };

        let (main_deps, dev_deps) =
            read_manifest_dependencies(manifest_path, manifest.manifest_file, config)
                .unwrap_or_default();

        let source_files: Vec<PathBuf> = files
            .iter()
            .filter(|f| is_source_file_for(manifest.name, f))
            .cloned()
            .collect();

        if let Some(existing) = languages.iter_mut().find(|l| l.name == manifest.name) {
            existing.main_dependencies.extend(main_deps);
            existing.dev_dependencies.extend(dev_deps);
            existing.main_dependencies.dedup();
            existing.dev_dependencies.dedup();
            existing.files.extend(source_files);
            continue;
        }

        languages.push(DetectedLanguage {
            name: manifest.name.to_string(),
            version: None,
            confidence: 0.9,
            files: source_files,
            main_dependencies: main_deps,
            dev_dependencies: dev_deps,
            package_manager: Some(manifest.package_manager.to_string()),
        });
    }

    Ok(languages)
}

fn is_source_file_for(language: &str, path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match language {
        "Rust" => ext == "rs",
        "JavaScript/TypeScript" => matches!(ext, "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs"),
        "Python" => ext == "py",
        "Go" => ext == "go",
        "Java/Kotlin" => matches!(ext, "java" | "kt" | "kts"),
        _ => false,
    }
}

fn read_manifest_dependencies(
    path: &Path,
    manifest_file: &str,
    config: &AnalysisConfig,
) -> Result<(Vec<String>, Vec<String>)> {
    let content = read_file_safe(path, config.max_file_size)?;

    match manifest_file {
        "Cargo.toml" => parse_cargo_toml_dependencies(&content),
        "package.json" => parse_package_json_dependencies(&content),
        "requirements.txt" => Ok((parse_requirements_txt(&content), Vec::new())),
        "pyproject.toml" => parse_pyproject_dependencies(&content),
        "go.mod" => Ok((parse_go_mod_dependencies(&content), Vec::new())),
        _ => Ok((Vec::new(), Vec::new())),
    }
}

fn parse_cargo_toml_dependencies(content: &str) -> Result<(Vec<String>, Vec<String>)> {
    let value: toml::Value = toml::from_str(content)?;
    let main = value
        .get("dependencies")
        .and_then(|t| t.as_table())
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default();
    let dev = value
        .get("dev-dependencies")
        .and_then(|t| t.as_table())
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default();
    Ok((main, dev))
}

fn parse_package_json_dependencies(content: &str) -> Result<(Vec<String>, Vec<String>)> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let main = value
        .get("dependencies")
        .and_then(|d| d.as_object())
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    let dev = value
        .get("devDependencies")
        .and_then(|d| d.as_object())
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    Ok((main, dev))
}

fn parse_pyproject_dependencies(content: &str) -> Result<(Vec<String>, Vec<String>)> {
    let value: toml::Value = toml::from_str(content)?;
    let main = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| requirement_name(s).to_string())
                .collect()
        })
        .unwrap_or_default();
    Ok((main, Vec::new()))
}

fn parse_requirements_txt(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(requirement_name)
        .map(str::to_string)
        .collect()
}

fn requirement_name(spec: &str) -> &str {
    spec.split(|c: char| "=<>!~[; ".contains(c))
        .next()
        .unwrap_or(spec)
        .trim()
}

fn parse_go_mod_dependencies(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_require_block = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("require (") {
            in_require_block = true;
            continue;
        }
        if in_require_block && line == ")" {
            in_require_block = false;
            continue;
        }
        if in_require_block {
            if let Some(name) = line.split_whitespace().next() {
                deps.push(name.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(name) = rest.split_whitespace().next() {
                deps.push(name.to_string());
            }
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rust_from_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"x\"\n[dependencies]\nserde = \"1\"\n[dev-dependencies]\ntempfile = \"3\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let files = vec![dir.path().join("Cargo.toml"), dir.path().join("main.rs")];
        let langs = detect_languages(&files, &AnalysisConfig::default()).unwrap();
        assert_eq!(langs.len(), 1);
        assert_eq!(langs[0].name, "Rust");
        assert!(langs[0].main_dependencies.contains(&"serde".to_string()));
        assert!(langs[0].dev_dependencies.contains(&"tempfile".to_string()));
    }

    #[test]
    fn detects_multiple_languages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module x\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.0\n)\n").unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            "{\"dependencies\": {\"express\": \"^4.0.0\"}}",
        )
        .unwrap();

        let files = vec![dir.path().join("go.mod"), dir.path().join("package.json")];
        let langs = detect_languages(&files, &AnalysisConfig::default()).unwrap();
        assert_eq!(langs.len(), 2);
        assert!(langs.iter().any(|l| l.name == "Go"));
        assert!(langs.iter().any(|l| l.name == "JavaScript/TypeScript"));
    }

    #[test]
    fn no_manifests_found_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), "hi").unwrap();
        let files = vec![dir.path().join("readme.md")];
        let langs = detect_languages(&files, &AnalysisConfig::default()).unwrap();
        assert!(langs.is_empty());
    }
}
