//! Tool catalog & schema builder (component G).
//!
//! A statically declared table of [`ToolConfig`]s is the single source of
//! truth for tool metadata: the dispatcher never hand-writes a schema or a
//! required-parameter check, it reads the config. `build_schema` turns a
//! config into the JSON schema object `rmcp` publishes to the host; `lint`
//! checks the declared `next_tool` edges form a DAG, which is enforced at
//! catalog-construction time rather than on every call.

use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Workflow,
    Orchestration,
    Utility,
}

/// The upstream artifact a workflow tool requires before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Analyze,
    Dockerfile,
    BuildAndAnalyze,
    K8s,
}

impl Precondition {
    /// The tool name a `PreconditionFailed` error should point the caller at.
    pub fn required_tool(&self) -> &'static str {
        match self {
            Precondition::Analyze => "analyze_repository",
            Precondition::Dockerfile => "generate_dockerfile",
            Precondition::BuildAndAnalyze => "build_image",
            Precondition::K8s => "generate_k8s_manifests",
        }
    }

    pub fn is_satisfied(&self, artifacts: &crate::session::Artifacts) -> bool {
        match self {
            Precondition::Analyze => artifacts.analyze.is_some(),
            Precondition::Dockerfile => artifacts.dockerfile.is_some(),
            Precondition::BuildAndAnalyze => artifacts.build.is_some() && artifacts.analyze.is_some(),
            Precondition::K8s => artifacts.k8s.is_some(),
        }
    }
}

/// Default value for an optional parameter; also drives the inferred JSON
/// schema type for that property.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
    OptionalStr,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionalParam {
    pub name: &'static str,
    pub default: DefaultValue,
}

#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
    pub required_params: &'static [&'static str],
    pub optional_params: &'static [OptionalParam],
    /// Named collaborators this tool needs (matched against the bundle the
    /// catalog is constructed with): "sampling_client", "docker_client",
    /// "k8s_client", "cert_scanner".
    pub dependencies: &'static [&'static str],
    pub precondition: Option<Precondition>,
    pub next_tool: Option<&'static str>,
    pub chain_reason: &'static str,
}

impl ToolConfig {
    pub fn build_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for name in self.required_params {
            properties.insert((*name).to_string(), json!({ "type": "string" }));
            required.push(Value::String((*name).to_string()));
        }

        for param in self.optional_params {
            let schema = match param.default {
                DefaultValue::Str(_) | DefaultValue::OptionalStr => json!({ "type": "string" }),
                DefaultValue::Bool(_) => json!({ "type": "boolean" }),
            };
            properties.insert(param.name.to_string(), schema);
        }

        json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        })
    }
}

macro_rules! opt {
    ($name:expr, $default:expr) => {
        OptionalParam { name: $name, default: $default }
    };
}

pub static TOOLS: &[ToolConfig] = &[
    ToolConfig {
        name: "start_workflow",
        description: "Creates a new workflow session rooted at a repository path.",
        category: ToolCategory::Workflow,
        required_params: &["repo_path"],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: Some("analyze_repository"),
        chain_reason: "Analyze the repository to detect its language, framework, and entry points.",
    },
    ToolConfig {
        name: "workflow_status",
        description: "Returns the current workflow state for a session.",
        category: ToolCategory::Utility,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "analyze_repository",
        description: "Detects the repository's language, framework, dependencies, ports, and entry points.",
        category: ToolCategory::Workflow,
        required_params: &["session_id", "repo_path"],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: Some("generate_dockerfile"),
        chain_reason: "Generate a Dockerfile from the detected project profile.",
    },
    ToolConfig {
        name: "generate_dockerfile",
        description: "Generates a Dockerfile via the generate-validate-critique loop.",
        category: ToolCategory::Workflow,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &["sampling_client"],
        precondition: Some(Precondition::Analyze),
        next_tool: Some("apply_dockerfile"),
        chain_reason: "Write the generated Dockerfile into the repository.",
    },
    ToolConfig {
        name: "validate_dockerfile",
        description: "Runs the Dockerfile validator's syntax, security, and best-practice passes.",
        category: ToolCategory::Utility,
        required_params: &["content"],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "apply_dockerfile",
        description: "Writes Dockerfile content into the repository via an atomic, idempotent write.",
        category: ToolCategory::Workflow,
        required_params: &["session_id", "repo_path", "content"],
        optional_params: &[opt!("path", DefaultValue::Str("Dockerfile")), opt!("dry_run", DefaultValue::Bool(false))],
        dependencies: &[],
        precondition: None,
        next_tool: Some("build_image"),
        chain_reason: "Build a container image from the written Dockerfile.",
    },
    ToolConfig {
        name: "build_image",
        description: "Builds a container image from the repository's Dockerfile.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[opt!("image_name", DefaultValue::OptionalStr), opt!("tag", DefaultValue::OptionalStr)],
        dependencies: &["docker_client"],
        precondition: Some(Precondition::Dockerfile),
        next_tool: Some("scan_image"),
        chain_reason: "Scan the built image for known vulnerabilities before pushing.",
    },
    ToolConfig {
        name: "scan_image",
        description: "Scans a built image for vulnerabilities and secrets.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &["cert_scanner"],
        precondition: None,
        next_tool: Some("tag_image"),
        chain_reason: "Tag the scanned image for its destination registry.",
    },
    ToolConfig {
        name: "scan_secrets",
        description: "Scans repository files for likely secrets (API keys, tokens, credentials).",
        category: ToolCategory::Utility,
        required_params: &["session_id"],
        optional_params: &[
            opt!("scan_path", DefaultValue::OptionalStr),
            opt!("file_patterns", DefaultValue::OptionalStr),
            opt!("exclude_patterns", DefaultValue::OptionalStr),
            opt!("suggest_remediation", DefaultValue::Bool(false)),
        ],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "tag_image",
        description: "Tags a built image for its destination registry.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[opt!("registry", DefaultValue::OptionalStr), opt!("tag", DefaultValue::OptionalStr)],
        dependencies: &["docker_client"],
        precondition: None,
        next_tool: Some("push_image"),
        chain_reason: "Push the tagged image to the registry.",
    },
    ToolConfig {
        name: "push_image",
        description: "Pushes a tagged image to its destination registry.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &["docker_client"],
        precondition: None,
        next_tool: Some("generate_k8s_manifests"),
        chain_reason: "Generate Kubernetes manifests for the pushed image.",
    },
    ToolConfig {
        name: "generate_k8s_manifests",
        description: "Generates Kubernetes manifests via the generate-validate-critique loop.",
        category: ToolCategory::Workflow,
        required_params: &["session_id"],
        optional_params: &[opt!("namespace", DefaultValue::OptionalStr)],
        dependencies: &["sampling_client"],
        precondition: Some(Precondition::BuildAndAnalyze),
        next_tool: Some("apply_k8s_manifests"),
        chain_reason: "Write the generated manifests into the repository.",
    },
    ToolConfig {
        name: "validate_k8s_manifests",
        description: "Runs the Kubernetes manifest validator's structural, security, and cross-document passes.",
        category: ToolCategory::Utility,
        required_params: &["content"],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "apply_k8s_manifests",
        description: "Writes Kubernetes manifest content into the repository via an atomic, idempotent write.",
        category: ToolCategory::Workflow,
        required_params: &["session_id", "repo_path", "path", "content"],
        optional_params: &[opt!("dry_run", DefaultValue::Bool(false))],
        dependencies: &[],
        precondition: None,
        next_tool: Some("prepare_cluster"),
        chain_reason: "Prepare the target cluster to receive the deployment.",
    },
    ToolConfig {
        name: "prepare_cluster",
        description: "Prepares the target Kubernetes cluster (namespace, context) for deployment.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[opt!("cluster_name", DefaultValue::OptionalStr), opt!("namespace", DefaultValue::OptionalStr)],
        dependencies: &["k8s_client"],
        precondition: None,
        next_tool: Some("deploy_application"),
        chain_reason: "Deploy the application to the prepared cluster.",
    },
    ToolConfig {
        name: "deploy_application",
        description: "Applies the generated manifests to the target cluster.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &["k8s_client"],
        precondition: Some(Precondition::K8s),
        next_tool: Some("verify_deployment"),
        chain_reason: "Verify the deployment came up healthy.",
    },
    ToolConfig {
        name: "verify_deployment",
        description: "Verifies a deployment reached a healthy state.",
        category: ToolCategory::Orchestration,
        required_params: &["session_id"],
        optional_params: &[],
        dependencies: &["k8s_client"],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "list_tools",
        description: "Lists every tool in the catalog with its schema.",
        category: ToolCategory::Utility,
        required_params: &[],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "ping",
        description: "Liveness check.",
        category: ToolCategory::Utility,
        required_params: &[],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
    ToolConfig {
        name: "server_status",
        description: "Reports server uptime and the number of active sessions.",
        category: ToolCategory::Utility,
        required_params: &[],
        optional_params: &[],
        dependencies: &[],
        precondition: None,
        next_tool: None,
        chain_reason: "",
    },
];

/// Looks up a tool config by name.
pub fn get(name: &str) -> Option<&'static ToolConfig> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Validates every declared tool dependency is present in `available`
/// (e.g. `"sampling_client"`, `"docker_client"`), and that required and
/// optional parameter names are disjoint per tool.
pub fn validate_dependencies(available: &HashSet<&str>) -> Result<()> {
    for tool in TOOLS {
        for dep in tool.dependencies {
            if !available.contains(dep) {
                return Err(AppError::backend(format!(
                    "tool '{}' declares dependency '{}' which is not in the supplied collaborator bundle",
                    tool.name, dep
                )));
            }
        }
        let required: HashSet<&str> = tool.required_params.iter().copied().collect();
        for opt in tool.optional_params {
            if required.contains(opt.name) {
                return Err(AppError::backend(format!(
                    "tool '{}' declares '{}' as both required and optional",
                    tool.name, opt.name
                )));
            }
        }
    }
    Ok(())
}

/// Checks the `next_tool` graph is a DAG (no cycles). Run once at
/// construction time, not per call.
pub fn lint() -> Result<()> {
    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    let by_name: HashMap<&str, &ToolConfig> = TOOLS.iter().map(|t| (t.name, t)).collect();

    fn visit<'a>(
        name: &'a str,
        by_name: &HashMap<&'a str, &'a ToolConfig>,
        visiting: &mut HashSet<&'a str>,
        visited: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if visited.contains(name) {
            return Ok(());
        }
        if !visiting.insert(name) {
            return Err(AppError::backend(format!(
                "tool chain graph has a cycle at '{name}'"
            )));
        }
        if let Some(tool) = by_name.get(name) {
            if let Some(next) = tool.next_tool {
                visit(next, by_name, visiting, visited)?;
            }
        }
        visiting.remove(name);
        visited.insert(name);
        Ok(())
    }

    for tool in TOOLS {
        visit(tool.name, &by_name, &mut visiting, &mut visited)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lints_clean() {
        lint().unwrap();
    }

    #[test]
    fn dependencies_validate_against_full_bundle() {
        let available: HashSet<&str> =
            ["sampling_client", "docker_client", "k8s_client", "cert_scanner"]
                .into_iter()
                .collect();
        validate_dependencies(&available).unwrap();
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let available: HashSet<&str> = HashSet::new();
        assert!(validate_dependencies(&available).is_err());
    }

    #[test]
    fn schema_lists_required_before_optional_defaults() {
        let tool = get("apply_dockerfile").unwrap();
        let schema = tool.build_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "session_id"));
        assert!(required.iter().any(|v| v == "content"));
        assert_eq!(schema["properties"]["dry_run"]["type"], "boolean");
    }

    #[test]
    fn chain_hint_matches_declared_next_tool() {
        let tool = get("analyze_repository").unwrap();
        assert_eq!(tool.next_tool, Some("generate_dockerfile"));
    }
}
