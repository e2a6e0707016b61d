//! Tool bodies: one function per catalog entry, called by
//! [`super::Dispatcher`] once argument checks, session-state load, and the
//! precondition check have already passed. A body only needs to do the
//! tool's actual work and report what it produced — the dispatcher owns
//! state bookkeeping, error-to-`ToolOutput` translation, and chain hints.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

use super::{ArtifactPatch, Dispatcher, opt_bool, opt_str, require_str, schema_entry};
use crate::analyzer::{self, TechnologyCategory};
use crate::catalog::{self, Precondition};
use crate::dockerfile;
use crate::error::{AppError, Result};
use crate::fsops;
use crate::k8s;
use crate::progress::ProgressEmitter;
use crate::scan;
use crate::session::{
    AnalyzeArtifact, BuildArtifact, DockerfileArtifact, K8sArtifact, ScanArtifact, WorkflowState, new_session_id,
};
use crate::templates;

/// Routes to the individual body function for every tool that goes
/// through the session-scoped generic wrapper in `Dispatcher::dispatch`.
pub(super) async fn run_body(
    d: &Dispatcher,
    tool_name: &str,
    session_id: &str,
    state: &WorkflowState,
    args: &Value,
    progress: &dyn ProgressEmitter,
) -> Result<(Value, ArtifactPatch)> {
    match tool_name {
        "analyze_repository" => analyze_repository(d, args, progress).await,
        "generate_dockerfile" => generate_dockerfile(d, state, progress).await,
        "apply_dockerfile" => apply_dockerfile(state, args),
        "build_image" => build_image(d, state, args, progress).await,
        "scan_image" => scan_image(d, state, progress).await,
        "scan_secrets" => scan_secrets(d, state, args, progress).await,
        "tag_image" => tag_image(d, state, args).await,
        "push_image" => push_image(d, state).await,
        "generate_k8s_manifests" => generate_k8s_manifests(d, state, args, progress).await,
        "apply_k8s_manifests" => apply_k8s_manifests(state, args),
        "prepare_cluster" => prepare_cluster(d, args).await,
        "deploy_application" => deploy_application(d, state).await,
        "verify_deployment" => verify_deployment(d, state, session_id).await,
        other => Err(AppError::backend(format!("tool '{other}' has no registered body"))),
    }
}

// ---- Stateless utility tools (handled directly in Dispatcher::dispatch) ----

pub(super) fn list_tools() -> Result<Value> {
    let tools: Vec<Value> = catalog::TOOLS.iter().map(schema_entry).collect();
    Ok(json!({ "tools": tools }))
}

pub(super) fn ping() -> Value {
    json!({ "pong": true })
}

pub(super) fn server_status(d: &Dispatcher) -> Value {
    let uptime_secs = (chrono::Utc::now() - d.started_at).num_seconds().max(0);
    json!({
        "uptime_secs": uptime_secs,
        "active_sessions": d.sessions.len(),
        "version": env!("CARGO_PKG_VERSION"),
    })
}

pub(super) fn validate_dockerfile_tool(args: &Value) -> Result<Value> {
    let content = require_str(args, "content")?;
    Ok(serde_json::to_value(dockerfile::validate_dockerfile(content))?)
}

pub(super) fn validate_k8s_manifests_tool(args: &Value) -> Result<Value> {
    let content = require_str(args, "content")?;
    Ok(serde_json::to_value(k8s::validate_manifests(content, "manifest"))?)
}

// ---- Session-bootstrapping / reading tools (handled directly, no precondition) ----

pub(super) async fn start_workflow(d: &Dispatcher, args: &Value) -> Result<(Value, Option<super::ChainHint>)> {
    let repo_path = require_str(args, "repo_path")?;
    let session_id = new_session_id();

    d.sessions.update_workflow_state(&session_id, Some(repo_path), |s| {
        s.status = crate::session::WorkflowStatus::Started;
        Ok(())
    })?;

    let tool = catalog::get("start_workflow").expect("start_workflow is in the static catalog");
    let chain_hint = tool.next_tool.map(|next| super::ChainHint { next_tool: next.to_string(), reason: tool.chain_reason.to_string() });
    Ok((json!({ "session_id": session_id, "status": "started", "repo_path": repo_path }), chain_hint))
}

pub(super) fn workflow_status(d: &Dispatcher, args: &Value) -> Result<(Value, Option<super::ChainHint>)> {
    let session_id = require_str(args, "session_id")?;
    let state = d.sessions.get_workflow_state(session_id)?;
    Ok((serde_json::to_value(state)?, None))
}

// ---- Workflow tool bodies ----

async fn analyze_repository(d: &Dispatcher, args: &Value, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let repo_path = require_str(args, "repo_path")?.to_string();
    let analysis_config = d.config.analysis.clone();

    progress.emit("analyze", 0.1, "scanning repository files");
    let path = Path::new(&repo_path);
    let analysis_config = crate::analyzer::AnalysisConfig {
        include_dev_dependencies: analysis_config.include_dev_dependencies,
        deep_analysis: analysis_config.deep_analysis,
        ignore_patterns: analysis_config.ignore_patterns,
        max_file_size: analysis_config.max_file_size,
    };
    let path_owned = path.to_path_buf();
    let analysis = tokio::task::spawn_blocking(move || analyzer::analyze_project_with_config(&path_owned, &analysis_config))
        .await
        .map_err(|e| AppError::backend(format!("analysis task panicked: {e}")))??;
    progress.emit("analyze", 1.0, "analysis complete");

    let artifact = to_analyze_artifact(&repo_path, &analysis);
    let data = serde_json::to_value(&analysis)?;
    Ok((data, ArtifactPatch::Analyze(artifact)))
}

fn to_analyze_artifact(repo_path: &str, analysis: &analyzer::ProjectAnalysis) -> AnalyzeArtifact {
    let language = analysis.languages.first().map(|l| l.name.clone()).unwrap_or_else(|| "unknown".to_string());

    let framework = analysis
        .technologies
        .iter()
        .find(|t| matches!(t.category, TechnologyCategory::FrontendFramework | TechnologyCategory::BackendFramework | TechnologyCategory::MetaFramework))
        .map(|t| t.name.clone());

    let port = analysis.ports.first().map(|p| p.number);

    let build_command = analysis
        .build_scripts
        .iter()
        .find(|b| b.is_default && b.name == "build")
        .or_else(|| analysis.build_scripts.iter().find(|b| b.name == "build"))
        .map(|b| b.command.clone());

    let start_command = analysis
        .build_scripts
        .iter()
        .find(|b| b.name == "start")
        .map(|b| b.command.clone())
        .or_else(|| analysis.entry_points.first().and_then(|e| e.command.clone()));

    let dependencies = analysis.dependencies.keys().cloned().collect();

    AnalyzeArtifact {
        repo_path: repo_path.to_string(),
        language,
        framework,
        port,
        build_command,
        start_command,
        dependencies,
    }
}

async fn generate_dockerfile(d: &Dispatcher, state: &WorkflowState, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let analyze = state.artifacts.analyze.as_ref().expect("precondition checked Analyze before body ran");

    let mut context = tera::Context::new();
    context.insert("language", &analyze.language);
    context.insert("framework", &analyze.framework);
    context.insert("build_command", &analyze.build_command);
    context.insert("start_command", &analyze.start_command);
    context.insert("port", &analyze.port);
    context.insert("dependencies", &analyze.dependencies);

    progress.emit("generate", 0.1, "rendering prompt");
    let sampling = d.collaborators.sampling_client.as_deref().ok_or_else(|| AppError::backend("no sampling_client configured"))?;
    let builtin = templates::BuiltinTemplateProvider;
    let template_provider: &dyn crate::collaborators::TemplateProvider =
        d.collaborators.template_provider.as_deref().unwrap_or(&builtin);

    let outcome = crate::engine::run(
        &d.templates,
        sampling,
        template_provider,
        dockerfile::validate_dockerfile,
        crate::engine::GenerationRequest {
            generate_template: templates::DOCKERFILE_GENERATE,
            critique_template: templates::DOCKERFILE_CRITIQUE,
            context,
            schema: json!({ "type": "object", "properties": { "content": { "type": "string" } }, "required": ["content"] }),
            max_attempts: d.config.server.max_generation_attempts,
        },
    )
    .await?;
    progress.emit("generate", 1.0, "dockerfile accepted");

    let (base_image, metadata) = dockerfile::extract_metadata(&outcome.content);
    let quality_score = outcome.attempts.last().map(|a| a.validation.quality_score).unwrap_or(0);

    let artifact = DockerfileArtifact { content: outcome.content.clone(), path: "Dockerfile".to_string(), base_image, metadata };
    let data = json!({
        "content": outcome.content,
        "attempts": outcome.attempts.len(),
        "quality_score": quality_score,
    });
    Ok((data, ArtifactPatch::Dockerfile(artifact)))
}

fn apply_dockerfile(state: &WorkflowState, args: &Value) -> Result<(Value, ArtifactPatch)> {
    let repo_path = require_str(args, "repo_path")?;
    let content = require_str(args, "content")?;
    let rel_path = opt_str(args, "path").unwrap_or("Dockerfile");
    let dry_run = opt_bool(args, "dry_run", false);

    let root = Path::new(repo_path);
    let dest = fsops::resolve_in_root(root, rel_path)?;

    if dry_run {
        let plan = fsops::plan_write(&dest, content.as_bytes())?;
        let _ = state;
        return Ok((serde_json::to_value(plan)?, ArtifactPatch::None));
    }

    let outcome = fsops::atomic_write(&dest, content.as_bytes(), 0o644)?;
    let (base_image, metadata) = dockerfile::extract_metadata(content);
    let artifact = DockerfileArtifact { content: content.to_string(), path: rel_path.to_string(), base_image, metadata };
    let data = json!({ "changed": outcome.changed, "old_hash": outcome.old_hash, "new_hash": outcome.new_hash, "path": rel_path });
    Ok((data, ArtifactPatch::Dockerfile(artifact)))
}

async fn build_image(d: &Dispatcher, state: &WorkflowState, args: &Value, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let dockerfile = state.artifacts.dockerfile.as_ref().expect("precondition checked Dockerfile before body ran");
    let image_name = opt_str(args, "image_name").map(str::to_string).unwrap_or_else(|| default_image_name(&state.repo_path));
    let tag = opt_str(args, "tag").unwrap_or("latest");

    progress.emit("build", 0.1, "starting image build");
    let docker = d.collaborators.docker_client.as_deref().ok_or_else(|| AppError::backend("no docker_client configured"))?;
    let outcome = docker.build_image(&state.repo_path, &dockerfile.path, &image_name).await?;
    progress.emit("build", 1.0, "image build complete");

    let image_ref = format!("{image_name}:{tag}");
    let artifact = BuildArtifact {
        image_id: outcome.image_id.clone(),
        image_ref: image_ref.clone(),
        size_bytes: outcome.size_bytes,
        build_time_ms: outcome.build_time_ms,
        layers: outcome.layers.clone(),
    };
    let data = json!({
        "image_id": outcome.image_id,
        "image_ref": image_ref,
        "size_bytes": outcome.size_bytes,
        "build_time_ms": outcome.build_time_ms,
        "layers": outcome.layers,
    });
    Ok((data, ArtifactPatch::Build(artifact)))
}

fn require_build<'a>(state: &'a WorkflowState, needing_tool: &str) -> Result<&'a BuildArtifact> {
    state.artifacts.build.as_ref().ok_or_else(|| AppError::precondition(format!("{} (build_image)", needing_tool)))
}

async fn scan_image(d: &Dispatcher, state: &WorkflowState, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let build = require_build(state, "scan_image")?;

    progress.emit("scan", 0.2, "scanning image for vulnerabilities");
    let cert_scanner = d.collaborators.cert_scanner.as_deref().ok_or_else(|| AppError::backend("no cert_scanner configured"))?;
    let report = cert_scanner.scan_image(&build.image_ref).await?;
    progress.emit("scan", 1.0, "scan complete");

    let counts_by_severity = report.counts_by_severity.clone();
    let artifact = ScanArtifact {
        counts_by_severity,
        scan_timestamp: chrono::Utc::now(),
        scanner_name: "cert_scanner".to_string(),
        total_findings: report.findings.len() as u32,
    };
    let data = json!({
        "findings": report.findings.iter().map(|f| json!({
            "severity": f.severity,
            "code": f.code,
            "package": f.package,
            "message": f.message,
        })).collect::<Vec<_>>(),
        "counts_by_severity": report.counts_by_severity,
    });
    Ok((data, ArtifactPatch::Scan(artifact)))
}

async fn scan_secrets(d: &Dispatcher, state: &WorkflowState, args: &Value, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let scan_root = opt_str(args, "scan_path").unwrap_or(&state.repo_path).to_string();
    let include: Vec<String> = opt_str(args, "file_patterns")
        .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
        .unwrap_or_else(|| d.config.server.scan_include_globs.clone());
    let exclude: Vec<String> = opt_str(args, "exclude_patterns")
        .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
        .unwrap_or_else(|| d.config.server.scan_exclude_globs.clone());
    let suggest_remediation = opt_bool(args, "suggest_remediation", false);
    let include_high_entropy = d.config.server.scan_include_high_entropy;
    let max_file_size = d.config.server.scan_max_file_size as u64;

    progress.emit("scan", 0.1, "walking repository");
    let walk_config = scan::WalkConfig::from_patterns(&include, &exclude, max_file_size)?;
    let scan_config = scan::ScanConfig { include_high_entropy, suggest_remediation };
    let registry = scan::ScannerRegistry::with_default_plugins();
    let root = std::path::PathBuf::from(scan_root);

    let result = tokio::task::spawn_blocking(move || scan::scan_repository(&root, &registry, &scan_config, &walk_config))
        .await
        .map_err(|e| AppError::backend(format!("scan task panicked: {e}")))??;
    progress.emit("scan", 1.0, "scan complete");

    let findings: Vec<Value> = result
        .findings
        .iter()
        .map(|f| {
            json!({
                "secret_type": f.secret_type.label(),
                "severity": f.severity,
                "file": f.location.file.to_string_lossy(),
                "line": f.location.line,
                "column": f.location.column,
                "masked_value": f.masked_value,
                "confidence": f.confidence,
                "pattern": f.evidence.pattern,
            })
        })
        .collect();

    let data = json!({
        "total_scanners": result.total_scanners,
        "total_secrets": result.total_secrets,
        "by_type": result.by_type,
        "by_severity": result.by_severity,
        "confidence_avg": result.confidence_avg,
        "findings": findings,
    });
    Ok((data, ArtifactPatch::None))
}

async fn tag_image(d: &Dispatcher, state: &WorkflowState, args: &Value) -> Result<(Value, ArtifactPatch)> {
    let build = require_build(state, "tag_image")?.clone();
    let registry = opt_str(args, "registry");
    let tag = opt_str(args, "tag").unwrap_or("latest");

    let base_name = build.image_ref.rsplit_once(':').map(|(name, _)| name).unwrap_or(&build.image_ref);
    let target_ref = match registry {
        Some(r) => format!("{r}/{base_name}:{tag}"),
        None => format!("{base_name}:{tag}"),
    };

    let docker = d.collaborators.docker_client.as_deref().ok_or_else(|| AppError::backend("no docker_client configured"))?;
    docker.tag_image(&build.image_id, &target_ref).await?;

    let artifact = BuildArtifact { image_ref: target_ref.clone(), ..build };
    Ok((json!({ "image_ref": target_ref }), ArtifactPatch::Build(artifact)))
}

async fn push_image(d: &Dispatcher, state: &WorkflowState) -> Result<(Value, ArtifactPatch)> {
    let build = require_build(state, "push_image")?;
    let docker = d.collaborators.docker_client.as_deref().ok_or_else(|| AppError::backend("no docker_client configured"))?;
    docker.push_image(&build.image_ref).await?;
    Ok((json!({ "pushed": true, "image_ref": build.image_ref }), ArtifactPatch::None))
}

async fn generate_k8s_manifests(d: &Dispatcher, state: &WorkflowState, args: &Value, progress: &dyn ProgressEmitter) -> Result<(Value, ArtifactPatch)> {
    let analyze = state.artifacts.analyze.as_ref().expect("precondition checked BuildAndAnalyze before body ran");
    let build = state.artifacts.build.as_ref().expect("precondition checked BuildAndAnalyze before body ran");
    let namespace = opt_str(args, "namespace").unwrap_or("default").to_string();

    let mut context = tera::Context::new();
    context.insert("language", &analyze.language);
    context.insert("framework", &analyze.framework);
    context.insert("image_ref", &build.image_ref);
    context.insert("namespace", &namespace);
    context.insert("port", &analyze.port);

    progress.emit("generate", 0.1, "rendering prompt");
    let sampling = d.collaborators.sampling_client.as_deref().ok_or_else(|| AppError::backend("no sampling_client configured"))?;
    let builtin = templates::BuiltinTemplateProvider;
    let template_provider: &dyn crate::collaborators::TemplateProvider =
        d.collaborators.template_provider.as_deref().unwrap_or(&builtin);

    let outcome = crate::engine::run(
        &d.templates,
        sampling,
        template_provider,
        |content| k8s::validate_manifests(content, "manifests"),
        crate::engine::GenerationRequest {
            generate_template: templates::K8S_GENERATE,
            critique_template: templates::K8S_CRITIQUE,
            context,
            schema: json!({ "type": "object", "properties": { "content": { "type": "string" } }, "required": ["content"] }),
            max_attempts: d.config.server.max_generation_attempts,
        },
    )
    .await?;
    progress.emit("generate", 1.0, "manifests accepted");

    let quality_score = outcome.attempts.last().map(|a| a.validation.quality_score).unwrap_or(0);
    let artifact = K8sArtifact {
        manifests: vec![outcome.content.clone()],
        namespace,
        endpoint: None,
        services: Vec::new(),
        metadata: HashMap::new(),
    };
    let data = json!({ "content": outcome.content, "attempts": outcome.attempts.len(), "quality_score": quality_score });
    Ok((data, ArtifactPatch::K8s(artifact)))
}

fn apply_k8s_manifests(state: &WorkflowState, args: &Value) -> Result<(Value, ArtifactPatch)> {
    let repo_path = require_str(args, "repo_path")?;
    let rel_path = require_str(args, "path")?;
    let content = require_str(args, "content")?;
    let dry_run = opt_bool(args, "dry_run", false);

    let root = Path::new(repo_path);
    let dest = fsops::resolve_in_root(root, rel_path)?;

    if dry_run {
        let plan = fsops::plan_write(&dest, content.as_bytes())?;
        return Ok((serde_json::to_value(plan)?, ArtifactPatch::None));
    }

    let outcome = fsops::atomic_write(&dest, content.as_bytes(), 0o644)?;

    let mut manifests = state.artifacts.k8s.as_ref().map(|k| k.manifests.clone()).unwrap_or_default();
    manifests.push(content.to_string());
    let namespace = state.artifacts.k8s.as_ref().map(|k| k.namespace.clone()).unwrap_or_else(|| "default".to_string());
    let artifact = K8sArtifact { manifests, namespace, endpoint: None, services: Vec::new(), metadata: HashMap::new() };

    let data = json!({ "changed": outcome.changed, "old_hash": outcome.old_hash, "new_hash": outcome.new_hash, "path": rel_path });
    Ok((data, ArtifactPatch::K8s(artifact)))
}

async fn prepare_cluster(d: &Dispatcher, args: &Value) -> Result<(Value, ArtifactPatch)> {
    let cluster_name = opt_str(args, "cluster_name").unwrap_or("default").to_string();
    let namespace = opt_str(args, "namespace").unwrap_or("default").to_string();

    let k8s_client = d.collaborators.k8s_client.as_deref().ok_or_else(|| AppError::backend("no k8s_client configured"))?;
    k8s_client.prepare_namespace(&cluster_name, &namespace).await?;

    Ok((json!({ "cluster_name": cluster_name, "namespace": namespace, "prepared": true }), ArtifactPatch::None))
}

async fn deploy_application(d: &Dispatcher, state: &WorkflowState) -> Result<(Value, ArtifactPatch)> {
    let k8s_artifact = state
        .artifacts
        .k8s
        .as_ref()
        .ok_or_else(|| AppError::precondition(Precondition::K8s.required_tool()))?
        .clone();

    let k8s_client = d.collaborators.k8s_client.as_deref().ok_or_else(|| AppError::backend("no k8s_client configured"))?;
    let applied = k8s_client.apply_manifests(&k8s_artifact.manifests, &k8s_artifact.namespace).await?;

    let artifact = K8sArtifact { services: applied.clone(), ..k8s_artifact };
    Ok((json!({ "applied": applied }), ArtifactPatch::K8s(artifact)))
}

async fn verify_deployment(d: &Dispatcher, state: &WorkflowState, session_id: &str) -> Result<(Value, ArtifactPatch)> {
    let k8s_artifact = state
        .artifacts
        .k8s
        .as_ref()
        .ok_or_else(|| AppError::precondition("deploy_application"))?
        .clone();
    let service = k8s_artifact.services.first().cloned().unwrap_or_else(|| session_id.to_string());

    let k8s_client = d.collaborators.k8s_client.as_deref().ok_or_else(|| AppError::backend("no k8s_client configured"))?;
    let status = k8s_client.deployment_status(&k8s_artifact.namespace, &service).await?;

    let healthy = status.ready_replicas >= status.desired_replicas && status.desired_replicas > 0;
    let artifact = K8sArtifact { endpoint: status.endpoint.clone(), ..k8s_artifact };
    let data = json!({
        "healthy": healthy,
        "ready_replicas": status.ready_replicas,
        "desired_replicas": status.desired_replicas,
        "endpoint": status.endpoint,
    });
    Ok((data, ArtifactPatch::K8s(artifact)))
}

fn default_image_name(repo_path: &str) -> String {
    Path::new(repo_path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.to_lowercase().replace(['_', ' '], "-"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "app".to_string())
}
