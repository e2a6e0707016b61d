//! Dispatcher-level integration tests: drives `Dispatcher::dispatch` through
//! chained tool calls the way an MCP host actually would, with locally-defined
//! fake collaborators standing in for Docker/Kubernetes/an LLM sampler. Unlike
//! the in-module unit tests (which exercise one component at a time), these
//! confirm the catalog, session store, and tool bodies agree with each other
//! end to end.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use syncable_mcp::collaborators::{
    BuildOutcome, CertScanner, Collaborators, DeploymentStatus, DockerClient, ImageScanReport, KubernetesClient,
    SamplingClient,
};
use syncable_mcp::config::types::Config;
use syncable_mcp::progress::NullEmitter;
use syncable_mcp::{Dispatcher, Result};

/// Always returns a minimal valid Dockerfile on the first call.
struct FakeSampler;

#[async_trait]
impl SamplingClient for FakeSampler {
    async fn sample(&self, _prompt: &str, _schema: &Value) -> Result<Value> {
        Ok(json!({
            "content": "FROM node:20-slim\nWORKDIR /app\nCOPY . .\nRUN npm ci\nUSER node\nHEALTHCHECK CMD curl -f http://localhost:3000/health || exit 1\nCMD [\"node\", \"index.js\"]\n"
        }))
    }
}

/// Fails validation on the first attempt, then returns a clean draft — used
/// to exercise the engine's critique loop from the dispatcher's side.
struct FlakySampler {
    calls: AtomicUsize,
}

#[async_trait]
impl SamplingClient for FlakySampler {
    async fn sample(&self, _prompt: &str, _schema: &Value) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Ok(json!({ "content": "RUN npm ci\n" }))
        } else {
            Ok(json!({
                "content": "FROM node:20-slim\nWORKDIR /app\nCOPY . .\nRUN npm ci\nUSER node\nHEALTHCHECK CMD curl -f http://localhost:3000/health || exit 1\nCMD [\"node\", \"index.js\"]\n"
            }))
        }
    }
}

struct FakeDocker;

#[async_trait]
impl DockerClient for FakeDocker {
    async fn image_exists(&self, _image_ref: &str) -> Result<bool> {
        Ok(false)
    }

    async fn build_image(&self, _context_dir: &str, _dockerfile_path: &str, _image_name: &str) -> Result<BuildOutcome> {
        Ok(BuildOutcome { image_id: "sha256:fake".to_string(), size_bytes: 1024, build_time_ms: 50, layers: vec!["layer1".to_string()] })
    }

    async fn tag_image(&self, _image_id: &str, _target_ref: &str) -> Result<()> {
        Ok(())
    }

    async fn push_image(&self, _image_ref: &str) -> Result<()> {
        Ok(())
    }
}

struct FakeK8s;

#[async_trait]
impl KubernetesClient for FakeK8s {
    async fn prepare_namespace(&self, _cluster_name: &str, _namespace: &str) -> Result<()> {
        Ok(())
    }

    async fn apply_manifests(&self, manifests: &[String], _namespace: &str) -> Result<Vec<String>> {
        Ok(manifests.iter().map(|_| "applied".to_string()).collect())
    }

    async fn deployment_status(&self, _namespace: &str, _service: &str) -> Result<DeploymentStatus> {
        Ok(DeploymentStatus { ready_replicas: 2, desired_replicas: 2, endpoint: Some("http://fake.local".to_string()) })
    }
}

struct FakeCertScanner;

#[async_trait]
impl CertScanner for FakeCertScanner {
    async fn scan_image(&self, _image_ref: &str) -> Result<ImageScanReport> {
        Ok(ImageScanReport::default())
    }
}

fn write_node_fixture(dir: &std::path::Path) {
    fs::write(
        dir.join("package.json"),
        r#"{"name": "demo", "version": "1.0.0", "scripts": {"start": "node index.js", "build": "true"}}"#,
    )
    .unwrap();
    fs::write(dir.join("index.js"), "console.log('hello');\n").unwrap();
}

fn dispatcher_with(sampling: Arc<dyn SamplingClient>) -> Dispatcher {
    let collaborators = Collaborators {
        sampling_client: Some(sampling),
        template_provider: None,
        docker_client: Some(Arc::new(FakeDocker)),
        k8s_client: Some(Arc::new(FakeK8s)),
        cert_scanner: Some(Arc::new(FakeCertScanner)),
    };
    Dispatcher::new(collaborators, Config::default()).expect("catalog lints and dependencies are valid")
}

#[tokio::test]
async fn happy_path_chain_through_dockerfile_generation() {
    let fixture = tempfile::tempdir().unwrap();
    write_node_fixture(fixture.path());
    let dispatcher = dispatcher_with(Arc::new(FakeSampler));
    let progress = NullEmitter;

    let start = dispatcher
        .dispatch("start_workflow", json!({ "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    assert!(start.success, "start_workflow failed: {:?}", start.error);
    let session_id = start.data["session_id"].as_str().unwrap().to_string();

    let analyze = dispatcher
        .dispatch("analyze_repository", json!({ "session_id": session_id, "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    assert!(analyze.success, "analyze_repository failed: {:?}", analyze.error);
    assert_eq!(analyze.chain_hint.as_ref().unwrap().next_tool, "generate_dockerfile");

    let generate = dispatcher.dispatch("generate_dockerfile", json!({ "session_id": session_id }), &progress).await;
    assert!(generate.success, "generate_dockerfile failed: {:?}", generate.error);
    assert!(generate.data["content"].as_str().unwrap().contains("FROM node"));
    assert_eq!(generate.chain_hint.as_ref().unwrap().next_tool, "apply_dockerfile");

    let status = dispatcher.dispatch("workflow_status", json!({ "session_id": session_id }), &progress).await;
    assert!(status.success);
    let completed = status.data["completed_steps"].as_array().unwrap();
    let completed: Vec<&str> = completed.iter().map(|v| v.as_str().unwrap()).collect();
    assert!(completed.contains(&"analyze_repository"));
    assert!(completed.contains(&"generate_dockerfile"));
}

#[tokio::test]
async fn precondition_failure_names_the_missing_step() {
    let fixture = tempfile::tempdir().unwrap();
    write_node_fixture(fixture.path());
    let dispatcher = dispatcher_with(Arc::new(FakeSampler));
    let progress = NullEmitter;

    let start = dispatcher
        .dispatch("start_workflow", json!({ "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    let session_id = start.data["session_id"].as_str().unwrap().to_string();

    dispatcher
        .dispatch("analyze_repository", json!({ "session_id": session_id, "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;

    let build = dispatcher.dispatch("build_image", json!({ "session_id": session_id }), &progress).await;
    assert!(!build.success);
    let err = build.error.expect("build_image before generate_dockerfile must fail");
    assert_eq!(err.code, "PreconditionFailed");
    assert!(err.message.contains("generate_dockerfile"));
    let hint = build.chain_hint.expect("precondition failure should point back at the missing step");
    assert_eq!(hint.next_tool, "generate_dockerfile");

    let status = dispatcher.dispatch("workflow_status", json!({ "session_id": session_id }), &progress).await;
    let failed = status.data["failed_steps"].as_array().unwrap();
    let failed: Vec<&str> = failed.iter().map(|v| v.as_str().unwrap()).collect();
    assert!(failed.contains(&"build_image"));
}

#[tokio::test]
async fn generate_dockerfile_retries_past_a_bad_first_draft() {
    let fixture = tempfile::tempdir().unwrap();
    write_node_fixture(fixture.path());
    let dispatcher = dispatcher_with(Arc::new(FlakySampler { calls: AtomicUsize::new(0) }));
    let progress = NullEmitter;

    let start = dispatcher
        .dispatch("start_workflow", json!({ "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    let session_id = start.data["session_id"].as_str().unwrap().to_string();
    dispatcher
        .dispatch("analyze_repository", json!({ "session_id": session_id, "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;

    let generate = dispatcher.dispatch("generate_dockerfile", json!({ "session_id": session_id }), &progress).await;
    assert!(generate.success, "expected the critique loop to recover: {:?}", generate.error);
    assert_eq!(generate.data["attempts"].as_u64().unwrap(), 2);
}

#[tokio::test]
async fn build_tag_push_chain_uses_the_fake_docker_client() {
    let fixture = tempfile::tempdir().unwrap();
    write_node_fixture(fixture.path());
    let dispatcher = dispatcher_with(Arc::new(FakeSampler));
    let progress = NullEmitter;

    let start = dispatcher
        .dispatch("start_workflow", json!({ "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    let session_id = start.data["session_id"].as_str().unwrap().to_string();
    dispatcher
        .dispatch("analyze_repository", json!({ "session_id": session_id, "repo_path": fixture.path().to_string_lossy() }), &progress)
        .await;
    dispatcher.dispatch("generate_dockerfile", json!({ "session_id": session_id }), &progress).await;
    dispatcher.dispatch("apply_dockerfile", json!({ "session_id": session_id, "repo_path": fixture.path().to_string_lossy(), "content": "FROM node:20-slim\n" }), &progress).await;

    let build = dispatcher.dispatch("build_image", json!({ "session_id": session_id }), &progress).await;
    assert!(build.success, "build_image failed: {:?}", build.error);
    assert_eq!(build.data["image_id"], "sha256:fake");

    let tag = dispatcher.dispatch("tag_image", json!({ "session_id": session_id, "registry": "registry.example.com", "tag": "v1" }), &progress).await;
    assert!(tag.success, "tag_image failed: {:?}", tag.error);

    let push = dispatcher.dispatch("push_image", json!({ "session_id": session_id }), &progress).await;
    assert!(push.success, "push_image failed: {:?}", push.error);
}
