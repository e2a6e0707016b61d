//! Collaborator traits: narrow async seams the dispatcher calls through for
//! anything that needs a network, a subprocess, or an LLM sampling round
//! trip. Keeping these as traits (rather than baking concrete clients into
//! the tool bodies) is what makes `src/engine` and the orchestration tools
//! testable without Docker or a cluster on hand.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::validate::Severity;

/// Schema-constrained generation: given a prompt and a JSON schema, returns
/// a value the caller can assume validates against that schema. Backs the
/// generate-validate-critique engine's generation and critique calls alike.
#[async_trait]
pub trait SamplingClient: Send + Sync {
    async fn sample(&self, prompt: &str, schema: &Value) -> Result<Value>;
}

/// Resolves named templates to their source text. Implementations may read
/// from disk, an embedded bundle, or a remote template store.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    async fn template(&self, name: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub image_id: String,
    pub size_bytes: u64,
    pub build_time_ms: u64,
    pub layers: Vec<String>,
}

/// Container build/push/tag operations. The real implementation shells out
/// to a Docker-compatible daemon; tests use an in-memory fake.
#[async_trait]
pub trait DockerClient: Send + Sync {
    async fn image_exists(&self, image_ref: &str) -> Result<bool>;
    async fn build_image(&self, context_dir: &str, dockerfile_path: &str, image_name: &str) -> Result<BuildOutcome>;
    async fn tag_image(&self, image_id: &str, target_ref: &str) -> Result<()>;
    async fn push_image(&self, image_ref: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct DeploymentStatus {
    pub ready_replicas: u32,
    pub desired_replicas: u32,
    pub endpoint: Option<String>,
}

/// Cluster operations: namespace/context prep, manifest application, and
/// deployment health checks.
#[async_trait]
pub trait KubernetesClient: Send + Sync {
    async fn prepare_namespace(&self, cluster_name: &str, namespace: &str) -> Result<()>;
    async fn apply_manifests(&self, manifests: &[String], namespace: &str) -> Result<Vec<String>>;
    async fn deployment_status(&self, namespace: &str, service: &str) -> Result<DeploymentStatus>;
}

#[derive(Debug, Clone)]
pub struct ImageFinding {
    pub severity: Severity,
    pub code: String,
    pub package: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImageScanReport {
    pub findings: Vec<ImageFinding>,
    pub counts_by_severity: HashMap<String, u32>,
}

/// Image vulnerability scanning, kept separate from the repo-local secrets
/// scanner (`crate::scan`) since it operates on a built image rather than
/// source files and is backed by a different kind of tool entirely.
#[async_trait]
pub trait CertScanner: Send + Sync {
    async fn scan_image(&self, image_ref: &str) -> Result<ImageScanReport>;
}

/// The full set of collaborators a dispatcher is constructed with. Each
/// field is optional so a host can wire up only the backends it has
/// credentials or binaries for; `catalog::validate_dependencies` checks a
/// tool's declared dependencies against this bundle's present fields before
/// the dispatcher is ever handed a request.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub sampling_client: Option<std::sync::Arc<dyn SamplingClient>>,
    pub template_provider: Option<std::sync::Arc<dyn TemplateProvider>>,
    pub docker_client: Option<std::sync::Arc<dyn DockerClient>>,
    pub k8s_client: Option<std::sync::Arc<dyn KubernetesClient>>,
    pub cert_scanner: Option<std::sync::Arc<dyn CertScanner>>,
}

impl Collaborators {
    /// Names of the collaborators actually present, matching the strings
    /// `catalog::ToolConfig::dependencies` uses.
    pub fn available(&self) -> std::collections::HashSet<&'static str> {
        let mut set = std::collections::HashSet::new();
        if self.sampling_client.is_some() {
            set.insert("sampling_client");
        }
        if self.docker_client.is_some() {
            set.insert("docker_client");
        }
        if self.k8s_client.is_some() {
            set.insert("k8s_client");
        }
        if self.cert_scanner.is_some() {
            set.insert("cert_scanner");
        }
        set
    }
}

/// Inert collaborator implementations for backends a deployment hasn't
/// wired up yet. `Collaborators::available()` reports these names as
/// present (so `catalog::validate_dependencies` is satisfied and the tool
/// stays listed), but every call fails with a `Backend` error naming the
/// config knob that would replace it. This keeps the server runnable with
/// zero external infrastructure while still surfacing a clear error instead
/// of a missing tool or a silent no-op the moment a host calls one.
pub mod unconfigured {
    use super::*;

    pub struct UnconfiguredSampling;

    #[async_trait]
    impl SamplingClient for UnconfiguredSampling {
        async fn sample(&self, _prompt: &str, _schema: &Value) -> Result<Value> {
            Err(crate::error::AppError::backend(
                "no sampling_client configured: this deployment has no LLM backend wired up for generate_dockerfile/generate_k8s_manifests",
            ))
        }
    }

    pub struct UnconfiguredDocker;

    #[async_trait]
    impl DockerClient for UnconfiguredDocker {
        async fn image_exists(&self, _image_ref: &str) -> Result<bool> {
            Err(crate::error::AppError::backend("no docker_client configured"))
        }

        async fn build_image(&self, _context_dir: &str, _dockerfile_path: &str, _image_name: &str) -> Result<BuildOutcome> {
            Err(crate::error::AppError::backend("no docker_client configured: build_image/tag_image/push_image need a container daemon"))
        }

        async fn tag_image(&self, _image_id: &str, _target_ref: &str) -> Result<()> {
            Err(crate::error::AppError::backend("no docker_client configured"))
        }

        async fn push_image(&self, _image_ref: &str) -> Result<()> {
            Err(crate::error::AppError::backend("no docker_client configured"))
        }
    }

    pub struct UnconfiguredKubernetes;

    #[async_trait]
    impl KubernetesClient for UnconfiguredKubernetes {
        async fn prepare_namespace(&self, _cluster_name: &str, _namespace: &str) -> Result<()> {
            Err(crate::error::AppError::backend("no k8s_client configured: prepare_cluster/deploy_application/verify_deployment need a cluster context"))
        }

        async fn apply_manifests(&self, _manifests: &[String], _namespace: &str) -> Result<Vec<String>> {
            Err(crate::error::AppError::backend("no k8s_client configured"))
        }

        async fn deployment_status(&self, _namespace: &str, _service: &str) -> Result<DeploymentStatus> {
            Err(crate::error::AppError::backend("no k8s_client configured"))
        }
    }

    pub struct UnconfiguredCertScanner;

    #[async_trait]
    impl CertScanner for UnconfiguredCertScanner {
        async fn scan_image(&self, _image_ref: &str) -> Result<ImageScanReport> {
            Err(crate::error::AppError::backend("no cert_scanner configured: scan_image needs an image vulnerability scanner"))
        }
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;
    use std::sync::Mutex;

    pub struct FakeSamplingClient {
        pub responses: Mutex<Vec<Value>>,
    }

    impl FakeSamplingClient {
        pub fn new(responses: Vec<Value>) -> Self {
            Self { responses: Mutex::new(responses) }
        }
    }

    #[async_trait]
    impl SamplingClient for FakeSamplingClient {
        async fn sample(&self, _prompt: &str, _schema: &Value) -> Result<Value> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(crate::error::AppError::backend("fake sampling client exhausted"));
            }
            Ok(responses.remove(0))
        }
    }

    pub struct FakeTemplateProvider {
        pub templates: HashMap<String, String>,
    }

    #[async_trait]
    impl TemplateProvider for FakeTemplateProvider {
        async fn template(&self, name: &str) -> Result<String> {
            self.templates
                .get(name)
                .cloned()
                .ok_or_else(|| crate::error::AppError::NotFound(format!("template '{name}'")))
        }
    }

    #[derive(Default)]
    pub struct FakeDockerClient;

    #[async_trait]
    impl DockerClient for FakeDockerClient {
        async fn image_exists(&self, _image_ref: &str) -> Result<bool> {
            Ok(false)
        }

        async fn build_image(&self, _context_dir: &str, _dockerfile_path: &str, image_name: &str) -> Result<BuildOutcome> {
            Ok(BuildOutcome {
                image_id: format!("sha256:fake-{image_name}"),
                size_bytes: 42_000_000,
                build_time_ms: 1200,
                layers: vec!["layer1".to_string(), "layer2".to_string()],
            })
        }

        async fn tag_image(&self, _image_id: &str, _target_ref: &str) -> Result<()> {
            Ok(())
        }

        async fn push_image(&self, _image_ref: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeKubernetesClient;

    #[async_trait]
    impl KubernetesClient for FakeKubernetesClient {
        async fn prepare_namespace(&self, _cluster_name: &str, _namespace: &str) -> Result<()> {
            Ok(())
        }

        async fn apply_manifests(&self, manifests: &[String], _namespace: &str) -> Result<Vec<String>> {
            Ok((0..manifests.len()).map(|i| format!("applied-{i}")).collect())
        }

        async fn deployment_status(&self, _namespace: &str, _service: &str) -> Result<DeploymentStatus> {
            Ok(DeploymentStatus {
                ready_replicas: 1,
                desired_replicas: 1,
                endpoint: Some("http://fake.local".to_string()),
            })
        }
    }

    #[derive(Default)]
    pub struct FakeCertScanner;

    #[async_trait]
    impl CertScanner for FakeCertScanner {
        async fn scan_image(&self, _image_ref: &str) -> Result<ImageScanReport> {
            Ok(ImageScanReport::default())
        }
    }
}
