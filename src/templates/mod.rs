//! Built-in [`TemplateProvider`] (component I's default collaborator): the
//! four prompt templates the generate-validate-critique engine needs for
//! `generate_dockerfile` and `generate_k8s_manifests`, embedded at compile
//! time so the server has something to render with no host configuration
//! at all. A deployment that wants custom prompts supplies its own
//! `TemplateProvider` instead of this one; the engine itself never cares
//! which implementation it's handed.

use async_trait::async_trait;

use crate::collaborators::TemplateProvider;
use crate::error::{AppError, Result};

pub const DOCKERFILE_GENERATE: &str = "dockerfile_generate";
pub const DOCKERFILE_CRITIQUE: &str = "dockerfile_critique";
pub const K8S_GENERATE: &str = "k8s_generate";
pub const K8S_CRITIQUE: &str = "k8s_critique";

const DOCKERFILE_GENERATE_SRC: &str = r#"Write a production Dockerfile for a {{ language }} project{% if framework %} using {{ framework }}{% endif %}.

Build command: {{ build_command | default(value="none detected") }}
Start command: {{ start_command | default(value="none detected") }}
{% if port %}The application listens on port {{ port }}.{% endif %}
Dependencies: {{ dependencies | join(sep=", ") }}

Requirements:
- Use a multi-stage build when the language has a separate build step.
- Run the application as a non-root user.
- Pin the base image to a specific version, never `:latest`.
- Add a HEALTHCHECK instruction appropriate for this kind of service.
{% if port %}- EXPOSE {{ port }}.{% endif %}

Respond with a JSON object of the form {"content": "<the full Dockerfile text>"}.
"#;

const DOCKERFILE_CRITIQUE_SRC: &str = r#"The Dockerfile you produced on attempt {{ attempt }} failed validation:

{% for finding in findings %}- [{{ finding.severity }}] {{ finding.code }}: {{ finding.message }}
{% endfor %}
Previous attempt:
---
{{ previous_content }}
---

Revise the Dockerfile to resolve every finding above without introducing new ones. Respond with a JSON object of the form {"content": "<the full corrected Dockerfile text>"}.
"#;

const K8S_GENERATE_SRC: &str = r#"Write Kubernetes manifests (a Deployment and a matching Service, as one multi-document YAML file separated by `---`) for a {{ language }} application{% if framework %} built with {{ framework }}{% endif %}.

Image: {{ image_ref }}
Namespace: {{ namespace | default(value="default") }}
{% if port %}Container port: {{ port }}{% endif %}

Requirements:
- Set resource requests and limits on every container.
- Set a readiness and a liveness probe.
- Run as a non-root user with a read-only root filesystem where practical.
- The Service's target port must match the Deployment's container port.

Respond with a JSON object of the form {"content": "<the full multi-document YAML text>"}.
"#;

const K8S_CRITIQUE_SRC: &str = r#"The manifests you produced on attempt {{ attempt }} failed validation:

{% for finding in findings %}- [{{ finding.severity }}] {{ finding.code }}: {{ finding.message }}
{% endfor %}
Previous attempt:
---
{{ previous_content }}
---

Revise the manifests to resolve every finding above without introducing new ones. Respond with a JSON object of the form {"content": "<the full corrected multi-document YAML text>"}.
"#;

/// Serves the four templates above verbatim. `template` never fails for a
/// name in this list; any other name is `NotFound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTemplateProvider;

#[async_trait]
impl TemplateProvider for BuiltinTemplateProvider {
    async fn template(&self, name: &str) -> Result<String> {
        match name {
            DOCKERFILE_GENERATE => Ok(DOCKERFILE_GENERATE_SRC.to_string()),
            DOCKERFILE_CRITIQUE => Ok(DOCKERFILE_CRITIQUE_SRC.to_string()),
            K8S_GENERATE => Ok(K8S_GENERATE_SRC.to_string()),
            K8S_CRITIQUE => Ok(K8S_CRITIQUE_SRC.to_string()),
            other => Err(AppError::NotFound(format!("template '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_all_four_builtin_templates() {
        let provider = BuiltinTemplateProvider;
        for name in [DOCKERFILE_GENERATE, DOCKERFILE_CRITIQUE, K8S_GENERATE, K8S_CRITIQUE] {
            assert!(provider.template(name).await.is_ok());
        }
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let provider = BuiltinTemplateProvider;
        assert!(matches!(provider.template("nope").await, Err(AppError::NotFound(_))));
    }
}
