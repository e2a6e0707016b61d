//! Generate-validate-critique engine (component I).
//!
//! Each artifact kind (Dockerfile, Kubernetes manifests) is generated by the
//! same bounded loop: render a prompt from a template, ask the sampling
//! client for a schema-constrained draft, validate it with the matching
//! offline validator, and if it fails, render a critique prompt carrying the
//! validator's findings and retry. Templates are rendered through a single
//! shared [`tera::Tera`] registry so a template is parsed once no matter how
//! many attempts or tool invocations use it.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::collaborators::{SamplingClient, TemplateProvider};
use crate::error::{AppError, Result};
use crate::validate::ValidationResult;

/// One attempt of the generate-validate-critique loop.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub attempt: u32,
    pub content: String,
    pub validation: ValidationResult,
}

/// Outcome of a completed run: the accepted content plus every attempt made,
/// so callers can surface "it took 2 tries" in a response or log.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub content: String,
    pub attempts: Vec<Attempt>,
}

/// A template registry shared by every engine invocation in a process.
/// Templates are fetched from a [`TemplateProvider`] on first use and then
/// cached in the underlying [`Tera`] instance; later renders of the same
/// template name skip the provider and the parse step entirely.
pub struct TemplateRegistry {
    tera: Mutex<Tera>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        TemplateRegistry { tera: Mutex::new(Tera::default()) }
    }

    async fn render(
        &self,
        provider: &dyn TemplateProvider,
        name: &str,
        context: &Context,
    ) -> Result<String> {
        let already_loaded = self.tera.lock().get_template_names().any(|t| t == name);
        if !already_loaded {
            let source = provider.template(name).await?;
            self.tera
                .lock()
                .add_raw_template(name, &source)
                .map_err(|e| AppError::backend(format!("template '{name}' failed to parse: {e}")))?;
        }
        self.tera
            .lock()
            .render(name, context)
            .map_err(|e| AppError::backend(format!("template '{name}' failed to render: {e}")))
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters for one generate-validate-critique run.
pub struct GenerationRequest<'a> {
    pub generate_template: &'a str,
    pub critique_template: &'a str,
    pub context: Context,
    pub schema: Value,
    pub max_attempts: u32,
}

/// Runs the bounded retry loop and returns the first draft whose validator
/// output has no error-severity findings, or `GenerationFailed` once
/// `max_attempts` is exhausted. The sampling client is expected to return a
/// JSON object with a `content` string field holding the generated artifact;
/// this is the shape every generation template in this crate asks for.
pub async fn run(
    registry: &TemplateRegistry,
    sampling: &dyn SamplingClient,
    templates: &dyn TemplateProvider,
    validator: impl Fn(&str) -> ValidationResult,
    request: GenerationRequest<'_>,
) -> Result<GenerationOutcome> {
    let mut attempts = Vec::new();
    let mut context = request.context;

    for attempt_number in 1..=request.max_attempts {
        let template_name = if attempt_number == 1 {
            request.generate_template
        } else {
            request.critique_template
        };

        let prompt = registry.render(templates, template_name, &context).await?;
        let draft = sampling.sample(&prompt, &request.schema).await?;
        let content = extract_content(&draft)?;

        let validation = validator(&content);
        let passed = validation.is_valid();
        attempts.push(Attempt { attempt: attempt_number, content: content.clone(), validation: validation.clone() });

        if passed {
            return Ok(GenerationOutcome { content, attempts });
        }

        context.insert("previous_content", &content);
        context.insert("findings", &validation.findings);
        context.insert("attempt", &attempt_number);
    }

    Err(AppError::GenerationFailed {
        attempts: request.max_attempts,
        message: attempts
            .last()
            .map(|a| format!("{} error-severity finding(s) remained", a.validation.errors()))
            .unwrap_or_else(|| "no attempts completed".to_string()),
    })
}

fn extract_content(draft: &Value) -> Result<String> {
    draft
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::backend("sampling client response missing string 'content' field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{FakeSamplingClient, FakeTemplateProvider};
    use crate::validate::ResultBuilder;
    use serde_json::json;
    use std::collections::HashMap;

    fn templates() -> FakeTemplateProvider {
        let mut map = HashMap::new();
        map.insert("gen".to_string(), "generate a thing".to_string());
        map.insert("critique".to_string(), "fix: {{ findings | length }} issue(s)".to_string());
        FakeTemplateProvider { templates: map }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt_when_validator_is_clean() {
        let registry = TemplateRegistry::new();
        let sampling = FakeSamplingClient::new(vec![json!({ "content": "FROM scratch" })]);
        let providers = templates();

        let outcome = run(
            &registry,
            &sampling,
            &providers,
            |_content| ResultBuilder::new().build(),
            GenerationRequest {
                generate_template: "gen",
                critique_template: "critique",
                context: Context::new(),
                schema: json!({ "type": "object" }),
                max_attempts: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.content, "FROM scratch");
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds_after_critique() {
        let registry = TemplateRegistry::new();
        let sampling = FakeSamplingClient::new(vec![
            json!({ "content": "bad" }),
            json!({ "content": "good" }),
        ]);
        let providers = templates();

        let outcome = run(
            &registry,
            &sampling,
            &providers,
            |content| {
                let mut builder = ResultBuilder::new();
                if content == "bad" {
                    builder.add_error("X001", "-", "invalid");
                }
                builder.build()
            },
            GenerationRequest {
                generate_template: "gen",
                critique_template: "critique",
                context: Context::new(),
                schema: json!({ "type": "object" }),
                max_attempts: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.content, "good");
        assert_eq!(outcome.attempts.len(), 2);
    }

    #[tokio::test]
    async fn exhausting_attempts_returns_generation_failed() {
        let registry = TemplateRegistry::new();
        let sampling = FakeSamplingClient::new(vec![
            json!({ "content": "bad" }),
            json!({ "content": "bad" }),
        ]);
        let providers = templates();

        let result = run(
            &registry,
            &sampling,
            &providers,
            |_content| {
                let mut builder = ResultBuilder::new();
                builder.add_error("X001", "-", "invalid");
                builder.build()
            },
            GenerationRequest {
                generate_template: "gen",
                critique_template: "critique",
                context: Context::new(),
                schema: json!({ "type": "object" }),
                max_attempts: 2,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::GenerationFailed { attempts: 2, .. })));
    }
}
