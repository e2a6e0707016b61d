//! Typed workflow state and the codec that moves it in and out of a
//! session's generic metadata map (component F).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{AppError, Result};

/// Reserved key under which the workflow state lives in a session's metadata map.
pub const WORKFLOW_STATE_KEY: &str = "workflow_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Started,
    InProgress,
    Error,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeArtifact {
    pub repo_path: String,
    pub language: String,
    pub framework: Option<String>,
    pub port: Option<u16>,
    pub build_command: Option<String>,
    pub start_command: Option<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerfileMetadata {
    pub exposed_port: Option<u16>,
    pub build_stage_count: u32,
    pub security_features: Vec<String>,
    pub optimization_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerfileArtifact {
    pub content: String,
    pub path: String,
    pub base_image: String,
    pub metadata: DockerfileMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub image_id: String,
    pub image_ref: String,
    pub size_bytes: u64,
    pub build_time_ms: u64,
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sArtifact {
    pub manifests: Vec<String>,
    pub namespace: String,
    pub endpoint: Option<String>,
    pub services: Vec<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanArtifact {
    pub counts_by_severity: HashMap<String, u32>,
    pub scan_timestamp: DateTime<Utc>,
    pub scanner_name: String,
    pub total_findings: u32,
}

/// Artifacts produced by the workflow's steps. Absent fields mean "not yet
/// produced" rather than "produced empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyze: Option<AnalyzeArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<DockerfileArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k8s: Option<K8sArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub session_id: String,
    pub workflow_id: String,
    pub step: String,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowError {
    pub step: String,
    pub attempt: u32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub repo_path: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[serde(default)]
    pub failed_steps: Vec<String>,
    #[serde(default)]
    pub skip_steps: Vec<String>,
    #[serde(default)]
    pub artifacts: Artifacts,
    pub metadata: WorkflowMetadata,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<WorkflowError>,
}

impl WorkflowState {
    pub fn new(session_id: &str, repo_path: impl Into<String>) -> Self {
        WorkflowState {
            repo_path: repo_path.into(),
            status: WorkflowStatus::Initialized,
            current_step: String::new(),
            completed_steps: Vec::new(),
            failed_steps: Vec::new(),
            skip_steps: Vec::new(),
            artifacts: Artifacts::default(),
            metadata: WorkflowMetadata {
                session_id: session_id.to_string(),
                workflow_id: session_id.to_string(),
                step: String::new(),
                timestamp: Utc::now(),
                version: 1,
                tags: HashMap::new(),
            },
            error: None,
        }
    }

    /// Records a successfully completed step: removes it from `failed_steps`
    /// if present and appends it to `completed_steps` exactly once.
    pub fn mark_completed(&mut self, step: &str) {
        self.failed_steps.retain(|s| s != step);
        if !self.completed_steps.iter().any(|s| s == step) {
            self.completed_steps.push(step.to_string());
        }
        self.current_step = step.to_string();
        self.error = None;
        self.status = WorkflowStatus::InProgress;
        self.touch();
    }

    /// Records a failed step: removes it from `completed_steps` if present
    /// and appends it to `failed_steps` exactly once.
    pub fn mark_failed(&mut self, step: &str, attempt: u32, message: impl Into<String>) {
        self.completed_steps.retain(|s| s != step);
        if !self.failed_steps.iter().any(|s| s == step) {
            self.failed_steps.push(step.to_string());
        }
        self.error = Some(WorkflowError {
            step: step.to_string(),
            attempt,
            message: message.into(),
        });
        self.status = WorkflowStatus::Error;
        self.touch();
    }

    fn touch(&mut self) {
        self.metadata.timestamp = Utc::now();
        self.metadata.version += 1;
        self.metadata.step = self.current_step.clone();
    }
}

/// The full metadata document persisted for a session: arbitrary
/// host-supplied fields plus the reserved [`WORKFLOW_STATE_KEY`] entry.
/// `extra` preserves unknown fields verbatim across a decode/encode
/// round-trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_state: Option<WorkflowState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decodes a generic JSON metadata map into typed [`SessionMetadata`].
pub fn decode(value: &Value) -> Result<SessionMetadata> {
    serde_json::from_value(value.clone()).map_err(AppError::from)
}

/// Encodes [`SessionMetadata`] back into a generic JSON value, preserving
/// whatever unknown fields it was decoded with.
pub fn encode(metadata: &SessionMetadata) -> Result<Value> {
    serde_json::to_value(metadata).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_completed_then_failed_keeps_sets_disjoint() {
        let mut state = WorkflowState::new("wf_1", "/repo");
        state.mark_completed("analyze_repository");
        assert_eq!(state.completed_steps, vec!["analyze_repository"]);

        state.mark_failed("analyze_repository", 1, "boom");
        assert!(state.completed_steps.is_empty());
        assert_eq!(state.failed_steps, vec!["analyze_repository"]);
        assert_eq!(state.status, WorkflowStatus::Error);
    }

    #[test]
    fn codec_round_trips_unknown_fields() {
        let mut raw = Map::new();
        raw.insert("custom_tag".to_string(), Value::String("hello".to_string()));
        let state = WorkflowState::new("wf_2", "/repo");
        raw.insert(
            WORKFLOW_STATE_KEY.to_string(),
            serde_json::to_value(&state).unwrap(),
        );

        let decoded = decode(&Value::Object(raw.clone())).unwrap();
        assert!(decoded.workflow_state.is_some());
        assert_eq!(
            decoded.extra.get("custom_tag"),
            Some(&Value::String("hello".to_string()))
        );

        let re_encoded = encode(&decoded).unwrap();
        assert_eq!(re_encoded.get("custom_tag"), raw.get("custom_tag"));
    }
}
