//! Session-scoped workflow state with concurrent-safe updates (components
//! E and F): a durable per-session record of which steps ran, what they
//! produced, and where the workflow currently stands.

pub mod state;
pub mod store;

pub use state::{
    AnalyzeArtifact, Artifacts, BuildArtifact, DockerfileArtifact, DockerfileMetadata,
    K8sArtifact, ScanArtifact, WorkflowError, WorkflowMetadata, WorkflowState, WorkflowStatus,
};
pub use store::{SessionId, SessionStore, new_session_id};
