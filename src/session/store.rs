//! Concurrent session store (component E).
//!
//! The outer [`DashMap`] gives lock-free concurrency across sessions; the
//! per-entry [`Mutex`] gives the linearizable per-session updates the
//! dispatcher depends on. Mutation always goes through
//! [`SessionStore::update_workflow_state`] so a mutator that returns an
//! error discards its own partial edits instead of being written back.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

use super::state::{self, SessionMetadata, WorkflowState};
use crate::error::{AppError, Result};

pub type SessionId = String;

pub fn new_session_id() -> SessionId {
    format!("wf_{}", uuid::Uuid::new_v4())
}

#[derive(Debug, Default)]
pub struct SessionRecord {
    metadata: SessionMetadata,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<SessionRecord>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently tracked, for `server_status`.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Idempotent session creation: returns the existing entry if present,
    /// otherwise atomically inserts a fresh one via `DashMap::entry`.
    pub fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionRecord>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionRecord::default())))
            .clone()
    }

    /// Returns a consistent snapshot of the session's workflow state.
    /// `NotFound` if the session (or its workflow state) doesn't exist yet.
    pub fn get_workflow_state(&self, session_id: &str) -> Result<WorkflowState> {
        let entry = self
            .sessions
            .get(session_id)
            .ok_or_else(|| AppError::NotFound(session_id.to_string()))?;
        let record = entry.lock();
        record
            .metadata
            .workflow_state
            .clone()
            .ok_or_else(|| AppError::NotFound(session_id.to_string()))
    }

    /// Runs `mutator` against the session's current workflow state under an
    /// exclusive per-session lock, writing the result back only if `mutator`
    /// succeeds. Creates fresh state (via `default_repo_path`) if the
    /// session has none yet.
    pub fn update_workflow_state<F>(
        &self,
        session_id: &str,
        default_repo_path: Option<&str>,
        mutator: F,
    ) -> Result<WorkflowState>
    where
        F: FnOnce(&mut WorkflowState) -> Result<()>,
    {
        let entry = self.get_or_create(session_id);
        let mut record = entry.lock();

        let mut state = record
            .metadata
            .workflow_state
            .clone()
            .unwrap_or_else(|| WorkflowState::new(session_id, default_repo_path.unwrap_or("")));

        mutator(&mut state)?;

        record.metadata.workflow_state = Some(state.clone());
        Ok(state)
    }

    /// Returns the full generic metadata document for a session (workflow
    /// state plus any host-supplied extra fields), encoded as JSON.
    pub fn get_metadata(&self, session_id: &str) -> Result<Value> {
        let entry = self
            .sessions
            .get(session_id)
            .ok_or_else(|| AppError::NotFound(session_id.to_string()))?;
        let record = entry.lock();
        state::encode(&record.metadata)
    }

    /// Merges host-supplied metadata fields into the session, leaving
    /// `workflow_state` untouched unless the caller explicitly set it.
    pub fn merge_metadata(&self, session_id: &str, patch: Value) -> Result<()> {
        let entry = self.get_or_create(session_id);
        let mut record = entry.lock();
        let mut current = state::encode(&record.metadata)?;
        merge_json(&mut current, patch);
        record.metadata = state::decode(&current)?;
        Ok(())
    }
}

fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                merge_json(base_map.entry(k).or_insert(Value::Null), v);
            }
        }
        (base_slot, patch_value) => {
            *base_slot = patch_value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn get_workflow_state_on_missing_session_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get_workflow_state("wf_missing"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn update_creates_state_on_first_touch() {
        let store = SessionStore::new();
        let state = store
            .update_workflow_state("wf_1", Some("/repo"), |s| {
                s.mark_completed("analyze_repository");
                Ok(())
            })
            .unwrap();
        assert_eq!(state.repo_path, "/repo");
        assert_eq!(state.completed_steps, vec!["analyze_repository"]);

        let snapshot = store.get_workflow_state("wf_1").unwrap();
        assert_eq!(snapshot.completed_steps, vec!["analyze_repository"]);
    }

    #[test]
    fn failed_mutator_discards_partial_edits() {
        let store = SessionStore::new();
        store
            .update_workflow_state("wf_2", Some("/repo"), |s| {
                s.mark_completed("analyze_repository");
                Ok(())
            })
            .unwrap();

        let result = store.update_workflow_state("wf_2", None, |s| {
            s.mark_completed("generate_dockerfile");
            Err(AppError::backend("sampler unavailable"))
        });
        assert!(result.is_err());

        let snapshot = store.get_workflow_state("wf_2").unwrap();
        assert_eq!(snapshot.completed_steps, vec!["analyze_repository"]);
    }

    #[test]
    fn concurrent_updates_on_one_session_are_linearizable() {
        let store = Arc::new(SessionStore::new());
        let n = 32;
        let barrier = Arc::new(Barrier::new(n));
        let mut handles = Vec::new();

        for i in 0..n {
            let store = store.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                store
                    .update_workflow_state("wf_concurrent", Some("/repo"), |s| {
                        s.metadata.tags.insert(format!("writer_{i}"), "done".to_string());
                        Ok(())
                    })
                    .unwrap();
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        let state = store.get_workflow_state("wf_concurrent").unwrap();
        assert_eq!(state.metadata.tags.len(), n);
    }

    #[test]
    fn cross_session_updates_do_not_interfere() {
        let store = SessionStore::new();
        store
            .update_workflow_state("wf_a", Some("/a"), |s| {
                s.mark_completed("step_a");
                Ok(())
            })
            .unwrap();
        store
            .update_workflow_state("wf_b", Some("/b"), |s| {
                s.mark_completed("step_b");
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get_workflow_state("wf_a").unwrap().repo_path, "/a");
        assert_eq!(store.get_workflow_state("wf_b").unwrap().repo_path, "/b");
    }
}
