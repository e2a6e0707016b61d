//! Progress emitter (component J): a per-invocation stream of weighted-stage
//! progress records. Pluggable so batch callers and tests don't need a live
//! MCP transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// A declared stage and its share of the overall invocation, e.g.
/// `{ name: "analyze", weight: 0.15 }`. Weights across an emitter's stages
/// should sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct StageWeight {
    pub name: &'static str,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub step: String,
    pub total: u32,
    pub stage: String,
    pub percentage: f32,
    pub message: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
}

/// Capability every tool invocation is handed to report progress.
/// `close` is idempotent; callers may invoke it more than once.
pub trait ProgressEmitter: Send + Sync {
    fn emit(&self, stage: &str, fraction: f32, message: &str);
    fn emit_detailed(&self, record: ProgressRecord);
    fn close(&self);
}

/// Discards everything. Used for batch/offline contexts and tests that
/// don't care about progress streaming.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl ProgressEmitter for NullEmitter {
    fn emit(&self, _stage: &str, _fraction: f32, _message: &str) {}
    fn emit_detailed(&self, _record: ProgressRecord) {}
    fn close(&self) {}
}

/// Weighted-stage emitter that hands each record to a caller-supplied sink.
/// `ReportStage` tracks cumulative percentage across the declared stages so
/// a caller reporting "50% through the scan stage" gets the right overall
/// number, not 50% of the whole invocation.
pub struct WeightedProgress<S: Fn(ProgressRecord) + Send + Sync> {
    step: String,
    stages: Vec<StageWeight>,
    sink: S,
    cumulative_before: Vec<f32>,
    current_stage: AtomicU32,
    closed: AtomicBool,
    started_at: DateTime<Utc>,
}

impl<S: Fn(ProgressRecord) + Send + Sync> WeightedProgress<S> {
    pub fn new(step: impl Into<String>, stages: Vec<StageWeight>, sink: S) -> Self {
        let mut cumulative_before = Vec::with_capacity(stages.len());
        let mut running = 0.0;
        for stage in &stages {
            cumulative_before.push(running);
            running += stage.weight;
        }
        WeightedProgress {
            step: step.into(),
            stages,
            sink,
            cumulative_before,
            current_stage: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    fn record(&self, stage_name: &str, percentage: f32, message: &str, status: &str) -> ProgressRecord {
        ProgressRecord {
            step: self.step.clone(),
            total: 100,
            stage: stage_name.to_string(),
            percentage: percentage.clamp(0.0, 100.0),
            message: message.to_string(),
            status: status.to_string(),
            started_at: self.started_at,
        }
    }

    /// Advances into the stage with the given name (searched by name, not
    /// index, so out-of-order calls still land on the right cumulative base)
    /// and reports `fraction` (0.0-1.0) of completion within it.
    pub fn report_stage(&self, stage_name: &str, fraction: f32, message: &str) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let Some(idx) = self.stages.iter().position(|s| s.name == stage_name) else {
            return;
        };
        self.current_stage.store(idx as u32, Ordering::SeqCst);
        let base = self.cumulative_before[idx] * 100.0;
        let contribution = self.stages[idx].weight * fraction.clamp(0.0, 1.0) * 100.0;
        let record = self.record(stage_name, base + contribution, message, "in_progress");
        (self.sink)(record);
    }
}

impl<S: Fn(ProgressRecord) + Send + Sync> ProgressEmitter for WeightedProgress<S> {
    fn emit(&self, stage: &str, fraction: f32, message: &str) {
        self.report_stage(stage, fraction, message);
    }

    fn emit_detailed(&self, record: ProgressRecord) {
        if !self.closed.load(Ordering::SeqCst) {
            (self.sink)(record);
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let record = self.record("finalize", 100.0, "completed", "completed");
        (self.sink)(record);
    }
}

/// Collects every emitted record in order; used by tests that need to
/// assert on the emitted sequence rather than just "something was emitted".
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<ProgressRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> impl Fn(ProgressRecord) + '_ {
        move |record| self.records.lock().unwrap().push(record)
    }

    pub fn records(&self) -> Vec<ProgressRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_stages() -> Vec<StageWeight> {
        vec![
            StageWeight { name: "initialize", weight: 0.10 },
            StageWeight { name: "analyze", weight: 0.15 },
            StageWeight { name: "scan", weight: 0.50 },
            StageWeight { name: "process", weight: 0.20 },
            StageWeight { name: "finalize", weight: 0.05 },
        ]
    }

    #[test]
    fn stage_weights_sum_to_one() {
        let total: f32 = default_stages().iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cumulative_percentage_accounts_for_prior_stages() {
        let sink = RecordingSink::new();
        {
            let emitter = WeightedProgress::new("scan_image", default_stages(), sink.sink());
            emitter.report_stage("initialize", 1.0, "done");
            emitter.report_stage("analyze", 1.0, "done");
            emitter.report_stage("scan", 0.5, "halfway");
        }
        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert!((records[0].percentage - 10.0).abs() < 0.01);
        assert!((records[1].percentage - 25.0).abs() < 0.01);
        assert!((records[2].percentage - 50.0).abs() < 0.01);
    }

    #[test]
    fn close_is_idempotent_and_reports_completion() {
        let sink = RecordingSink::new();
        {
            let emitter = WeightedProgress::new("build_image", default_stages(), sink.sink());
            emitter.close();
            emitter.close();
        }
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "completed");
        assert!((records[0].percentage - 100.0).abs() < 0.01);
    }

    #[test]
    fn null_emitter_emits_nothing() {
        let emitter = NullEmitter;
        emitter.emit("analyze", 0.5, "ignored");
        emitter.close();
    }
}
