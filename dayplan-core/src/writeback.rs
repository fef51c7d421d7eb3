//! Write-back projection: results → field patches for the task store.
//!
//! Pure: this only decides what should change. Applying patches belongs to
//! whoever owns the store connection. Tasks whose id was made up during
//! normalization get no patch, since the store cannot address them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::balancer::FocusPick;
use crate::scheduler_kernel::ScheduleResult;
use crate::task::{Task, TaskStatus};
use crate::time::to_rfc3339_utc;

pub const STATUS_FIELD: &str = "Status";
pub const SCHEDULED_START_FIELD: &str = "Scheduled Start";
pub const SCHEDULED_END_FIELD: &str = "Scheduled End";
pub const NOTES_FIELD: &str = "Notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPatch {
    pub task_id: String,
    pub fields: BTreeMap<String, Value>,
}

impl RecordPatch {
    fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            fields: BTreeMap::new(),
        }
    }

    fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritebackPolicy {
    pub annotate_unscheduled: bool,
    pub unscheduled_note: String,
    pub annotate_ineligible: bool,
}

impl Default for WritebackPolicy {
    fn default() -> Self {
        Self {
            annotate_unscheduled: true,
            unscheduled_note: "Did not fit today".to_string(),
            annotate_ineligible: false,
        }
    }
}

/// Append `note` to existing notes, space separated. A note already present
/// is not repeated.
pub fn append_note(current: Option<&str>, note: &str) -> String {
    match current.map(str::trim).filter(|c| !c.is_empty()) {
        None => note.to_string(),
        Some(c) if c.contains(note) => c.to_string(),
        Some(c) => format!("{c} {note}"),
    }
}

/// Patches in a fixed order: assignments (placement order), then
/// unscheduled (priority order), then ineligible (input order).
pub fn project_schedule(result: &ScheduleResult, policy: &WritebackPolicy) -> Vec<RecordPatch> {
    let mut out = Vec::new();

    for a in &result.assignments {
        if skip_synthetic(&a.task_id, a.synthetic_id) {
            continue;
        }
        out.push(
            RecordPatch::new(&a.task_id)
                .set(STATUS_FIELD, TaskStatus::Scheduled.as_str())
                .set(SCHEDULED_START_FIELD, to_rfc3339_utc(a.start))
                .set(SCHEDULED_END_FIELD, to_rfc3339_utc(a.end)),
        );
    }

    if policy.annotate_unscheduled {
        for t in &result.unscheduled {
            out.extend(note_patch(t, &policy.unscheduled_note));
        }
    }

    if policy.annotate_ineligible {
        for i in &result.ineligible {
            let note = format!("Not planned: {}", i.reason_texts().join("; "));
            out.extend(note_patch(&i.task, &note));
        }
    }

    out
}

/// Promote focus picks to `Today`, clearing any stale schedule window.
pub fn project_focus(picks: &[FocusPick]) -> Vec<RecordPatch> {
    picks
        .iter()
        .filter(|p| !skip_synthetic(&p.task.id, p.task.synthetic_id))
        .map(|p| {
            RecordPatch::new(&p.task.id)
                .set(STATUS_FIELD, TaskStatus::Today.as_str())
                .set(SCHEDULED_START_FIELD, Value::Null)
                .set(SCHEDULED_END_FIELD, Value::Null)
        })
        .collect()
}

fn note_patch(task: &Task, note: &str) -> Option<RecordPatch> {
    if skip_synthetic(&task.id, task.synthetic_id) {
        return None;
    }
    Some(RecordPatch::new(&task.id).set(NOTES_FIELD, append_note(task.notes.as_deref(), note)))
}

fn skip_synthetic(task_id: &str, synthetic: bool) -> bool {
    if synthetic {
        warn!(task = %task_id, "no store record for made-up id; patch skipped");
    }
    synthetic
}
