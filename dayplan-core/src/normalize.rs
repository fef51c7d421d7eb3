//! Task Normalizer: heterogeneous raw records -> canonical `Task`.
//!
//! Records come from the remote table store in two shapes: flat
//! (`{"name": ..., "status": ...}`) or wrapped (`{"id": ..., "fields": {...}}`).
//! Field names drifted over time, so each logical field has an ordered alias
//! list (modern name first, legacy labels after). Lookup order is:
//! modern field -> legacy alias -> hard-coded default.
//!
//! Nothing in here fails. Wrong types, unparseable dates and out-of-range
//! numbers all degrade to the documented default.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

use crate::task::{Energy, Priority, Task, TaskContext, TaskStatus};

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})-(\d{2})-(\d{2})").expect("static date pattern"));

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").expect("static number pattern"));

/// Logical task fields and the raw keys they have been stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Status,
    Priority,
    Energy,
    Context,
    Duration,
    DueDate,
    Project,
    AutoSchedule,
    BlockedBy,
    Notes,
}

impl Field {
    /// Prioritized aliases, most modern first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id", "record_id", "recordId"],
            Field::Name => &["name", "Task Name", "title", "Name"],
            Field::Status => &["status", "Status"],
            Field::Priority => &["priority", "Priority"],
            Field::Energy => &["energy", "Energy Level", "energy_level", "Energy"],
            Field::Context => &["context", "Context"],
            Field::Duration => &[
                "duration_minutes",
                "durationMinutes",
                "Time Estimate",
                "timeEstimate",
                "time",
                "estimate",
            ],
            Field::DueDate => &["due_date", "dueDate", "Due Date", "due"],
            Field::Project => &["project", "Project"],
            Field::AutoSchedule => &["auto_schedule", "autoSchedule", "Auto-Schedule"],
            Field::BlockedBy => &["blocked_by", "blockedBy", "Blocked By"],
            Field::Notes => &["notes", "Notes"],
        }
    }
}

/// A raw record split into its value map and its envelope.
struct RecordView<'a> {
    fields: Option<&'a Map<String, Value>>,
    top: Option<&'a Map<String, Value>>,
}

impl<'a> RecordView<'a> {
    fn new(raw: &'a Value) -> Self {
        let top = raw.as_object();
        let fields = top.and_then(|o| o.get("fields")).and_then(Value::as_object);
        Self { fields, top }
    }

    /// First present value for `field`. Nulls and blank strings count as absent.
    ///
    /// Values live in `fields` when the record is wrapped; identity lives on the
    /// envelope, so `Id` checks the top level first.
    fn lookup(&self, field: Field) -> Option<&'a Value> {
        let layers = if field == Field::Id {
            [self.top, self.fields]
        } else {
            [self.fields, self.top]
        };
        layers.into_iter().flatten().find_map(|map| {
            field
                .aliases()
                .iter()
                .filter_map(|alias| map.get(*alias))
                .find(|v| is_present(v))
        })
    }
}

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Normalize a single record. Missing ids come back empty; use
/// [`normalize_records`] when ids must be unique across a batch.
pub fn normalize_record(raw: &Value) -> Task {
    let view = RecordView::new(raw);

    let id = view.lookup(Field::Id).and_then(scalar_text).unwrap_or_default();
    let name = view
        .lookup(Field::Name)
        .and_then(scalar_text)
        .unwrap_or_else(|| Task::DEFAULT_NAME.to_string());

    let status = match view.lookup(Field::Status) {
        None => TaskStatus::Inbox,
        Some(v) => scalar_text(v)
            .and_then(|s| TaskStatus::from_label(&s))
            .unwrap_or_else(|| {
                debug!(task = %id, raw = %v, "unrecognized status, coercing to Someday");
                TaskStatus::Someday
            }),
    };

    let priority = view
        .lookup(Field::Priority)
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64().and_then(Priority::from_rank),
            other => scalar_text(other).and_then(|s| Priority::from_label(&s)),
        })
        .unwrap_or(Priority::P3);

    let energy = view
        .lookup(Field::Energy)
        .and_then(scalar_text)
        .and_then(|s| Energy::from_label(&s))
        .unwrap_or(Energy::Medium);

    let context = view
        .lookup(Field::Context)
        .and_then(scalar_text)
        .and_then(|s| TaskContext::from_label(&s))
        .unwrap_or(TaskContext::Admin);

    Task {
        id,
        name,
        status,
        priority,
        energy,
        context,
        duration_minutes: coerce_duration(view.lookup(Field::Duration)),
        due_date: view.lookup(Field::DueDate).and_then(parse_date_only),
        project: view.lookup(Field::Project).and_then(first_text),
        auto_schedule: view.lookup(Field::AutoSchedule).is_some_and(coerce_bool),
        blocked_by: view.lookup(Field::BlockedBy).map(id_list).unwrap_or_default(),
        notes: view.lookup(Field::Notes).and_then(scalar_text),
        synthetic_id: false,
    }
}

/// Normalize a batch, guaranteeing unique, non-empty ids.
///
/// Records without an id become `row-{index}`; repeated ids get `#2`, `#3`, ...
/// in input order.
pub fn normalize_records(records: &[Value]) -> Vec<Task> {
    let mut used: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(records.len());

    for (i, raw) in records.iter().enumerate() {
        let mut task = normalize_record(raw);
        if task.id.is_empty() {
            task.id = format!("row-{i}");
            task.synthetic_id = true;
        }
        if used.contains(&task.id) {
            let n = repeats.entry(task.id.clone()).or_insert(1);
            let renamed = loop {
                *n += 1;
                let candidate = format!("{}#{}", task.id, n);
                if !used.contains(&candidate) {
                    break candidate;
                }
            };
            debug!(original = %task.id, renamed = %renamed, "duplicate task id");
            task.id = renamed;
            task.synthetic_id = true;
        }
        used.insert(task.id.clone());
        out.push(task);
    }

    out
}

/// Boolean-like coercion: `true`, case-insensitive "true"/"1"/"yes"/"y"/"on",
/// nonzero numbers. Anything else is false.
pub fn coerce_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "on"
        ),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Parse an ISO `YYYY-MM-DD` prefix. Anything else is `None`.
pub fn parse_date_only(v: &Value) -> Option<NaiveDate> {
    let s = v.as_str()?;
    let caps = DATE_PREFIX.captures(s)?;
    let y: i32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let d: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Missing, non-numeric or non-positive -> 30; otherwise rounded and clamped to `1..=480`.
pub fn coerce_duration(v: Option<&Value>) -> i32 {
    let minutes = v.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_NUMBER
            .captures(s)
            .and_then(|c| c[1].parse::<f64>().ok()),
        _ => None,
    });

    match minutes {
        Some(m) if m.is_finite() && m > 0.0 => {
            (m.round() as i64).clamp(1, Task::MAX_DURATION as i64) as i32
        }
        _ => Task::DEFAULT_DURATION,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Linked-record fields arrive as arrays; take the first usable entry.
fn first_text(v: &Value) -> Option<String> {
    match v {
        Value::Array(items) => items.iter().find_map(scalar_text),
        other => scalar_text(other),
    }
}

fn id_list(v: &Value) -> Vec<String> {
    let raw: Vec<String> = match v {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(o) => o.get("id").and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        other => scalar_text(other).into_iter().collect(),
    };

    let mut seen = HashSet::new();
    raw.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
