//! Canonical task model consumed by the scheduling core.
//!
//! A `Task` is an immutable snapshot; the remote table store owns the mutable
//! record. Every enumerated field is always one of its variants: raw labels are
//! coerced in `crate::normalize`, never stored as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryMap};

/// Lowercase and drop everything but ASCII alphanumerics, so that
/// "This Week", "this_week" and "THIS-WEEK" compare equal.
pub(crate) fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Inbox,
    Today,
    #[serde(rename = "This Week")]
    ThisWeek,
    Scheduled,
    Done,
    Someday,
}

impl TaskStatus {
    pub fn from_label(label: &str) -> Option<Self> {
        match squash(label).as_str() {
            "inbox" | "new" | "todo" => Some(Self::Inbox),
            "today" => Some(Self::Today),
            "thisweek" | "week" => Some(Self::ThisWeek),
            "scheduled" => Some(Self::Scheduled),
            "done" | "complete" | "completed" => Some(Self::Done),
            "someday" | "later" => Some(Self::Someday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Today => "Today",
            Self::ThisWeek => "This Week",
            Self::Scheduled => "Scheduled",
            Self::Done => "Done",
            Self::Someday => "Someday",
        }
    }

    /// Tertiary ordering key: Today < This Week < Scheduled < everything else.
    pub fn planning_rank(&self) -> u8 {
        match self {
            Self::Today => 0,
            Self::ThisWeek => 1,
            Self::Scheduled => 2,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Critical
    P1 = 1,
    /// High
    P2 = 2,
    /// Medium
    P3 = 3,
    /// Low
    P4 = 4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    pub fn from_label(label: &str) -> Option<Self> {
        let s = squash(label);
        match s.as_str() {
            "critical" | "urgent" => return Some(Self::P1),
            "high" => return Some(Self::P2),
            "medium" | "normal" => return Some(Self::P3),
            "low" => return Some(Self::P4),
            _ => {}
        }
        // "p1", "p1critical", "P2-High", ...
        match s.get(..2) {
            Some("p1") => Some(Self::P1),
            Some("p2") => Some(Self::P2),
            Some("p3") => Some(Self::P3),
            Some("p4") => Some(Self::P4),
            _ => None,
        }
    }

    pub fn from_rank(rank: i64) -> Option<Self> {
        match rank {
            1 => Some(Self::P1),
            2 => Some(Self::P2),
            3 => Some(Self::P3),
            4 => Some(Self::P4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Energy {
    High,
    Medium,
    Low,
}

impl Energy {
    pub fn from_label(label: &str) -> Option<Self> {
        match squash(label).as_str() {
            "high" | "h" => Some(Self::High),
            "medium" | "med" | "m" => Some(Self::Medium),
            "low" | "l" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskContext {
    #[serde(rename = "Deep Work")]
    DeepWork,
    Meetings,
    Admin,
    #[serde(rename = "Quick Wins")]
    QuickWins,
}

impl TaskContext {
    pub fn from_label(label: &str) -> Option<Self> {
        match squash(label).as_str() {
            "deepwork" | "deep" | "focus" => Some(Self::DeepWork),
            "meetings" | "meeting" => Some(Self::Meetings),
            "admin" => Some(Self::Admin),
            "quickwins" | "quickwin" | "quick" => Some(Self::QuickWins),
            _ => None,
        }
    }
}

/// Core task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,

    pub status: TaskStatus,
    pub priority: Priority,
    pub energy: Energy,
    pub context: TaskContext,

    /// Minutes, always in `1..=480` after normalization.
    pub duration_minutes: i32,

    pub due_date: Option<NaiveDate>,
    pub project: Option<String>,
    pub auto_schedule: bool,

    /// Ids that must reach `Done` first.
    pub blocked_by: Vec<String>,

    pub notes: Option<String>,

    /// The id was made up during batch normalization (missing or repeated in
    /// the export), so the store has no record under it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic_id: bool,
}

impl Task {
    pub const DEFAULT_NAME: &'static str = "(untitled)";
    pub const DEFAULT_DURATION: i32 = 30;
    pub const MAX_DURATION: i32 = 8 * 60;

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: TaskStatus::Inbox,
            priority: Priority::P3,
            energy: Energy::Medium,
            context: TaskContext::Admin,
            duration_minutes: Self::DEFAULT_DURATION,
            due_date: None,
            project: None,
            auto_schedule: false,
            blocked_by: Vec::new(),
            notes: None,
            synthetic_id: false,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: i32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_energy(mut self, energy: Energy) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_context(mut self, context: TaskContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_auto_schedule(mut self, auto: bool) -> Self {
        self.auto_schedule = auto;
        self
    }

    pub fn blocked_by(mut self, id: impl Into<String>) -> Self {
        self.blocked_by.push(id.into());
        self
    }

    pub fn category(&self, map: &CategoryMap) -> Category {
        map.categorize(self.project.as_deref())
    }

    /// Render the canonical record form. Normalizing it yields `self` again.
    pub fn to_record(&self) -> serde_json::Value {
        // Every field is a plain string/number/bool/array; this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
