//! Time blocks for a single day, and the working-hours template that builds them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::task::{Energy, TaskContext};
use crate::time::{local_to_utc, parse_timezone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[serde(alias = "deep")]
    DeepWork,
    #[serde(alias = "meeting")]
    Meetings,
    Admin,
    QuickWins,
    /// Unconstrained: takes any context.
    Any,
}

impl BlockKind {
    pub fn accepts(&self, context: TaskContext) -> bool {
        match self {
            BlockKind::Any => true,
            BlockKind::DeepWork => context == TaskContext::DeepWork,
            BlockKind::Meetings => context == TaskContext::Meetings,
            BlockKind::Admin => context == TaskContext::Admin,
            BlockKind::QuickWins => context == TaskContext::QuickWins,
        }
    }

    /// Deep-work blocks skip low-energy tasks; admin and quick-win blocks,
    /// which the template puts late in the day, skip high-energy ones.
    pub fn suits(&self, energy: Energy) -> bool {
        match self {
            BlockKind::DeepWork => energy != Energy::Low,
            BlockKind::Admin | BlockKind::QuickWins => energy != Energy::High,
            BlockKind::Meetings | BlockKind::Any => true,
        }
    }
}

/// A fixed interval available for placing tasks today.
///
/// Overlap between blocks is not checked; that is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_kind")]
    pub kind: BlockKind,
}

fn default_kind() -> BlockKind {
    BlockKind::Any
}

impl TimeBlock {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, kind: BlockKind) -> Self {
        Self { start, end, kind }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn validate(&self, index: usize) -> Result<(), ScheduleError> {
        if self.end <= self.start {
            return Err(ScheduleError::InvalidBlock {
                index,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

pub fn validate_blocks(blocks: &[TimeBlock]) -> Result<(), ScheduleError> {
    blocks
        .iter()
        .enumerate()
        .try_for_each(|(i, b)| b.validate(i))
}

/// Working-hours template: AM deep work, a short admin/meetings slot, then a PM
/// deep block no earlier than 14:00 followed by admin/meetings until the end of
/// the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayTemplate {
    pub start_hour: u32,
    pub end_hour: u32,
    pub include_deep_am: bool,
    pub include_admin_am: bool,
    pub include_deep_pm: bool,
    pub include_admin_pm: bool,
    /// Admin slots are booked as meetings when set.
    pub include_meetings: bool,
}

impl Default for DayTemplate {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            include_deep_am: true,
            include_admin_am: true,
            include_deep_pm: true,
            include_admin_pm: true,
            include_meetings: true,
        }
    }
}

impl DayTemplate {
    const PM_EARLIEST_HOUR: u32 = 14;

    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (name, hour) in [("start_hour", self.start_hour), ("end_hour", self.end_hour)] {
            if hour > 24 {
                return Err(ScheduleError::InvalidTemplate(format!(
                    "{name} must be within 0..=24, got {hour}"
                )));
            }
        }
        Ok(())
    }

    /// Hour ranges `(kind, start_hour, end_hour)` before any timezone resolution.
    pub fn hour_ranges(&self) -> Vec<(BlockKind, u32, u32)> {
        let start = self.start_hour.min(self.end_hour);
        let end = self.start_hour.max(self.end_hour);
        let admin_kind = if self.include_meetings {
            BlockKind::Meetings
        } else {
            BlockKind::Admin
        };

        let mut out = Vec::new();

        let am_end = end.min(start + 2);
        if self.include_deep_am && am_end > start {
            out.push((BlockKind::DeepWork, start, am_end));
        }

        let admin_start = end.min(start + 2);
        let admin_end = end.min(start + 3);
        if self.include_admin_am && admin_end > admin_start {
            out.push((admin_kind, admin_start, admin_end));
        }

        let pm_start = (start + 3).max(Self::PM_EARLIEST_HOUR);
        if self.include_deep_pm && end > pm_start {
            let deep_pm_end = end.min(pm_start + 2);
            out.push((BlockKind::DeepWork, pm_start, deep_pm_end));
            if self.include_admin_pm && end > deep_pm_end {
                out.push((admin_kind, deep_pm_end, end));
            }
        }

        out.sort_by_key(|(_, s, _)| *s);
        out
    }

    /// Resolve the template for `day` in the IANA timezone `tz`.
    pub fn build(&self, day: NaiveDate, tz: &str) -> Result<Vec<TimeBlock>, ScheduleError> {
        self.validate()?;
        let tz = parse_timezone(tz)?;

        self.hour_ranges()
            .into_iter()
            .map(|(kind, s, e)| -> Result<TimeBlock, ScheduleError> {
                Ok(TimeBlock::new(
                    local_to_utc(day, s, 0, tz)?,
                    local_to_utc(day, e, 0, tz)?,
                    kind,
                ))
            })
            .collect()
    }
}
