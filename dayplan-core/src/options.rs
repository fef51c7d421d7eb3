//! Per-call scheduling options.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Placed chunks at or above this length may be followed by one quick win.
pub const QUICK_WIN_ANCHOR_MINUTES: i32 = 45;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Plan tasks even when their auto-schedule flag is off.
    pub ignore_auto_flag: bool,
    /// Allow tasks already `Scheduled` to be re-planned.
    pub include_already_scheduled: bool,
    /// Tasks at or below this duration count as quick wins.
    pub quick_win_threshold_minutes: i32,
    /// Longest chunk a single task may occupy in one block.
    pub chunk_ceiling_minutes: i32,
    /// Insert one queued quick win after each long placement.
    pub sprinkle_quick_wins: bool,
    /// Only place tasks into blocks whose kind accepts their context.
    pub match_context: bool,
    /// Keep tasks out of blocks whose kind does not suit their energy.
    pub match_energy: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            ignore_auto_flag: false,
            include_already_scheduled: false,
            quick_win_threshold_minutes: 5,
            chunk_ceiling_minutes: 90,
            sprinkle_quick_wins: false,
            match_context: false,
            match_energy: false,
        }
    }
}

impl ScheduleOptions {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.quick_win_threshold_minutes < 0 {
            return Err(ScheduleError::option(
                "quick_win_threshold_minutes",
                format!("must be >= 0, got {}", self.quick_win_threshold_minutes),
            ));
        }
        if self.chunk_ceiling_minutes <= 0 {
            return Err(ScheduleError::option(
                "chunk_ceiling_minutes",
                format!("must be > 0, got {}", self.chunk_ceiling_minutes),
            ));
        }
        Ok(())
    }

    pub fn ignoring_auto_flag(mut self) -> Self {
        self.ignore_auto_flag = true;
        self
    }

    pub fn including_scheduled(mut self) -> Self {
        self.include_already_scheduled = true;
        self
    }

    pub fn with_quick_wins(mut self, threshold_minutes: i32) -> Self {
        self.sprinkle_quick_wins = true;
        self.quick_win_threshold_minutes = threshold_minutes;
        self
    }

    pub fn is_quick_win(&self, minutes: i32) -> bool {
        minutes > 0 && minutes <= self.quick_win_threshold_minutes
    }
}
