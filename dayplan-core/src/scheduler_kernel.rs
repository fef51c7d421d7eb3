//! Scheduler Kernel: normalize → filter → order → allocate for one day.
//!
//! Pure and synchronous. Every call builds its own state from the inputs, so
//! identical inputs always produce identical results.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::allocator::{Assignment, BlockAllocator};
use crate::block::{TimeBlock, validate_blocks};
use crate::eligibility::{EligibilityFilter, IneligibleTask};
use crate::error::ScheduleError;
use crate::normalize::normalize_records;
use crate::options::ScheduleOptions;
use crate::ordering::sort_for_planning;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    pub day: NaiveDate,
    pub assignments: Vec<Assignment>,
    /// Eligible but did not fit, in priority order.
    pub unscheduled: Vec<Task>,
    pub ineligible: Vec<IneligibleTask>,
}

impl ScheduleResult {
    pub fn planned_minutes(&self) -> i64 {
        self.assignments.iter().map(|a| i64::from(a.minutes)).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerKernel {
    options: ScheduleOptions,
}

impl SchedulerKernel {
    /// Options are checked up front; a bad configuration never reaches planning.
    pub fn new(options: ScheduleOptions) -> Result<Self, ScheduleError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Plan raw store records. Ids are made unique before planning.
    pub fn plan_records(
        &self,
        day: NaiveDate,
        records: &[Value],
        blocks: &[TimeBlock],
    ) -> Result<ScheduleResult, ScheduleError> {
        let tasks = normalize_records(records);
        self.plan_tasks(day, &tasks, blocks)
    }

    /// Plan already-normalized tasks. Task ids are expected to be unique.
    pub fn plan_tasks(
        &self,
        day: NaiveDate,
        tasks: &[Task],
        blocks: &[TimeBlock],
    ) -> Result<ScheduleResult, ScheduleError> {
        validate_blocks(blocks)?;

        let filter = EligibilityFilter::new(tasks, &self.options);
        let (mut eligible, ineligible) = filter.split(tasks);
        sort_for_planning(&mut eligible);

        let allocation = BlockAllocator::new(&self.options).allocate(&eligible, blocks);

        let result = ScheduleResult {
            day,
            assignments: allocation.assignments,
            unscheduled: allocation.unscheduled,
            ineligible,
        };

        info!(
            %day,
            tasks = tasks.len(),
            blocks = blocks.len(),
            scheduled = result.assignments.len(),
            unscheduled = result.unscheduled.len(),
            ineligible = result.ineligible.len(),
            minutes = result.planned_minutes(),
            "planned day"
        );

        Ok(result)
    }
}
