//! dayplan-core: deterministic day planning over a task store export.
//!
//! Raw records are normalized into [`Task`]s, filtered for eligibility,
//! ordered by priority and packed into today's [`TimeBlock`]s. A separate
//! entry point ([`fill_today`]) picks a small, category-balanced "Today" slate.
//! Nothing here performs I/O.

pub mod allocator;
pub mod balancer;
pub mod block;
pub mod category;
pub mod eligibility;
pub mod error;
pub mod normalize;
pub mod options;
pub mod ordering;
pub mod scheduler_kernel;
pub mod task;
pub mod time;
pub mod writeback;

pub use allocator::{Allocation, Assignment, BlockAllocator};
pub use balancer::{FocusPick, PickRule, TodayFill, fill_today, focus_summary, select_focus};
pub use block::{BlockKind, DayTemplate, TimeBlock, validate_blocks};
pub use category::{Category, CategoryMap};
pub use eligibility::{Blocker, EligibilityFilter, Exclusion, IneligibleTask, Verdict};
pub use error::ScheduleError;
pub use normalize::{normalize_record, normalize_records};
pub use options::ScheduleOptions;
pub use ordering::sort_for_planning;
pub use scheduler_kernel::{ScheduleResult, SchedulerKernel};
pub use task::{Energy, Priority, Task, TaskContext, TaskStatus};
pub use writeback::{RecordPatch, WritebackPolicy, project_focus, project_schedule};
