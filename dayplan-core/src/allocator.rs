//! Block Allocator: greedy first-fit of ordered tasks into today's blocks.
//!
//! All mutable state (one cursor per block, the pending quick-win queue) lives
//! inside a single `allocate` call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::block::{BlockKind, TimeBlock};
use crate::options::{QUICK_WIN_ANCHOR_MINUTES, ScheduleOptions};
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub task_id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Placed minutes; less than the task's duration when capped by the chunk ceiling.
    pub minutes: i32,
    /// Index into the caller's block list.
    pub block_index: usize,
    pub quick_win: bool,
    /// Copied from the task; see `Task::synthetic_id`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub assignments: Vec<Assignment>,
    /// Priority order.
    pub unscheduled: Vec<Task>,
}

#[derive(Debug)]
struct Cursor {
    block_index: usize,
    kind: BlockKind,
    at: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Cursor {
    fn free_minutes(&self) -> i64 {
        (self.end - self.at).num_minutes()
    }

    fn take(&mut self, minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.at;
        self.at = start + Duration::minutes(i64::from(minutes));
        (start, self.at)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlockAllocator<'a> {
    options: &'a ScheduleOptions,
}

impl<'a> BlockAllocator<'a> {
    pub fn new(options: &'a ScheduleOptions) -> Self {
        Self { options }
    }

    fn chunk_minutes(&self, task: &Task) -> i32 {
        task.duration_minutes.min(self.options.chunk_ceiling_minutes)
    }

    fn usable(&self, cursor: &Cursor, task: &Task, minutes: i32) -> bool {
        if self.options.match_context && !cursor.kind.accepts(task.context) {
            return false;
        }
        if self.options.match_energy && !cursor.kind.suits(task.energy) {
            return false;
        }
        cursor.free_minutes() >= i64::from(minutes)
    }

    fn place(&self, cursor: &mut Cursor, task: &Task, minutes: i32, quick_win: bool) -> Assignment {
        let (start, end) = cursor.take(minutes);
        debug!(
            task = %task.id,
            block = cursor.block_index,
            %start,
            minutes,
            quick_win,
            "placed"
        );
        Assignment {
            task_id: task.id.clone(),
            name: task.name.clone(),
            start,
            end,
            minutes,
            block_index: cursor.block_index,
            quick_win,
            synthetic_id: task.synthetic_id,
        }
    }

    /// First block in chronological order with room for the task's chunk.
    fn first_fit(&self, cursors: &mut [Cursor], task: &Task, quick_win: bool) -> Option<(usize, Assignment)> {
        let minutes = self.chunk_minutes(task);
        if minutes <= 0 {
            return None;
        }
        let slot = cursors.iter().position(|c| self.usable(c, task, minutes))?;
        let assignment = self.place(&mut cursors[slot], task, minutes, quick_win);
        Some((slot, assignment))
    }

    /// Place `ordered` (already in planning order) into `blocks`.
    ///
    /// Blocks are scanned by start time regardless of the order given; the
    /// assignment's `block_index` refers to the caller's slice.
    pub fn allocate(&self, ordered: &[Task], blocks: &[TimeBlock]) -> Allocation {
        let mut cursors: Vec<Cursor> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| Cursor {
                block_index: i,
                kind: b.kind,
                at: b.start,
                end: b.end,
            })
            .collect();
        cursors.sort_by_key(|c| c.at);

        let rank: HashMap<&str, usize> = ordered
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let sprinkle = self.options.sprinkle_quick_wins;
        let (main, mut quick): (Vec<&Task>, VecDeque<&Task>) = if sprinkle {
            let (q, m): (Vec<&Task>, Vec<&Task>) = ordered
                .iter()
                .partition(|t| self.options.is_quick_win(t.duration_minutes));
            (m, q.into_iter().collect())
        } else {
            (ordered.iter().collect(), VecDeque::new())
        };

        let mut out = Allocation::default();

        for task in main {
            let Some((slot, assignment)) = self.first_fit(&mut cursors, task, false) else {
                debug!(task = %task.id, minutes = task.duration_minutes, "no block has room");
                out.unscheduled.push(task.clone());
                continue;
            };
            let anchor = assignment.minutes >= QUICK_WIN_ANCHOR_MINUTES;
            out.assignments.push(assignment);

            if anchor {
                let cursor = &mut cursors[slot];
                if let Some(pos) = quick
                    .iter()
                    .position(|q| self.usable(cursor, q, self.chunk_minutes(q)))
                    && let Some(q) = quick.remove(pos)
                {
                    let minutes = self.chunk_minutes(q);
                    out.assignments.push(self.place(cursor, q, minutes, true));
                }
            }
        }

        // Quick wins the sprinkle pass never reached get one ordinary pass.
        while let Some(q) = quick.pop_front() {
            match self.first_fit(&mut cursors, q, true) {
                Some((_, assignment)) => out.assignments.push(assignment),
                None => out.unscheduled.push(q.clone()),
            }
        }

        out.unscheduled
            .sort_by_key(|t| rank.get(t.id.as_str()).copied().unwrap_or(usize::MAX));
        out
    }
}
