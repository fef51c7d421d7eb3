//! Category Balancer: pick a small "today" slate with category diversity.
//!
//! P1 candidates always go first, in input order. Remaining slots rotate
//! Work → Personal → Project, taking the highest tier available in the
//! desired category, or the highest tier of any category when the desired one
//! is empty.

use serde::Serialize;
use tracing::{debug, info};

use crate::category::{Category, CategoryMap};
use crate::eligibility::EligibilityFilter;
use crate::options::ScheduleOptions;
use crate::task::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PickRule {
    P1First,
    RoundRobin { desired: Category },
    Fallback { desired: Category },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusPick {
    pub task: Task,
    pub category: Category,
    #[serde(flatten)]
    pub rule: PickRule,
}

/// Select up to `needed` tasks from `pool`. Returns fewer when the pool runs dry.
pub fn select_focus(pool: &[Task], needed: usize, map: &CategoryMap) -> Vec<FocusPick> {
    let categories: Vec<Category> = pool.iter().map(|t| t.category(map)).collect();
    let mut taken = vec![false; pool.len()];
    let mut picks = Vec::new();

    let take = |i: usize, rule: PickRule, taken: &mut Vec<bool>, picks: &mut Vec<FocusPick>| {
        taken[i] = true;
        debug!(task = %pool[i].id, category = categories[i].as_str(), ?rule, "focus pick");
        picks.push(FocusPick {
            task: pool[i].clone(),
            category: categories[i],
            rule,
        });
    };

    for (i, task) in pool.iter().enumerate() {
        if picks.len() >= needed {
            break;
        }
        if task.priority == Priority::P1 {
            take(i, PickRule::P1First, &mut taken, &mut picks);
        }
    }

    let lower_tiers = [Priority::P2, Priority::P3, Priority::P4];
    let find = |taken: &[bool], tier: Priority, category: Category| {
        (0..pool.len())
            .find(|&i| !taken[i] && pool[i].priority == tier && categories[i] == category)
    };

    let mut step = 0;
    while picks.len() < needed {
        let desired = Category::ROTATION[step % Category::ROTATION.len()];

        let preferred = lower_tiers
            .iter()
            .find_map(|&tier| find(&taken, tier, desired));
        let chosen = match preferred {
            Some(i) => Some((i, PickRule::RoundRobin { desired })),
            None => lower_tiers.iter().find_map(|&tier| {
                Category::ROTATION
                    .iter()
                    .find_map(|&c| find(&taken, tier, c))
                    .map(|i| (i, PickRule::Fallback { desired }))
            }),
        };

        let Some((i, rule)) = chosen else {
            break;
        };
        take(i, rule, &mut taken, &mut picks);
        step += 1;
    }

    picks
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayFill {
    pub already_today: usize,
    pub target: usize,
    pub picks: Vec<FocusPick>,
}

/// Top up the `Today` slate to `target` tasks.
///
/// Candidates are `Inbox`, `This Week` or `Scheduled` tasks with no incomplete
/// blockers (cycle members count as blocked).
pub fn fill_today(tasks: &[Task], target: usize, map: &CategoryMap) -> TodayFill {
    let already_today = tasks.iter().filter(|t| t.status == TaskStatus::Today).count();
    if already_today >= target {
        info!(already_today, target, "today slate already full");
        return TodayFill {
            already_today,
            target,
            picks: Vec::new(),
        };
    }

    let options = ScheduleOptions::default();
    let filter = EligibilityFilter::new(tasks, &options);
    let pool: Vec<Task> = tasks
        .iter()
        .filter(|t| {
            matches!(
                t.status,
                TaskStatus::Inbox | TaskStatus::ThisWeek | TaskStatus::Scheduled
            )
        })
        .filter(|t| !filter.has_incomplete_blockers(t))
        .cloned()
        .collect();

    let needed = target - already_today;
    let picks = select_focus(&pool, needed, map);
    info!(
        already_today,
        needed,
        candidates = pool.len(),
        picked = picks.len(),
        "filled today slate"
    );

    TodayFill {
        already_today,
        target,
        picks,
    }
}

/// "Today's focus: 2 Work • 1 Personal" for the first `limit` `Today` tasks.
/// `None` when there is nothing on today's slate.
pub fn focus_summary(tasks: &[Task], map: &CategoryMap, limit: usize) -> Option<String> {
    let mut counts = [0usize; 3];
    for t in tasks.iter().filter(|t| t.status == TaskStatus::Today).take(limit) {
        let c = t.category(map);
        if let Some(slot) = Category::ROTATION.iter().position(|r| *r == c) {
            counts[slot] += 1;
        }
    }

    let parts: Vec<String> = Category::ROTATION
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(c, n)| format!("{n} {}", c.as_str()))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("Today's focus: {}", parts.join(" • ")))
    }
}
