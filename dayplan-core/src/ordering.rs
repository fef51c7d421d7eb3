//! Priority/ordering policy for the Block Allocator.

use std::cmp::Ordering;

use crate::task::Task;

/// Total order, earlier = placed first:
/// 1) priority asc (P1 best)
/// 2) due date asc, no due date last
/// 3) status rank (Today < This Week < Scheduled < other)
/// 4) duration desc
pub fn compare(a: &Task, b: &Task) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.status.planning_rank().cmp(&b.status.planning_rank()))
        .then_with(|| b.duration_minutes.cmp(&a.duration_minutes))
}

/// Stable sort; full ties keep input order.
pub fn sort_for_planning(tasks: &mut [Task]) {
    tasks.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskStatus};
    use chrono::NaiveDate;

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn priority_dominates() {
        let mut v = vec![
            Task::new("p4", "").with_priority(Priority::P4),
            Task::new("p1", "").with_priority(Priority::P1),
            Task::new("p2", "").with_priority(Priority::P2),
        ];
        sort_for_planning(&mut v);
        assert_eq!(ids(&v), vec!["p1", "p2", "p4"]);
    }

    #[test]
    fn due_date_breaks_ties_and_missing_sorts_last() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        let mut v = vec![
            Task::new("none", ""),
            Task::new("late", "").with_due(d(30)),
            Task::new("soon", "").with_due(d(18)),
        ];
        sort_for_planning(&mut v);
        assert_eq!(ids(&v), vec!["soon", "late", "none"]);
    }

    #[test]
    fn status_then_duration() {
        let mut v = vec![
            Task::new("inbox", ""),
            Task::new("week-short", "").with_status(TaskStatus::ThisWeek).with_duration(15),
            Task::new("week-long", "").with_status(TaskStatus::ThisWeek).with_duration(60),
            Task::new("today", "").with_status(TaskStatus::Today),
        ];
        sort_for_planning(&mut v);
        assert_eq!(ids(&v), vec!["today", "week-long", "week-short", "inbox"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let mut v = vec![Task::new("b", ""), Task::new("a", ""), Task::new("c", "")];
        sort_for_planning(&mut v);
        assert_eq!(ids(&v), vec!["b", "a", "c"]);
    }
}
