use std::collections::HashMap;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use dayplan_core::{
    BlockKind, Energy, Priority, ScheduleOptions, SchedulerKernel, Task, TaskContext, TaskStatus,
    TimeBlock, normalize_record,
};
use proptest::prelude::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

const STATUSES: [TaskStatus; 6] = [
    TaskStatus::Inbox,
    TaskStatus::Today,
    TaskStatus::ThisWeek,
    TaskStatus::Scheduled,
    TaskStatus::Done,
    TaskStatus::Someday,
];

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (
            0usize..4,
            1i32..200,
            prop::option::of(0u64..10),
            0usize..6,
            any::<bool>(),
            prop::option::of(0usize..24),
        ),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (p, minutes, due, status, auto, blocker))| {
                let mut t = Task::new(format!("t{i}"), format!("task {i}"))
                    .with_priority(Priority::ALL[p])
                    .with_duration(minutes)
                    .with_status(STATUSES[status])
                    .with_auto_schedule(auto);
                if let Some(d) = due {
                    t = t.with_due(day() + chrono::Days::new(d));
                }
                if let Some(b) = blocker {
                    t = t.blocked_by(format!("t{b}"));
                }
                t
            })
            .collect()
    })
}

fn arb_blocks() -> impl Strategy<Value = Vec<TimeBlock>> {
    prop::collection::vec((0i64..40, 1i64..12), 0..5).prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2026, 10, 17, 6, 0, 0).unwrap();
        rows.into_iter()
            .map(|(slot, len)| {
                let start = base + Duration::minutes(slot * 15);
                TimeBlock::new(start, start + Duration::minutes(len * 15), BlockKind::Any)
            })
            .collect()
    })
}

fn arb_options() -> impl Strategy<Value = ScheduleOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0i32..20, 15i32..120).prop_map(
        |(ignore, include, sprinkle, threshold, ceiling)| ScheduleOptions {
            ignore_auto_flag: ignore,
            include_already_scheduled: include,
            quick_win_threshold_minutes: threshold,
            chunk_ceiling_minutes: ceiling,
            sprinkle_quick_wins: sprinkle,
            match_context: false,
            match_energy: false,
        },
    )
}

proptest! {
    #[test]
    fn planning_is_deterministic(tasks in arb_tasks(), blocks in arb_blocks(), options in arb_options()) {
        let kernel = SchedulerKernel::new(options).unwrap();
        let a = kernel.plan_tasks(day(), &tasks, &blocks).unwrap();
        let b = kernel.plan_tasks(day(), &tasks, &blocks).unwrap();
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn blocks_never_overfilled_or_double_booked(
        tasks in arb_tasks(),
        blocks in arb_blocks(),
        options in arb_options(),
    ) {
        let kernel = SchedulerKernel::new(options).unwrap();
        let r = kernel.plan_tasks(day(), &tasks, &blocks).unwrap();

        let mut per_block: HashMap<usize, Vec<_>> = HashMap::new();
        for a in &r.assignments {
            let b = &blocks[a.block_index];
            prop_assert!(a.start >= b.start && a.end <= b.end);
            prop_assert_eq!((a.end - a.start).num_minutes(), i64::from(a.minutes));
            per_block.entry(a.block_index).or_default().push((a.start, a.end));
        }
        for (idx, mut spans) in per_block {
            let used: i64 = spans.iter().map(|(s, e)| (*e - *s).num_minutes()).sum();
            prop_assert!(used <= blocks[idx].minutes());
            spans.sort();
            for w in spans.windows(2) {
                prop_assert!(w[0].1 <= w[1].0);
            }
        }
    }

    #[test]
    fn every_task_lands_in_exactly_one_bucket(
        tasks in arb_tasks(),
        blocks in arb_blocks(),
        options in arb_options(),
    ) {
        let kernel = SchedulerKernel::new(options).unwrap();
        let r = kernel.plan_tasks(day(), &tasks, &blocks).unwrap();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for a in &r.assignments {
            *seen.entry(a.task_id.as_str()).or_default() += 1;
        }
        for t in &r.unscheduled {
            *seen.entry(t.id.as_str()).or_default() += 1;
        }
        for i in &r.ineligible {
            prop_assert!(!i.reasons.is_empty());
            *seen.entry(i.task.id.as_str()).or_default() += 1;
        }
        prop_assert_eq!(seen.len(), tasks.len());
        prop_assert!(seen.values().all(|n| *n == 1));
    }

    #[test]
    fn higher_tier_goes_first_within_a_block(tasks in arb_tasks(), blocks in arb_blocks()) {
        let kernel = SchedulerKernel::new(ScheduleOptions::default().ignoring_auto_flag()).unwrap();
        let r = kernel.plan_tasks(day(), &tasks, &blocks).unwrap();
        let priority: HashMap<&str, Priority> =
            tasks.iter().map(|t| (t.id.as_str(), t.priority)).collect();

        for a in &r.assignments {
            for b in &r.assignments {
                if a.block_index == b.block_index && priority[a.task_id.as_str()] < priority[b.task_id.as_str()] {
                    prop_assert!(a.start < b.start);
                }
            }
        }
    }

    #[test]
    fn normalizing_a_rendered_task_is_identity(
        id in "[a-z][a-z0-9]{0,8}",
        name in "[A-Za-z][A-Za-z0-9 ]{0,16}[A-Za-z0-9]",
        status in 0usize..6,
        p in 0usize..4,
        (energy, context) in (
            prop::sample::select(vec![Energy::High, Energy::Medium, Energy::Low]),
            prop::sample::select(vec![
                TaskContext::DeepWork,
                TaskContext::Meetings,
                TaskContext::Admin,
                TaskContext::QuickWins,
            ]),
        ),
        minutes in 1i32..=480,
        due in prop::option::of(0u64..400),
        project in prop::option::of("[A-Z][a-z]{1,10}"),
        auto in any::<bool>(),
        blockers in prop::collection::btree_set("[a-z]{1,6}", 0..3),
        notes in prop::option::of("[A-Za-z][A-Za-z .]{0,20}[a-z]"),
    ) {
        let mut task = Task::new(id, name)
            .with_status(STATUSES[status])
            .with_priority(Priority::ALL[p])
            .with_energy(energy)
            .with_context(context)
            .with_duration(minutes)
            .with_auto_schedule(auto);
        task.due_date = due.map(|d| day() + chrono::Days::new(d));
        task.project = project;
        task.blocked_by = blockers.into_iter().collect();
        task.notes = notes;

        let once = normalize_record(&task.to_record());
        prop_assert_eq!(&once, &task);
        prop_assert_eq!(normalize_record(&once.to_record()), once);
    }
}
