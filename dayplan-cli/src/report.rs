//! Human-readable output. Times are shown in the configured timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dayplan_core::{BlockKind, PickRule, ScheduleResult, TimeBlock, TodayFill};

fn hhmm(t: DateTime<Utc>, tz: Tz) -> String {
    t.with_timezone(&tz).format("%H:%M").to_string()
}

fn kind_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::DeepWork => "Deep Work",
        BlockKind::Meetings => "Meetings",
        BlockKind::Admin => "Admin",
        BlockKind::QuickWins => "Quick Wins",
        BlockKind::Any => "Any",
    }
}

pub fn print_plan(result: &ScheduleResult, tz: Tz) {
    println!("# Plan for {}\n", result.day);

    if result.assignments.is_empty() {
        println!("(nothing scheduled)");
    }
    for a in &result.assignments {
        let marker = if a.quick_win { " (quick win)" } else { "" };
        println!(
            "{}-{}  {}{}  [{}]",
            hhmm(a.start, tz),
            hhmm(a.end, tz),
            a.name,
            marker,
            a.task_id
        );
    }

    if !result.unscheduled.is_empty() {
        println!("\n## Did not fit ({})", result.unscheduled.len());
        for t in &result.unscheduled {
            println!(
                "- {} [{}] {} min, {}",
                t.name,
                t.id,
                t.duration_minutes,
                t.priority.as_str()
            );
        }
    }

    if !result.ineligible.is_empty() {
        println!("\n## Not eligible ({})", result.ineligible.len());
        for i in &result.ineligible {
            println!("- {} [{}]: {}", i.task.name, i.task.id, i.reason_texts().join("; "));
        }
    }

    println!(
        "\nScheduled {} task(s), {} minute(s).",
        result.assignments.len(),
        result.planned_minutes()
    );
}

pub fn print_fill(fill: &TodayFill, summary: Option<&str>) {
    println!(
        "Today has {} of {} task(s).",
        fill.already_today.min(fill.target),
        fill.target
    );
    if fill.picks.is_empty() {
        println!("Nothing to add.");
    }
    for p in &fill.picks {
        let why = match p.rule {
            PickRule::P1First => "P1 first".to_string(),
            PickRule::RoundRobin { desired } => format!("round-robin {}", desired.as_str()),
            PickRule::Fallback { desired } => {
                format!("fallback, no {} left", desired.as_str())
            }
        };
        println!(
            "+ [{}] {} ({}; {})  [{}]",
            p.task.priority.as_str(),
            p.task.name,
            p.category.as_str(),
            why,
            p.task.id
        );
    }
    if let Some(s) = summary {
        println!("\n{s}");
    }
}

pub fn print_blocks(blocks: &[TimeBlock], tz: Tz) {
    if blocks.is_empty() {
        println!("(no blocks)");
    }
    for b in blocks {
        println!(
            "{}-{}  {}  ({} min)",
            hhmm(b.start, tz),
            hhmm(b.end, tz),
            kind_label(b.kind),
            b.minutes()
        );
    }
}
