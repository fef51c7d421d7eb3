//! Eligibility Filter: may a task be considered for today's plan?
//!
//! Every rule is evaluated (no short-circuit), so a task can carry several
//! reasons at once. Blockers are resolved against the batch being planned;
//! ids that resolve to nothing are treated as still blocking.
//!
//! Cycle policy: every task in a `blocked_by` cycle (including a task that
//! blocks itself) is permanently ineligible until the cycle is broken in the
//! store, even when the other members are already `Done`.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::options::ScheduleOptions;
use crate::task::{Task, TaskStatus};

/// A blocker as seen from the dependent task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    pub id: String,
    /// `None` when the id does not resolve to any task in the batch.
    pub resolved: Option<(String, TaskStatus)>,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resolved {
            Some((name, status)) => write!(f, "{name} [{}, {}]", self.id, status.as_str()),
            None => write!(f, "{} [missing]", self.id),
        }
    }
}

/// Why a task was excluded. Renders as a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    AutoScheduleDisabled,
    StatusExcluded(TaskStatus),
    AlreadyScheduled,
    NoDuration,
    BlockedBy(Vec<Blocker>),
    DependencyCycle(Vec<String>),
    UnsupportedStatus(TaskStatus),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::AutoScheduleDisabled => f.write_str("auto-schedule disabled"),
            Exclusion::StatusExcluded(s) => {
                write!(f, "status excludes it from planning ({})", s.as_str())
            }
            Exclusion::AlreadyScheduled => f.write_str("already scheduled"),
            Exclusion::NoDuration => f.write_str("no duration"),
            Exclusion::BlockedBy(blockers) => {
                let names: Vec<String> = blockers.iter().map(ToString::to_string).collect();
                write!(f, "blocked by incomplete dependency: {}", names.join(", "))
            }
            Exclusion::DependencyCycle(members) => {
                write!(f, "blocked by dependency cycle: {}", members.join(" <-> "))
            }
            Exclusion::UnsupportedStatus(s) => write!(f, "unsupported status ({})", s.as_str()),
        }
    }
}

impl Serialize for Exclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Ineligible(Vec<Exclusion>),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IneligibleTask {
    pub task: Task,
    pub reasons: Vec<Exclusion>,
}

impl IneligibleTask {
    pub fn reason_texts(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Eligibility rules bound to one batch of tasks.
#[derive(Debug)]
pub struct EligibilityFilter<'a> {
    options: &'a ScheduleOptions,
    by_id: HashMap<&'a str, &'a Task>,
    /// task id -> index into `cycles`.
    on_cycle: HashMap<&'a str, usize>,
    /// Members of each cycle, in input order.
    cycles: Vec<Vec<String>>,
}

impl<'a> EligibilityFilter<'a> {
    pub fn new(tasks: &'a [Task], options: &'a ScheduleOptions) -> Self {
        let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        let (on_cycle, cycles) = find_cycles(tasks, &by_id);
        Self {
            options,
            by_id,
            on_cycle,
            cycles,
        }
    }

    pub fn check(&self, task: &Task) -> Verdict {
        let mut reasons = Vec::new();

        if !self.options.ignore_auto_flag && !task.auto_schedule {
            reasons.push(Exclusion::AutoScheduleDisabled);
        }
        if matches!(task.status, TaskStatus::Done | TaskStatus::Someday) {
            reasons.push(Exclusion::StatusExcluded(task.status));
        }
        if task.status == TaskStatus::Scheduled && !self.options.include_already_scheduled {
            reasons.push(Exclusion::AlreadyScheduled);
        }
        if task.duration_minutes <= 0 {
            reasons.push(Exclusion::NoDuration);
        }

        let blockers = self.incomplete_blockers(task);
        if !blockers.is_empty() {
            reasons.push(Exclusion::BlockedBy(blockers));
        }
        if let Some(&c) = self.on_cycle.get(task.id.as_str()) {
            reasons.push(Exclusion::DependencyCycle(self.cycles[c].clone()));
        }

        if reasons.is_empty() {
            return match task.status {
                TaskStatus::Inbox | TaskStatus::Today | TaskStatus::ThisWeek => Verdict::Eligible,
                TaskStatus::Scheduled if self.options.include_already_scheduled => {
                    Verdict::Eligible
                }
                // Unreachable for today's statuses: every other one already
                // produced a reason above. Guards statuses added later.
                other => Verdict::Ineligible(vec![Exclusion::UnsupportedStatus(other)]),
            };
        }

        Verdict::Ineligible(reasons)
    }

    /// Blockers that are not `Done`, plus ids that resolve to nothing.
    pub fn incomplete_blockers(&self, task: &Task) -> Vec<Blocker> {
        task.blocked_by
            .iter()
            .filter_map(|id| match self.by_id.get(id.as_str()) {
                None => Some(Blocker {
                    id: id.clone(),
                    resolved: None,
                }),
                Some(b) if b.status != TaskStatus::Done => Some(Blocker {
                    id: id.clone(),
                    resolved: Some((b.name.clone(), b.status)),
                }),
                Some(_) => None,
            })
            .collect()
    }

    pub fn has_incomplete_blockers(&self, task: &Task) -> bool {
        !self.incomplete_blockers(task).is_empty() || self.on_cycle.contains_key(task.id.as_str())
    }

    /// Split a batch into eligible tasks (input order) and ineligible ones with reasons.
    pub fn split(&self, tasks: &[Task]) -> (Vec<Task>, Vec<IneligibleTask>) {
        let mut eligible = Vec::new();
        let mut ineligible = Vec::new();

        for task in tasks {
            match self.check(task) {
                Verdict::Eligible => eligible.push(task.clone()),
                Verdict::Ineligible(reasons) => {
                    debug!(
                        task = %task.id,
                        reasons = %reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
                        "ineligible"
                    );
                    ineligible.push(IneligibleTask {
                        task: task.clone(),
                        reasons,
                    });
                }
            }
        }

        (eligible, ineligible)
    }
}

/// Tarjan's SCC over `blocked_by` edges that resolve inside the batch.
/// Returns each cycle's members in input order, and which cycle every member
/// sits on.
fn find_cycles<'a>(
    tasks: &'a [Task],
    by_id: &HashMap<&'a str, &'a Task>,
) -> (HashMap<&'a str, usize>, Vec<Vec<String>>) {
    struct Tarjan<'a, 'm> {
        by_id: &'m HashMap<&'a str, &'a Task>,
        next_index: usize,
        index: HashMap<&'a str, usize>,
        low: HashMap<&'a str, usize>,
        stack: Vec<&'a str>,
        on_stack: HashMap<&'a str, bool>,
        components: Vec<Vec<&'a str>>,
    }

    impl<'a> Tarjan<'a, '_> {
        fn edges(&self, v: &'a str) -> Vec<&'a str> {
            self.by_id
                .get(v)
                .map(|t| {
                    t.blocked_by
                        .iter()
                        .filter_map(|dep| self.by_id.get_key_value(dep.as_str()).map(|(k, _)| *k))
                        .collect()
                })
                .unwrap_or_default()
        }

        fn open(&mut self, v: &'a str, frames: &mut Vec<(&'a str, Vec<&'a str>, usize)>) {
            self.index.insert(v, self.next_index);
            self.low.insert(v, self.next_index);
            self.next_index += 1;
            self.stack.push(v);
            self.on_stack.insert(v, true);
            frames.push((v, self.edges(v), 0));
        }

        fn lower(&mut self, v: &'a str, to: usize) {
            if let Some(low) = self.low.get_mut(v) {
                *low = (*low).min(to);
            }
        }

        /// Explicit frame stack instead of recursion: blocker chains can be
        /// arbitrarily long.
        fn visit(&mut self, root: &'a str) {
            let mut frames = Vec::new();
            self.open(root, &mut frames);

            while let Some((v, edges, next)) = frames.last_mut() {
                let v = *v;
                if let Some(&w) = edges.get(*next) {
                    *next += 1;
                    if !self.index.contains_key(w) {
                        self.open(w, &mut frames);
                    } else if self.on_stack.get(w).copied().unwrap_or(false) {
                        let iw = self.index[w];
                        self.lower(v, iw);
                    }
                    continue;
                }

                frames.pop();
                let lv = self.low[v];
                if let Some((parent, _, _)) = frames.last() {
                    let parent = *parent;
                    self.lower(parent, lv);
                }

                if lv == self.index[v] {
                    let mut component = Vec::new();
                    while let Some(w) = self.stack.pop() {
                        self.on_stack.insert(w, false);
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    self.components.push(component);
                }
            }
        }
    }

    let mut t = Tarjan {
        by_id,
        next_index: 0,
        index: HashMap::new(),
        low: HashMap::new(),
        stack: Vec::new(),
        on_stack: HashMap::new(),
        components: Vec::new(),
    };
    for task in tasks {
        if !t.index.contains_key(task.id.as_str()) {
            t.visit(task.id.as_str());
        }
    }

    let position: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.id.as_str(), i))
        .collect();

    let mut on_cycle = HashMap::new();
    let mut cycles = Vec::new();
    for mut component in t.components {
        let is_cycle = component.len() > 1
            || by_id
                .get(component[0])
                .is_some_and(|task| task.blocked_by.iter().any(|d| d == &task.id));
        if !is_cycle {
            continue;
        }
        component.sort_by_key(|id| position.get(id).copied().unwrap_or(usize::MAX));
        let members: Vec<String> = component.iter().map(|s| s.to_string()).collect();
        debug!(members = %members.join(","), "dependency cycle");
        for id in component {
            on_cycle.insert(id, cycles.len());
        }
        cycles.push(members);
    }
    (on_cycle, cycles)
}
