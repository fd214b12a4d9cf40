//! Pure views over the canonical task list: filtering, day buckets and list ordering.

use std::collections::BTreeMap;

use crate::models::{DayKey, Filters, Task};

impl Filters {
    /// All four predicates must hold. An empty query matches every title.
    pub fn matches(&self, task: &Task) -> bool {
        self.day.accepts(&task.day)
            && self.priority.accepts(&task.priority)
            && self.status.accepts(&task.status)
            && title_matches(&task.title, &self.query)
    }
}

fn title_matches(title: &str, query: &str) -> bool {
    query.is_empty() || title.to_lowercase().contains(&query.to_lowercase())
}

/// Keeps the tasks accepted by `filters`, in input order.
pub fn filter_tasks<'a, I>(tasks: I, filters: &Filters) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| filters.matches(task))
        .collect()
}

/// Splits tasks into one bucket per weekday. Every day is present, even when empty.
pub fn group_by_day<'a, I>(tasks: I) -> BTreeMap<DayKey, Vec<&'a Task>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut buckets: BTreeMap<DayKey, Vec<&'a Task>> =
        DayKey::ALL.into_iter().map(|day| (day, Vec::new())).collect();
    for task in tasks {
        buckets.entry(task.day).or_default().push(task);
    }
    buckets
}

/// Moves finished tasks below unfinished ones, keeping relative order otherwise.
pub fn sort_done_last(bucket: &mut [&Task]) {
    bucket.sort_by_key(|task| task.is_done());
}
