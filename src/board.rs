use serde::Serialize;

use crate::derive::{filter_tasks, group_by_day, sort_done_last};
use crate::models::{DayKey, Filters, Stats, Task};

const PROGRESS_CELLS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySection {
    pub day: DayKey,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

/// What the weekly board shows: overall progress and the filtered tasks per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub stats: Stats,
    pub filters: Filters,
    pub days: Vec<DaySection>,
}

impl BoardView {
    /// Progress is computed over every task; only the day sections are filtered.
    pub fn build(tasks: &[Task], filters: &Filters) -> Self {
        let filtered = filter_tasks(tasks, filters);
        let days = group_by_day(filtered)
            .into_iter()
            .map(|(day, mut bucket)| {
                sort_done_last(&mut bucket);
                DaySection {
                    day,
                    label: day.label(),
                    tasks: bucket.into_iter().cloned().collect(),
                }
            })
            .collect();
        Self {
            stats: Stats::from_tasks(tasks),
            filters: filters.clone(),
            days,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.days.iter().map(|section| section.tasks.len()).sum()
    }
}

pub fn render_progress(stats: &Stats) -> String {
    let filled = (stats.percent.min(100) * PROGRESS_CELLS / 100) as usize;
    let empty = PROGRESS_CELLS as usize - filled;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(empty))
}

pub fn render_text(view: &BoardView) -> String {
    let mut out = String::new();
    out.push_str("Raspored+\n");
    out.push_str(&format!(
        "Završeno: {}/{} • {}%\n",
        view.stats.done, view.stats.total, view.stats.percent
    ));
    out.push_str(&render_progress(&view.stats));
    out.push_str("\n\n");

    for section in &view.days {
        out.push_str(&format!(
            "{} ({} zadataka)\n",
            section.label,
            section.tasks.len()
        ));
        if section.tasks.is_empty() {
            out.push_str("  Nema zadataka\n\n");
            continue;
        }
        for task in &section.tasks {
            let mark = if task.is_done() { "x" } else { " " };
            out.push_str(&format!("  [{mark}] {} ({})\n", task.title, task.id));
            out.push_str(&format!(
                "      Prioritet: {} • Status: {}\n",
                task.priority, task.status
            ));
        }
        out.push('\n');
    }
    out
}
