//! Raspored+: a weekly task planner.
//!
//! [`state::TaskStore`] owns the task list and writes every change through to a
//! [`storage::SlotStore`]. The [`derive`] and [`board`] modules turn that list into the
//! filtered, day-grouped board, and [`commands`] wraps it all for front-ends.

pub mod board;
pub mod commands;
pub mod config;
pub mod derive;
pub mod events;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
pub mod theme;

pub use models::{
    DayKey, Filters, Priority, Selector, Stats, Status, Task, TaskDraft, TaskPatch, ThemeMode,
};
pub use state::{StoreError, TaskStore};
pub use storage::{FileStore, MemoryStore, SlotStore, StorageError};
