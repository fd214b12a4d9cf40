use crate::models::{Stats, Task, ThemeMode};

pub const EVENT_STATE_UPDATED: &str = "state_updated";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StatePayload {
    pub tasks: Vec<Task>,
    pub theme: ThemeMode,
    pub stats: Stats,
}
