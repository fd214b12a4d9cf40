use crate::board::BoardView;
use crate::events::{StatePayload, EVENT_STATE_UPDATED};
use crate::models::{Filters, Stats, Task, TaskDraft, TaskPatch, ThemeMode};
use crate::state::TaskStore;
use crate::storage::SlotStore;
use crate::theme::{self, load_theme, save_theme};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Where state change notifications go once a command has been applied and persisted.
pub trait CommandCtx {
    fn emit_state_updated(&self, payload: StatePayload);
}

/// Context for one-shot front-ends that only need the change in the log.
#[derive(Debug, Default)]
pub struct LogCtx;

impl CommandCtx for LogCtx {
    fn emit_state_updated(&self, payload: StatePayload) {
        log::debug!(
            "{EVENT_STATE_UPDATED} tasks={} done={} theme={}",
            payload.stats.total,
            payload.stats.done,
            payload.theme
        );
    }
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

impl<T> CommandResult<T> {
    /// A failed result carrying only `message`, for front-ends that reject input before any command runs.
    pub fn failure(message: impl Into<String>) -> Self {
        CommandResult {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult::failure(message)
}

fn snapshot<S: SlotStore>(state: &TaskStore<S>) -> StatePayload {
    StatePayload {
        tasks: state.tasks().to_vec(),
        theme: load_theme(state.storage()),
        stats: state.stats(),
    }
}

pub fn load_state<S: SlotStore>(state: &TaskStore<S>) -> CommandResult<StatePayload> {
    ok(snapshot(state))
}

pub fn create_task<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &mut TaskStore<S>,
    draft: TaskDraft,
) -> CommandResult<Task> {
    let task = match draft.into_task() {
        Ok(task) => task,
        Err(error) => return err(&error.to_string()),
    };
    let id = task.id.clone();
    if let Err(error) = state.add_task(task) {
        return err(&error.to_string());
    }
    ctx.emit_state_updated(snapshot(state));
    match state.get(&id) {
        Some(task) => ok(task.clone()),
        None => err("task not found"),
    }
}

pub fn update_task<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &mut TaskStore<S>,
    task_id: &str,
    patch: TaskPatch,
) -> CommandResult<Task> {
    match state.update_task(task_id, &patch) {
        Ok(true) => {}
        Ok(false) => return err("task not found"),
        Err(error) => return err(&error.to_string()),
    }
    ctx.emit_state_updated(snapshot(state));
    match state.get(task_id) {
        Some(task) => ok(task.clone()),
        None => err("task not found"),
    }
}

pub fn set_done<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &mut TaskStore<S>,
    task_id: &str,
    done: bool,
) -> CommandResult<Task> {
    match state.set_done(task_id, done) {
        Ok(true) => {}
        Ok(false) => return err("task not found"),
        Err(error) => return err(&error.to_string()),
    }
    ctx.emit_state_updated(snapshot(state));
    match state.get(task_id) {
        Some(task) => ok(task.clone()),
        None => err("task not found"),
    }
}

pub fn delete_task<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &mut TaskStore<S>,
    task_id: &str,
) -> CommandResult<bool> {
    match state.delete_task(task_id) {
        Ok(true) => {}
        Ok(false) => return err("task not found"),
        Err(error) => return err(&error.to_string()),
    }
    ctx.emit_state_updated(snapshot(state));
    ok(true)
}

pub fn current_theme<S: SlotStore>(state: &TaskStore<S>) -> CommandResult<ThemeMode> {
    ok(load_theme(state.storage()))
}

pub fn set_theme<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &TaskStore<S>,
    mode: ThemeMode,
) -> CommandResult<ThemeMode> {
    if let Err(error) = save_theme(state.storage(), mode) {
        return err(&format!("storage error: {error}"));
    }
    ctx.emit_state_updated(snapshot(state));
    ok(mode)
}

pub fn toggle_theme<S: SlotStore>(
    ctx: &impl CommandCtx,
    state: &TaskStore<S>,
) -> CommandResult<ThemeMode> {
    let next = match theme::toggle_theme(state.storage()) {
        Ok(mode) => mode,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    ctx.emit_state_updated(snapshot(state));
    ok(next)
}

pub fn board<S: SlotStore>(state: &TaskStore<S>, filters: &Filters) -> CommandResult<BoardView> {
    ok(BoardView::build(state.tasks(), filters))
}

pub fn stats<S: SlotStore>(state: &TaskStore<S>) -> CommandResult<Stats> {
    ok(state.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayKey, Priority, Selector, Status};
    use crate::storage::{FileStore, MemoryStore, StorageError, TASKS_SLOT, THEME_SLOT};
    use std::cell::Cell;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestCtx {
        emitted: Mutex<Vec<StatePayload>>,
    }

    impl CommandCtx for TestCtx {
        fn emit_state_updated(&self, payload: StatePayload) {
            self.emitted.lock().unwrap().push(payload);
        }
    }

    impl TestCtx {
        fn emitted(&self) -> usize {
            self.emitted.lock().unwrap().len()
        }
    }

    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: Cell<bool>,
    }

    impl SlotStore for FlakyStore {
        fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(slot)
        }

        fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.get() {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.write(slot, value)
        }
    }

    #[test]
    fn ok_and_err_helpers_construct_expected_shape() {
        let r = ok(123);
        assert!(r.ok);
        assert_eq!(r.data, Some(123));
        assert_eq!(r.error, None);

        let r: CommandResult<i32> = err("nope");
        assert!(!r.ok);
        assert_eq!(r.data, None);
        assert_eq!(r.error, Some("nope".to_string()));
    }

    #[test]
    fn failure_serializes_as_the_error_envelope() {
        let r: CommandResult<Task> = CommandResult::failure("nothing to change");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            serde_json::json!({"ok": false, "data": null, "error": "nothing to change"})
        );
    }

    #[test]
    fn create_edit_toggle_and_delete_emit_state() {
        let ctx = TestCtx::default();
        let mut state = TaskStore::open(MemoryStore::new());

        let mut draft = TaskDraft::new(" Vjezba ", DayKey::Mon);
        draft.priority = Priority::High;
        let res = create_task(&ctx, &mut state, draft);
        assert!(res.ok);
        let created = res.data.unwrap();
        assert_eq!(created.title, "Vjezba");
        assert_eq!(ctx.emitted(), 1);

        let patch = TaskPatch {
            title: Some("Vjezba 2".to_string()),
            day: Some(DayKey::Thu),
            ..TaskPatch::default()
        };
        let res = update_task(&ctx, &mut state, &created.id, patch);
        assert!(res.ok);
        let updated = res.data.unwrap();
        assert_eq!(updated.title, "Vjezba 2");
        assert_eq!(updated.day, DayKey::Thu);
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.created_at, created.created_at);

        let res = set_done(&ctx, &mut state, &created.id, true);
        assert_eq!(res.data.unwrap().status, Status::Done);
        let last = ctx.emitted.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.stats.percent, 100);

        let res = delete_task(&ctx, &mut state, &created.id);
        assert!(res.ok);
        assert!(state.is_empty());
        assert_eq!(ctx.emitted(), 4);
    }

    #[test]
    fn missing_ids_and_invalid_input_fail_without_emitting() {
        let ctx = TestCtx::default();
        let mut state = TaskStore::open(MemoryStore::new());

        let res = create_task(&ctx, &mut state, TaskDraft::new("   ", DayKey::Mon));
        assert!(!res.ok);
        assert_eq!(res.error.as_deref(), Some("title must not be empty"));

        let res = update_task(&ctx, &mut state, "missing", TaskPatch::status(Status::Done));
        assert_eq!(res.error.as_deref(), Some("task not found"));
        let res = set_done(&ctx, &mut state, "missing", false);
        assert_eq!(res.error.as_deref(), Some("task not found"));
        let res = delete_task(&ctx, &mut state, "missing");
        assert_eq!(res.error.as_deref(), Some("task not found"));

        assert_eq!(ctx.emitted(), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn storage_failure_is_reported_and_nothing_changes() {
        let ctx = TestCtx::default();
        let backing = FlakyStore::default();
        let mut state = TaskStore::open(&backing);
        backing.fail_writes.set(true);

        let res = create_task(&ctx, &mut state, TaskDraft::new("a", DayKey::Mon));
        assert!(!res.ok);
        assert!(res.error.unwrap().starts_with("storage error"));
        assert!(state.is_empty());

        let res = set_theme(&ctx, &state, ThemeMode::Dark);
        assert!(!res.ok);
        assert_eq!(load_theme(&backing), ThemeMode::Light);
        assert_eq!(ctx.emitted(), 0);
    }

    #[test]
    fn theme_commands_persist_and_report_mode() {
        let ctx = TestCtx::default();
        let dir = tempfile::tempdir().unwrap();
        let state = TaskStore::open(FileStore::new(dir.path().to_path_buf()));

        assert_eq!(load_state(&state).data.unwrap().theme, ThemeMode::Light);
        assert_eq!(toggle_theme(&ctx, &state).data, Some(ThemeMode::Dark));
        assert_eq!(current_theme(&state).data, Some(ThemeMode::Dark));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(THEME_SLOT)).unwrap(),
            "dark"
        );
        assert_eq!(set_theme(&ctx, &state, ThemeMode::Light).data, Some(ThemeMode::Light));
        assert_eq!(ctx.emitted(), 2);
        assert!(!dir.path().join(TASKS_SLOT).exists());
    }

    #[test]
    fn board_and_stats_reflect_store() {
        let ctx = TestCtx::default();
        let mut state = TaskStore::open(MemoryStore::new());
        for (title, day) in [("a", DayKey::Mon), ("b", DayKey::Mon), ("c", DayKey::Sat)] {
            assert!(create_task(&ctx, &mut state, TaskDraft::new(title, day)).ok);
        }
        let monday_id = state.tasks()[1].id.clone();
        assert!(set_done(&ctx, &mut state, &monday_id, true).ok);

        let summary = stats(&state).data.unwrap();
        assert_eq!((summary.total, summary.done, summary.percent), (3, 1, 33));

        let filters = Filters {
            day: Selector::Only(DayKey::Mon),
            ..Filters::default()
        };
        let view = board(&state, &filters).data.unwrap();
        assert_eq!(view.visible_count(), 2);
        assert_eq!(view.days[0].tasks[1].id, monday_id);
    }
}
