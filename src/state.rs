use thiserror::Error;

use crate::models::{clean_title, Stats, Status, Task, TaskPatch, ValidationError};
use crate::storage::{load_tasks, save_tasks, SlotStore, StorageError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owner of the canonical task list, newest first.
///
/// Every applied mutation is written through to the slot store. When the write fails the
/// mutation is undone, so the in-memory list always equals the last persisted one.
#[derive(Debug)]
pub struct TaskStore<S: SlotStore> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: SlotStore> TaskStore<S> {
    pub fn open(storage: S) -> Self {
        let tasks = load_tasks(&storage);
        Self { storage, tasks }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), StoreError> {
        let title = clean_title(&task.title)?;
        if self.get(&task.id).is_some() {
            return Err(ValidationError::DuplicateId(task.id).into());
        }
        self.tasks.insert(0, Task { title, ..task });
        if let Err(err) = self.persist() {
            self.tasks.remove(0);
            return Err(err);
        }
        log::debug!("task added id={} total={}", self.tasks[0].id, self.tasks.len());
        Ok(())
    }

    /// Returns `Ok(false)` without writing when no task has `id`.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<bool, StoreError> {
        patch.validate()?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.tasks[index].clone();
        patch.apply(&mut self.tasks[index])?;
        if let Err(err) = self.persist() {
            self.tasks[index] = previous;
            return Err(err);
        }
        log::debug!("task updated id={id}");
        Ok(true)
    }

    pub fn set_done(&mut self, id: &str, done: bool) -> Result<bool, StoreError> {
        let status = if done { Status::Done } else { Status::Todo };
        self.update_task(id, &TaskPatch::status(status))
    }

    /// Returns `Ok(false)` without writing when no task has `id`.
    pub fn delete_task(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let removed = self.tasks.remove(index);
        if let Err(err) = self.persist() {
            self.tasks.insert(index, removed);
            return Err(err);
        }
        log::debug!("task deleted id={id} total={}", self.tasks.len());
        Ok(true)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_tasks(&self.storage, &self.tasks).map_err(|err| {
            log::error!("failed to persist {} tasks: {err}", self.tasks.len());
            StoreError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayKey, Priority, TaskDraft};
    use crate::storage::{MemoryStore, TASKS_SLOT};
    use std::cell::Cell;

    fn make_task(id: &str, day: DayKey) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            day,
            priority: Priority::Medium,
            status: Status::Todo,
            created_at: "2024-01-01T08:00:00.000Z".to_string(),
        }
    }

    /// Memory store whose writes can be switched to fail.
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
                return Err(StorageError::Io(std::io::Error::other("quota exceeded")));
            }
            self.inner.write(slot, value)
        }
    }

    #[test]
    fn add_then_complete_updates_stats() {
        let mut store = TaskStore::open(MemoryStore::new());
        assert!(store.is_empty());

        let mut draft = TaskDraft::new("Vjezba", DayKey::Mon);
        draft.priority = Priority::High;
        let task = draft.into_task().unwrap();
        let id = task.id.clone();
        store.add_task(task).unwrap();
        let stats = store.stats();
        assert_eq!((stats.total, stats.done, stats.percent), (1, 0, 0));

        assert!(store.update_task(&id, &TaskPatch::status(Status::Done)).unwrap());
        let stats = store.stats();
        assert_eq!((stats.total, stats.done, stats.percent), (1, 1, 100));
    }

    #[test]
    fn add_prepends_and_writes_through() {
        let backing = MemoryStore::new();
        let mut store = TaskStore::open(backing.clone());
        store.add_task(make_task("a", DayKey::Mon)).unwrap();
        store.add_task(make_task("b", DayKey::Tue)).unwrap();

        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let reopened = TaskStore::open(backing);
        assert_eq!(reopened.tasks(), store.tasks());
    }

    #[test]
    fn add_trims_title_and_rejects_blank_or_duplicate() {
        let mut store = TaskStore::open(MemoryStore::new());
        let mut task = make_task("a", DayKey::Mon);
        task.title = "  padded  ".to_string();
        store.add_task(task).unwrap();
        assert_eq!(store.get("a").unwrap().title, "padded");

        let mut blank = make_task("b", DayKey::Mon);
        blank.title = " \t ".to_string();
        assert!(matches!(
            store.add_task(blank),
            Err(StoreError::Validation(ValidationError::EmptyTitle))
        ));

        assert!(matches!(
            store.add_task(make_task("a", DayKey::Fri)),
            Err(StoreError::Validation(ValidationError::DuplicateId(id))) if id == "a"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_and_delete_of_missing_id_are_noops() {
        let backing = MemoryStore::new();
        let mut store = TaskStore::open(backing.clone());
        assert!(!store
            .update_task("missing", &TaskPatch::status(Status::Done))
            .unwrap());
        assert!(!store.delete_task("missing").unwrap());
        // Nothing was applied, so nothing was written.
        assert!(backing.read(TASKS_SLOT).unwrap().is_none());
    }

    #[test]
    fn update_rejects_blank_title_and_keeps_task() {
        let mut store = TaskStore::open(MemoryStore::new());
        store.add_task(make_task("a", DayKey::Mon)).unwrap();
        let patch = TaskPatch {
            title: Some("   ".to_string()),
            status: Some(Status::Done),
            ..TaskPatch::default()
        };
        assert!(store.update_task("a", &patch).is_err());
        let task = store.get("a").unwrap();
        assert_eq!(task.title, "task-a");
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn set_done_toggles_between_done_and_todo() {
        let mut store = TaskStore::open(MemoryStore::new());
        let mut task = make_task("a", DayKey::Mon);
        task.status = Status::InProgress;
        store.add_task(task).unwrap();

        assert!(store.set_done("a", true).unwrap());
        assert_eq!(store.get("a").unwrap().status, Status::Done);
        assert!(store.set_done("a", false).unwrap());
        assert_eq!(store.get("a").unwrap().status, Status::Todo);
    }

    #[test]
    fn replayed_operations_match_expected_state() {
        let mut store = TaskStore::open(MemoryStore::new());
        for (id, day) in [("a", DayKey::Mon), ("b", DayKey::Wed), ("c", DayKey::Sun)] {
            store.add_task(make_task(id, day)).unwrap();
        }
        store
            .update_task(
                "b",
                &TaskPatch {
                    title: Some("renamed".to_string()),
                    day: Some(DayKey::Fri),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        store.delete_task("a").unwrap();
        store.update_task("a", &TaskPatch::status(Status::Done)).unwrap();
        store.add_task(make_task("d", DayKey::Mon)).unwrap();

        let mut expected_b = make_task("b", DayKey::Fri);
        expected_b.title = "renamed".to_string();
        let expected = vec![
            make_task("d", DayKey::Mon),
            make_task("c", DayKey::Sun),
            expected_b,
        ];
        assert_eq!(store.tasks(), expected.as_slice());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn failed_write_rolls_back_every_mutation() {
        let backing = FlakyStore::default();
        let mut store = TaskStore::open(&backing);
        store.add_task(make_task("a", DayKey::Mon)).unwrap();
        let snapshot = store.tasks().to_vec();

        backing.fail_writes.set(true);
        assert!(matches!(
            store.add_task(make_task("b", DayKey::Tue)),
            Err(StoreError::Storage(_))
        ));
        assert!(store.set_done("a", true).is_err());
        assert!(store.delete_task("a").is_err());
        assert_eq!(store.tasks(), snapshot.as_slice());

        backing.fail_writes.set(false);
        assert!(store.delete_task("a").unwrap());
        assert!(TaskStore::open(&backing).is_empty());
    }

    #[test]
    fn stats_stay_within_bounds() {
        let mut store = TaskStore::open(MemoryStore::new());
        for i in 0..7 {
            let mut task = make_task(&i.to_string(), DayKey::ALL[i]);
            if i % 3 == 0 {
                task.status = Status::Done;
            }
            store.add_task(task).unwrap();
            let stats = store.stats();
            assert!(stats.done <= stats.total);
            assert!(stats.percent <= 100);
        }
        assert_eq!(store.stats().done, 3);
        assert_eq!(store.stats().percent, 43);
    }

    #[test]
    fn opening_over_corrupt_slot_starts_empty() {
        let backing = MemoryStore::new();
        backing.write(TASKS_SLOT, "not json").unwrap();
        let store = TaskStore::open(backing);
        assert!(store.is_empty());
    }
}
