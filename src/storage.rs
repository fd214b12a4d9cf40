use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::models::Task;

pub const TASKS_SLOT: &str = "tasks";
pub const THEME_SLOT: &str = "theme";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid slot name `{0}`")]
    InvalidSlot(String),
}

/// A named-slot key-value store holding one string per slot.
pub trait SlotStore {
    /// Returns `Ok(None)` when the slot has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the whole value of `slot`.
    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: SlotStore + ?Sized> SlotStore for &S {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        (**self).read(slot)
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(slot, value)
    }
}

/// Slots stored as one file each under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && !slot.contains(['/', '\\'])
            && slot != "."
            && !slot.contains("..");
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(slot))
    }

    fn write_atomic(&self, path: PathBuf, bytes: &[u8]) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl SlotStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(slot)?;
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(Some(buf))
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        self.write_atomic(path, value.as_bytes())
    }
}

/// In-process slots. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds complete values: every write is a single insert.
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(slot).cloned())
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads the task list. Missing, unreadable or malformed data yields an empty list.
pub fn load_tasks(store: &impl SlotStore) -> Vec<Task> {
    let raw = match store.read(TASKS_SLOT) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::warn!("tasks slot unreadable, starting empty: {err}");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Task>>(&raw) {
        Ok(tasks) => {
            log::debug!("loaded {} tasks", tasks.len());
            tasks
        }
        Err(err) => {
            log::warn!("tasks slot is malformed, starting empty: {err}");
            Vec::new()
        }
    }
}

pub fn save_tasks(store: &impl SlotStore, tasks: &[Task]) -> Result<(), StorageError> {
    let json = serde_json::to_string(tasks)?;
    store.write(TASKS_SLOT, &json)
}
