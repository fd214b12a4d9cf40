use crate::models::ThemeMode;
use crate::storage::{SlotStore, StorageError, THEME_SLOT};

/// Reads the display mode, falling back to light for anything but `light` / `dark`.
pub fn load_theme(store: &impl SlotStore) -> ThemeMode {
    match store.read(THEME_SLOT) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|err| {
            log::warn!("ignoring stored theme: {err}");
            ThemeMode::default()
        }),
        Ok(None) => ThemeMode::default(),
        Err(err) => {
            log::warn!("theme slot unreadable: {err}");
            ThemeMode::default()
        }
    }
}

pub fn save_theme(store: &impl SlotStore, mode: ThemeMode) -> Result<(), StorageError> {
    store.write(THEME_SLOT, mode.as_str())
}

pub fn toggle_theme(store: &impl SlotStore) -> Result<ThemeMode, StorageError> {
    let next = load_theme(store).toggled();
    save_theme(store, next)?;
    Ok(next)
}
