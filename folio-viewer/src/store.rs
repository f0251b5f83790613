//! Navigation state that survives reloads: the last page shown and two
//! one-shot UI flags.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tracing::debug;

pub const CURRENT_PAGE_KEY: &str = "currentPage";
pub const SEEN_HOME_HINT_KEY: &str = "seenHomeHint";
pub const NOTIFICATION_DISMISSED_KEY: &str = "notificationDismissed";

/// Raw string store backing [`NavigationStore`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object on disk. Writes go through a temp file and a rename so a
/// crash never leaves a half-written state file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file {:?}", self.path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to decode state file {:?}", self.path))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state directory {:?}", parent))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let payload = serde_json::to_string_pretty(entries)?;
        let mut file =
            fs::File::create(&tmp).with_context(|| format!("failed to open {:?}", tmp))?;
        file.write_all(payload.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A state file that can't be read is replaced rather than left to
        // block every later write.
        let mut entries = self.read_all().unwrap_or_else(|err| {
            debug!(?err, "discarding unreadable state file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// Typed view over a [`KeyValueStore`]. Every failure degrades to the default
/// value or a no-op; an unavailable store must never break navigation.
#[derive(Clone)]
pub struct NavigationStore {
    backend: Arc<dyn KeyValueStore>,
}

impl NavigationStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Last persisted page if it parses as a positive integer.
    pub fn current_page(&self) -> Option<u32> {
        self.read(CURRENT_PAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page > 0)
    }

    /// Restored page, or 1 when nothing usable was stored.
    pub fn initial_page(&self) -> u32 {
        self.current_page().unwrap_or(1)
    }

    pub fn save_current_page(&self, page: u32) {
        self.write(CURRENT_PAGE_KEY, &page.to_string());
    }

    pub fn seen_home_hint(&self) -> bool {
        self.flag(SEEN_HOME_HINT_KEY)
    }

    pub fn mark_home_hint_seen(&self) {
        self.write(SEEN_HOME_HINT_KEY, "true");
    }

    pub fn notification_dismissed(&self) -> bool {
        self.flag(NOTIFICATION_DISMISSED_KEY)
    }

    pub fn dismiss_notification(&self) {
        self.write(NOTIFICATION_DISMISSED_KEY, "true");
    }

    fn flag(&self, key: &str) -> bool {
        self.read(key).is_some_and(|raw| raw == "true")
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                debug!(key, ?err, "state store unavailable, using default");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            debug!(key, ?err, "could not save navigation state");
        }
    }
}

impl std::fmt::Debug for NavigationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStore").finish_non_exhaustive()
    }
}
