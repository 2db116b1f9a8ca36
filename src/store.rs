use crate::event::{EventSender, SettingsEvent};
use anyhow::{Context as _, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const SETTINGS_TREE: &str = "launcher_prefs";
const LOCAL_STATE_DB_DIR_NAME: &str = "prefs_db";
// A relaunched process waits up to 5 s for the exiting one to drop the lock.
const LOCK_RETRY_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, EventSender)>,
}

/// Persisted preference map shared by the whole process.
///
/// Writes go straight to sled and are flushed; every registered listener is
/// then told which key changed. Keys this crate does not know are stored
/// and reported like any other.
#[derive(Clone)]
pub struct SettingsStore {
    tree: sled::Tree,
    listeners: Arc<Mutex<Listeners>>,
}

pub fn local_state_db_path() -> PathBuf {
    crate::config::data_dir().join(LOCAL_STATE_DB_DIR_NAME)
}

pub fn open_database(path: &Path) -> Result<sled::Db> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    retry_while_locked(LOCK_RETRY_ATTEMPTS, LOCK_RETRY_DELAY, || sled::open(path))
        .with_context(|| format!("failed to open db at {}", path.display()))
}

fn is_lock_contention(err: &sled::Error) -> bool {
    match err {
        sled::Error::Io(io_err) => {
            io_err.kind() == io::ErrorKind::WouldBlock
                || io_err.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

/// Re-runs `open` while the database is locked by another process.
fn retry_while_locked<T>(
    attempts: u32,
    delay: Duration,
    mut open: impl FnMut() -> sled::Result<T>,
) -> sled::Result<T> {
    let mut attempt = 1;
    loop {
        match open() {
            Err(err) if attempt < attempts && is_lock_contention(&err) => {
                crate::debug_log!("[store] db locked, retry {}/{}", attempt, attempts);
                std::thread::sleep(delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub fn temporary_database() -> Result<sled::Db> {
    sled::Config::new()
        .temporary(true)
        .open()
        .context("failed to open temporary db")
}

fn decode_stored_bool(value: Option<sled::IVec>, default: bool) -> bool {
    let Some(raw) = value else {
        return default;
    };
    raw.first().copied().map(|v| v != 0).unwrap_or(default)
}

fn decode_stored_string(value: Option<sled::IVec>) -> Option<String> {
    let raw = value?;
    String::from_utf8(raw.to_vec()).ok()
}

impl SettingsStore {
    pub fn from_db(db: &sled::Db) -> Result<Self> {
        let tree = db
            .open_tree(SETTINGS_TREE)
            .with_context(|| format!("failed to open tree {SETTINGS_TREE}"))?;
        Ok(Self {
            tree,
            listeners: Arc::default(),
        })
    }

    fn read(&self, key: &str) -> Option<sled::IVec> {
        match self.tree.get(key) {
            Ok(value) => value,
            Err(err) => {
                crate::debug_log!("[store] read failed: {} | {}", key, err);
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read(key).is_some()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        decode_stored_string(self.read(key))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        decode_stored_bool(self.read(key), default)
    }

    pub fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, value.as_bytes())
    }

    pub fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.write(key, [u8::from(value)].as_slice())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let previous = self
            .tree
            .remove(key)
            .with_context(|| format!("failed to remove {key}"))?;
        if previous.is_some() {
            self.tree.flush().context("failed to flush settings")?;
            self.notify(key);
        }
        Ok(())
    }

    /// Rewriting the stored value is not a change: no flush, no notification.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let previous = self
            .tree
            .insert(key, bytes)
            .with_context(|| format!("failed to write {key}"))?;
        if previous.as_deref() == Some(bytes) {
            return Ok(());
        }
        self.tree.flush().context("failed to flush settings")?;
        self.notify(key);
        Ok(())
    }

    pub fn register_listener(&self, sender: EventSender) -> ListenerId {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, sender));
        id
    }

    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn notify(&self, key: &str) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entries.retain(|(id, sender)| {
            let delivered = sender.post(SettingsEvent::StoreChanged(key.to_string()));
            if !delivered {
                crate::debug_log!("[store] dropping dead listener {:?}", id);
            }
            delivered
        });
    }
}
