//! OS-level settings living outside the launcher's own store.
//!
//! Two disjoint namespaces, each a sled tree of string values. Content
//! observers subscribe to keys in one namespace and receive an
//! [`SettingsEvent::ExternalChanged`] for their token on every write.

use crate::event::{EventSender, ObserverToken, SettingsEvent};
use anyhow::{Context as _, Result};
use std::sync::{Arc, Mutex, PoisonError};

pub const ACCELEROMETER_ROTATION: &str = "accelerometer_rotation";
pub const NOTIFICATION_BADGING: &str = "notification_badging";
pub const ENABLED_NOTIFICATION_LISTENERS: &str = "enabled_notification_listeners";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    System,
    Secure,
}

impl Scope {
    pub fn tree_name(self) -> &'static str {
        match self {
            Self::System => "os_system",
            Self::Secure => "os_secure",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "secure" => Some(Self::Secure),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ContentObserver {
    token: ObserverToken,
    scope: Scope,
    keys: Vec<String>,
    sender: EventSender,
}

#[derive(Debug, Default)]
struct Observers {
    next_token: u64,
    entries: Vec<ContentObserver>,
}

#[derive(Clone)]
pub struct OsSettings {
    system: sled::Tree,
    secure: sled::Tree,
    observers: Arc<Mutex<Observers>>,
}

impl OsSettings {
    pub fn from_db(db: &sled::Db) -> Result<Self> {
        let open = |scope: Scope| {
            db.open_tree(scope.tree_name())
                .with_context(|| format!("failed to open tree {}", scope.tree_name()))
        };
        Ok(Self {
            system: open(Scope::System)?,
            secure: open(Scope::Secure)?,
            observers: Arc::default(),
        })
    }

    fn tree(&self, scope: Scope) -> &sled::Tree {
        match scope {
            Scope::System => &self.system,
            Scope::Secure => &self.secure,
        }
    }

    /// Raw string value; a missing row, read error or non-UTF-8 value reads as absent.
    pub fn get_string(&self, scope: Scope, key: &str) -> Option<String> {
        match self.tree(scope).get(key) {
            Ok(Some(raw)) => String::from_utf8(raw.to_vec()).ok(),
            Ok(None) => None,
            Err(err) => {
                crate::debug_log!("[os] read failed: {:?}/{} | {}", scope, key, err);
                None
            }
        }
    }

    pub fn get_int(&self, scope: Scope, key: &str, default: i64) -> i64 {
        self.get_string(scope, key)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(default)
    }

    /// `key == 1`; absent or garbled rows count as disabled.
    pub fn get_flag(&self, scope: Scope, key: &str) -> bool {
        self.get_int(scope, key, 0) == 1
    }

    pub fn put_string(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        self.tree(scope)
            .insert(key, value.as_bytes())
            .with_context(|| format!("failed to write {scope:?}/{key}"))?;
        self.notify(scope, key);
        Ok(())
    }

    pub fn put_int(&self, scope: Scope, key: &str, value: i64) -> Result<()> {
        self.put_string(scope, key, &value.to_string())
    }

    pub fn delete(&self, scope: Scope, key: &str) -> Result<()> {
        let previous = self
            .tree(scope)
            .remove(key)
            .with_context(|| format!("failed to delete {scope:?}/{key}"))?;
        if previous.is_some() {
            self.notify(scope, key);
        }
        Ok(())
    }

    pub fn register_content_observer(
        &self,
        scope: Scope,
        keys: &[&str],
        sender: EventSender,
    ) -> ObserverToken {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let token = ObserverToken(observers.next_token);
        observers.next_token += 1;
        observers.entries.push(ContentObserver {
            token,
            scope,
            keys: keys.iter().map(|key| key.to_string()).collect(),
            sender,
        });
        crate::debug_log!("[os] observer {:?} watching {:?} {:?}", token, scope, keys);
        token
    }

    pub fn unregister_content_observer(&self, token: ObserverToken) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.entries.len();
        observers.entries.retain(|entry| entry.token != token);
        observers.entries.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn notify(&self, scope: Scope, key: &str) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        observers.entries.retain(|entry| {
            if entry.scope != scope || !entry.keys.iter().any(|watched| watched == key) {
                return true;
            }
            entry
                .sender
                .post(SettingsEvent::ExternalChanged(entry.token))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventQueue;
    use crate::store::temporary_database;

    fn os() -> OsSettings {
        OsSettings::from_db(&temporary_database().unwrap()).unwrap()
    }

    #[test]
    fn absent_and_garbled_rows_read_as_disabled() {
        let os = os();
        assert!(!os.get_flag(Scope::System, ACCELEROMETER_ROTATION));
        os.put_string(Scope::System, ACCELEROMETER_ROTATION, "yes")
            .unwrap();
        assert!(!os.get_flag(Scope::System, ACCELEROMETER_ROTATION));
        os.put_int(Scope::System, ACCELEROMETER_ROTATION, 1).unwrap();
        assert!(os.get_flag(Scope::System, ACCELEROMETER_ROTATION));
        assert_eq!(os.get_string(Scope::Secure, ENABLED_NOTIFICATION_LISTENERS), None);
    }

    #[test]
    fn namespaces_are_disjoint() {
        let os = os();
        os.put_int(Scope::Secure, NOTIFICATION_BADGING, 1).unwrap();
        assert!(os.get_flag(Scope::Secure, NOTIFICATION_BADGING));
        assert!(!os.get_flag(Scope::System, NOTIFICATION_BADGING));
    }

    #[test]
    fn observers_only_hear_their_scope_and_keys() {
        let os = os();
        let queue = EventQueue::new();
        let token = os.register_content_observer(
            Scope::Secure,
            &[NOTIFICATION_BADGING, ENABLED_NOTIFICATION_LISTENERS],
            queue.sender(),
        );

        os.put_int(Scope::System, NOTIFICATION_BADGING, 1).unwrap();
        os.put_int(Scope::Secure, "unrelated", 1).unwrap();
        assert_eq!(queue.try_next(), None);

        os.put_string(Scope::Secure, ENABLED_NOTIFICATION_LISTENERS, "a/b")
            .unwrap();
        assert_eq!(
            queue.try_next(),
            Some(SettingsEvent::ExternalChanged(token))
        );

        assert!(os.unregister_content_observer(token));
        os.put_int(Scope::Secure, NOTIFICATION_BADGING, 0).unwrap();
        assert_eq!(queue.try_next(), None);
        assert_eq!(os.observer_count(), 0);
    }

    #[test]
    fn scope_names_parse() {
        assert_eq!(Scope::parse("System"), Some(Scope::System));
        assert_eq!(Scope::parse(" secure "), Some(Scope::Secure));
        assert_eq!(Scope::parse("global"), None);
    }
}
