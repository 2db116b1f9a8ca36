//! Single delivery context for every callback a session receives.
//!
//! Store writes and OS setting writes may happen on any thread; they only
//! post events here. The owning session drains the queue on its own thread,
//! so no two callbacks ever run concurrently.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    /// The launcher's own store changed this key.
    StoreChanged(String),
    /// A value watched by this external-state observer changed.
    ExternalChanged(ObserverToken),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<SettingsEvent>,
}

impl EventSender {
    /// Returns false once the receiving session is gone.
    pub fn post(&self, event: SettingsEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct EventQueue {
    rx: Receiver<SettingsEvent>,
    tx: Sender<SettingsEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn try_next(&self) -> Option<SettingsEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
