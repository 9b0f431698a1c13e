//! # Connectivity Monitor
//!
//! Tracks the terminal's online/offline state on a watch channel.
//!
//! The embedding shell feeds browser `online`/`offline` events (or its
//! own probe) into [`ConnectionMonitor::set`]; the sync agent subscribes
//! and reacts to the offline→online TRANSITION. There is no polling -
//! reconciliation is purely event-driven.

use std::sync::Arc;
use tokio::sync::watch;

/// Connectivity state of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Online,
    Offline,
}

impl ConnectionState {
    /// True when online.
    pub const fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online)
    }
}

/// Shared connectivity flag.
///
/// Cheaply cloneable; all clones observe and drive the same state.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    sender: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionMonitor {
    /// Creates a monitor with the given initial state.
    pub fn new(initial: ConnectionState) -> Self {
        let (sender, _) = watch::channel(initial);
        ConnectionMonitor {
            sender: Arc::new(sender),
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.sender.borrow()
    }

    /// True when the terminal is currently online.
    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Records a connectivity change (browser event or probe result).
    pub fn set(&self, state: ConnectionState) {
        self.sender.send_replace(state);
    }

    /// Shorthand for `set(ConnectionState::Online)`.
    pub fn set_online(&self) {
        self.set(ConnectionState::Online);
    }

    /// Shorthand for `set(ConnectionState::Offline)`.
    pub fn set_offline(&self) {
        self.set(ConnectionState::Offline);
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.sender.subscribe()
    }
}

impl Default for ConnectionMonitor {
    /// Terminals start offline until the shell reports otherwise.
    fn default() -> Self {
        ConnectionMonitor::new(ConnectionState::Offline)
    }
}
