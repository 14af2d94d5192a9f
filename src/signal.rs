//! Named signals exchanged with the host
//!
//! Inbound signals (`echojrFileSelected`, `echojrAction`) travel over an mpsc
//! channel to the brain; the outbound `echojrFileCached` signal is broadcast to
//! any number of subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

pub const FILE_SELECTED: &str = "echojrFileSelected";
pub const ACTION: &str = "echojrAction";
pub const FILE_CACHED: &str = "echojrFileCached";

/// Capacity of the inbound channel
const INBOUND_CAPACITY: usize = 32;

/// Capacity of the outbound broadcast buffer per subscriber
const OUTBOUND_CAPACITY: usize = 16;

/// Signals the host can send in
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A file path was selected
    FileSelected(String),
    /// Arbitrary action payload, observed only
    Action(Value),
}

impl Signal {
    /// Host-facing name of the signal
    pub fn name(&self) -> &'static str {
        match self {
            Signal::FileSelected(_) => FILE_SELECTED,
            Signal::Action(_) => ACTION,
        }
    }
}

/// Payload of the file-cached signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSignal {
    /// File selected when the fetch completed
    pub file: String,
    /// Length of the decoded text in characters
    pub size: usize,
}

/// Cloneable handle for sending inbound signals
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<Signal>,
}

impl SignalSender {
    /// Sends a signal; returns `false` if the receiving side is gone
    pub async fn send(&self, signal: Signal) -> bool {
        self.tx.send(signal).await.is_ok()
    }

    pub async fn select_file(&self, file: impl Into<String>) -> bool {
        self.send(Signal::FileSelected(file.into())).await
    }

    pub async fn action(&self, payload: Value) -> bool {
        self.send(Signal::Action(payload)).await
    }
}

/// Creates the inbound signal channel
pub fn channel() -> (SignalSender, mpsc::Receiver<Signal>) {
    let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
    (SignalSender { tx }, rx)
}

/// Broadcasts file-cached signals to subscribers
#[derive(Debug, Clone)]
pub struct CachedBroadcaster {
    tx: broadcast::Sender<CachedSignal>,
}

impl CachedBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(OUTBOUND_CAPACITY);
        Self { tx }
    }

    /// Emits a signal; with no subscribers it is dropped
    pub fn emit(&self, signal: CachedSignal) {
        let _ = self.tx.send(signal);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CachedSignal> {
        self.tx.subscribe()
    }
}

impl Default for CachedBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks for a pending file-cached signal without blocking
///
/// A lagged receiver skips the signals it missed and returns the oldest one
/// still buffered.
pub fn try_recv(receiver: &mut broadcast::Receiver<CachedSignal>) -> Option<CachedSignal> {
    loop {
        match receiver.try_recv() {
            Ok(signal) => return Some(signal),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return None,
        }
    }
}
