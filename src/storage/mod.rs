//! Durable key-value storage for session state
//!
//! Stands in for browser local storage: each key maps to one JSON file in an
//! XDG-compliant data directory. Only the selected file path is stored here.

mod manager;

pub use manager::{Storage, StorageError, StoredValue};

/// Key under which the selected file path is stored
pub const SELECTED_FILE_KEY: &str = "echojr-selected-file";
