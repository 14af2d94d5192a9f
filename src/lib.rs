//! Echo Jr library
//!
//! Holds the owner/repo/selected-file context, reacts to file-selection and
//! action signals, and caches the decoded contents of the selected file.

pub mod brain;
pub mod cli;
pub mod context;
pub mod github;
pub mod signal;
pub mod storage;
