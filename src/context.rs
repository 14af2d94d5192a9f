//! In-memory context record
//!
//! The owner/repo pair, the selected file path and the last decoded file body.
//! Only `selected_file` outlives a session, and only through `storage`.

/// Owner, repo, selected file and the most recently cached file body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Repository owner, unset until `set_context`
    pub owner: Option<String>,
    /// Repository name, unset until `set_context`
    pub repo: Option<String>,
    /// Path of the selected file
    pub selected_file: Option<String>,
    /// Body of the last successful fetch
    ///
    /// Not tied to `selected_file`: whichever fetch resolves last wins.
    pub last_file_content: Option<String>,
}

/// Snapshot of everything a fetch needs, taken before the request goes out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl Context {
    /// Creates a context with a selection restored from storage
    pub fn with_selected_file(selected_file: Option<String>) -> Self {
        Self {
            selected_file,
            ..Default::default()
        }
    }

    /// Overwrites both owner and repo
    pub fn set_repo_context(&mut self, owner: String, repo: String) {
        self.owner = Some(owner);
        self.repo = Some(repo);
    }

    /// Returns the fetch target, or `None` if owner, repo or file is missing or empty
    pub fn fetch_target(&self) -> Option<FetchTarget> {
        let present = |field: &Option<String>| field.clone().filter(|value| !value.is_empty());
        Some(FetchTarget {
            owner: present(&self.owner)?,
            repo: present(&self.repo)?,
            path: present(&self.selected_file)?,
        })
    }
}
