use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Folder,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteEntry {
    pub(crate) name: String,
    pub(crate) size: i64,
    pub(crate) modified: DateTime<Local>,
    pub(crate) kind: EntryKind,
}

/// One directory listing, kept as a whole until the next successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) path: String,
    pub(crate) entries: Vec<RemoteEntry>,
    pub(crate) fetched_at: DateTime<Local>,
}

impl Snapshot {
    pub(crate) fn new(path: impl Into<String>, entries: Vec<RemoteEntry>) -> Self {
        Self {
            path: path.into(),
            entries,
            fetched_at: Local::now(),
        }
    }

    pub(crate) fn find(&self, name: &str) -> Option<&RemoteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatchResult {
    Found(RemoteEntry),
    FoundAsPartial(RemoteEntry),
    NotFound(String),
}

impl MatchResult {
    pub(crate) fn entry(&self) -> Option<&RemoteEntry> {
        match self {
            MatchResult::Found(entry) | MatchResult::FoundAsPartial(entry) => Some(entry),
            MatchResult::NotFound(_) => None,
        }
    }

    /// The name as listed for a hit, or the looked-up candidate for a miss.
    pub(crate) fn name(&self) -> &str {
        match self {
            MatchResult::Found(entry) | MatchResult::FoundAsPartial(entry) => &entry.name,
            MatchResult::NotFound(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Quit,
    Refresh,
    PasteCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopState {
    Idle,
    Busy,
}

#[cfg(test)]
pub(crate) fn entry(name: &str, size: i64) -> RemoteEntry {
    RemoteEntry {
        name: name.to_string(),
        size,
        modified: Local::now(),
        kind: EntryKind::File,
    }
}
