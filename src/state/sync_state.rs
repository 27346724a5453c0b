/// Sync state definitions for stored articles
///
/// Every article saved by a crawl starts out pending. The synchronization
/// client moves it to synced, or to failed with an error message; failed
/// articles are picked up again on the next sync pass.
use std::fmt;

/// Represents where a stored article is in the sync process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    /// Saved by a crawl, not yet pushed to the destination
    Pending,

    /// Pushed to the destination
    Synced,

    /// The last push attempt failed
    Failed,
}

impl SyncState {
    /// Returns true if the sync client still has work to do for this article
    pub fn needs_sync(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }

    /// Converts the sync state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
        }
    }

    /// Parses a sync state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "synced" => Some(Self::Synced),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible sync states
    pub fn all_states() -> [Self; 3] {
        [Self::Pending, Self::Synced, Self::Failed]
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
