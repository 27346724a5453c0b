//! State module for tracking stored articles
//!
//! # Components
//!
//! - `SyncState`: where a stored article is in the hand-off to the
//!   synchronization client (pending, synced, failed)

mod sync_state;

pub use sync_state::SyncState;
