//! Version-history reconstruction.
//!
//! - [`HistoryWalker`]: follows `previousVersion` links from a starting
//!   record to rebuild an entity's edit history, and resolves entry points
//!   through the on-chain event log.
//! - [`EventLog`]: seam for the anchor event log, with an HTTP indexer
//!   implementation ([`HttpEventLog`]), an in-memory one
//!   ([`MemoryEventLog`]) and a placeholder for unconfigured deployments
//!   ([`DisabledEventLog`]).

pub mod event_log;
pub mod indexer;
pub mod walker;

pub use event_log::{DisabledEventLog, EventLog, EventLogError, MemoryEventLog};
pub use indexer::{EventLogConfig, HttpEventLog};
pub use walker::{AnchorRecord, ContentComparison, HistoryWalker, WalkOptions, MAX_HISTORY_RECORDS};
