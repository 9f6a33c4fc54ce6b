//! State module for tracking enrichment progress
//!
//! # Components
//!
//! - `WorkItem` / `ResolvedRecord`: an item pending resolution and its result
//! - `ItemOutcome`: how a single resolution ended
//! - `ProgressState`: processed/total counters with ETA estimation
//! - `CompletedSet`: item ids already durably resolved by earlier runs

mod progress;
mod record;

pub use progress::{format_eta, ProgressSnapshot, ProgressState};
pub use record::{ItemOutcome, ResolvedRecord, WorkItem};

use std::collections::HashSet;

/// Item ids already persisted with a non-empty locator
pub type CompletedSet = HashSet<u64>;
