//! TRACE message cleaning.
//!
//! This crate handles:
//! - Regime split at the reporting-system cutover
//! - Post-cutover cancellation and reversal removal
//! - Pre-cutover cancellation, correction chains and positional reversals
//! - Agency trade deduplication and the settlement filter
//! - Output sorting and projection

pub mod agency;
pub mod output;
pub mod pipeline;
pub mod post_regime;
pub mod pre_regime;
pub mod regime;
pub mod report;
pub mod reversal;
pub mod settlement;

mod matching;

#[cfg(test)]
mod fixtures;

pub use agency::AgencyTradeResolver;
pub use output::OutputFormatter;
pub use pipeline::{clean, Reconciliation, TraceCleaner};
pub use post_regime::PostRegimeCleaner;
pub use pre_regime::PreRegimeCleaner;
pub use regime::{RegimeSplit, RegimeSplitter};
pub use report::{CleaningReport, SettlementRejects};
pub use reversal::{ReversalOutcome, ReversalResolver};
pub use settlement::{SettlementFilter, SettlementReject};
