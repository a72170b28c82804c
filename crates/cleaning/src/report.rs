//! Cleaning statistics and audit trail.
//!
//! Ordinary deduplication is only counted. Discards that may hide valid data
//! (corrections whose target never shows up, reversals with no counterpart)
//! are listed by message key so they can be audited.

use serde::{Deserialize, Serialize};
use trace_core::MessageKey;

/// Settlement filter rejections, by first failing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRejects {
    /// Reported days to settlement above the limit.
    pub days_to_settle: u64,
    /// Settlement date minus execution date above the limit.
    pub settlement_lag: u64,
    /// When-issued or missing when-issued flag.
    pub when_issued: u64,
    /// Special trade flag set.
    pub special_trade: u64,
    /// As-of code set.
    pub asof: u64,
}

impl SettlementRejects {
    /// Total rejected messages.
    pub fn total(&self) -> u64 {
        self.days_to_settle + self.settlement_lag + self.when_issued + self.special_trade + self.asof
    }

    fn merge(&mut self, other: &SettlementRejects) {
        self.days_to_settle += other.days_to_settle;
        self.settlement_lag += other.settlement_lag;
        self.when_issued += other.when_issued;
        self.special_trade += other.special_trade;
        self.asof += other.asof;
    }
}

/// Per-stage counters for one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Messages in the input store.
    pub input_messages: u64,
    /// Messages reported before the cutover.
    pub pre_cutover_messages: u64,
    /// Messages reported on or after the cutover.
    pub post_cutover_messages: u64,
    /// Messages whose status has no meaning in their regime.
    pub ignored_status: u64,
    /// Post-cutover trades removed by a cancel or correction-cancel.
    pub post_cancelled: u64,
    /// Post-cutover trades removed by a reversal.
    pub post_reversed: u64,
    /// Pre-cutover trades removed by a cancellation.
    pub pre_cancelled: u64,
    /// Pre-cutover corrections applied.
    pub corrections_applied: u64,
    /// Most fixpoint passes needed by any partition.
    pub correction_passes: u64,
    /// Pre-cutover reversal/target pairs removed.
    pub reversal_pairs: u64,
    /// Pre-cutover messages dropped for a delayed or expired as-of code.
    pub exception_coded: u64,
    /// Agency buy legs removed as duplicates of a sell leg.
    pub agency_buys_removed: u64,
    /// Messages dropped for a counterparty that is neither customer nor dealer.
    pub unknown_counterparty: u64,
    /// Settlement filter rejections.
    pub settlement_rejects: SettlementRejects,
    /// Messages in the clean ledger.
    pub output_trades: u64,
    /// Corrections discarded because their target never appeared.
    pub orphaned_corrections: Vec<MessageKey>,
    /// Reversals discarded because no counterpart was found.
    pub unmatched_reversals: Vec<MessageKey>,
}

impl CleaningReport {
    /// Fold another partition's report into this one.
    pub fn merge(&mut self, other: CleaningReport) {
        self.input_messages += other.input_messages;
        self.pre_cutover_messages += other.pre_cutover_messages;
        self.post_cutover_messages += other.post_cutover_messages;
        self.ignored_status += other.ignored_status;
        self.post_cancelled += other.post_cancelled;
        self.post_reversed += other.post_reversed;
        self.pre_cancelled += other.pre_cancelled;
        self.corrections_applied += other.corrections_applied;
        self.correction_passes = self.correction_passes.max(other.correction_passes);
        self.reversal_pairs += other.reversal_pairs;
        self.exception_coded += other.exception_coded;
        self.agency_buys_removed += other.agency_buys_removed;
        self.unknown_counterparty += other.unknown_counterparty;
        self.settlement_rejects.merge(&other.settlement_rejects);
        self.output_trades += other.output_trades;
        self.orphaned_corrections.extend(other.orphaned_corrections);
        self.unmatched_reversals.extend(other.unmatched_reversals);
    }

    /// Were any messages discarded without a counterpart?
    pub fn has_audit_findings(&self) -> bool {
        !self.orphaned_corrections.is_empty() || !self.unmatched_reversals.is_empty()
    }
}
