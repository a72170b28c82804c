//! Pre-cutover cleaning.
//!
//! Before the cutover a cancellation points back at its target through
//! `orig_msg_seq`, corrections (`W`) may themselves be corrected, and
//! reversals are as-of coded reports with no back reference at all.

use crate::matching::{anti_join, ensure_unique_targets};
use crate::report::CleaningReport;
use crate::reversal::ReversalResolver;
use std::collections::{HashMap, HashSet};
use trace_core::{EconomicKey, Error, MessageKey, Result, TradeMessage, TradeStatus};
use tracing::{debug, warn};

const CANCEL_STAGE: &str = "pre-cutover cancellation";
const CORRECTION_STAGE: &str = "pre-cutover correction";

/// Removes cancellations, applies correction chains and removes reversals
/// from messages reported before the cutover.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreRegimeCleaner {
    /// Fixpoint pass cap; `None` caps at the number of pending corrections.
    max_passes: Option<usize>,
}

impl PreRegimeCleaner {
    pub fn new(max_passes: Option<usize>) -> Self {
        Self { max_passes }
    }

    /// Clean the pre-cutover side.
    ///
    /// Postcondition: every survivor is a trade report or the final
    /// replacement of a correction chain, no survivor is the target of a
    /// cancellation, and no reversal or reversed report remains.
    pub fn clean(
        &self,
        messages: Vec<TradeMessage>,
        report: &mut CleaningReport,
    ) -> Result<Vec<TradeMessage>> {
        let mut trades = Vec::new();
        let mut cancels = Vec::new();
        let mut corrections = Vec::new();

        for msg in messages {
            match msg.status {
                TradeStatus::Trade => trades.push(msg),
                status if status.is_cancellation() => cancels.push(msg),
                TradeStatus::PreCutoverCorrection => corrections.push(msg),
                _ => report.ignored_status += 1,
            }
        }

        let cancel_keys: HashSet<EconomicKey> = cancels
            .iter()
            .filter_map(|c| c.orig_msg_seq.map(|orig| c.economic_key_with_seq(orig)))
            .collect();
        ensure_unique_targets(CANCEL_STAGE, &trades, &cancel_keys, TradeMessage::economic_key)?;
        let cancelled = anti_join(&mut trades, &cancel_keys, TradeMessage::economic_key);
        report.pre_cancelled += cancelled as u64;

        let active = self.apply_corrections(trades, corrections, report)?;

        let outcome = ReversalResolver::new().resolve(active);
        report.reversal_pairs += outcome.pairs as u64;
        report.exception_coded += outcome.exception_coded as u64;
        report.unmatched_reversals.extend(outcome.unmatched);

        debug!(
            cancelled,
            reversal_pairs = outcome.pairs,
            survivors = outcome.survivors.len(),
            "pre-cutover cleaning"
        );
        Ok(outcome.survivors)
    }

    /// Resolve correction chains to a fixpoint.
    ///
    /// Each pass applies every pending correction whose target is active at
    /// the start of the pass. A correction applied in this pass can only be
    /// targeted in the next one. The loop stops when nothing is pending or a
    /// pass would apply nothing; what is left is orphaned and discarded.
    /// Needing more applying passes than the cap is a data integrity error.
    pub fn apply_corrections(
        &self,
        trades: Vec<TradeMessage>,
        corrections: Vec<TradeMessage>,
        report: &mut CleaningReport,
    ) -> Result<Vec<TradeMessage>> {
        let mut arena = CorrectionArena::new(trades);
        let mut orphaned: Vec<MessageKey> = Vec::new();
        let mut pending: Vec<TradeMessage> = Vec::with_capacity(corrections.len());
        for correction in corrections {
            if correction.orig_msg_seq.is_some() {
                pending.push(correction);
            } else {
                orphaned.push(correction.message_key());
            }
        }

        let cap = self.max_passes.unwrap_or(pending.len());
        let mut passes = 0;

        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|c| c.target_message_key().is_some_and(|key| arena.contains(&key)));
            if ready.is_empty() {
                pending = waiting;
                break;
            }
            if passes >= cap {
                return Err(Error::DataIntegrity {
                    passes,
                    unresolved: ready
                        .iter()
                        .chain(&waiting)
                        .map(|c| c.message_key().to_string())
                        .collect(),
                });
            }
            passes += 1;
            pending = waiting;

            // Resolve every target against the pass-start state before applying.
            let mut claimed: HashSet<usize> = HashSet::with_capacity(ready.len());
            let mut plan = Vec::with_capacity(ready.len());
            for correction in ready {
                let Some(target) = correction.target_message_key() else {
                    continue;
                };
                let slot = arena.resolve(&target)?;
                if !claimed.insert(slot) {
                    return Err(Error::ambiguous(CORRECTION_STAGE, target, 2));
                }
                plan.push((slot, correction));
            }

            report.corrections_applied += plan.len() as u64;
            for (slot, correction) in plan {
                arena.replace(slot, correction);
            }
        }

        orphaned.extend(pending.iter().map(TradeMessage::message_key));
        if !orphaned.is_empty() {
            warn!(
                orphaned = orphaned.len(),
                "discarding pre-cutover corrections whose target never appeared"
            );
        }
        report.correction_passes = report.correction_passes.max(passes as u64);
        report.orphaned_corrections.extend(orphaned);

        Ok(arena.into_messages())
    }
}

/// One record's identity and its current revision.
#[derive(Debug, Clone)]
struct Slot {
    /// Sequence number of the original trade report.
    root_seq: u64,
    current: TradeMessage,
}

impl Slot {
    /// The current revision under the original report's identity.
    fn into_message(self) -> TradeMessage {
        let mut msg = self.current;
        if msg.status != TradeStatus::Trade || msg.msg_seq != self.root_seq {
            msg.msg_seq = self.root_seq;
            msg.status = TradeStatus::Trade;
            msg.orig_msg_seq = None;
        }
        msg
    }
}

/// Active records indexed by the linkage key of their current revision.
#[derive(Debug, Default)]
struct CorrectionArena {
    slots: Vec<Slot>,
    index: HashMap<MessageKey, Vec<usize>>,
}

impl CorrectionArena {
    fn new(trades: Vec<TradeMessage>) -> Self {
        let mut arena = Self::default();
        for trade in trades {
            let slot = arena.slots.len();
            arena.index.entry(trade.message_key()).or_default().push(slot);
            arena.slots.push(Slot {
                root_seq: trade.msg_seq,
                current: trade,
            });
        }
        arena
    }

    fn contains(&self, key: &MessageKey) -> bool {
        self.index.contains_key(key)
    }

    fn resolve(&self, key: &MessageKey) -> Result<usize> {
        match self.index.get(key).map(Vec::as_slice) {
            Some([slot]) => Ok(*slot),
            Some(slots) if !slots.is_empty() => {
                Err(Error::ambiguous(CORRECTION_STAGE, key, slots.len()))
            }
            _ => Err(Error::ambiguous(CORRECTION_STAGE, key, 0)),
        }
    }

    fn replace(&mut self, slot: usize, correction: TradeMessage) {
        let old_key = self.slots[slot].current.message_key();
        if let Some(slots) = self.index.get_mut(&old_key) {
            slots.retain(|&s| s != slot);
            if slots.is_empty() {
                self.index.remove(&old_key);
            }
        }
        self.index.entry(correction.message_key()).or_default().push(slot);
        self.slots[slot].current = correction;
    }

    fn into_messages(self) -> Vec<TradeMessage> {
        self.slots.into_iter().map(Slot::into_message).collect()
    }
}
