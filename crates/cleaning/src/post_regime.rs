//! Post-cutover cleaning.
//!
//! After the cutover every cancel, correction-cancel and reversal repeats the
//! economic identity of the report it voids, so removal is a pair of exact
//! anti-joins on the economic key.

use crate::matching::{anti_join, ensure_unique_targets};
use crate::report::CleaningReport;
use std::collections::HashSet;
use trace_core::{EconomicKey, Result, TradeMessage, TradeStatus};
use tracing::debug;

const CANCEL_STAGE: &str = "post-cutover cancellation";
const REVERSAL_STAGE: &str = "post-cutover reversal";

/// Removes cancelled and reversed reports reported on or after the cutover.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostRegimeCleaner;

impl PostRegimeCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean the post-cutover side.
    ///
    /// Postcondition: only trade and correction reports remain, none of them
    /// matched by a cancel, correction-cancel or reversal key.
    pub fn clean(
        &self,
        messages: Vec<TradeMessage>,
        report: &mut CleaningReport,
    ) -> Result<Vec<TradeMessage>> {
        let mut trades = Vec::new();
        let mut cancels = Vec::new();
        let mut reversals = Vec::new();

        for msg in messages {
            match msg.status {
                TradeStatus::Trade | TradeStatus::Correction => trades.push(msg),
                TradeStatus::Cancel | TradeStatus::CorrectionCancel => cancels.push(msg),
                TradeStatus::Reversal => reversals.push(msg),
                TradeStatus::PreCutoverCorrection => report.ignored_status += 1,
            }
        }

        // Cancellations first: a cancelled report must not absorb a reversal.
        let cancel_keys: HashSet<EconomicKey> = cancels.iter().map(TradeMessage::economic_key).collect();
        ensure_unique_targets(CANCEL_STAGE, &trades, &cancel_keys, TradeMessage::economic_key)?;
        let cancelled = anti_join(&mut trades, &cancel_keys, TradeMessage::economic_key);

        // A reversal points at its target through orig_msg_seq.
        let mut reversal_keys: HashSet<EconomicKey> = HashSet::new();
        for rev in &reversals {
            match rev.orig_msg_seq {
                Some(orig) => {
                    reversal_keys.insert(rev.economic_key_with_seq(orig));
                }
                None => report.unmatched_reversals.push(rev.message_key()),
            }
        }
        ensure_unique_targets(REVERSAL_STAGE, &trades, &reversal_keys, TradeMessage::economic_key)?;

        let live: HashSet<EconomicKey> = trades.iter().map(TradeMessage::economic_key).collect();
        for rev in &reversals {
            if let Some(orig) = rev.orig_msg_seq {
                if !live.contains(&rev.economic_key_with_seq(orig)) {
                    report.unmatched_reversals.push(rev.message_key());
                }
            }
        }
        let reversed = anti_join(&mut trades, &reversal_keys, TradeMessage::economic_key);

        report.post_cancelled += cancelled as u64;
        report.post_reversed += reversed as u64;
        debug!(
            cancels = cancels.len(),
            cancelled,
            reversals = reversals.len(),
            reversed,
            survivors = trades.len(),
            "post-cutover cleaning"
        );
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{make_linked, make_trade, post_day, seqs, time};
    use trace_core::Error;

    fn cancel(status: TradeStatus, target: &TradeMessage) -> TradeMessage {
        // post-cutover cancels repeat the target's sequence number
        target.clone().with_status(status, None)
    }

    #[test]
    fn test_cancel_and_correction_cancel_remove_target() {
        let day = post_day();
        let t1 = make_trade(1, day);
        let t2 = make_trade(2, day);
        let t3 = make_trade(3, day);
        let messages = vec![
            t1.clone(),
            t2.clone(),
            t3,
            cancel(TradeStatus::Cancel, &t1),
            cancel(TradeStatus::CorrectionCancel, &t2),
        ];

        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new().clean(messages, &mut report).unwrap();
        assert_eq!(seqs(&clean), vec![3]);
        assert_eq!(report.post_cancelled, 2);
    }

    #[test]
    fn test_correction_replaces_cancelled_original() {
        let day = post_day();
        let t1 = make_trade(1, day);
        let correction = make_linked(TradeStatus::Correction, 2, 1, day).with_price(100.25);
        let messages = vec![t1.clone(), cancel(TradeStatus::CorrectionCancel, &t1), correction];

        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new().clean(messages, &mut report).unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].status, TradeStatus::Correction);
        assert_eq!(clean[0].price.into_inner(), 100.25);
    }

    #[test]
    fn test_cancel_must_match_all_economics() {
        let day = post_day();
        let t1 = make_trade(1, day);
        let mut other_time = cancel(TradeStatus::Cancel, &t1);
        other_time.exec_time = time(10, 0, 1);
        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new()
            .clean(vec![t1, other_time], &mut report)
            .unwrap();
        assert_eq!(seqs(&clean), vec![1]);
    }

    #[test]
    fn test_reversal_removes_target_by_orig_seq() {
        let day = post_day();
        let messages = vec![
            make_trade(1, day),
            make_trade(2, day),
            make_linked(TradeStatus::Reversal, 9, 1, day),
        ];
        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new().clean(messages, &mut report).unwrap();
        assert_eq!(seqs(&clean), vec![2]);
        assert_eq!(report.post_reversed, 1);
        assert!(report.unmatched_reversals.is_empty());
    }

    #[test]
    fn test_cancelled_trade_does_not_absorb_reversal() {
        let day = post_day();
        let t1 = make_trade(1, day);
        let messages = vec![
            t1.clone(),
            cancel(TradeStatus::Cancel, &t1),
            make_linked(TradeStatus::Reversal, 9, 1, day),
        ];
        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new().clean(messages, &mut report).unwrap();
        assert!(clean.is_empty());
        assert_eq!(report.post_cancelled, 1);
        assert_eq!(report.post_reversed, 0);
        assert_eq!(report.unmatched_reversals.len(), 1);
        assert_eq!(report.unmatched_reversals[0].msg_seq, 9);
    }

    #[test]
    fn test_reversal_without_back_reference_is_unmatched() {
        let day = post_day();
        let rev = make_trade(9, day).with_status(TradeStatus::Reversal, None);
        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new()
            .clean(vec![make_trade(1, day), rev], &mut report)
            .unwrap();
        assert_eq!(seqs(&clean), vec![1]);
        assert_eq!(report.unmatched_reversals.len(), 1);
    }

    #[test]
    fn test_pre_cutover_status_ignored() {
        let day = post_day();
        let stray = make_linked(TradeStatus::PreCutoverCorrection, 2, 1, day);
        let mut report = CleaningReport::default();
        let clean = PostRegimeCleaner::new()
            .clean(vec![make_trade(1, day), stray], &mut report)
            .unwrap();
        assert_eq!(seqs(&clean), vec![1]);
        assert_eq!(report.ignored_status, 1);
    }

    #[test]
    fn test_duplicate_target_is_ambiguous() {
        let day = post_day();
        let t1 = make_trade(1, day);
        let messages = vec![t1.clone(), t1.clone(), cancel(TradeStatus::Cancel, &t1)];
        let mut report = CleaningReport::default();
        let err = PostRegimeCleaner::new().clean(messages, &mut report).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousMatch { stage: CANCEL_STAGE, candidates: 2, .. }
        ));
    }
}
