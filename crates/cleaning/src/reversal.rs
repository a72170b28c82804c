//! Positional reversal matching.
//!
//! Pre-cutover reversals carry no back reference. A reversal and the report it
//! reverses share every economic field, so the only disambiguator is rank
//! among otherwise identical reports: the s-th reversal in a group cancels
//! the s-th regular report in the same group.

use std::collections::{HashMap, HashSet};
use trace_core::{AsOfCode, GroupKey, MessageKey, TradeMessage};

/// Result of one reversal pass.
#[derive(Debug, Clone, Default)]
pub struct ReversalOutcome {
    /// Regular reports left after removing reversed ones, in input order.
    pub survivors: Vec<TradeMessage>,
    /// Reversal/target pairs removed.
    pub pairs: usize,
    /// Reversals without a counterpart at their position.
    pub unmatched: Vec<MessageKey>,
    /// Messages dropped for a delayed or expired as-of code.
    pub exception_coded: usize,
}

/// Matches as-of reversals to the regular report at the same group rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversalResolver;

impl ReversalResolver {
    pub fn new() -> Self {
        Self
    }

    /// Remove reversal/target pairs.
    ///
    /// Postcondition: no survivor carries an as-of code of reversal, delayed
    /// or expired.
    pub fn resolve(&self, messages: Vec<TradeMessage>) -> ReversalOutcome {
        let mut reversals = Vec::new();
        let mut regular = Vec::new();
        let mut exception_coded = 0;

        for msg in messages {
            match msg.asof {
                Some(AsOfCode::Reversal) => reversals.push(msg),
                Some(AsOfCode::Delayed) | Some(AsOfCode::Expired) => exception_coded += 1,
                Some(AsOfCode::AsOf) | None => regular.push(msg),
            }
        }

        let reversal_positions = rank_within_groups(&reversals);
        let regular_positions = rank_within_groups(&regular);

        let reversed: HashSet<&(GroupKey, usize)> = reversal_positions.iter().collect();
        let available: HashSet<&(GroupKey, usize)> = regular_positions.iter().collect();

        let unmatched: Vec<MessageKey> = reversals
            .iter()
            .zip(&reversal_positions)
            .filter(|(_, position)| !available.contains(position))
            .map(|(msg, _)| msg.message_key())
            .collect();

        let before = regular.len();
        let survivors: Vec<TradeMessage> = regular
            .into_iter()
            .zip(&regular_positions)
            .filter(|(_, position)| !reversed.contains(position))
            .map(|(msg, _)| msg)
            .collect();

        ReversalOutcome {
            pairs: before - survivors.len(),
            survivors,
            unmatched,
            exception_coded,
        }
    }
}

/// Rank each message within its group, 1-based, ordered by execution time,
/// then report date, then report time. Sequence number breaks the remaining
/// ties so the ranking never depends on input order.
pub fn rank_within_groups(messages: &[TradeMessage]) -> Vec<(GroupKey, usize)> {
    let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    for (i, msg) in messages.iter().enumerate() {
        groups.entry(msg.group_key()).or_default().push(i);
    }

    let mut ranks = vec![0; messages.len()];
    for members in groups.values_mut() {
        members.sort_by_key(|&i| {
            let m = &messages[i];
            (m.exec_time, m.report_date, m.report_time, m.msg_seq)
        });
        for (rank, &i) in members.iter().enumerate() {
            ranks[i] = rank + 1;
        }
    }

    messages
        .iter()
        .zip(ranks)
        .map(|(msg, rank)| (msg.group_key(), rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{make_trade, pre_day, seqs, time};
    use trace_core::ReportSide;

    fn reversal(msg_seq: u64) -> TradeMessage {
        make_trade(msg_seq, pre_day()).with_asof(Some(AsOfCode::Reversal))
    }

    #[test]
    fn test_rank_orders_by_time_then_report() {
        let day = pre_day();
        let messages = vec![
            make_trade(1, day).with_report(day, time(15, 0, 0)),
            make_trade(2, day).with_report(day, time(11, 0, 0)),
            make_trade(3, day),
        ];
        let ranks: Vec<usize> = rank_within_groups(&messages).into_iter().map(|(_, r)| r).collect();
        // all three execute at 10:00; report times 15:00, 11:00, 10:00
        assert_eq!(ranks, vec![3, 2, 1]);
    }

    #[test]
    fn test_rank_is_per_group() {
        let mut sell = make_trade(2, pre_day());
        sell.side = ReportSide::Sell;
        let messages = vec![make_trade(1, pre_day()), sell];
        let ranks: Vec<usize> = rank_within_groups(&messages).into_iter().map(|(_, r)| r).collect();
        assert_eq!(ranks, vec![1, 1]);
    }

    #[test]
    fn test_reversal_removes_pair() {
        let outcome = ReversalResolver::new().resolve(vec![make_trade(1, pre_day()), reversal(2)]);
        assert!(outcome.survivors.is_empty());
        assert_eq!(outcome.pairs, 1);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_unmatched_reversal_removed_alone() {
        let outcome = ReversalResolver::new().resolve(vec![reversal(2)]);
        assert!(outcome.survivors.is_empty());
        assert_eq!(outcome.pairs, 0);
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].msg_seq, 2);
    }

    #[test]
    fn test_reversal_takes_same_rank_only() {
        let day = pre_day();
        let outcome = ReversalResolver::new().resolve(vec![
            make_trade(1, day),
            make_trade(2, day).with_report(day, time(12, 0, 0)),
            reversal(3),
        ]);
        // the reversal ranks first among reversals, so it takes the first report
        assert_eq!(seqs(&outcome.survivors), vec![2]);
        assert_eq!(outcome.pairs, 1);
    }

    #[test]
    fn test_second_reversal_without_second_report() {
        let day = pre_day();
        let outcome = ReversalResolver::new().resolve(vec![
            make_trade(1, day),
            reversal(2),
            reversal(3).with_report(day, time(12, 0, 0)),
        ]);
        assert!(outcome.survivors.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].msg_seq, 3);
    }

    #[test]
    fn test_exception_codes_dropped_and_unranked() {
        let day = pre_day();
        let outcome = ReversalResolver::new().resolve(vec![
            make_trade(1, day).with_asof(Some(AsOfCode::Expired)),
            make_trade(2, day).with_report(day, time(12, 0, 0)),
            reversal(3),
            make_trade(4, day).with_asof(Some(AsOfCode::AsOf)),
        ]);
        assert_eq!(outcome.exception_coded, 1);
        // regular ranks: #4 (10:00 report) first, #2 second; reversal takes #4
        assert_eq!(seqs(&outcome.survivors), vec![2]);
    }
}
