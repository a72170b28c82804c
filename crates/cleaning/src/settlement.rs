//! Final exclusion filter.
//!
//! Drops reports that survived deduplication but are not standard
//! executions: long settlement, when-issued, special or as-of coded trades.

use crate::report::CleaningReport;
use trace_core::TradeMessage;
use tracing::debug;

/// Why a message failed the settlement filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementReject {
    /// Reported days to settlement above the limit.
    DaysToSettle,
    /// Settlement date too far after execution.
    SettlementLag,
    /// When-issued, or the flag is missing.
    WhenIssued,
    /// Special trade flag set.
    SpecialTrade,
    /// As-of code set.
    AsOf,
}

/// Settlement, when-issued, special-trade and as-of gate.
#[derive(Debug, Clone, Copy)]
pub struct SettlementFilter {
    max_days: i64,
}

impl Default for SettlementFilter {
    fn default() -> Self {
        Self { max_days: 7 }
    }
}

impl SettlementFilter {
    pub fn new(max_days: i64) -> Self {
        Self { max_days }
    }

    /// First rule the message fails, if any. Missing settlement fields pass.
    pub fn check(&self, msg: &TradeMessage) -> Option<SettlementReject> {
        if msg.days_to_settle.is_some_and(|d| d > self.max_days) {
            Some(SettlementReject::DaysToSettle)
        } else if msg.settlement_lag_days().is_some_and(|d| d > self.max_days) {
            Some(SettlementReject::SettlementLag)
        } else if msg.when_issued != Some(false) {
            Some(SettlementReject::WhenIssued)
        } else if msg.special_trade.as_deref().is_some_and(|f| !f.is_empty()) {
            Some(SettlementReject::SpecialTrade)
        } else if msg.asof.is_some() {
            Some(SettlementReject::AsOf)
        } else {
            None
        }
    }

    /// Keep messages passing every rule, in input order.
    pub fn apply(&self, messages: Vec<TradeMessage>, report: &mut CleaningReport) -> Vec<TradeMessage> {
        let before = messages.len();
        let rejects = &mut report.settlement_rejects;
        let kept: Vec<TradeMessage> = messages
            .into_iter()
            .filter(|msg| match self.check(msg) {
                None => true,
                Some(reason) => {
                    match reason {
                        SettlementReject::DaysToSettle => rejects.days_to_settle += 1,
                        SettlementReject::SettlementLag => rejects.settlement_lag += 1,
                        SettlementReject::WhenIssued => rejects.when_issued += 1,
                        SettlementReject::SpecialTrade => rejects.special_trade += 1,
                        SettlementReject::AsOf => rejects.asof += 1,
                    }
                    false
                }
            })
            .collect();
        debug!(rejected = before - kept.len(), kept = kept.len(), "settlement filter");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, make_trade, post_day};
    use trace_core::AsOfCode;

    fn check(msg: &TradeMessage) -> Option<SettlementReject> {
        SettlementFilter::default().check(msg)
    }

    #[test]
    fn test_days_to_settle_boundary() {
        let day = post_day();
        assert_eq!(check(&make_trade(1, day).with_settlement(None, Some(7))), None);
        assert_eq!(
            check(&make_trade(1, day).with_settlement(None, Some(8))),
            Some(SettlementReject::DaysToSettle)
        );
    }

    #[test]
    fn test_missing_settlement_fields_pass() {
        assert_eq!(check(&make_trade(1, post_day()).with_settlement(None, None)), None);
    }

    #[test]
    fn test_settlement_lag_from_dates() {
        // executed 2013-06-03
        let on_limit = make_trade(1, post_day()).with_settlement(Some(date(2013, 6, 10)), Some(2));
        let past_limit = make_trade(1, post_day()).with_settlement(Some(date(2013, 6, 11)), Some(2));
        assert_eq!(check(&on_limit), None);
        assert_eq!(check(&past_limit), Some(SettlementReject::SettlementLag));
    }

    #[test]
    fn test_when_issued_flag_required() {
        let mut when_issued = make_trade(1, post_day());
        when_issued.when_issued = Some(true);
        let mut unflagged = make_trade(1, post_day());
        unflagged.when_issued = None;
        assert_eq!(check(&when_issued), Some(SettlementReject::WhenIssued));
        assert_eq!(check(&unflagged), Some(SettlementReject::WhenIssued));
    }

    #[test]
    fn test_special_and_asof() {
        let mut special = make_trade(1, post_day());
        special.special_trade = Some("Y".to_string());
        let mut blank_special = make_trade(1, post_day());
        blank_special.special_trade = Some(String::new());
        let asof = make_trade(1, post_day()).with_asof(Some(AsOfCode::AsOf));
        assert_eq!(check(&special), Some(SettlementReject::SpecialTrade));
        assert_eq!(check(&blank_special), None);
        assert_eq!(check(&asof), Some(SettlementReject::AsOf));
    }

    #[test]
    fn test_apply_counts_first_failing_rule() {
        let day = post_day();
        let mut both = make_trade(2, day).with_settlement(None, Some(9));
        both.when_issued = Some(true);
        let mut report = CleaningReport::default();
        let kept = SettlementFilter::new(7).apply(
            vec![make_trade(1, day), both, make_trade(3, day).with_settlement(None, Some(8))],
            &mut report,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(report.settlement_rejects.days_to_settle, 2);
        assert_eq!(report.settlement_rejects.when_issued, 0);
        assert_eq!(report.settlement_rejects.total(), 2);
    }
}
