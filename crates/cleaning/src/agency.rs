//! Agency trade deduplication.
//!
//! A riskless principal trade between dealers is reported by both sides: one
//! sell report and one buy report with the same security, date, volume and
//! price. Keeping only the sell leg counts the trade once.

use crate::report::CleaningReport;
use std::collections::HashSet;
use trace_core::{AgencyKey, Counterparty, ReportSide, TradeMessage};
use tracing::debug;

/// Drops dealer buy legs matched by a dealer sell leg.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgencyTradeResolver;

impl AgencyTradeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Precondition: input is the union of both regime cleaners' output.
    ///
    /// Customer reports and dealer sells always pass, dealer buys pass only
    /// when no dealer sell shares their agency key. Reports with any other
    /// counterparty code are dropped. Input order is kept.
    pub fn resolve(
        &self,
        messages: Vec<TradeMessage>,
        report: &mut CleaningReport,
    ) -> Vec<TradeMessage> {
        let sell_keys: HashSet<AgencyKey> = messages
            .iter()
            .filter(|m| m.counterparty == Counterparty::Dealer && m.side == ReportSide::Sell)
            .map(TradeMessage::agency_key)
            .collect();

        let mut matched_buys = 0u64;
        let mut unknown = 0u64;
        let retained: Vec<TradeMessage> = messages
            .into_iter()
            .filter(|m| match (&m.counterparty, m.side) {
                (Counterparty::Customer, _) => true,
                (Counterparty::Dealer, ReportSide::Sell) => true,
                (Counterparty::Dealer, ReportSide::Buy) => {
                    let unmatched = !sell_keys.contains(&m.agency_key());
                    if !unmatched {
                        matched_buys += 1;
                    }
                    unmatched
                }
                (Counterparty::Other(_), _) => {
                    unknown += 1;
                    false
                }
            })
            .collect();

        report.agency_buys_removed += matched_buys;
        report.unknown_counterparty += unknown;
        debug!(
            agency_sells = sell_keys.len(),
            matched_buys,
            unknown_counterparty = unknown,
            "agency deduplication"
        );
        retained
    }
}
