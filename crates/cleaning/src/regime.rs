//! Regime split by report date.
//!
//! Status codes mean different things before and after the cutover, so each
//! side is cleaned by its own rules.

use chrono::NaiveDate;
use trace_core::TradeMessage;

/// Messages split at the cutover. Every input message lands in exactly one
/// side, in input order.
#[derive(Debug, Clone, Default)]
pub struct RegimeSplit {
    /// Reported strictly before the cutover.
    pub pre: Vec<TradeMessage>,
    /// Reported on or after the cutover.
    pub post: Vec<TradeMessage>,
}

/// Partitions messages by `report_date >= cutover`.
#[derive(Debug, Clone, Copy)]
pub struct RegimeSplitter {
    cutover: NaiveDate,
}

impl RegimeSplitter {
    pub fn new(cutover: NaiveDate) -> Self {
        Self { cutover }
    }

    pub fn split(&self, messages: Vec<TradeMessage>) -> RegimeSplit {
        let (post, pre): (Vec<_>, Vec<_>) = messages
            .into_iter()
            .partition(|msg| msg.report_date >= self.cutover);
        RegimeSplit { pre, post }
    }
}
