//! Message fixtures for the stage tests.

use chrono::{NaiveDate, NaiveTime};
use trace_core::{Counterparty, ReportSide, TradeMessage, TradeStatus};

pub const CUSIP: &str = "123456AB7";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

/// A trading day before the cutover.
pub fn pre_day() -> NaiveDate {
    date(2011, 6, 1)
}

/// A trading day after the cutover.
pub fn post_day() -> NaiveDate {
    date(2013, 6, 3)
}

/// Customer buy of 100 @ 99.5 at 10:00:00.
pub fn make_trade(msg_seq: u64, day: NaiveDate) -> TradeMessage {
    TradeMessage::trade(
        CUSIP,
        msg_seq,
        day,
        time(10, 0, 0),
        100.0,
        99.5,
        ReportSide::Buy,
        Counterparty::Customer,
    )
}

/// A message of `status` pointing back at `orig`, same economics as
/// [`make_trade`].
pub fn make_linked(status: TradeStatus, msg_seq: u64, orig: u64, day: NaiveDate) -> TradeMessage {
    make_trade(msg_seq, day).with_status(status, Some(orig))
}

pub fn seqs(messages: &[TradeMessage]) -> Vec<u64> {
    let mut seqs: Vec<u64> = messages.iter().map(|m| m.msg_seq).collect();
    seqs.sort_unstable();
    seqs
}
