//! Core data types for the TRACE cleaner.

use chrono::{NaiveDate, NaiveTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price type with ordering and hashing support.
pub type Price = OrderedFloat<f64>;

/// Entered volume with ordering and hashing support.
pub type Volume = OrderedFloat<f64>;

/// Message status code (`trc_st`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    /// `T`: trade report.
    Trade,
    /// `R`: post-cutover correction.
    Correction,
    /// `X`: cancellation.
    Cancel,
    /// `C`: correction-cancel (plain cancellation before the cutover).
    CorrectionCancel,
    /// `W`: pre-cutover correction, may itself be corrected.
    PreCutoverCorrection,
    /// `Y`: post-cutover reversal.
    Reversal,
}

impl TradeStatus {
    /// One-letter feed code.
    pub fn code(self) -> &'static str {
        match self {
            TradeStatus::Trade => "T",
            TradeStatus::Correction => "R",
            TradeStatus::Cancel => "X",
            TradeStatus::CorrectionCancel => "C",
            TradeStatus::PreCutoverCorrection => "W",
            TradeStatus::Reversal => "Y",
        }
    }

    /// Parse a feed code. `S` is accepted as a reversal alias.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "T" => Some(TradeStatus::Trade),
            "R" => Some(TradeStatus::Correction),
            "X" => Some(TradeStatus::Cancel),
            "C" => Some(TradeStatus::CorrectionCancel),
            "W" => Some(TradeStatus::PreCutoverCorrection),
            "Y" | "S" => Some(TradeStatus::Reversal),
            _ => None,
        }
    }

    /// Does this message void its target?
    pub fn is_cancellation(self) -> bool {
        matches!(self, TradeStatus::Cancel | TradeStatus::CorrectionCancel)
    }
}

/// As-of qualifier (`asof_cd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsOfCode {
    /// `A`: late (as-of) report.
    AsOf,
    /// `R`: reversal of an earlier report.
    Reversal,
    /// `D`: delayed report.
    Delayed,
    /// `X`: expired report.
    Expired,
}

impl AsOfCode {
    /// One-letter feed code.
    pub fn code(self) -> &'static str {
        match self {
            AsOfCode::AsOf => "A",
            AsOfCode::Reversal => "R",
            AsOfCode::Delayed => "D",
            AsOfCode::Expired => "X",
        }
    }

    /// Parse a feed code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(AsOfCode::AsOf),
            "R" => Some(AsOfCode::Reversal),
            "D" => Some(AsOfCode::Delayed),
            "X" => Some(AsOfCode::Expired),
            _ => None,
        }
    }
}

/// Reporting side (`rpt_side_cd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportSide {
    Buy,
    Sell,
}

impl ReportSide {
    /// One-letter feed code.
    pub fn code(self) -> &'static str {
        match self {
            ReportSide::Buy => "B",
            ReportSide::Sell => "S",
        }
    }

    /// Parse a feed code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "B" => Some(ReportSide::Buy),
            "S" => Some(ReportSide::Sell),
            _ => None,
        }
    }
}

/// Contra-party type (`cntra_mp_id`).
///
/// `Dealer` is the agency marker: dealer-to-dealer legs of a riskless
/// principal trade are reported from both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Counterparty {
    /// `C`: customer.
    Customer,
    /// `D`: dealer.
    Dealer,
    /// Any other code, kept verbatim.
    Other(String),
}

impl Counterparty {
    /// Feed code.
    pub fn code(&self) -> &str {
        match self {
            Counterparty::Customer => "C",
            Counterparty::Dealer => "D",
            Counterparty::Other(code) => code,
        }
    }

    /// Parse a feed code. Never fails; unknown codes become `Other`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "C" => Counterparty::Customer,
            "D" => Counterparty::Dealer,
            other => Counterparty::Other(other.to_string()),
        }
    }
}

/// One reported event from the enhanced TRACE feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMessage {
    /// Security identifier.
    pub cusip: String,
    /// Message sequence number.
    pub msg_seq: u64,
    /// Sequence number of the message this one corrects, cancels or reverses.
    pub orig_msg_seq: Option<u64>,
    /// Execution date.
    pub exec_date: NaiveDate,
    /// Execution time.
    pub exec_time: NaiveTime,
    /// Report date.
    pub report_date: NaiveDate,
    /// Report time.
    pub report_time: NaiveTime,
    /// Entered volume.
    pub volume: Volume,
    /// Reported price.
    pub price: Price,
    /// Reported yield.
    pub yield_pct: Option<f64>,
    /// Buy or sell report.
    pub side: ReportSide,
    /// Contra-party type.
    pub counterparty: Counterparty,
    /// Status code.
    pub status: TradeStatus,
    /// As-of qualifier.
    pub asof: Option<AsOfCode>,
    /// Settlement date.
    pub settlement_date: Option<NaiveDate>,
    /// Reported days to settlement.
    pub days_to_settle: Option<i64>,
    /// When-issued flag (`None` when not reported).
    pub when_issued: Option<bool>,
    /// Special trade flag, `None` when empty.
    pub special_trade: Option<String>,
}

impl TradeMessage {
    /// Create a plain trade report: reported at execution, regular settlement,
    /// not when-issued, no special or as-of flags.
    #[allow(clippy::too_many_arguments)]
    pub fn trade(
        cusip: impl Into<String>,
        msg_seq: u64,
        exec_date: NaiveDate,
        exec_time: NaiveTime,
        volume: f64,
        price: f64,
        side: ReportSide,
        counterparty: Counterparty,
    ) -> Self {
        Self {
            cusip: cusip.into(),
            msg_seq,
            orig_msg_seq: None,
            exec_date,
            exec_time,
            report_date: exec_date,
            report_time: exec_time,
            volume: OrderedFloat(volume),
            price: OrderedFloat(price),
            yield_pct: None,
            side,
            counterparty,
            status: TradeStatus::Trade,
            asof: None,
            settlement_date: None,
            days_to_settle: None,
            when_issued: Some(false),
            special_trade: None,
        }
    }

    /// Same message with another status and back reference.
    pub fn with_status(mut self, status: TradeStatus, orig_msg_seq: Option<u64>) -> Self {
        self.status = status;
        self.orig_msg_seq = orig_msg_seq;
        self
    }

    /// Same message with another sequence number.
    pub fn with_msg_seq(mut self, msg_seq: u64) -> Self {
        self.msg_seq = msg_seq;
        self
    }

    /// Same message with another report timestamp.
    pub fn with_report(mut self, report_date: NaiveDate, report_time: NaiveTime) -> Self {
        self.report_date = report_date;
        self.report_time = report_time;
        self
    }

    /// Same message with another as-of code.
    pub fn with_asof(mut self, asof: Option<AsOfCode>) -> Self {
        self.asof = asof;
        self
    }

    /// Same message with another price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = OrderedFloat(price);
        self
    }

    /// Same message with settlement information.
    pub fn with_settlement(
        mut self,
        settlement_date: Option<NaiveDate>,
        days_to_settle: Option<i64>,
    ) -> Self {
        self.settlement_date = settlement_date;
        self.days_to_settle = days_to_settle;
        self
    }

    /// Economic-identity key, the exact target of a cancellation or reversal.
    pub fn economic_key(&self) -> EconomicKey {
        self.economic_key_with_seq(self.msg_seq)
    }

    /// Economic-identity key with the sequence number replaced, so a
    /// cancellation or reversal can address the message it points back to.
    pub fn economic_key_with_seq(&self, msg_seq: u64) -> EconomicKey {
        EconomicKey {
            cusip: self.cusip.clone(),
            msg_seq,
            volume: self.volume,
            price: self.price,
            side: self.side,
            counterparty: self.counterparty.clone(),
            exec_date: self.exec_date,
            exec_time: self.exec_time,
        }
    }

    /// Group key for reversal sequencing.
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            cusip: self.cusip.clone(),
            exec_date: self.exec_date,
            volume: self.volume,
            price: self.price,
            side: self.side,
            counterparty: self.counterparty.clone(),
        }
    }

    /// Correction linkage key.
    pub fn message_key(&self) -> MessageKey {
        MessageKey {
            cusip: self.cusip.clone(),
            exec_date: self.exec_date,
            msg_seq: self.msg_seq,
        }
    }

    /// Key of the message this one points back to, if any.
    pub fn target_message_key(&self) -> Option<MessageKey> {
        self.orig_msg_seq.map(|msg_seq| MessageKey {
            cusip: self.cusip.clone(),
            exec_date: self.exec_date,
            msg_seq,
        })
    }

    /// Agency round-trip key.
    pub fn agency_key(&self) -> AgencyKey {
        AgencyKey {
            cusip: self.cusip.clone(),
            exec_date: self.exec_date,
            volume: self.volume,
            price: self.price,
        }
    }

    /// Days between execution and settlement date.
    pub fn settlement_lag_days(&self) -> Option<i64> {
        self.settlement_date
            .map(|settle| (settle - self.exec_date).num_days())
    }
}

/// Economic identity: `(cusip, msg_seq, volume, price, side, counterparty,
/// exec_date, exec_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EconomicKey {
    pub cusip: String,
    pub msg_seq: u64,
    pub volume: Volume,
    pub price: Price,
    pub side: ReportSide,
    pub counterparty: Counterparty,
    pub exec_date: NaiveDate,
    pub exec_time: NaiveTime,
}

/// Same-economics group: `(cusip, exec_date, volume, price, side, counterparty)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub cusip: String,
    pub exec_date: NaiveDate,
    pub volume: Volume,
    pub price: Price,
    pub side: ReportSide,
    pub counterparty: Counterparty,
}

/// Correction linkage: `(cusip, exec_date, msg_seq)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageKey {
    pub cusip: String,
    pub exec_date: NaiveDate,
    pub msg_seq: u64,
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cusip, self.exec_date, self.msg_seq)
    }
}

/// Agency round trip: `(cusip, exec_date, volume, price)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgencyKey {
    pub cusip: String,
    pub exec_date: NaiveDate,
    pub volume: Volume,
    pub price: Price,
}

/// Output row of the clean ledger, serialized under the TRACE column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanTrade {
    #[serde(rename = "cusip_id")]
    pub cusip: String,
    #[serde(rename = "trd_exctn_dt")]
    pub exec_date: NaiveDate,
    /// Execution time as `HH:MM:SS`.
    #[serde(rename = "trd_exctn_tm")]
    pub exec_time: String,
    #[serde(rename = "rptd_pr")]
    pub price: f64,
    #[serde(rename = "entrd_vol_qt")]
    pub volume: f64,
    #[serde(rename = "yld_pt")]
    pub yield_pct: Option<f64>,
    #[serde(rename = "rpt_side_cd")]
    pub side: String,
    #[serde(rename = "cntra_mp_id")]
    pub counterparty: String,
}

impl From<&TradeMessage> for CleanTrade {
    fn from(msg: &TradeMessage) -> Self {
        Self {
            cusip: msg.cusip.clone(),
            exec_date: msg.exec_date,
            exec_time: msg.exec_time.format("%H:%M:%S").to_string(),
            price: msg.price.into_inner(),
            volume: msg.volume.into_inner(),
            yield_pct: msg.yield_pct,
            side: msg.side.code().to_string(),
            counterparty: msg.counterparty.code().to_string(),
        }
    }
}
