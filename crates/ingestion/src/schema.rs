//! Schema validation for raw TRACE rows.
//!
//! Rows arrive loosely typed (CSV cells, JSON values, Python dicts) under the
//! enhanced TRACE column names. Validation is fail-fast: the first missing
//! required column or out-of-domain value aborts the load.

use chrono::{NaiveDate, NaiveTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use trace_core::{
    AsOfCode, Counterparty, Error, ReportSide, Result, TradeMessage, TradeStatus,
};

/// Columns that must be present and non-empty on every row.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "cusip_id",
    "msg_seq_nb",
    "trd_exctn_dt",
    "trd_exctn_tm",
    "trd_rpt_dt",
    "trd_rpt_tm",
    "entrd_vol_qt",
    "rptd_pr",
    "rpt_side_cd",
    "cntra_mp_id",
    "trc_st",
];

/// Columns that may be absent or empty.
pub const OPTIONAL_COLUMNS: &[&str] = &[
    "orig_msg_seq_nb",
    "yld_pt",
    "asof_cd",
    "stlmnt_dt",
    "days_to_sttl_ct",
    "wis_fl",
    "spcl_trd_fl",
];

/// Cell texts that dataframe exports write for a missing value.
pub const MISSING_MARKERS: &[&str] = &["nan", "NaN", "NaT", "<NA>"];

/// One unvalidated feed row. Every cell is kept as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTradeMessage {
    pub cusip_id: Option<String>,
    pub msg_seq_nb: Option<String>,
    pub orig_msg_seq_nb: Option<String>,
    pub trd_exctn_dt: Option<String>,
    pub trd_exctn_tm: Option<String>,
    pub trd_rpt_dt: Option<String>,
    pub trd_rpt_tm: Option<String>,
    pub entrd_vol_qt: Option<String>,
    pub rptd_pr: Option<String>,
    pub yld_pt: Option<String>,
    pub rpt_side_cd: Option<String>,
    pub cntra_mp_id: Option<String>,
    pub trc_st: Option<String>,
    pub asof_cd: Option<String>,
    pub stlmnt_dt: Option<String>,
    pub days_to_sttl_ct: Option<String>,
    pub wis_fl: Option<String>,
    pub spcl_trd_fl: Option<String>,
}

impl RawTradeMessage {
    /// Set a cell by column name. Returns `false` for unknown columns.
    /// Blank values and [`MISSING_MARKERS`] are stored as missing.
    pub fn set(&mut self, column: &str, value: Option<String>) -> bool {
        let value = value.filter(|v| {
            let v = v.trim();
            !v.is_empty() && !MISSING_MARKERS.iter().any(|m| *m == v)
        });
        let slot = match column {
            "cusip_id" => &mut self.cusip_id,
            "msg_seq_nb" => &mut self.msg_seq_nb,
            "orig_msg_seq_nb" => &mut self.orig_msg_seq_nb,
            "trd_exctn_dt" => &mut self.trd_exctn_dt,
            "trd_exctn_tm" => &mut self.trd_exctn_tm,
            "trd_rpt_dt" => &mut self.trd_rpt_dt,
            "trd_rpt_tm" => &mut self.trd_rpt_tm,
            "entrd_vol_qt" => &mut self.entrd_vol_qt,
            "rptd_pr" => &mut self.rptd_pr,
            "yld_pt" => &mut self.yld_pt,
            "rpt_side_cd" => &mut self.rpt_side_cd,
            "cntra_mp_id" => &mut self.cntra_mp_id,
            "trc_st" => &mut self.trc_st,
            "asof_cd" => &mut self.asof_cd,
            "stlmnt_dt" => &mut self.stlmnt_dt,
            "days_to_sttl_ct" => &mut self.days_to_sttl_ct,
            "wis_fl" => &mut self.wis_fl,
            "spcl_trd_fl" => &mut self.spcl_trd_fl,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Validate and convert into a typed message. `row` is only used for
    /// error messages.
    pub fn into_message(self, row: usize) -> Result<TradeMessage> {
        let status_code = required(row, "trc_st", self.trc_st)?;
        let status = TradeStatus::from_code(&status_code)
            .ok_or_else(|| Error::schema_at(row, "trc_st", format!("unknown code `{status_code}`")))?;

        let asof = match self.asof_cd {
            Some(code) => Some(AsOfCode::from_code(&code).ok_or_else(|| {
                Error::schema_at(row, "asof_cd", format!("unknown code `{code}`"))
            })?),
            None => None,
        };

        let side_code = required(row, "rpt_side_cd", self.rpt_side_cd)?;
        let side = ReportSide::from_code(&side_code).ok_or_else(|| {
            Error::schema_at(row, "rpt_side_cd", format!("unknown code `{side_code}`"))
        })?;

        let when_issued = match self.wis_fl.as_deref().map(str::trim) {
            Some("Y") => Some(true),
            Some("N") => Some(false),
            Some(other) => {
                return Err(Error::schema_at(row, "wis_fl", format!("unknown flag `{other}`")))
            }
            None => None,
        };

        Ok(TradeMessage {
            cusip: required(row, "cusip_id", self.cusip_id)?.trim().to_string(),
            msg_seq: parse_seq(row, "msg_seq_nb", &required(row, "msg_seq_nb", self.msg_seq_nb)?)?,
            orig_msg_seq: self
                .orig_msg_seq_nb
                .map(|v| parse_seq(row, "orig_msg_seq_nb", &v))
                .transpose()?,
            exec_date: parse_date(row, "trd_exctn_dt", &required(row, "trd_exctn_dt", self.trd_exctn_dt)?)?,
            exec_time: parse_time(row, "trd_exctn_tm", &required(row, "trd_exctn_tm", self.trd_exctn_tm)?)?,
            report_date: parse_date(row, "trd_rpt_dt", &required(row, "trd_rpt_dt", self.trd_rpt_dt)?)?,
            report_time: parse_time(row, "trd_rpt_tm", &required(row, "trd_rpt_tm", self.trd_rpt_tm)?)?,
            volume: OrderedFloat(parse_f64(row, "entrd_vol_qt", &required(row, "entrd_vol_qt", self.entrd_vol_qt)?)?),
            price: OrderedFloat(parse_f64(row, "rptd_pr", &required(row, "rptd_pr", self.rptd_pr)?)?),
            yield_pct: self
                .yld_pt
                .map(|v| parse_f64(row, "yld_pt", &v))
                .transpose()?,
            side,
            counterparty: Counterparty::from_code(&required(row, "cntra_mp_id", self.cntra_mp_id)?),
            status,
            asof,
            settlement_date: self
                .stlmnt_dt
                .map(|v| parse_date(row, "stlmnt_dt", &v))
                .transpose()?,
            days_to_settle: self
                .days_to_sttl_ct
                .map(|v| parse_integral(row, "days_to_sttl_ct", &v))
                .transpose()?,
            when_issued,
            special_trade: self.spcl_trd_fl.map(|v| v.trim().to_string()),
        })
    }
}

/// Check that a header row carries every required column.
pub fn check_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = columns.into_iter().map(str::trim).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Columns that are neither required nor optional, in header order.
pub fn unknown_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    columns
        .into_iter()
        .map(str::trim)
        .filter(|c| !REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS).any(|known| known == c))
        .collect()
}

fn required(row: usize, column: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::schema_at(row, column, "missing required value"))
}

fn parse_f64(row: usize, column: &str, value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|e| Error::schema_at(row, column, format!("`{value}`: {e}")))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(Error::schema_at(row, column, format!("`{value}` is not finite")))
    }
}

/// Integers exported through a float column come back as `"12.0"`.
fn parse_integral(row: usize, column: &str, value: &str) -> Result<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    let f = parse_f64(row, column, value)?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(Error::schema_at(row, column, format!("`{value}` is not an integer")))
    }
}

fn parse_seq(row: usize, column: &str, value: &str) -> Result<u64> {
    let n = parse_integral(row, column, value)?;
    u64::try_from(n).map_err(|_| Error::schema_at(row, column, format!("`{value}` is negative")))
}

fn parse_date(row: usize, column: &str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    // Timestamps exported from date columns carry a midnight suffix.
    let day = value.split([' ', 'T']).next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y%m%d"))
        .map_err(|e| Error::schema_at(row, column, format!("`{value}`: {e}")))
}

fn parse_time(row: usize, column: &str, value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H%M%S"))
        .map_err(|e| Error::schema_at(row, column, format!("`{value}`: {e}")))
}
