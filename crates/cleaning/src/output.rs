//! Output projection and writers.

use std::io::Write;
use trace_core::{CleanTrade, Error, Result, TradeMessage};

/// Sorts the clean ledger and projects it to the output columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Sort by `(cusip, exec_date, exec_time)` and project. The sort is
    /// stable and uses the full-precision execution time; the projected time
    /// is truncated to `HH:MM:SS`.
    pub fn format(&self, ledger: &[TradeMessage]) -> Vec<CleanTrade> {
        let mut sorted: Vec<&TradeMessage> = ledger.iter().collect();
        sorted.sort_by(|a, b| {
            (&a.cusip, a.exec_date, a.exec_time).cmp(&(&b.cusip, b.exec_date, b.exec_time))
        });
        sorted.into_iter().map(CleanTrade::from).collect()
    }

    /// Write a headed CSV table.
    pub fn write_csv<W: Write>(&self, trades: &[CleanTrade], writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for trade in trades {
            wtr.serialize(trade).map_err(|e| Error::csv(e.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render as a JSON array of row objects.
    pub fn to_json(&self, trades: &[CleanTrade]) -> Result<String> {
        Ok(serde_json::to_string(trades)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, make_trade, time};
    use chrono::NaiveTime;

    #[test]
    fn test_format_sorts_and_projects() {
        let mut late = make_trade(1, date(2013, 6, 3));
        late.exec_time = time(15, 0, 0);
        let mut other_cusip = make_trade(2, date(2013, 6, 1));
        other_cusip.cusip = "999999ZZ9".to_string();
        let mut early = make_trade(3, date(2013, 6, 3));
        early.exec_time = NaiveTime::from_hms_milli_opt(9, 30, 0, 500).unwrap();
        let earlier_day = make_trade(4, date(2013, 6, 2));

        let rows = OutputFormatter::new().format(&[late, other_cusip, early, earlier_day]);
        let order: Vec<(&str, String, &str)> = rows
            .iter()
            .map(|r| (r.cusip.as_str(), r.exec_date.to_string(), r.exec_time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("123456AB7", "2013-06-02".to_string(), "10:00:00"),
                ("123456AB7", "2013-06-03".to_string(), "09:30:00"),
                ("123456AB7", "2013-06-03".to_string(), "15:00:00"),
                ("999999ZZ9", "2013-06-01".to_string(), "10:00:00"),
            ]
        );
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let formatter = OutputFormatter::new();
        let mut trade = make_trade(1, date(2013, 6, 3));
        trade.yield_pct = Some(4.5);
        let rows = formatter.format(&[trade, make_trade(2, date(2013, 6, 4))]);

        let mut buf = Vec::new();
        formatter.write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "cusip_id,trd_exctn_dt,trd_exctn_tm,rptd_pr,entrd_vol_qt,yld_pt,rpt_side_cd,cntra_mp_id"
        );
        assert_eq!(lines[1], "123456AB7,2013-06-03,10:00:00,99.5,100.0,4.5,B,C");
        assert_eq!(lines[2], "123456AB7,2013-06-04,10:00:00,99.5,100.0,,B,C");
    }

    #[test]
    fn test_to_json() {
        let formatter = OutputFormatter::new();
        let rows = formatter.format(&[make_trade(1, date(2013, 6, 3))]);
        let json: serde_json::Value = serde_json::from_str(&formatter.to_json(&rows).unwrap()).unwrap();
        assert_eq!(json[0]["cusip_id"], "123456AB7");
        assert_eq!(json[0]["trd_exctn_tm"], "10:00:00");
        assert_eq!(json[0]["yld_pt"], serde_json::Value::Null);
    }

    #[test]
    fn test_format_empty() {
        assert!(OutputFormatter::new().format(&[]).is_empty());
    }
}
