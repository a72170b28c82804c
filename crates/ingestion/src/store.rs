//! Immutable in-memory message store.

use crate::reader::{read_csv, read_json_lines};
use crate::schema::RawTradeMessage;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use trace_core::{Result, TradeMessage};
use tracing::debug;

/// The complete raw feed for one `(cusip, date-range)` selection.
///
/// Messages are validated on construction and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<TradeMessage>,
}

impl MessageStore {
    /// Wrap already-typed messages.
    pub fn new(messages: Vec<TradeMessage>) -> Self {
        Self { messages }
    }

    /// Validate raw rows. Fails on the first schema violation.
    pub fn from_raw(rows: impl IntoIterator<Item = RawTradeMessage>) -> Result<Self> {
        let messages = rows
            .into_iter()
            .enumerate()
            .map(|(row, raw)| raw.into_message(row))
            .collect::<Result<Vec<_>>>()?;
        debug!(messages = messages.len(), "validated trace messages");
        Ok(Self::new(messages))
    }

    /// Load a headed CSV export.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(read_csv(reader)?)
    }

    /// Load a CSV export from disk.
    pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_csv(BufReader::new(File::open(path)?))
    }

    /// Load a JSON-lines export.
    pub fn read_json_lines<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(read_json_lines(BufReader::new(reader))?)
    }

    /// All messages in feed order.
    pub fn messages(&self) -> &[TradeMessage] {
        &self.messages
    }

    /// Iterate over messages in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &TradeMessage> {
        self.messages.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Split into per-cusip partitions, ordered by cusip, feed order kept
    /// within each partition. Every matching key is cusip-scoped, so the
    /// partitions can be cleaned independently.
    pub fn partition_by_cusip(&self) -> BTreeMap<&str, Vec<TradeMessage>> {
        let mut partitions: BTreeMap<&str, Vec<TradeMessage>> = BTreeMap::new();
        for msg in self.iter() {
            partitions
                .entry(msg.cusip.as_str())
                .or_default()
                .push(msg.clone());
        }
        partitions
    }
}

impl From<Vec<TradeMessage>> for MessageStore {
    fn from(messages: Vec<TradeMessage>) -> Self {
        Self::new(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use trace_core::{Counterparty, Error, ReportSide};

    fn make_trade(cusip: &str, msg_seq: u64) -> TradeMessage {
        TradeMessage::trade(
            cusip,
            msg_seq,
            NaiveDate::from_ymd_opt(2013, 5, 2).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            100.0,
            99.0,
            ReportSide::Buy,
            Counterparty::Customer,
        )
    }

    #[test]
    fn test_partition_by_cusip() {
        let store = MessageStore::new(vec![
            make_trade("B", 1),
            make_trade("A", 2),
            make_trade("B", 3),
        ]);
        let partitions = store.partition_by_cusip();
        let cusips: Vec<&str> = partitions.keys().copied().collect();
        assert_eq!(cusips, vec!["A", "B"]);
        let seqs: Vec<u64> = partitions["B"].iter().map(|m| m.msg_seq).collect();
        assert_eq!(seqs, vec![1, 3]);
    }

    #[test]
    fn test_from_typed_messages() {
        let store: MessageStore = vec![make_trade("A", 1), make_trade("A", 2)].into();
        assert_eq!(store.len(), 2);
        let seqs: Vec<u64> = store.iter().map(|m| m.msg_seq).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn test_from_raw_fails_fast() {
        let mut bad = RawTradeMessage::default();
        bad.set("cusip_id", Some("A".to_string()));
        let err = MessageStore::from_raw(vec![bad]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_read_csv_into_store() {
        let data = "cusip_id,msg_seq_nb,trd_exctn_dt,trd_exctn_tm,trd_rpt_dt,trd_rpt_tm,entrd_vol_qt,rptd_pr,rpt_side_cd,cntra_mp_id,trc_st,wis_fl\n\
                    123456AB7,1,2011-05-02,10:15:00,2011-05-02,10:15:30,100,99.5,B,C,T,N\n";
        let store = MessageStore::read_csv(data.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].msg_seq, 1);
    }

    #[test]
    fn test_empty_store() {
        let store = MessageStore::from_raw(Vec::new()).unwrap();
        assert!(store.is_empty());
        assert!(store.partition_by_cusip().is_empty());
    }
}
