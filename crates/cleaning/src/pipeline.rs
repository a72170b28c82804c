//! End-to-end cleaning pipeline.
//!
//! Every matching key is scoped to one cusip, so the feed is cleaned per
//! cusip partition: regime split, both regime cleaners, agency deduplication
//! and the settlement filter all run inside a partition. Partitions run on a
//! rayon pool and are concatenated in cusip order; the global sort happens
//! once, in the output formatter.

use crate::agency::AgencyTradeResolver;
use crate::output::OutputFormatter;
use crate::post_regime::PostRegimeCleaner;
use crate::pre_regime::PreRegimeCleaner;
use crate::regime::RegimeSplitter;
use crate::report::CleaningReport;
use crate::settlement::SettlementFilter;
use rayon::prelude::*;
use trace_core::{CleanTrade, Config, Error, Result, TradeMessage};
use trace_ingestion::MessageStore;
use tracing::{debug, info, warn};

/// Surviving messages plus the run report.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Surviving messages, grouped by cusip in cusip order.
    pub ledger: Vec<TradeMessage>,
    /// Per-stage counters and audit findings.
    pub report: CleaningReport,
}

/// TRACE cleaner configured once, reusable across stores.
#[derive(Debug, Clone, Default)]
pub struct TraceCleaner {
    config: Config,
}

impl TraceCleaner {
    /// Create a cleaner from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clean a store into the sorted output table.
    pub fn clean(&self, store: &MessageStore) -> Result<Vec<CleanTrade>> {
        let reconciliation = self.reconcile(store)?;
        Ok(OutputFormatter::new().format(&reconciliation.ledger))
    }

    /// Run every cleaning stage and keep the surviving messages.
    pub fn reconcile(&self, store: &MessageStore) -> Result<Reconciliation> {
        let partitions: Vec<(&str, Vec<TradeMessage>)> =
            store.partition_by_cusip().into_iter().collect();
        let partition_count = partitions.len();

        let outcomes = if self.config.execution.parallel && partition_count > 1 {
            self.reconcile_parallel(partitions)?
        } else {
            partitions
                .into_iter()
                .map(|(cusip, messages)| self.reconcile_partition(cusip, messages))
                .collect::<Result<Vec<_>>>()?
        };

        let mut result = Reconciliation::default();
        for outcome in outcomes {
            result.ledger.extend(outcome.ledger);
            result.report.merge(outcome.report);
        }

        let report = &result.report;
        if report.has_audit_findings() {
            warn!(
                orphaned_corrections = report.orphaned_corrections.len(),
                unmatched_reversals = report.unmatched_reversals.len(),
                "messages discarded without a counterpart"
            );
        }
        info!(
            partitions = partition_count,
            input = report.input_messages,
            output = report.output_trades,
            "trace cleaning complete"
        );
        Ok(result)
    }

    fn reconcile_parallel(
        &self,
        partitions: Vec<(&str, Vec<TradeMessage>)>,
    ) -> Result<Vec<Reconciliation>> {
        let run = || {
            partitions
                .into_par_iter()
                .map(|(cusip, messages)| self.reconcile_partition(cusip, messages))
                .collect::<Result<Vec<_>>>()
        };

        match self.config.execution.workers {
            0 => run(),
            workers => rayon::ThreadPoolBuilder::new()
                .num_threads(workers as usize)
                .build()
                .map_err(|e| Error::config(format!("worker pool: {e}")))?
                .install(run),
        }
    }

    /// Clean one cusip's messages.
    fn reconcile_partition(&self, cusip: &str, messages: Vec<TradeMessage>) -> Result<Reconciliation> {
        let mut report = CleaningReport {
            input_messages: messages.len() as u64,
            ..Default::default()
        };

        let split = RegimeSplitter::new(self.config.regime.cutover_date).split(messages);
        report.pre_cutover_messages = split.pre.len() as u64;
        report.post_cutover_messages = split.post.len() as u64;

        let mut merged = PostRegimeCleaner::new().clean(split.post, &mut report)?;
        let pre = PreRegimeCleaner::new(self.config.correction.max_passes).clean(split.pre, &mut report)?;
        merged.extend(pre);

        let deduplicated = AgencyTradeResolver::new().resolve(merged, &mut report);
        let ledger = SettlementFilter::new(self.config.settlement.max_days).apply(deduplicated, &mut report);
        report.output_trades = ledger.len() as u64;

        debug!(
            cusip,
            input = report.input_messages,
            output = report.output_trades,
            "cleaned partition"
        );
        Ok(Reconciliation { ledger, report })
    }
}

/// Clean a message table with the default configuration.
pub fn clean(messages: Vec<TradeMessage>) -> Result<Vec<CleanTrade>> {
    TraceCleaner::default().clean(&MessageStore::from(messages))
}
