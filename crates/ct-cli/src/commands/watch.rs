//! Watch command: follows session logs live and persists usage as it appears.
//!
//! Runs one tailer for primary session logs and one for sub-task logs. Both
//! share a dedup buffer, so a sub-task call mirrored into its parent's log and
//! also written to its own log is recorded once.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use ct_core::{
    BranchResolver, PricingTable, SharedDedup, TailEvent, Tailer, TailerConfig, UsageRecord,
};
use ct_db::Database;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::Config;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub records_written: usize,
    pub errors: usize,
}

struct Sink<'a> {
    db: &'a mut Database,
    resolver: &'a dyn BranchResolver,
    summary: WatchSummary,
}

impl Sink<'_> {
    fn handle(&mut self, event: TailEvent) -> Result<()> {
        match event {
            TailEvent::Usage(record) => self.persist(record),
            TailEvent::Error(e) => {
                tracing::warn!(error = %e, "tailer error");
                self.summary.errors += 1;
                Ok(())
            }
        }
    }

    fn persist(&mut self, mut record: UsageRecord) -> Result<()> {
        if record.branch_name.is_unknown() {
            record.branch_name = self.resolver.branch_at_time(record.timestamp);
        }
        tracing::debug!(
            message_id = %record.message_id,
            branch = %record.branch_name,
            cost_usd = record.cost_usd,
            partial = record.is_partial,
            "usage"
        );
        let written = self
            .db
            .upsert_usage(std::slice::from_ref(&record))
            .context("failed to persist usage record")?;
        self.summary.records_written += written;
        Ok(())
    }

    async fn drain(&mut self, rx: &mut UnboundedReceiver<TailEvent>) -> Result<()> {
        while let Some(event) = rx.recv().await {
            self.handle(event)?;
        }
        Ok(())
    }
}

/// Tails both log patterns until `shutdown` resolves, then flushes and drains.
pub async fn watch_until(
    db: &mut Database,
    config: &Config,
    pricing: Arc<PricingTable>,
    resolver: &dyn BranchResolver,
    shutdown: impl Future<Output = ()>,
) -> Result<WatchSummary> {
    let dedup = SharedDedup::new();
    let mut tailers: Vec<Tailer> = config
        .log_patterns()
        .into_iter()
        .map(|pattern| {
            let tailer_config =
                TailerConfig::new(pattern).with_rescan_interval(config.rescan_interval());
            Tailer::new(tailer_config, Arc::clone(&pricing), dedup.clone())
        })
        .collect();

    let mut receivers = Vec::with_capacity(tailers.len());
    for tailer in &mut tailers {
        receivers.push(tailer.start().context("failed to start log tailer")?);
    }
    let [mut primary_rx, mut subagent_rx]: [UnboundedReceiver<TailEvent>; 2] = receivers
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected two log tailers"))?;

    let mut sink = Sink {
        db,
        resolver,
        summary: WatchSummary::default(),
    };

    tokio::pin!(shutdown);
    let outcome = loop {
        let event = tokio::select! {
            biased;
            () = &mut shutdown => break Ok(()),
            Some(event) = primary_rx.recv() => event,
            Some(event) = subagent_rx.recv() => event,
            else => break Ok(()),
        };
        if let Err(e) = sink.handle(event) {
            break Err(e);
        }
    };

    tracing::info!("stopping tailers");
    for tailer in &mut tailers {
        tailer.stop().await;
    }
    outcome?;
    sink.drain(&mut primary_rx).await?;
    sink.drain(&mut subagent_rx).await?;

    tracing::info!(summary = ?sink.summary, "watch stopped");
    Ok(sink.summary)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C; stop the process to exit");
        std::future::pending::<()>().await;
    }
}

/// Runs the watch command until Ctrl-C.
pub fn run(
    db: &mut Database,
    config: &Config,
    pricing: PricingTable,
    resolver: &dyn BranchResolver,
) -> Result<WatchSummary> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(watch_until(db, config, Arc::new(pricing), resolver, ctrl_c()))
}
