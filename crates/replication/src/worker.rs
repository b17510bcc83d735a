// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Single-threaded delivery worker for replication records.
//!
//! The finalizer hands records over through an unbounded channel and never
//! blocks on the sink; a failed append is retried here with a delay until it
//! lands or the attempt budget runs out. Records are delivered in commit
//! order because one thread drains the backlog sequentially.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use strata_core::diagnostic::DefaultRenderer;
use strata_core::diagnostic::replication::{append_failed, delivery_abandoned};
use tracing::{info, trace, warn};

use crate::record::SchemaChangeRecord;
use crate::sink::ReplicationSink;

/// Timeout for recv in the worker loop, allows checking the shutdown flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ReplicationWorkerConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ReplicationWorkerConfig {
    fn default() -> Self {
        Self { max_attempts: 10, retry_delay: Duration::from_millis(50) }
    }
}

pub struct ReplicationWorker {
    sender: Sender<SchemaChangeRecord>,
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
}

#[derive(Default)]
struct WorkerStats {
    delivered: AtomicU64,
    abandoned: AtomicU64,
}

impl ReplicationWorker {
    pub fn spawn(sink: Arc<dyn ReplicationSink>, config: ReplicationWorkerConfig) -> Self {
        let (sender, receiver) = unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = stats.clone();

        let handle = thread::Builder::new()
            .name("replication-worker".to_string())
            .spawn(move || {
                info!("replication worker started");
                worker_loop(sink, receiver, running_clone, stats_clone, config);
                info!("replication worker stopped");
            })
            .expect("Failed to spawn replication worker");

        Self { sender, handle: Some(handle), running, stats }
    }

    /// Non-blocking enqueue; the local commit has already succeeded when
    /// this is called.
    pub fn send(&self, record: SchemaChangeRecord) {
        let _ = self.sender.try_send(record);
    }

    /// Count of records the sink has acknowledged.
    pub fn delivered(&self) -> u64 {
        self.stats.delivered.load(Ordering::SeqCst)
    }

    /// Count of records given up on after exhausting the attempt budget.
    pub fn abandoned(&self) -> u64 {
        self.stats.abandoned.load(Ordering::SeqCst)
    }

    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReplicationWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    sink: Arc<dyn ReplicationSink>,
    receiver: Receiver<SchemaChangeRecord>,
    running: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
    config: ReplicationWorkerConfig,
) {
    while running.load(Ordering::SeqCst) {
        let record = match receiver.recv_timeout(RECV_TIMEOUT) {
            Ok(record) => record,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        deliver(sink.as_ref(), &record, &running, &stats, &config);
    }

    // Drain whatever is still queued before exiting so a clean shutdown does
    // not drop committed records.
    while let Ok(record) = receiver.try_recv() {
        deliver(sink.as_ref(), &record, &running, &stats, &config);
    }
}

fn deliver(
    sink: &dyn ReplicationSink,
    record: &SchemaChangeRecord,
    running: &AtomicBool,
    stats: &WorkerStats,
    config: &ReplicationWorkerConfig,
) {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match sink.append(record) {
            Ok(ack) => {
                trace!("replication record {} acknowledged", ack.seq);
                stats.delivered.fetch_add(1, Ordering::SeqCst);
                return;
            }
            Err(err) => {
                warn!(
                    "{}",
                    DefaultRenderer::render_string(&append_failed(record.seq, err.to_string()))
                );

                if attempts >= config.max_attempts {
                    warn!(
                        "{}",
                        DefaultRenderer::render_string(&delivery_abandoned(record.seq, attempts))
                    );
                    stats.abandoned.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                if !running.load(Ordering::SeqCst) && attempts >= 2 {
                    // Shutting down; leave convergence to follower catch-up.
                    stats.abandoned.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                thread::sleep(config.retry_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_core::{CommitSequence, NodeId};
    use strata_testing::wait::wait_for;

    use crate::sink::MemorySink;

    use super::*;

    fn record(seq: u64) -> SchemaChangeRecord {
        SchemaChangeRecord::local(CommitSequence(seq), NodeId(1), vec![seq as u8])
    }

    #[test]
    fn test_delivers_in_order() {
        let sink = Arc::new(MemorySink::new());
        let worker = ReplicationWorker::spawn(sink.clone(), ReplicationWorkerConfig::default());

        worker.send(record(1));
        worker.send(record(2));
        worker.send(record(3));

        wait_for(|| sink.len() == 3, "all records delivered");

        let seqs: Vec<_> = sink.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![CommitSequence(1), CommitSequence(2), CommitSequence(3)]);
    }

    #[test]
    fn test_retries_until_sink_recovers() {
        let sink = Arc::new(MemorySink::new());
        sink.fail_next(3);

        let config =
            ReplicationWorkerConfig { max_attempts: 10, retry_delay: Duration::from_millis(1) };
        let worker = ReplicationWorker::spawn(sink.clone(), config);

        worker.send(record(1));

        wait_for(|| sink.len() == 1, "record delivered after retries");
        assert_eq!(worker.delivered(), 1);
    }

    #[test]
    fn test_abandons_after_attempt_budget() {
        let sink = Arc::new(MemorySink::new());
        sink.fail_next(u32::MAX);

        let config =
            ReplicationWorkerConfig { max_attempts: 3, retry_delay: Duration::from_millis(1) };
        let worker = ReplicationWorker::spawn(sink.clone(), config);

        worker.send(record(1));
        wait_for(|| worker.abandoned() == 1, "first record abandoned");

        // The worker keeps serving later records after giving one up.
        sink.fail_next(0);
        worker.send(record(2));
        wait_for(|| worker.delivered() == 1, "later record still delivered");
        assert_eq!(sink.records()[0].seq, CommitSequence(2));
    }

    #[test]
    fn test_shutdown_drains_backlog() {
        let sink = Arc::new(MemorySink::new());
        let mut worker = ReplicationWorker::spawn(sink.clone(), ReplicationWorkerConfig::default());

        for seq in 1..=20u64 {
            worker.send(record(seq));
        }
        worker.shutdown();

        assert_eq!(sink.len(), 20);
    }
}
