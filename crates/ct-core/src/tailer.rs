//! Deduplicating tailer over append-only JSONL logs.
//!
//! One tailer owns one glob. It runs as a single tokio task that:
//!
//! 1. re-expands the glob every `rescan_interval` (first pass immediately),
//! 2. catches newly seen files up from offset 0 *before* watching them,
//! 3. reads appended bytes on change notifications, and on every rescan as a
//!    fallback when notifications are missing,
//! 4. pushes every parsed frame through a [`SharedDedup`] and forwards what
//!    it emits as [`TailEvent::Usage`].
//!
//! Offsets live inside the task while it runs and are handed back on
//! [`Tailer::stop`], so a restarted tailer resumes where it left off.
//!
//! An I/O fault on a path is reported once and then only again when its kind
//! changes or after the path has been read successfully in between.

use std::collections::{HashMap, HashSet};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::dedup::SharedDedup;
use crate::discovery::{Discovered, discover};
use crate::parser::parse_line;
use crate::pricing::PricingTable;
use crate::usage::UsageRecord;

/// Default interval between glob re-expansions.
pub const DEFAULT_RESCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Recoverable tailer faults. None of these stop the tailer.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("invalid log pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("discovery task failed: {0}")]
    Discovery(String),
    #[error("tailer is already running")]
    AlreadyRunning,
}

/// What a running tailer reports to its caller.
#[derive(Debug)]
pub enum TailEvent {
    /// One unique billable call.
    Usage(UsageRecord),
    /// A recoverable I/O or configuration fault.
    Error(TailError),
}

#[derive(Debug, Clone)]
pub struct TailerConfig {
    /// Path pattern; `*` wildcards, leading `~` expands to home.
    pub pattern: String,
    pub rescan_interval: Duration,
}

impl TailerConfig {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            rescan_interval: DEFAULT_RESCAN_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_rescan_interval(mut self, interval: Duration) -> Self {
        self.rescan_interval = interval;
        self
    }
}

/// Read offsets, keyed by file.
#[derive(Debug, Default)]
struct TailState {
    offsets: HashMap<PathBuf, u64>,
}

struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<TailState>,
}

pub struct Tailer {
    config: TailerConfig,
    pricing: Arc<PricingTable>,
    dedup: SharedDedup,
    state: Option<TailState>,
    running: Option<Running>,
}

impl Tailer {
    pub fn new(config: TailerConfig, pricing: Arc<PricingTable>, dedup: SharedDedup) -> Self {
        Self {
            config,
            pricing,
            dedup,
            state: Some(TailState::default()),
            running: None,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Starts discovery and tailing, returning the event stream.
    ///
    /// Must be called inside a tokio runtime. The stream ends after
    /// [`Tailer::stop`]. The tailer stays attached to its dedup buffer until
    /// then.
    pub fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TailEvent>, TailError> {
        if self.running.is_some() {
            return Err(TailError::AlreadyRunning);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let worker = Worker {
            config: self.config.clone(),
            pricing: Arc::clone(&self.pricing),
            dedup: self.dedup.clone(),
            state: self.state.take().unwrap_or_default(),
            faults: HashMap::new(),
            tx,
        };
        self.dedup.attach();
        tracing::info!(pattern = %self.config.pattern, "starting log tailer");
        let task = tokio::spawn(worker.run(shutdown_rx));
        self.running = Some(Running { shutdown, task });
        Ok(rx)
    }

    /// Stops discovery and watching, then detaches from the dedup buffer.
    ///
    /// Buffered partials are flushed into this tailer's stream only when it
    /// was the last running tailer on the buffer. Idempotent: stopping a
    /// stopped tailer does nothing.
    pub async fn stop(&mut self) {
        let Some(Running { shutdown, task }) = self.running.take() else {
            return;
        };
        // The task may already have exited; a closed channel is fine.
        let _ = shutdown.send(());
        match task.await {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "tailer task ended abnormally; offsets reset");
                self.state = Some(TailState::default());
                let lost = self.dedup.detach();
                if !lost.is_empty() {
                    tracing::warn!(count = lost.len(), "partial frames dropped with failed tailer");
                }
            }
        }
        tracing::info!(pattern = %self.config.pattern, "log tailer stopped");
    }
}

struct Worker {
    config: TailerConfig,
    pricing: Arc<PricingTable>,
    dedup: SharedDedup,
    state: TailState,
    /// Last reported fault per path.
    faults: HashMap<PathBuf, ErrorKind>,
    tx: mpsc::UnboundedSender<TailEvent>,
}

impl Worker {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> TailState {
        let (fs_tx, mut fs_rx) = mpsc::unbounded_channel();
        let mut watcher = match notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| {
                let _ = fs_tx.send(res);
            },
        ) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "file watcher unavailable; relying on rescans");
                self.emit(TailEvent::Error(TailError::Watch(e)));
                None
            }
        };

        let mut ticker = tokio::time::interval(self.config.rescan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.rescan(watcher.as_mut()).await,
                Some(res) = fs_rx.recv() => match res {
                    Ok(event) => {
                        for path in event.paths {
                            if self.state.offsets.contains_key(&path) {
                                self.read_pass(&path).await;
                            }
                        }
                    }
                    Err(e) => self.emit(TailEvent::Error(TailError::Watch(e))),
                },
            }
        }

        drop(watcher);
        let flushed = self.dedup.detach();
        if !flushed.is_empty() {
            tracing::debug!(count = flushed.len(), "flushing partial frames on shutdown");
        }
        for record in flushed {
            self.emit(TailEvent::Usage(record));
        }
        self.state
    }

    fn emit(&self, event: TailEvent) {
        // The caller dropped the receiver; keep tailing so offsets stay correct.
        let _ = self.tx.send(event);
    }

    fn report_io(&mut self, path: PathBuf, source: std::io::Error) {
        let kind = source.kind();
        if self.faults.insert(path.clone(), kind) == Some(kind) {
            tracing::trace!(path = %path.display(), error = %source, "fault unchanged");
            return;
        }
        tracing::warn!(path = %path.display(), error = %source, "log path unreadable");
        self.emit(TailEvent::Error(TailError::Io { path, source }));
    }

    async fn rescan(&mut self, mut watcher: Option<&mut RecommendedWatcher>) {
        let pattern = self.config.pattern.clone();
        let discovered = match tokio::task::spawn_blocking(move || discover(&pattern)).await {
            Ok(Ok(discovered)) => discovered,
            Ok(Err(e)) => {
                self.emit(TailEvent::Error(e));
                return;
            }
            Err(e) => {
                self.emit(TailEvent::Error(TailError::Discovery(e.to_string())));
                return;
            }
        };
        let Discovered { files, errors } = discovered;
        let mut scan_faults = HashSet::new();
        for error in errors {
            match error {
                TailError::Io { path, source } => {
                    scan_faults.insert(path.clone());
                    self.report_io(path, source);
                }
                other => self.emit(TailEvent::Error(other)),
            }
        }

        let before = self.state.offsets.len();
        self.state.offsets.retain(|path, _| files.contains(path));
        if self.state.offsets.len() < before {
            tracing::debug!(
                dropped = before - self.state.offsets.len(),
                "log files no longer matched"
            );
        }
        let offsets = &self.state.offsets;
        self.faults
            .retain(|path, _| scan_faults.contains(path) || offsets.contains_key(path));

        for path in files {
            let is_new = !self.state.offsets.contains_key(&path);
            self.read_pass(&path).await;
            if is_new {
                tracing::info!(path = %path.display(), "tailing new log file");
                if let Some(watcher) = watcher.as_deref_mut() {
                    if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
                        self.emit(TailEvent::Error(TailError::Watch(e)));
                    }
                }
            }
        }
    }

    /// Reads everything appended to `path` since its last offset.
    async fn read_pass(&mut self, path: &Path) {
        let offset = self.state.offsets.get(path).copied().unwrap_or(0);
        let pricing = Arc::clone(&self.pricing);
        let dedup = self.dedup.clone();
        let tx = self.tx.clone();
        let mut emitted = 0usize;

        let result = read_appended_lines(path, offset, |line| {
            if let Some(record) = parse_line(line, &pricing).and_then(|frame| dedup.offer(frame)) {
                emitted += 1;
                let _ = tx.send(TailEvent::Usage(record));
            }
        })
        .await;

        match result {
            Ok(new_offset) => {
                if new_offset != offset {
                    tracing::debug!(
                        path = %path.display(),
                        from = offset,
                        to = new_offset,
                        emitted,
                        "read pass complete"
                    );
                }
                self.state.offsets.insert(path.to_path_buf(), new_offset);
                if self.faults.remove(path).is_some() {
                    tracing::info!(path = %path.display(), "log file readable again");
                }
            }
            Err(source) => {
                // Keep the file known so a later pass retries from the old offset.
                self.state.offsets.entry(path.to_path_buf()).or_insert(offset);
                self.report_io(path.to_path_buf(), source);
            }
        }
    }
}

/// Streams complete lines appended after `offset`, returning the new offset.
///
/// Blank lines are skipped. A trailing line without `\n` is left for the next
/// pass. A file shorter than `offset` was truncated or replaced and is read
/// from the start.
pub(crate) async fn read_appended_lines(
    path: &Path,
    offset: u64,
    mut on_line: impl FnMut(&str),
) -> std::io::Result<u64> {
    let mut file = File::open(path).await?;
    let len = file.metadata().await?.len();

    let mut start = offset;
    if len < start {
        tracing::debug!(path = %path.display(), offset, len, "file shrank; rereading from start");
        start = 0;
    }
    if len == start {
        return Ok(start);
    }

    file.seek(SeekFrom::Start(start)).await?;
    let mut reader = BufReader::new(file.take(len - start));
    let mut buf = Vec::new();
    let mut consumed = start;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 || buf.last() != Some(&b'\n') {
            break;
        }
        consumed += n as u64;
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if !line.is_empty() {
            on_line(line);
        }
    }

    Ok(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(10);

    fn assistant_line(id: &str, output: u64, stop_reason: Option<&str>) -> String {
        let stop = stop_reason.map_or_else(|| "null".to_string(), |s| format!("\"{s}\""));
        format!(
            r#"{{"type":"assistant","timestamp":"2026-01-29T10:00:00Z","gitBranch":"main","message":{{"id":"{id}","model":"claude-sonnet-4-6","stop_reason":{stop},"usage":{{"input_tokens":100,"output_tokens":{output}}}}}}}"#
        )
    }

    fn progress_line(id: &str, output: u64) -> String {
        format!(
            r#"{{"type":"progress","timestamp":"2026-01-29T10:00:00Z","data":{{"message":{{"message":{{"id":"{id}","model":"claude-haiku-4-5","stop_reason":"end_turn","usage":{{"input_tokens":50,"output_tokens":{output}}}}}}}}}}}"#
        )
    }

    fn append(path: &Path, lines: &[String]) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    async fn next_usage(rx: &mut mpsc::UnboundedReceiver<TailEvent>) -> UsageRecord {
        loop {
            match timeout(WAIT, rx.recv()).await {
                Ok(Some(TailEvent::Usage(record))) => return record,
                Ok(Some(TailEvent::Error(e))) => panic!("unexpected tailer error: {e}"),
                Ok(None) => panic!("tailer stream ended"),
                Err(_) => panic!("timed out waiting for usage"),
            }
        }
    }

    async fn drain(rx: &mut mpsc::UnboundedReceiver<TailEvent>) -> Vec<UsageRecord> {
        let mut records = Vec::new();
        while let Ok(Some(event)) = timeout(WAIT, rx.recv()).await {
            if let TailEvent::Usage(record) = event {
                records.push(record);
            }
        }
        records
    }

    async fn wait_for(mut done: impl FnMut() -> bool) {
        timeout(WAIT, async {
            while !done() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn tailer_for(dir: &Path, dedup: SharedDedup) -> Tailer {
        let config = TailerConfig::new(format!("{}/*.jsonl", dir.display()))
            .with_rescan_interval(Duration::from_millis(50));
        Tailer::new(config, Arc::new(PricingTable::default()), dedup)
    }

    #[tokio::test]
    async fn read_appended_lines_skips_blank_and_incomplete_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("log.jsonl");
        std::fs::write(&path, "first\n\n  \nsecond\npartial").unwrap();

        let mut lines = Vec::new();
        let offset = read_appended_lines(&path, 0, |l| lines.push(l.to_string()))
            .await
            .unwrap();
        assert_eq!(lines, vec!["first", "second"]);
        assert_eq!(offset, "first\n\n  \nsecond\n".len() as u64);

        // Completing the trailing line makes it visible on the next pass.
        append(&path, &["-done".to_string()]);
        let mut more = Vec::new();
        let next = read_appended_lines(&path, offset, |l| more.push(l.to_string()))
            .await
            .unwrap();
        assert_eq!(more, vec!["partial-done"]);
        assert_eq!(next, std::fs::metadata(&path).unwrap().len());
    }

    #[tokio::test]
    async fn read_appended_lines_restarts_after_truncation() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("log.jsonl");
        std::fs::write(&path, "a\n").unwrap();

        let mut lines = Vec::new();
        let offset = read_appended_lines(&path, 100, |l| lines.push(l.to_string()))
            .await
            .unwrap();
        assert_eq!(lines, vec!["a"]);
        assert_eq!(offset, 2);
    }

    #[tokio::test]
    async fn read_appended_lines_reports_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = read_appended_lines(&temp.path().join("gone.jsonl"), 0, |_| {}).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn emits_final_once_and_flushes_partials_on_stop() {
        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("session.jsonl");
        append(
            &log,
            &[
                assistant_line("m1", 1, None),
                assistant_line("m1", 5, None),
                assistant_line("m1", 40, Some("end_turn")),
                assistant_line("m2", 3, None),
            ],
        );

        let mut tailer = tailer_for(temp.path(), SharedDedup::new());
        let mut rx = tailer.start().unwrap();

        let first = next_usage(&mut rx).await;
        assert_eq!(first.message_id, "m1");
        assert_eq!(first.tokens.output, 40);
        assert!(!first.is_partial);

        // Live append picked up by notification or rescan.
        append(&log, &[assistant_line("m3", 7, Some("end_turn"))]);
        let live = next_usage(&mut rx).await;
        assert_eq!(live.message_id, "m3");

        tailer.stop().await;
        let rest = drain(&mut rx).await;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].message_id, "m2");
        assert!(rest[0].is_partial);

        // Idempotent.
        tailer.stop().await;
        assert!(!tailer.is_running());
    }

    #[tokio::test]
    async fn restart_resumes_from_saved_offsets() {
        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("session.jsonl");
        append(&log, &[assistant_line("m1", 10, Some("end_turn"))]);

        // Fresh dedup on each run so only the offsets prevent re-emission.
        let mut tailer = tailer_for(temp.path(), SharedDedup::new());
        let mut rx = tailer.start().unwrap();
        assert_eq!(next_usage(&mut rx).await.message_id, "m1");
        tailer.stop().await;
        assert!(drain(&mut rx).await.is_empty());

        append(&log, &[assistant_line("m2", 10, Some("end_turn"))]);
        let mut rx = tailer.start().unwrap();
        assert_eq!(next_usage(&mut rx).await.message_id, "m2");
        tailer.stop().await;
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let mut tailer = tailer_for(temp.path(), SharedDedup::new());
        let _rx = tailer.start().unwrap();
        assert!(matches!(tailer.start(), Err(TailError::AlreadyRunning)));
        tailer.stop().await;
    }

    #[tokio::test]
    async fn shared_dedup_collapses_mirror_and_subagent_log() {
        let temp = tempfile::tempdir().unwrap();
        let parent_dir = temp.path().join("parent");
        let sub_dir = temp.path().join("sub");
        std::fs::create_dir_all(&parent_dir).unwrap();
        std::fs::create_dir_all(&sub_dir).unwrap();
        append(&parent_dir.join("s.jsonl"), &[progress_line("msg_sub", 20)]);
        append(
            &sub_dir.join("agent-1.jsonl"),
            &[assistant_line("msg_sub", 20, Some("end_turn"))],
        );

        let dedup = SharedDedup::new();
        let mut parent = tailer_for(&parent_dir, dedup.clone());
        let mut sub = tailer_for(&sub_dir, dedup);
        let mut parent_rx = parent.start().unwrap();
        let mut sub_rx = sub.start().unwrap();

        // Give both tailers several rescans to catch up.
        tokio::time::sleep(Duration::from_millis(300)).await;
        parent.stop().await;
        sub.stop().await;

        let mut all = drain(&mut parent_rx).await;
        all.extend(drain(&mut sub_rx).await);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].message_id, "msg_sub");
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_silently() {
        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("session.jsonl");
        append(
            &log,
            &[
                "{not json".to_string(),
                r#"{"type":"user","message":{"content":"hi"}}"#.to_string(),
                assistant_line("m1", 2, Some("end_turn")),
            ],
        );

        let mut tailer = tailer_for(temp.path(), SharedDedup::new());
        let mut rx = tailer.start().unwrap();
        assert_eq!(next_usage(&mut rx).await.message_id, "m1");
        tailer.stop().await;
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn stopping_one_tailer_leaves_shared_partials_to_the_other() {
        let temp = tempfile::tempdir().unwrap();
        let a_dir = temp.path().join("a");
        let b_dir = temp.path().join("b");
        std::fs::create_dir_all(&a_dir).unwrap();
        std::fs::create_dir_all(&b_dir).unwrap();
        let b_log = b_dir.join("s.jsonl");
        append(&b_log, &[assistant_line("m1", 3, None)]);

        let dedup = SharedDedup::new();
        let mut a = tailer_for(&a_dir, dedup.clone());
        let mut b = tailer_for(&b_dir, dedup.clone());
        let mut a_rx = a.start().unwrap();
        let mut b_rx = b.start().unwrap();
        wait_for(|| dedup.pending_len() == 1).await;

        a.stop().await;
        assert!(drain(&mut a_rx).await.is_empty());
        assert_eq!(dedup.attached(), 1);

        append(&b_log, &[assistant_line("m1", 500, Some("end_turn"))]);
        let last = next_usage(&mut b_rx).await;
        assert_eq!(last.message_id, "m1");
        assert_eq!(last.tokens.output, 500);
        assert!(!last.is_partial);

        b.stop().await;
        assert!(drain(&mut b_rx).await.is_empty());
        assert_eq!(dedup.attached(), 0);
    }

    #[tokio::test]
    async fn final_after_restart_follows_flushed_partial() {
        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("session.jsonl");
        append(&log, &[assistant_line("m1", 3, None)]);

        let dedup = SharedDedup::new();
        let mut tailer = tailer_for(temp.path(), dedup.clone());
        let mut rx = tailer.start().unwrap();
        wait_for(|| dedup.pending_len() == 1).await;
        tailer.stop().await;
        let flushed = drain(&mut rx).await;
        assert_eq!(flushed.len(), 1);
        assert!(flushed[0].is_partial);

        append(&log, &[assistant_line("m1", 500, Some("end_turn"))]);
        let mut rx = tailer.start().unwrap();
        let last = next_usage(&mut rx).await;
        assert_eq!(last.tokens.output, 500);
        assert!(!last.is_partial);
        tailer.stop().await;
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn unreadable_file_is_reported_once_while_others_flow() {
        let temp = tempfile::tempdir().unwrap();
        let good = temp.path().join("good.jsonl");
        let flaky = temp.path().join("flaky.jsonl");
        append(&good, &[assistant_line("m1", 10, Some("end_turn"))]);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut worker = Worker {
            config: TailerConfig::new(format!("{}/*.jsonl", temp.path().display())),
            pricing: Arc::new(PricingTable::default()),
            dedup: SharedDedup::new(),
            state: TailState::default(),
            faults: HashMap::new(),
            tx,
        };
        worker.state.offsets.insert(flaky.clone(), 0);

        worker.read_pass(&flaky).await;
        worker.read_pass(&good).await;
        worker.read_pass(&flaky).await;

        match rx.try_recv() {
            Ok(TailEvent::Error(TailError::Io { path, source })) => {
                assert_eq!(path, flaky);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
        match rx.try_recv() {
            Ok(TailEvent::Usage(record)) => assert_eq!(record.message_id, "m1"),
            other => panic!("expected usage, got {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "repeat fault must not be re-reported");
        assert_eq!(worker.state.offsets.get(&flaky), Some(&0));

        // Recovery clears the fault, so a later failure is news again.
        append(&flaky, &[assistant_line("m2", 10, Some("end_turn"))]);
        worker.read_pass(&flaky).await;
        assert!(matches!(rx.try_recv(), Ok(TailEvent::Usage(r)) if r.message_id == "m2"));
        assert!(worker.faults.is_empty());

        std::fs::remove_file(&flaky).unwrap();
        worker.read_pass(&flaky).await;
        assert!(matches!(rx.try_recv(), Ok(TailEvent::Error(TailError::Io { .. }))));
    }
}
