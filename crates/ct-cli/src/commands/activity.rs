//! Activity command: appends one engagement event to the activity log.
//!
//! Editor and shell hooks call this on every interaction, so the write path
//! stays small: take an exclusive lock, append one JSON line, release.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use ct_core::{ActivityEvent, ActivityKind, BranchName, BranchResolver};
use fs2::FileExt;

/// Builds an event, resolving the branch through `resolver` when none is given.
pub fn build_event(
    kind: ActivityKind,
    branch: Option<&str>,
    at_ms: Option<i64>,
    resolver: &dyn BranchResolver,
) -> Result<ActivityEvent> {
    let timestamp_ms = at_ms.unwrap_or_else(|| Utc::now().timestamp_millis());
    let branch = match branch {
        Some(name) => BranchName::new(name).context("invalid branch name")?,
        None => resolver.current_branch(),
    };
    Ok(ActivityEvent::new(kind, timestamp_ms, branch))
}

/// Appends an event to the activity log under an exclusive lock.
pub fn append_event(events_path: &Path, event: &ActivityEvent) -> Result<()> {
    if let Some(parent) = events_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(events_path)
        .with_context(|| format!("failed to open {}", events_path.display()))?;
    FileExt::lock_exclusive(&file).context("failed to lock activity log")?;

    let json = serde_json::to_string(event).context("failed to serialize event")?;
    let written = writeln!(file, "{json}").context("failed to write event");
    FileExt::unlock(&file).context("failed to unlock activity log")?;
    written
}

/// Reads every event in the activity log, oldest first.
///
/// Lines that fail to parse are skipped with a warning. A missing file is an
/// empty log.
pub fn read_events(events_path: &Path) -> Result<Vec<ActivityEvent>> {
    let file = match File::open(events_path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to open {}", events_path.display()));
        }
    };
    FileExt::lock_shared(&file).context("failed to lock activity log")?;

    let mut events = Vec::new();
    for (idx, line) in BufReader::new(&file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<ActivityEvent>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!(line = idx + 1, error = %e, "skipping invalid activity event"),
        }
    }
    FileExt::unlock(&file).context("failed to unlock activity log")?;

    events.sort_by_key(|event| event.timestamp_ms);
    Ok(events)
}

/// Runs the activity command.
pub fn run(
    events_path: &Path,
    kind: ActivityKind,
    branch: Option<&str>,
    at_ms: Option<i64>,
    resolver: &dyn BranchResolver,
) -> Result<ActivityEvent> {
    let event = build_event(kind, branch, at_ms, resolver)?;
    append_event(events_path, &event)?;
    tracing::debug!(kind = %event.kind, branch = %event.branch, ts = event.timestamp_ms, "recorded activity");
    Ok(event)
}
