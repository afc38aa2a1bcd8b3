//! Git branch resolution.
//!
//! Both lookups are infallible from the caller's side: any failure collapses
//! to [`BranchName::unknown`] so attribution never aborts on a VCS hiccup.
//!
//! Historical lookups read HEAD's reflog once and answer from that snapshot.
//! The snapshot is re-read only for timestamps after it was taken, and at most
//! once per [`REFLOG_REFRESH_MS`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use thiserror::Error;

use crate::types::{BranchName, UNKNOWN_BRANCH};

/// Minimum age of a reflog snapshot before a newer lookup re-reads it.
pub const REFLOG_REFRESH_MS: i64 = 5_000;

#[derive(Debug, Error)]
pub enum BranchError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },
    #[error("HEAD is detached")]
    Detached,
}

/// Resolves the branch that work should be attributed to.
pub trait BranchResolver {
    /// The branch checked out right now.
    fn current_branch(&self) -> BranchName;

    /// The branch that was checked out at `timestamp_ms`.
    fn branch_at_time(&self, timestamp_ms: i64) -> BranchName;
}

/// Resolves branches by shelling out to `git` in a working directory.
#[derive(Debug)]
pub struct GitBranchResolver {
    repo_dir: PathBuf,
    snapshot: SnapshotCache,
}

impl GitBranchResolver {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            snapshot: SnapshotCache::default(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn git(&self, args: &[&str]) -> Result<String, BranchError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()?;
        if !output.status.success() {
            return Err(BranchError::Git {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn try_current_branch(&self) -> Result<String, BranchError> {
        let name = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = name.trim();
        if is_detached(name) {
            return Err(BranchError::Detached);
        }
        Ok(name.to_string())
    }

    pub fn try_reflog_history(&self) -> Result<ReflogHistory, BranchError> {
        let reflog = self.git(&[
            "reflog",
            "show",
            "--date=unix",
            "--format=%gd%x09%gs",
            "HEAD",
        ])?;
        Ok(ReflogHistory::parse(&reflog))
    }

    fn load_snapshot(&self) -> Snapshot {
        let read_at_ms = Utc::now().timestamp_millis();
        let (history, current) = match self.try_reflog_history() {
            Ok(history) if history.is_empty() => (history, self.current_branch()),
            Ok(history) => (history, BranchName::unknown()),
            Err(e) => {
                tracing::debug!(dir = %self.repo_dir.display(), error = %e, "historical branch unknown");
                (ReflogHistory::default(), BranchName::unknown())
            }
        };
        tracing::debug!(checkouts = history.len(), "reflog snapshot loaded");
        Snapshot {
            history,
            current,
            read_at_ms,
        }
    }
}

impl BranchResolver for GitBranchResolver {
    fn current_branch(&self) -> BranchName {
        match self.try_current_branch() {
            Ok(name) => BranchName::or_unknown(Some(&name)),
            Err(e) => {
                tracing::debug!(dir = %self.repo_dir.display(), error = %e, "current branch unknown");
                BranchName::unknown()
            }
        }
    }

    fn branch_at_time(&self, timestamp_ms: i64) -> BranchName {
        let now_ms = Utc::now().timestamp_millis();
        self.snapshot
            .resolve(timestamp_ms, now_ms, || self.load_snapshot())
    }
}

/// HEAD history as of `read_at_ms`. `current` answers when there are no
/// checkouts to go by.
#[derive(Debug)]
struct Snapshot {
    history: ReflogHistory,
    current: BranchName,
    read_at_ms: i64,
}

impl Snapshot {
    fn branch_at(&self, timestamp_ms: i64) -> BranchName {
        self.history
            .branch_at(timestamp_ms)
            .map_or_else(|| self.current.clone(), |name| BranchName::or_unknown(Some(name)))
    }
}

#[derive(Debug, Default)]
struct SnapshotCache(Mutex<Option<Snapshot>>);

impl SnapshotCache {
    fn resolve(
        &self,
        timestamp_ms: i64,
        now_ms: i64,
        load: impl FnOnce() -> Snapshot,
    ) -> BranchName {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = slot.as_ref().is_some_and(|snapshot| {
            timestamp_ms > snapshot.read_at_ms && now_ms - snapshot.read_at_ms >= REFLOG_REFRESH_MS
        });
        if stale {
            *slot = None;
        }
        slot.get_or_insert_with(load).branch_at(timestamp_ms)
    }
}

/// A resolver that always answers with the same branch. Useful in tests and
/// when attribution is pinned by the caller.
#[derive(Debug, Clone)]
pub struct FixedBranch(pub BranchName);

impl BranchResolver for FixedBranch {
    fn current_branch(&self) -> BranchName {
        self.0.clone()
    }

    fn branch_at_time(&self, _timestamp_ms: i64) -> BranchName {
        self.0.clone()
    }
}

fn is_detached(name: &str) -> bool {
    name == "HEAD" || (name.len() == 40 && name.chars().all(|c| c.is_ascii_hexdigit()))
}

/// One `checkout: moving from A to B` reflog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Checkout {
    at_ms: i64,
    from: String,
    to: String,
}

fn parse_checkout(line: &str) -> Option<Checkout> {
    let (selector, subject) = line.split_once('\t')?;
    let seconds: i64 = selector
        .rsplit_once("@{")?
        .1
        .strip_suffix('}')?
        .parse()
        .ok()?;
    let (from, to) = subject
        .strip_prefix("checkout: moving from ")?
        .split_once(" to ")?;
    Some(Checkout {
        at_ms: seconds.saturating_mul(1000),
        from: from.trim().to_string(),
        to: to.trim().to_string(),
    })
}

/// Checkout entries parsed from HEAD reflog output (`%gd\t%gs` with
/// `--date=unix`), oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflogHistory {
    checkouts: Vec<Checkout>,
}

impl ReflogHistory {
    pub fn parse(reflog: &str) -> Self {
        let mut checkouts: Vec<Checkout> = reflog.lines().filter_map(parse_checkout).collect();
        checkouts.sort_by_key(|c| c.at_ms);
        Self { checkouts }
    }

    pub fn len(&self) -> usize {
        self.checkouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkouts.is_empty()
    }

    /// The branch checked out at `timestamp_ms`.
    ///
    /// Returns `None` when there are no checkout entries, leaving the choice
    /// of fallback to the caller. Detached checkouts resolve to `unknown`.
    pub fn branch_at(&self, timestamp_ms: i64) -> Option<&str> {
        let oldest = self.checkouts.first()?;
        let after = self.checkouts.partition_point(|c| c.at_ms <= timestamp_ms);
        let name = match after.checked_sub(1) {
            Some(i) => self.checkouts[i].to.as_str(),
            None => oldest.from.as_str(),
        };
        Some(if is_detached(name) { UNKNOWN_BRANCH } else { name })
    }
}

/// One-shot form of [`ReflogHistory::branch_at`].
pub fn branch_from_reflog(reflog: &str, timestamp_ms: i64) -> Option<String> {
    ReflogHistory::parse(reflog)
        .branch_at(timestamp_ms)
        .map(str::to_string)
}
