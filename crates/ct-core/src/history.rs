//! One-shot historical reader.
//!
//! Reads every file a pattern matches from the start, in parallel, then runs
//! the frames through a fresh dedup buffer in a fixed order (sorted paths,
//! on-disk line order) so repeated imports produce the same records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::dedup::DedupBuffer;
use crate::discovery::discover;
use crate::parser::{ParsedFrame, parse_line};
use crate::pricing::PricingTable;
use crate::tailer::TailError;
use crate::usage::UsageRecord;

/// Result of a historical scan.
#[derive(Debug, Default)]
pub struct HistoryScan {
    /// Unique calls, sorted by timestamp.
    pub records: Vec<UsageRecord>,
    /// Files or directories that could not be read.
    pub issues: Vec<TailError>,
    pub files_scanned: usize,
}

/// Reads all usage in the files matching `pattern`.
///
/// Partials still pending at the end are flushed as best-effort records.
pub fn read_history(pattern: &str, pricing: &PricingTable) -> Result<HistoryScan, TailError> {
    read_history_many(&[pattern], pricing)
}

/// Like [`read_history`], but across several patterns sharing one dedup pass.
///
/// Files matched by more than one pattern are read once.
pub fn read_history_many(
    patterns: &[&str],
    pricing: &PricingTable,
) -> Result<HistoryScan, TailError> {
    let mut scan = HistoryScan::default();
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let discovered = discover(pattern)?;
        files.extend(discovered.files);
        scan.issues.extend(discovered.errors);
    }
    files.sort();
    files.dedup();
    scan.files_scanned = files.len();

    let parsed: Vec<(PathBuf, std::io::Result<Vec<ParsedFrame>>)> = files
        .into_par_iter()
        .map(|path| {
            let frames = read_frames(&path, pricing);
            (path, frames)
        })
        .collect();

    let mut dedup = DedupBuffer::new();
    for (path, frames) in parsed {
        match frames {
            Ok(frames) => {
                tracing::debug!(path = %path.display(), frames = frames.len(), "read log file");
                scan.records
                    .extend(frames.into_iter().filter_map(|frame| dedup.offer(frame)));
            }
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "skipping unreadable log");
                scan.issues.push(TailError::Io { path, source });
            }
        }
    }
    scan.records.extend(dedup.flush());
    scan.records.sort_by_key(|record| record.timestamp);

    tracing::info!(
        files = scan.files_scanned,
        records = scan.records.len(),
        issues = scan.issues.len(),
        "historical scan complete"
    );
    Ok(scan)
}

fn read_frames(path: &Path, pricing: &PricingTable) -> std::io::Result<Vec<ParsedFrame>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(frame) = parse_line(line, pricing) {
            frames.push(frame);
        }
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn assistant(id: &str, ts: &str, stop: Option<&str>, output: u64) -> String {
        let stop = stop.map_or_else(|| "null".to_string(), |s| format!("\"{s}\""));
        format!(
            r#"{{"type":"assistant","timestamp":"{ts}","gitBranch":"main","message":{{"id":"{id}","model":"claude-sonnet-4-6","stop_reason":{stop},"usage":{{"input_tokens":100,"output_tokens":{output}}}}}}}"#
        )
    }

    fn mirrored(id: &str, ts: &str) -> String {
        format!(
            r#"{{"type":"progress","timestamp":"{ts}","data":{{"message":{{"message":{{"id":"{id}","model":"claude-haiku-4-5","stop_reason":"end_turn","usage":{{"input_tokens":10,"output_tokens":5}}}}}}}}}}"#
        )
    }

    #[test]
    fn reads_and_dedups_across_files() {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("proj");
        fs::create_dir_all(project.join("sess/subagents")).unwrap();

        let main_log = [
            assistant("m1", "2026-01-29T10:00:00Z", None, 1),
            assistant("m1", "2026-01-29T10:00:01Z", Some("end_turn"), 50),
            mirrored("sub1", "2026-01-29T10:00:02Z"),
            assistant("m2", "2026-01-29T10:00:03Z", None, 7),
            String::new(),
            "not json".to_string(),
        ]
        .join("\n");
        fs::write(project.join("a.jsonl"), main_log).unwrap();

        let sub_log = format!(
            "{}\n",
            r#"{"type":"assistant","isSidechain":true,"timestamp":"2026-01-29T10:00:02Z","message":{"id":"sub1","model":"claude-haiku-4-5","stop_reason":"end_turn","usage":{"input_tokens":10,"output_tokens":5}}}"#
        );
        fs::write(project.join("sess/subagents/agent-1.jsonl"), sub_log).unwrap();

        let main_glob = format!("{}/*/*.jsonl", temp.path().display());
        let sub_glob = format!("{}/*/*/subagents/*.jsonl", temp.path().display());
        let scan = read_history_many(&[&main_glob, &sub_glob], &PricingTable::default()).unwrap();

        assert_eq!(scan.files_scanned, 2);
        assert!(scan.issues.is_empty());
        let ids: Vec<&str> = scan.records.iter().map(|r| r.message_id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "sub1", "m2"]);

        assert_eq!(scan.records[0].tokens.output, 50);
        assert!(!scan.records[0].is_partial);
        assert!(scan.records[1].is_background);
        assert!(scan.records[2].is_partial);
        assert_eq!(scan.records[2].tokens.output, 7);
    }

    #[test]
    fn repeated_scans_agree() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("p");
        fs::create_dir_all(&dir).unwrap();
        for (name, id) in [("x.jsonl", "a"), ("y.jsonl", "b"), ("z.jsonl", "a")] {
            fs::write(
                dir.join(name),
                assistant(id, "2026-01-29T10:00:00Z", Some("end_turn"), 3),
            )
            .unwrap();
        }

        let pattern = format!("{}/*/*.jsonl", temp.path().display());
        let first = read_history(&pattern, &PricingTable::default()).unwrap();
        let second = read_history(&pattern, &PricingTable::default()).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.records.len(), 2);
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let pattern = format!("{}/nope/*/*.jsonl", temp.path().display());
        let scan = read_history(&pattern, &PricingTable::default()).unwrap();
        assert_eq!(scan.files_scanned, 0);
        assert!(scan.records.is_empty());
    }

    #[test]
    fn invalid_pattern_errors() {
        let result = read_history("/tmp/[unclosed", &PricingTable::default());
        assert!(matches!(result, Err(TailError::Pattern { .. })));
    }
}
