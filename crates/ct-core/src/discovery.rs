//! Log file discovery from a path pattern.

use std::path::{Path, PathBuf};

use glob::MatchOptions;

use crate::tailer::TailError;

/// `*` matches within one path segment only.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expands a leading `~` to the home directory.
pub fn expand_home(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return pattern.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => {
            tracing::warn!(pattern, "could not determine home directory; pattern left unexpanded");
            pattern.to_string()
        }
    }
}

/// Files matched by one expansion pass, plus the non-fatal faults hit along the way.
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub errors: Vec<TailError>,
}

/// Expands `pattern` to the regular files it matches, sorted.
///
/// Missing directories yield an empty list. Unreadable directories are
/// reported in [`Discovered::errors`] and skipped.
pub fn discover(pattern: &str) -> Result<Discovered, TailError> {
    let expanded = expand_home(pattern);
    let entries = glob::glob_with(&expanded, MATCH_OPTIONS).map_err(|source| {
        TailError::Pattern {
            pattern: expanded.clone(),
            source,
        }
    })?;

    let mut discovered = Discovered::default();
    for entry in entries {
        match entry {
            Ok(path) if is_regular_file(&path) => discovered.files.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                discovered.errors.push(TailError::Io {
                    path,
                    source: e.into_error(),
                });
            }
        }
    }
    discovered.files.sort();
    Ok(discovered)
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file())
}
