//! Line-delimited sample file reader.
//!
//! A sample file holds one floating-point literal per line. Blank lines
//! are ignored. Nothing in here returns an error to the caller: every
//! problem becomes a [`LoadIssue`] that is logged and handed back next to
//! whatever samples survived.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// What to do with a line that is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Discard the whole file on the first malformed line.
    #[default]
    AllOrNothing,
    /// Report and drop only the malformed lines.
    SkipInvalid,
}

impl std::fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsePolicy::AllOrNothing => write!(f, "all-or-nothing"),
            ParsePolicy::SkipInvalid => write!(f, "skip-invalid"),
        }
    }
}

/// A problem found while loading a sample file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadIssue {
    #[error("input file {} not found", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("line {line}: cannot convert {content:?} to a number")]
    Malformed { line: usize, content: String },
}

/// Samples read from one file, plus every issue that was reported.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub samples: Vec<f64>,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    fn failed(issue: LoadIssue) -> Self {
        Self {
            samples: Vec::new(),
            issues: vec![issue],
        }
    }
}

/// Parses one trimmed, non-blank line.
///
/// `line` is the 1-based line number, used only for the diagnostic.
pub fn parse_line(line: usize, text: &str) -> Result<f64, LoadIssue> {
    text.parse::<f64>().map_err(|_| LoadIssue::Malformed {
        line,
        content: text.to_string(),
    })
}

/// Parses file content into samples according to `policy`.
pub fn parse_samples(content: &str, policy: ParsePolicy) -> LoadReport {
    let mut report = LoadReport::default();

    for (idx, raw) in content.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        match parse_line(idx + 1, text) {
            Ok(value) => report.samples.push(value),
            Err(issue) => match policy {
                ParsePolicy::AllOrNothing => return LoadReport::failed(issue),
                ParsePolicy::SkipInvalid => report.issues.push(issue),
            },
        }
    }

    report
}

/// Loads the samples stored in `path`.
///
/// Missing or unreadable files yield an empty sequence. Each issue is
/// logged exactly once.
pub fn load_samples(path: &Path, policy: ParsePolicy) -> LoadReport {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let issue = LoadIssue::Missing {
                path: path.to_path_buf(),
            };
            warn!("{}", issue);
            return LoadReport::failed(issue);
        }
        Err(e) => {
            let issue = LoadIssue::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            warn!("{}", issue);
            return LoadReport::failed(issue);
        }
    };

    let report = parse_samples(&content, policy);
    for issue in &report.issues {
        warn!("{}: {}", path.display(), issue);
    }
    if policy == ParsePolicy::AllOrNothing && !report.issues.is_empty() {
        warn!("{}: discarding all samples from this file", path.display());
    }

    debug!("Loaded {} samples from {}", report.samples.len(), path.display());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(1, "1.5"), Ok(1.5));
        assert_eq!(parse_line(1, "-2"), Ok(-2.0));
        assert_eq!(parse_line(1, "1e3"), Ok(1000.0));
        assert_eq!(
            parse_line(7, "abc"),
            Err(LoadIssue::Malformed {
                line: 7,
                content: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let report = parse_samples("3.5\n1.25\n\n   \n2.0\n", ParsePolicy::AllOrNothing);
        assert_eq!(report.samples, vec![3.5, 1.25, 2.0]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_parse_trims_whitespace_and_crlf() {
        let report = parse_samples("  10.0  \r\n\t20.5\r\n", ParsePolicy::AllOrNothing);
        assert_eq!(report.samples, vec![10.0, 20.5]);
    }

    #[test]
    fn test_all_or_nothing_discards_file() {
        let report = parse_samples("1.0\n2.0\noops\n4.0\n", ParsePolicy::AllOrNothing);
        assert!(report.samples.is_empty());
        assert_eq!(
            report.issues,
            vec![LoadIssue::Malformed {
                line: 3,
                content: "oops".to_string()
            }]
        );
    }

    #[test]
    fn test_skip_invalid_drops_only_bad_lines() {
        let report = parse_samples("1.0\nbad\n2.0\n3,5\n4.0\n", ParsePolicy::SkipInvalid);
        assert_eq!(report.samples, vec![1.0, 2.0, 4.0]);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[1].to_string().contains("3,5"));
    }

    #[test]
    fn test_load_n_valid_lines() {
        let dir = TempDir::new().unwrap();
        let content: String = (0..50).map(|i| format!("{}.5\n", i)).collect();
        let path = write_file(&dir, "latency_ssh", &content);

        let report = load_samples(&path, ParsePolicy::AllOrNothing);
        assert_eq!(report.samples.len(), 50);
        assert_eq!(report.samples[0], 0.5);
        assert_eq!(report.samples[49], 49.5);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latency_ssh_1MB");

        let report = load_samples(&path, ParsePolicy::AllOrNothing);
        assert!(report.samples.is_empty());
        // load_samples emits one warn! per returned issue, so one issue is one diagnostic
        assert_eq!(report.issues, vec![LoadIssue::Missing { path }]);
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "latency_quicssh", "12.0\n13.0\nN/A\n");

        let report = load_samples(&path, ParsePolicy::AllOrNothing);
        assert!(report.samples.is_empty());
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].to_string().contains("N/A"));
    }

    #[test]
    fn test_load_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();

        let report = load_samples(dir.path(), ParsePolicy::SkipInvalid);
        assert!(report.samples.is_empty());
        assert!(matches!(report.issues[..], [LoadIssue::Unreadable { .. }]));
    }
}
