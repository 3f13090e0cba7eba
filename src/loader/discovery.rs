//! Comparison group discovery.
//!
//! Finds `latency_<tag>[_<size>]` files in an input directory and pairs
//! the baseline and variant files that share a size suffix.

use crate::config::GroupSpec;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const FILE_PREFIX: &str = "latency";

/// Which side of a comparison a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Baseline,
    Variant,
}

/// Splits `latency_<tag>[_<size>]` into its size suffix, if `name`
/// belongs to `tag`. The unsuffixed form yields `Some(None)`.
fn match_tag<'a>(name: &'a str, tag: &str) -> Option<Option<&'a str>> {
    let rest = name.strip_prefix(FILE_PREFIX)?.strip_prefix('_')?;
    let rest = rest.strip_prefix(tag)?;

    if rest.is_empty() {
        Some(None)
    } else {
        rest.strip_prefix('_')
            .filter(|size| !size.is_empty())
            .map(Some)
    }
}

/// Parses size suffixes such as `512B`, `1KB` or `10MB` into bytes.
pub fn size_in_bytes(size: &str) -> Option<u64> {
    let upper = size.to_ascii_uppercase();
    let digits_end = upper
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(upper.len());
    let (digits, unit) = upper.split_at(digits_end);
    let value: u64 = digits.parse().ok()?;

    let multiplier = match unit {
        "" | "B" => 1,
        "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        _ => return None,
    };
    value.checked_mul(multiplier)
}

/// Output prefix for a size suffix.
fn group_prefix(size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{}_{}", FILE_PREFIX, size),
        None => FILE_PREFIX.to_string(),
    }
}

/// Scans `input_dir` (non-recursively) and builds one group per size.
///
/// A group is produced as soon as either side has a file; the missing
/// side is reported later by the loader. Group paths are relative to
/// `input_dir`.
pub fn discover_groups(
    input_dir: &Path,
    baseline_tag: &str,
    variant_tag: &str,
) -> Result<Vec<GroupSpec>> {
    if !input_dir.is_dir() {
        bail!("Input directory does not exist: {}", input_dir.display());
    }

    let mut found: BTreeMap<Option<String>, (Option<PathBuf>, Option<PathBuf>)> = BTreeMap::new();

    let entries = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        });

    for entry in entries {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        // Longer tag first, so "ssh_v2" is not read as "ssh" with a "v2_..." size
        let mut tags = [(Side::Baseline, baseline_tag), (Side::Variant, variant_tag)];
        tags.sort_by_key(|(_, tag)| std::cmp::Reverse(tag.len()));

        let Some((side, size)) = tags
            .iter()
            .find_map(|(side, tag)| match_tag(&name, tag).map(|size| (*side, size)))
        else {
            continue;
        };

        let slot = found.entry(size.map(str::to_string)).or_default();
        match side {
            Side::Baseline => slot.0 = Some(PathBuf::from(&name)),
            Side::Variant => slot.1 = Some(PathBuf::from(&name)),
        }
    }

    let mut groups: Vec<(Option<String>, GroupSpec)> = found
        .into_iter()
        .map(|(size, (baseline, variant))| {
            let prefix = group_prefix(size.as_deref());
            let baseline =
                baseline.unwrap_or_else(|| conventional_name(baseline_tag, size.as_deref()));
            let variant =
                variant.unwrap_or_else(|| conventional_name(variant_tag, size.as_deref()));
            (
                size,
                GroupSpec {
                    prefix,
                    baseline,
                    variant,
                    clamp: None,
                },
            )
        })
        .collect();

    groups.sort_by(|(a, _), (b, _)| {
        let key = |s: &Option<String>| match s {
            None => (0, 0, String::new()),
            Some(size) => match size_in_bytes(size) {
                Some(bytes) => (1, bytes, size.clone()),
                None => (2, 0, size.clone()),
            },
        };
        key(a).cmp(&key(b))
    });

    debug!("Discovered {} comparison groups", groups.len());
    Ok(groups.into_iter().map(|(_, group)| group).collect())
}

/// `latency_<tag>[_<size>]`
fn conventional_name(tag: &str, size: Option<&str>) -> PathBuf {
    match size {
        Some(size) => PathBuf::from(format!("{}_{}_{}", FILE_PREFIX, tag, size)),
        None => PathBuf::from(format!("{}_{}", FILE_PREFIX, tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        std::fs::write(dir.path().join(name), "1.0\n").unwrap();
    }

    #[test]
    fn test_match_tag() {
        assert_eq!(match_tag("latency_ssh_1KB", "ssh"), Some(Some("1KB")));
        assert_eq!(match_tag("latency_ssh", "ssh"), Some(None));
        assert_eq!(match_tag("latency_quicssh_5MB", "ssh"), None);
        assert_eq!(match_tag("latency_quicssh_5MB", "quicssh"), Some(Some("5MB")));
        assert_eq!(match_tag("latency_ssh_", "ssh"), None);
        assert_eq!(match_tag("latency_sshx", "ssh"), None);
        assert_eq!(match_tag("notes.txt", "ssh"), None);
    }

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(size_in_bytes("512B"), Some(512));
        assert_eq!(size_in_bytes("1KB"), Some(1024));
        assert_eq!(size_in_bytes("10MB"), Some(10 * 1024 * 1024));
        assert_eq!(size_in_bytes("2gb"), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(size_in_bytes("large"), None);
    }

    #[test]
    fn test_discover_pairs_and_orders_by_size() {
        let dir = TempDir::new().unwrap();
        for name in [
            "latency_ssh_10MB",
            "latency_quicssh_10MB",
            "latency_ssh_1KB",
            "latency_quicssh_1KB",
            "latency_quicssh_1MB",
            "latency_ssh",
            "latency_quicssh",
            "README.md",
        ] {
            touch(&dir, name);
        }

        let groups = discover_groups(dir.path(), "ssh", "quicssh").unwrap();
        let prefixes: Vec<_> = groups.iter().map(|g| g.prefix.as_str()).collect();
        assert_eq!(
            prefixes,
            vec!["latency", "latency_1KB", "latency_1MB", "latency_10MB"]
        );

        // Missing baseline still gets its conventional name
        let one_mb = &groups[2];
        assert_eq!(one_mb.baseline, PathBuf::from("latency_ssh_1MB"));
        assert_eq!(one_mb.variant, PathBuf::from("latency_quicssh_1MB"));
        assert!(one_mb.clamp.is_none());
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover_groups(&dir.path().join("nope"), "ssh", "quicssh").is_err());
    }
}
