use regex::Regex;
use std::collections::HashMap;

use crate::types::{Commit, Revisions};

/// Tallies, per file path, how many commits touched it. Paths matching
/// any exclude pattern are ignored. Patterns are compiled at
/// configuration time — a bad pattern never reaches this function.
pub fn revision_counts(commits: &[Commit], exclude: &[Regex]) -> Revisions {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for commit in commits {
        for entry in &commit.file_entries {
            if exclude.iter().any(|re| re.is_match(&entry.file_name)) {
                continue;
            }
            *counts.entry(entry.file_name.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;

    fn make_commit(files: &[&str]) -> Commit {
        Commit {
            hash: "abc".to_string(),
            date: "2024-01-01".to_string(),
            author: "dev".to_string(),
            message: "change".to_string(),
            file_entries: files
                .iter()
                .map(|f| FileEntry {
                    file_name: f.to_string(),
                    added: 1,
                    removed: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_counts_commits_per_file() {
        let commits = vec![
            make_commit(&["a.rs", "b.rs"]),
            make_commit(&["a.rs"]),
            make_commit(&["a.rs", "c.rs"]),
        ];
        let counts = revision_counts(&commits, &[]);
        assert_eq!(counts["a.rs"], 3);
        assert_eq!(counts["b.rs"], 1);
        assert_eq!(counts["c.rs"], 1);
    }

    #[test]
    fn test_empty_history_yields_empty_counts() {
        let counts = revision_counts(&[], &[]);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_every_count_is_at_least_one() {
        let commits = vec![make_commit(&["a.rs"]), make_commit(&["b.rs"])];
        let counts = revision_counts(&commits, &[]);
        assert!(counts.values().all(|&c| c >= 1), "only touched files are keyed");
    }

    #[test]
    fn test_exclude_patterns_drop_matching_paths() {
        let commits = vec![make_commit(&["src/a.rs", "package.json", "docs/x.md"])];
        let exclude = vec![
            Regex::new(r"package.*json").expect("valid pattern"),
            Regex::new(r"\.md$").expect("valid pattern"),
        ];
        let counts = revision_counts(&commits, &exclude);
        assert_eq!(counts.len(), 1, "only src/a.rs should survive");
        assert_eq!(counts["src/a.rs"], 1);
    }
}
