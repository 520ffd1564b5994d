use std::collections::HashMap;

use crate::types::{AuthorShare, Commit, FileOwnership, OwnershipEntry};

/// Per-file commit shares by author. Each entry carries the author's
/// absolute commit count for the file and its fraction of the file's
/// total, so every file's percentages sum to 1. Sorted by commit count
/// descending, author name ascending on ties.
pub fn file_ownership(commits: &[Commit]) -> FileOwnership {
    let mut per_file: HashMap<String, HashMap<String, usize>> = HashMap::new();

    for commit in commits {
        for entry in &commit.file_entries {
            *per_file
                .entry(entry.file_name.clone())
                .or_default()
                .entry(commit.author.clone())
                .or_insert(0) += 1;
        }
    }

    per_file
        .into_iter()
        .map(|(file, authors)| {
            let total: usize = authors.values().sum();
            let mut entries: Vec<OwnershipEntry> = authors
                .into_iter()
                .map(|(name, commits)| OwnershipEntry {
                    percentage: commits as f64 / total as f64,
                    name,
                    commits,
                })
                .collect();
            entries.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
            (file, entries)
        })
        .collect()
}

/// Each author's share of total ownership weight across the whole
/// repository: the sum of their per-file percentages over every file
/// they touch, divided by the total number of distinct files — not by
/// the number of files that author touched. A file fully owned by one
/// author contributes 1.0 to that author's sum. Sorted descending.
pub fn ownership_distribution(ownership: &FileOwnership) -> Vec<AuthorShare> {
    let total_files = ownership.len();
    if total_files == 0 {
        return Vec::new();
    }

    let mut sums: HashMap<&str, f64> = HashMap::new();
    for entries in ownership.values() {
        for entry in entries {
            *sums.entry(entry.name.as_str()).or_insert(0.0) += entry.percentage;
        }
    }

    let mut shares: Vec<AuthorShare> = sums
        .into_iter()
        .map(|(name, sum)| AuthorShare {
            name: name.to_string(),
            percentage: sum / total_files as f64,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    shares
}

/// The smallest prefix of top contributors whose combined ownership
/// share reaches half the codebase. The input is already sorted
/// descending, so a greedy prefix sum is exact. The truck factor is the
/// length of the returned prefix.
pub fn truck_factor(distribution: &[AuthorShare]) -> Vec<AuthorShare> {
    let mut result = Vec::new();
    let mut cumulative = 0.0;
    for share in distribution {
        if cumulative >= 0.5 {
            break;
        }
        cumulative += share.percentage;
        result.push(share.clone());
    }
    result
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;

    fn make_commit(author: &str, files: &[&str]) -> Commit {
        Commit {
            hash: "123".to_string(),
            date: "2021-01-01".to_string(),
            author: author.to_string(),
            message: "commit message".to_string(),
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
    fn test_file_ownership_shares() {
        let commits = vec![
            make_commit("Alice", &["file1"]),
            make_commit("Bob", &["file1"]),
            make_commit("Bob", &["file1"]),
        ];
        let ownership = file_ownership(&commits);
        assert_eq!(
            ownership["file1"],
            vec![
                OwnershipEntry {
                    name: "Bob".to_string(),
                    commits: 2,
                    percentage: 2.0 / 3.0,
                },
                OwnershipEntry {
                    name: "Alice".to_string(),
                    commits: 1,
                    percentage: 1.0 / 3.0,
                },
            ],
            "top committer first, fractions of the file total"
        );
    }

    #[test]
    fn test_per_file_percentages_sum_to_one() {
        let commits = vec![
            make_commit("Alice", &["a", "b"]),
            make_commit("Bob", &["a"]),
            make_commit("Carol", &["a", "b"]),
            make_commit("Alice", &["b"]),
        ];
        for (file, entries) in file_ownership(&commits) {
            let total: f64 = entries.iter().map(|e| e.percentage).sum();
            assert!(
                (total - 1.0).abs() < 1e-9,
                "percentages for {file} sum to {total}, expected 1.0"
            );
        }
    }

    #[test]
    fn test_distribution_divides_by_total_file_count() {
        let mut ownership = FileOwnership::new();
        ownership.insert(
            "file-1".to_string(),
            vec![
                OwnershipEntry { name: "Bob".to_string(), commits: 1, percentage: 0.5 },
                OwnershipEntry { name: "Alice".to_string(), commits: 1, percentage: 0.5 },
            ],
        );
        ownership.insert(
            "file-2".to_string(),
            vec![OwnershipEntry { name: "Alice".to_string(), commits: 1, percentage: 1.0 }],
        );
        let distribution = ownership_distribution(&ownership);
        assert_eq!(
            distribution,
            vec![
                AuthorShare { name: "Alice".to_string(), percentage: 0.75 },
                AuthorShare { name: "Bob".to_string(), percentage: 0.25 },
            ],
            "Alice holds (0.5 + 1.0) / 2 files, Bob 0.5 / 2"
        );
    }

    #[test]
    fn test_distribution_of_empty_ownership_is_empty() {
        assert!(ownership_distribution(&FileOwnership::new()).is_empty());
    }

    #[test]
    fn test_truck_factor_stops_at_half_coverage() {
        let distribution = vec![
            AuthorShare { name: "Bob".to_string(), percentage: 0.3 },
            AuthorShare { name: "Alice".to_string(), percentage: 0.3 },
            AuthorShare { name: "Charlie".to_string(), percentage: 0.2 },
            AuthorShare { name: "David".to_string(), percentage: 0.2 },
        ];
        let result = truck_factor(&distribution);
        assert_eq!(result.len(), 2, "Bob + Alice reach 0.6 ≥ 0.5");
        assert_eq!(result[0].name, "Bob");
        assert_eq!(result[1].name, "Alice");
    }

    #[test]
    fn test_truck_factor_cutoff_is_tight() {
        let distribution = vec![
            AuthorShare { name: "a".to_string(), percentage: 0.26 },
            AuthorShare { name: "b".to_string(), percentage: 0.25 },
            AuthorShare { name: "c".to_string(), percentage: 0.25 },
            AuthorShare { name: "d".to_string(), percentage: 0.24 },
        ];
        let result = truck_factor(&distribution);
        let without_last: f64 = result[..result.len() - 1]
            .iter()
            .map(|s| s.percentage)
            .sum();
        let with_last: f64 = result.iter().map(|s| s.percentage).sum();
        assert!(without_last < 0.5, "dropping the last entry falls below half");
        assert!(with_last >= 0.5, "the full prefix reaches half");
    }

    #[test]
    fn test_truck_factor_exhausts_gracefully() {
        // Shares that never reach 0.5 — the whole list is the answer.
        let distribution = vec![
            AuthorShare { name: "a".to_string(), percentage: 0.2 },
            AuthorShare { name: "b".to_string(), percentage: 0.1 },
        ];
        let result = truck_factor(&distribution);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_single_author_repository() {
        let commits = vec![
            make_commit("Solo", &["a", "b", "c"]),
            make_commit("Solo", &["a"]),
        ];
        let distribution = ownership_distribution(&file_ownership(&commits));
        assert_eq!(distribution.len(), 1);
        assert!((distribution[0].percentage - 1.0).abs() < 1e-9);
        assert_eq!(truck_factor(&distribution).len(), 1);
    }
}
