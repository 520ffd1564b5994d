use std::collections::{HashMap, HashSet};

use crate::types::{Commit, CoupledFile, CoupledPair, CouplingItem, Soc};

/// Finds every pair of files that changed together in at least one
/// commit.
///
/// For each pair, `revisions` is the number of commits touching either
/// file and `percentage` the fraction of those touching both — Jaccard
/// similarity over commit-index sets. Using the set union (rather than
/// the sum of the two files' counts) keeps commits where the files
/// already co-occur from being counted twice.
///
/// No significance filtering happens here; see
/// [`significant_coupled_pairs`].
pub fn coupled_pairs(commits: &[Commit]) -> Vec<CoupledPair> {
    let mut both: HashMap<(String, String), usize> = HashMap::new();
    let mut touched: HashMap<String, HashSet<usize>> = HashMap::new();

    for (index, commit) in commits.iter().enumerate() {
        // Distinct paths only — a commit listing a file twice is one change.
        let mut files: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &commit.file_entries {
            if seen.insert(entry.file_name.as_str()) {
                files.push(entry.file_name.as_str());
            }
        }

        for file in &files {
            touched.entry((*file).to_string()).or_default().insert(index);
        }
        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                *both.entry(pair_key(files[i], files[j])).or_default() += 1;
            }
        }
    }

    let mut pairs: Vec<CoupledPair> = both
        .into_iter()
        .map(|((file1, file2), both_count)| {
            let set1 = touched.get(&file1).map_or(0, HashSet::len);
            let set2 = touched.get(&file2).map_or(0, HashSet::len);
            // |A ∪ B| = |A| + |B| − |A ∩ B|; both_count is the intersection,
            // one increment per commit containing the pair.
            let union = set1 + set2 - both_count;
            CoupledPair {
                percentage: both_count as f64 / union as f64,
                revisions: union,
                file1,
                file2,
            }
        })
        .collect();

    // Hash order is arbitrary; pin the output order so runs are comparable.
    pairs.sort_by(|a, b| a.file1.cmp(&b.file1).then_with(|| a.file2.cmp(&b.file2)));
    pairs
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Keeps the pairs worth reporting: coupling strength at or above
/// `min_coupling_percentage` AND a revision count at or above the
/// `revisions_percentile`-th percentile of all pairs' revision counts.
/// Both axes are required — a pair that is strongly coupled but rarely
/// co-changed is noise, and so is a frequently-changed weakly-coupled
/// one.
pub fn significant_coupled_pairs(
    pairs: &[CoupledPair],
    revisions_percentile: f64,
    min_coupling_percentage: f64,
) -> Vec<CoupledPair> {
    let mut revision_counts: Vec<usize> = pairs.iter().map(|p| p.revisions).collect();
    revision_counts.sort_unstable();
    let idx = (revision_counts.len() as f64 * revisions_percentile).floor() as usize;
    let threshold = revision_counts.get(idx).copied().unwrap_or(0);

    pairs
        .iter()
        .filter(|p| p.percentage >= min_coupling_percentage && p.revisions >= threshold)
        .cloned()
        .collect()
}

/// Display ordering for coupled pairs: the product of min-max
/// normalized percentage and revisions, descending. Pairs strong on
/// both axes rank above pairs extreme on one axis only. Stable on
/// ties and non-mutating.
pub fn sort_coupled_pairs(pairs: &[CoupledPair]) -> Vec<CoupledPair> {
    let (min_pct, max_pct) = min_max(pairs.iter().map(|p| p.percentage));
    let (min_rev, max_rev) = min_max(pairs.iter().map(|p| p.revisions as f64));

    let norm = |value: f64, min: f64, max: f64| {
        if max > min {
            (value - min) / (max - min)
        } else {
            0.0
        }
    };
    let score = |p: &CoupledPair| {
        norm(p.percentage, min_pct, max_pct) * norm(p.revisions as f64, min_rev, max_rev)
    };

    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}

/// Joins each SOC entry with the pairs it participates in, yielding the
/// per-file coupling overview used by the report.
pub fn coupling_overview(pairs: &[CoupledPair], socs: &[Soc]) -> Vec<CouplingItem> {
    socs.iter()
        .map(|entry| CouplingItem {
            file: entry.file.clone(),
            soc: entry.soc,
            coupled_files: pairs
                .iter()
                .filter(|p| p.file1 == entry.file || p.file2 == entry.file)
                .map(|p| CoupledFile {
                    file: if p.file1 == entry.file {
                        p.file2.clone()
                    } else {
                        p.file1.clone()
                    },
                    percentage: p.percentage,
                    revisions: p.revisions,
                })
                .collect(),
        })
        .collect()
}

/// Number of unshared path segments between two files once their common
/// directory prefix is removed. Identical paths score 0; siblings score 2.
pub fn file_proximity(file1: &str, file2: &str) -> usize {
    let a: Vec<&str> = file1.split('/').collect();
    let b: Vec<&str> = file2.split('/').collect();
    let common = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    (a.len() - common) + (b.len() - common)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

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
                    removed: 1,
                })
                .collect(),
        }
    }

    fn find_pair<'a>(pairs: &'a [CoupledPair], a: &str, b: &str) -> Option<&'a CoupledPair> {
        pairs.iter().find(|p| {
            (p.file1 == a && p.file2 == b) || (p.file1 == b && p.file2 == a)
        })
    }

    #[test]
    fn test_single_file_commits_produce_no_pairs() {
        let commits = vec![make_commit(&["file.txt"])];
        assert!(coupled_pairs(&commits).is_empty());
    }

    #[test]
    fn test_finds_a_pair() {
        let commits = vec![make_commit(&["file.txt", "file2.txt"])];
        let result = coupled_pairs(&commits);
        assert_eq!(result.len(), 1);
        let pair = &result[0];
        assert!((pair.percentage - 1.0).abs() < f64::EPSILON);
        assert_eq!(pair.revisions, 1);
    }

    #[test]
    fn test_pair_is_symmetric_in_listing_order() {
        let commits = vec![
            make_commit(&["file.txt", "file2.txt"]),
            make_commit(&["file2.txt", "file.txt"]),
        ];
        let result = coupled_pairs(&commits);
        assert_eq!(result.len(), 1, "(A,B) and (B,A) are the same pair");
        assert!((result[0].percentage - 1.0).abs() < f64::EPSILON);
        assert_eq!(result[0].revisions, 2);
    }

    #[test]
    fn test_three_files_in_one_commit_yield_three_pairs() {
        let commits = vec![make_commit(&["a.txt", "b.txt", "c.txt"])];
        let result = coupled_pairs(&commits);
        assert_eq!(result.len(), 3);
        for pair in &result {
            assert!((pair.percentage - 1.0).abs() < f64::EPSILON);
            assert_eq!(pair.revisions, 1);
        }
    }

    #[test]
    fn test_percentage_is_both_over_either() {
        // One solo commit of a.txt, one shared commit: 1 of 2 commits
        // touching either file touched both.
        let commits = vec![
            make_commit(&["a.txt"]),
            make_commit(&["a.txt", "b.txt"]),
        ];
        let result = coupled_pairs(&commits);
        assert_eq!(result.len(), 1);
        assert!((result[0].percentage - 0.5).abs() < f64::EPSILON);
        assert_eq!(result[0].revisions, 2);
    }

    #[test]
    fn test_union_counting_across_many_commits() {
        let mut commits = Vec::new();
        // 5 solo commits of A, 10 of B, 4 of C
        for _ in 0..5 {
            commits.push(make_commit(&["fileA.txt"]));
        }
        for _ in 0..10 {
            commits.push(make_commit(&["fileB.txt"]));
        }
        for _ in 0..4 {
            commits.push(make_commit(&["fileC.txt"]));
        }
        // 5 commits with A and B, 3 with A and C
        for _ in 0..5 {
            commits.push(make_commit(&["fileA.txt", "fileB.txt"]));
        }
        for _ in 0..3 {
            commits.push(make_commit(&["fileA.txt", "fileC.txt"]));
        }

        let result = coupled_pairs(&commits);

        let ab = find_pair(&result, "fileA.txt", "fileB.txt").expect("A-B pair exists");
        assert_eq!(ab.revisions, 23, "5 + 10 + 5 + 3 commits touch A or B");
        assert!((ab.percentage - 5.0 / 23.0).abs() < f64::EPSILON);

        let ac = find_pair(&result, "fileA.txt", "fileC.txt").expect("A-C pair exists");
        assert_eq!(ac.revisions, 17, "5 + 4 + 5 + 3 commits touch A or C");
        assert!((ac.percentage - 3.0 / 17.0).abs() < f64::EPSILON);

        assert!(
            find_pair(&result, "fileB.txt", "fileC.txt").is_none(),
            "B and C never changed together"
        );
    }

    #[test]
    fn test_percentage_stays_within_bounds() {
        let commits = vec![
            make_commit(&["a", "b", "c"]),
            make_commit(&["a", "b"]),
            make_commit(&["b"]),
            make_commit(&["c", "a"]),
        ];
        for pair in coupled_pairs(&commits) {
            assert!(
                pair.percentage >= 0.0 && pair.percentage <= 1.0,
                "percentage {} out of bounds for {}-{}",
                pair.percentage,
                pair.file1,
                pair.file2
            );
            let implied_both = (pair.percentage * pair.revisions as f64).round() as usize;
            assert!(
                pair.revisions >= implied_both,
                "revisions must cover the implied both-count"
            );
        }
    }

    #[test]
    fn test_duplicate_entries_in_one_commit_count_once() {
        let commits = vec![make_commit(&["a.txt", "a.txt", "b.txt"])];
        let result = coupled_pairs(&commits);
        assert_eq!(result.len(), 1, "duplicate path must not pair with itself");
        assert!((result[0].percentage - 1.0).abs() < f64::EPSILON);
    }

    // ── significant_coupled_pairs ─────────────────────────────────────────────

    fn pair(file1: &str, file2: &str, percentage: f64, revisions: usize) -> CoupledPair {
        CoupledPair {
            file1: file1.to_string(),
            file2: file2.to_string(),
            percentage,
            revisions,
        }
    }

    #[test]
    fn test_significant_requires_both_axes() {
        let pairs = vec![
            pair("strong-rare.a", "strong-rare.b", 0.9, 1),
            pair("weak-busy.a", "weak-busy.b", 0.1, 50),
            pair("strong-busy.a", "strong-busy.b", 0.8, 40),
        ];
        // percentile 0.5 of revisions [1, 40, 50] → index 1 → threshold 40
        let result = significant_coupled_pairs(&pairs, 0.5, 0.5);
        assert_eq!(result.len(), 1, "only the pair clearing both thresholds survives");
        assert_eq!(result[0].file1, "strong-busy.a");
    }

    #[test]
    fn test_significant_out_of_range_percentile_keeps_all_strong_pairs() {
        let pairs = vec![
            pair("a", "b", 0.9, 1),
            pair("c", "d", 0.7, 2),
        ];
        // index = floor(2 × 1.0) = 2 → out of range → threshold 0
        let result = significant_coupled_pairs(&pairs, 1.0, 0.5);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_significant_on_empty_input() {
        assert!(significant_coupled_pairs(&[], 0.8, 0.5).is_empty());
    }

    // ── sort_coupled_pairs ────────────────────────────────────────────────────

    #[test]
    fn test_sort_prefers_strength_on_both_axes() {
        let data = vec![
            pair("a.txt", "b.txt", 0.1, 20), // max revisions, min percentage
            pair("c.txt", "d.txt", 0.9, 5),  // max percentage, min revisions
            pair("e.txt", "f.txt", 0.5, 10), // middling on both
        ];
        let result = sort_coupled_pairs(&data);
        assert_eq!(
            result[0].file1, "e.txt",
            "a pair strong on both axes beats one extreme on a single axis"
        );
    }

    #[test]
    fn test_sort_is_stable_and_non_mutating() {
        let data = vec![
            pair("first.txt", "x.txt", 0.5, 10),
            pair("second.txt", "x.txt", 0.5, 10),
        ];
        let original = data.clone();
        let result = sort_coupled_pairs(&data);
        assert_eq!(data, original, "input must not be reordered");
        assert_eq!(result[0].file1, "first.txt", "ties keep their original order");
        assert_eq!(result[1].file1, "second.txt");
    }

    #[test]
    fn test_sort_handles_empty_and_single() {
        assert!(sort_coupled_pairs(&[]).is_empty());
        let one = vec![pair("a", "b", 0.5, 10)];
        assert_eq!(sort_coupled_pairs(&one), one);
    }

    // ── coupling_overview ─────────────────────────────────────────────────────

    #[test]
    fn test_overview_lists_counterparts_per_file() {
        let pairs = vec![
            pair("a.rs", "b.rs", 0.5, 10),
            pair("a.rs", "c.rs", 0.25, 8),
        ];
        let socs = vec![
            Soc { file: "a.rs".to_string(), soc: 7 },
            Soc { file: "b.rs".to_string(), soc: 5 },
        ];
        let overview = coupling_overview(&pairs, &socs);
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].file, "a.rs");
        assert_eq!(overview[0].soc, 7);
        let counterparts: Vec<&str> = overview[0]
            .coupled_files
            .iter()
            .map(|c| c.file.as_str())
            .collect();
        assert_eq!(counterparts, vec!["b.rs", "c.rs"]);
        assert_eq!(overview[1].coupled_files.len(), 1);
        assert_eq!(overview[1].coupled_files[0].file, "a.rs");
    }

    // ── file_proximity ────────────────────────────────────────────────────────

    #[test]
    fn test_proximity_of_siblings_and_strangers() {
        assert_eq!(file_proximity("src/a.rs", "src/b.rs"), 2);
        assert_eq!(file_proximity("src/x/a.rs", "src/y/b.rs"), 4);
        assert_eq!(file_proximity("a.rs", "a.rs"), 0);
        assert_eq!(file_proximity("src/deep/nest/a.rs", "top.rs"), 5);
    }
}
