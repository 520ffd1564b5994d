use std::collections::{HashMap, HashSet};

use crate::types::{Commit, Soc};

/// Sum of Coupling per file: the number of multi-file commits the file
/// participated in. A commit touching a single file contributes
/// nothing; a commit touching N files adds exactly 1 to each of the N
/// counters, not one per pairing. Sorted by soc descending, file name
/// ascending on ties.
pub fn soc(commits: &[Commit]) -> Vec<Soc> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for commit in commits {
        let distinct: HashSet<&str> = commit
            .file_entries
            .iter()
            .map(|e| e.file_name.as_str())
            .collect();
        if distinct.len() > 1 {
            for file in distinct {
                *counts.entry(file.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut socs: Vec<Soc> = counts
        .into_iter()
        .map(|(file, soc)| Soc { file, soc })
        .collect();
    socs.sort_by(|a, b| b.soc.cmp(&a.soc).then_with(|| a.file.cmp(&b.file)));
    socs
}

/// Keeps the top of the SOC ranking: `percentile` names the fraction of
/// the *low* end to discard, not a cutoff value — 0.3 over 10 entries
/// keeps the top 7, sorted descending.
pub fn soc_percentile(entries: &[Soc], percentile: f64) -> Vec<Soc> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.soc.cmp(&a.soc).then_with(|| a.file.cmp(&b.file)));
    let discard = (sorted.len() as f64 * percentile).floor() as usize;
    sorted.truncate(sorted.len().saturating_sub(discard));
    sorted
}
