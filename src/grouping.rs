use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::types::{Commit, FileEntry, Hotspot};

/// One architectural grouping rule as written in the config file.
/// Rule order matters: the first matching pattern wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupRule {
    pub pattern: String,
    pub group: String,
}

/// A compiled grouping rule.
#[derive(Debug, Clone)]
pub struct Group {
    pub pattern: Regex,
    pub group: String,
}

/// Compiles every rule's pattern exactly once, at configuration time.
/// A pattern that does not compile is a fatal configuration error —
/// nothing downstream ever sees an uncompiled pattern.
pub fn compile_groups(rules: &[GroupRule]) -> Result<Vec<Group>, String> {
    rules
        .iter()
        .map(|rule| {
            Regex::new(&rule.pattern)
                .map(|pattern| Group {
                    pattern,
                    group: rule.group.clone(),
                })
                .map_err(|e| {
                    format!("Invalid architectural group pattern '{}': {e}", rule.pattern)
                })
        })
        .collect()
}

/// Label of the first group whose pattern matches, or the file name
/// unchanged when none do. First match wins — not best match.
pub fn filename_to_group<'a>(file: &'a str, groups: &'a [Group]) -> &'a str {
    groups
        .iter()
        .find(|g| g.pattern.is_match(file))
        .map(|g| g.group.as_str())
        .unwrap_or(file)
}

/// Remaps every entry's path to its group label, merging entries that
/// collapse into the same label within one commit by summing their
/// added/removed counts. First-seen order within the commit is kept.
/// The result feeds the same revision/coupling/ownership analyses at
/// group granularity.
pub fn group_commits(commits: &[Commit], groups: &[Group]) -> Vec<Commit> {
    commits
        .iter()
        .map(|commit| {
            let mut order: Vec<String> = Vec::new();
            let mut merged: HashMap<String, FileEntry> = HashMap::new();
            for entry in &commit.file_entries {
                let label = filename_to_group(&entry.file_name, groups).to_string();
                match merged.get_mut(&label) {
                    Some(existing) => {
                        existing.added += entry.added;
                        existing.removed += entry.removed;
                    }
                    None => {
                        order.push(label.clone());
                        merged.insert(
                            label.clone(),
                            FileEntry {
                                file_name: label,
                                added: entry.added,
                                removed: entry.removed,
                            },
                        );
                    }
                }
            }
            Commit {
                hash: commit.hash.clone(),
                date: commit.date.clone(),
                author: commit.author.clone(),
                message: commit.message.clone(),
                file_entries: order.into_iter().filter_map(|l| merged.remove(&l)).collect(),
            }
        })
        .collect()
}

/// Aggregates an already-ranked hotspot list into groups by summing
/// complexity and revisions per label. Group "content" has no single
/// file to score, so the grouped view aggregates the per-file scores
/// instead of re-reading disk; files matching no rule are left out of
/// it. Re-ranked by the combined score.
pub fn group_hotspots(hotspots: &[Hotspot], groups: &[Group]) -> Vec<Hotspot> {
    if groups.is_empty() {
        return hotspots.to_vec();
    }

    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Hotspot> = HashMap::new();
    for hotspot in hotspots {
        let Some(group) = groups.iter().find(|g| g.pattern.is_match(&hotspot.file)) else {
            continue;
        };
        match merged.get_mut(&group.group) {
            Some(existing) => {
                existing.complexity += hotspot.complexity;
                existing.revisions += hotspot.revisions;
            }
            None => {
                order.push(group.group.clone());
                merged.insert(
                    group.group.clone(),
                    Hotspot {
                        file: group.group.clone(),
                        complexity: hotspot.complexity,
                        revisions: hotspot.revisions,
                    },
                );
            }
        }
    }

    let mut grouped: Vec<Hotspot> = order.into_iter().filter_map(|l| merged.remove(&l)).collect();
    grouped.sort_by(|a, b| (b.complexity * b.revisions).cmp(&(a.complexity * a.revisions)));
    grouped
}

// ─── Tests ────────────────────────────────────────────────────────────────────
