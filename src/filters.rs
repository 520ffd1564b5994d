use regex::Regex;

use crate::types::Commit;

/// Applies the configured include/exclude path patterns to a parsed
/// history. An entry survives when it matches no exclude pattern and,
/// if any include patterns are set, matches at least one of them.
/// Commits left without entries are dropped entirely.
pub fn apply_filters(commits: Vec<Commit>, include: &[Regex], exclude: &[Regex]) -> Vec<Commit> {
    commits
        .into_iter()
        .map(|mut commit| {
            commit.file_entries.retain(|entry| {
                !exclude.iter().any(|re| re.is_match(&entry.file_name))
                    && (include.is_empty()
                        || include.iter().any(|re| re.is_match(&entry.file_name)))
            });
            commit
        })
        .filter(|commit| !commit.file_entries.is_empty())
        .collect()
}
