use crate::types::{Hotspot, Revisions};

/// Joins revision counts with a complexity resolver and ranks files by
/// `complexity × revisions`, descending. The resolver is injected — the
/// caller decides how file content is fetched (and may do so in
/// parallel; the ranking is independent of fetch order).
///
/// Files whose content cannot be scored (deleted, binary, unreadable —
/// complexity 0) are excluded from the ranking, not zero-ranked.
pub fn rank_hotspots<F>(revisions: &Revisions, complexity_of: F) -> Vec<Hotspot>
where
    F: Fn(&str) -> usize,
{
    let mut hotspots: Vec<Hotspot> = revisions
        .iter()
        .map(|(file, &revisions)| Hotspot {
            file: file.clone(),
            complexity: complexity_of(file),
            revisions,
        })
        .filter(|h| h.complexity > 0)
        .collect();
    hotspots.sort_by(|a, b| (b.complexity * b.revisions).cmp(&(a.complexity * a.revisions)));
    hotspots
}
