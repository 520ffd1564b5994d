use serde::Serialize;
use std::collections::HashMap;

// ─── Core Git Data ────────────────────────────────────────────────────────────

/// A single file's change within one commit, as reported by numstat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub file_name: String,
    pub added: usize,
    pub removed: usize,
}

/// One historical commit. `message` is always present — producers that
/// omit it yield an empty string rather than a missing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub date: String,
    pub author: String,
    pub message: String,
    pub file_entries: Vec<FileEntry>,
}

/// file path → number of commits that touched it
pub type Revisions = HashMap<String, usize>;

// ─── Analyzer Outputs ─────────────────────────────────────────────────────────

/// A file ranked by change frequency × structural complexity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub file: String,
    pub complexity: usize,
    pub revisions: usize,
}

/// Two files that change together. `revisions` counts commits touching
/// either file; `percentage` is the fraction of those touching both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoupledPair {
    pub file1: String,
    pub file2: String,
    pub percentage: f64,
    pub revisions: usize,
}

/// Sum of Coupling: how many multi-file commits a file participated in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Soc {
    pub file: String,
    pub soc: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoupledFile {
    pub file: String,
    pub percentage: f64,
    pub revisions: usize,
}

/// Per-file coupling overview: the SOC figure joined with every
/// counterpart the file is coupled to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplingItem {
    pub file: String,
    pub soc: usize,
    pub coupled_files: Vec<CoupledFile>,
}

/// One author's share of a single file's commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipEntry {
    pub name: String,
    pub commits: usize,
    pub percentage: f64,
}

/// file path → per-author ownership, sorted by commit count descending
pub type FileOwnership = HashMap<String, Vec<OwnershipEntry>>;

/// An author's share of total ownership weight across the repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorShare {
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub repo_path: String,
    pub after: String,
    pub commit_count: usize,
    pub file_count: usize,
    pub analyzed_at: String,
}

/// The same analyses re-run at architectural-group granularity.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedAnalysis {
    pub hotspots: Vec<Hotspot>,
    pub revisions: Revisions,
    pub coupled_pairs: Vec<CoupledPair>,
    pub soc: Vec<Soc>,
    pub ownership_distribution: Vec<AuthorShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub hotspots: Vec<Hotspot>,
    pub coupled_pairs: Vec<CoupledPair>,
    pub soc: Vec<Soc>,
    pub coupling: Vec<CouplingItem>,
    pub ownership: FileOwnership,
    pub ownership_distribution: Vec<AuthorShare>,
    pub truck_factor: Vec<AuthorShare>,
    pub word_frequencies: Vec<WordFrequency>,
    pub grouped: Option<GroupedAnalysis>,
}
