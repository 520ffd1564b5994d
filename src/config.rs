use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::grouping::{self, Group, GroupRule};

pub const DEFAULT_SOC_PERCENTILE: f64 = 0.8;
pub const DEFAULT_REVISIONS_PERCENTILE: f64 = 0.8;
pub const DEFAULT_MIN_COUPLING_PERCENTAGE: f64 = 0.5;

/// All settings that can be placed in a .git-hotmap.yml config file.
/// Every field is optional — omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotmapConfig {
    // Analysis defaults (overridden by the corresponding CLI flag)
    pub after: Option<String>,
    pub top: Option<usize>,
    pub format: Option<String>,
    pub output: Option<String>,

    // Path filtering: regular expressions matched against repo-relative paths
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,

    // Architectural grouping, first match wins
    pub architectural_groups: Option<Vec<GroupRule>>,

    // Significance thresholds
    pub soc_percentile: Option<f64>,
    pub revisions_percentile: Option<f64>,
    pub min_coupling_percentage: Option<f64>,
}

/// Compiled pattern sets handed to the pure analysis functions. Built
/// exactly once at configuration time — nothing downstream recompiles
/// a regex per call.
#[derive(Debug, Default)]
pub struct CompiledPatterns {
    pub include: Vec<Regex>,
    pub exclude: Vec<Regex>,
    pub groups: Vec<Group>,
}

impl HotmapConfig {
    /// Compiles the include/exclude lists and the architectural-group
    /// rules. Any pattern that fails to compile is a fatal
    /// configuration error, raised before any analysis runs.
    pub fn compile_patterns(&self) -> Result<CompiledPatterns, String> {
        Ok(CompiledPatterns {
            include: compile_list("include", self.include.as_deref().unwrap_or(&[]))?,
            exclude: compile_list("exclude", self.exclude.as_deref().unwrap_or(&[]))?,
            groups: grouping::compile_groups(
                self.architectural_groups.as_deref().unwrap_or(&[]),
            )?,
        })
    }

    /// Validates semantic constraints that serde cannot enforce.
    ///
    /// Returns a human-readable error describing exactly what is wrong
    /// and what values are accepted. Called automatically by
    /// [`load_config`].
    pub fn validate(&self) -> Result<(), String> {
        // format must be one of the two supported output drivers
        if let Some(fmt) = &self.format {
            match fmt.as_str() {
                "terminal" | "json" => {}
                other => {
                    return Err(format!(
                        "Invalid 'format' value: \"{other}\". \
                         Expected one of: \"terminal\", \"json\""
                    ))
                }
            }
        }

        // top: 0 would silently produce an empty report — almost certainly a mistake
        if let Some(0) = self.top {
            return Err("Invalid 'top' value: 0. Must be 1 or greater".to_string());
        }

        if let Some(after) = &self.after {
            if NaiveDate::parse_from_str(after, "%Y-%m-%d").is_err() {
                return Err(format!(
                    "Invalid 'after' value: \"{after}\". Expected an ISO date (YYYY-MM-DD)"
                ));
            }
        }

        // Percentiles and the coupling floor are fractions of 1
        let fractions: &[(&str, Option<f64>)] = &[
            ("soc_percentile", self.soc_percentile),
            ("revisions_percentile", self.revisions_percentile),
            ("min_coupling_percentage", self.min_coupling_percentage),
        ];
        for (name, value) in fractions {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(v) {
                    return Err(format!(
                        "Invalid '{name}' value: {v}. Must be between 0 and 1 \
                         (e.g. 0.8 keeps the top 20%)"
                    ));
                }
            }
        }

        // Pattern compilation is the real validity check for the regex fields
        self.compile_patterns().map(|_| ())
    }
}

fn compile_list(field: &str, patterns: &[String]) -> Result<Vec<Regex>, String> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| format!("Invalid '{field}' pattern '{p}': {e}")))
        .collect()
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<HotmapConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config file '{}': {e}", path.display()))?;
    let cfg: HotmapConfig = serde_yaml::from_str(&content)
        .map_err(|e| format!("Invalid config file '{}': {e}", path.display()))?;
    cfg.validate()
        .map_err(|e| format!("Config file '{}': {e}", path.display()))?;
    Ok(cfg)
}

/// Looks for a config file next to the analyzed repository first, then
/// in the user's config directory. Returns the first path that exists.
pub fn discover_config(repo: &Path) -> Option<PathBuf> {
    let local = repo.join(".git-hotmap.yml");
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("git-hotmap").join("config.yml");
    user.is_file().then_some(user)
}

/// Annotated YAML template — printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# git-hotmap configuration file
# Generated by: git-hotmap --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
# Save this file as .git-hotmap.yml in your repository root, then run:
#
#   git-hotmap [path]

# ── Analysis scope ─────────────────────────────────────────────────────────────

# Only analyze commits after this ISO date. Defaults to one year ago.
# after: "2024-01-01"

# Number of hotspot rows to display. All files are always analyzed.
# top: 20

# ── Output ─────────────────────────────────────────────────────────────────────

# Output format: terminal, json
# format: "terminal"

# Output file path (json format). Defaults to stdout.
# output: "hotmap-report.json"

# ── Path filtering ─────────────────────────────────────────────────────────────
# Regular expressions matched against repo-relative paths. Entries
# matching any exclude pattern are dropped; when include patterns are
# given, only entries matching one of them are kept.

# exclude:
#   - "package.*json"
#   - "\\.lock$"
#   - "^vendor/"

# include:
#   - "^src/"

# ── Architectural groups ───────────────────────────────────────────────────────
# Collapse many paths into one logical unit before re-running the
# revision and coupling analyses at a coarser granularity. The first
# matching pattern wins.

# architectural_groups:
#   - pattern: "^src/ui/"
#     group: "UI"
#   - pattern: "^src/api/"
#     group: "API"

# ── Significance thresholds ────────────────────────────────────────────────────

# Fraction of the low end of the SOC ranking to discard.
# soc_percentile: 0.8

# Coupled pairs must sit at or above this percentile of co-revision
# counts AND at or above the coupling floor below.
# revisions_percentile: 0.8
# min_coupling_percentage: 0.5
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(path, TEMPLATE)
            .map_err(|e| format!("Cannot write config template to '{}': {e}", path.display())),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
