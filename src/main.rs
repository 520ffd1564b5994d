use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use git_hotmap::analyzers::{complexity, coupling, hotspots, ownership, revisions, soc, word_count};
use git_hotmap::config::{self, CompiledPatterns, HotmapConfig};
use git_hotmap::types::*;
use git_hotmap::{filters, git, grouping, reporters};

#[derive(Parser, Debug)]
#[command(
    name = "git-hotmap",
    about = "🔥 Map git history into hotspot, coupling, and knowledge-ownership signals",
    version,
    long_about = "Mines your local git history for refactoring signals:\n\n\
                  • hotspots — files where change frequency meets structural complexity\n\
                  • change coupling — files that keep changing together\n\
                  • knowledge ownership — who holds the code, and the truck factor\n\n\
                  Optional architectural groups re-run the analyses at module granularity."
)]
struct Args {
    /// Path to a git repository. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    repo_path: Option<PathBuf>,

    /// Only analyze commits after this ISO date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    after: Option<String>,

    /// Config file to use instead of the auto-discovered one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hotspot rows to report.
    #[arg(long)]
    top: Option<usize>,

    /// Output format: terminal, json
    #[arg(long)]
    format: Option<String>,

    /// Output file (json format). Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print an annotated config template and exit.
    #[arg(long)]
    generate_config: bool,
}

fn main() {
    let args = Args::parse();

    if args.generate_config {
        if let Err(e) = config::print_template(args.output.as_deref()) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let repo_path = match &args.repo_path {
        Some(path) => path.clone(),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                eprintln!("Error: failed to resolve current directory: {e}");
                std::process::exit(1);
            }
        },
    };

    if !repo_path.join(".git").exists() {
        eprintln!("Error: no git repository found at: {}", repo_path.display());
        eprintln!("       Make sure the path contains a .git directory.");
        std::process::exit(1);
    }

    if let Err(e) = run_analysis(&repo_path, &args) {
        eprintln!("Error analyzing {}: {e}", repo_path.display());
        std::process::exit(1);
    }
}

// ── Analysis pipeline ──────────────────────────────────────────────────────────

fn run_analysis(repo_path: &Path, args: &Args) -> Result<(), String> {
    // Config file first, CLI flags on top
    let cfg = match args.config.clone().or_else(|| config::discover_config(repo_path)) {
        Some(path) => config::load_config(&path)?,
        None => HotmapConfig::default(),
    };
    let patterns = cfg.compile_patterns()?;

    let after = args
        .after
        .clone()
        .or(cfg.after.clone())
        .unwrap_or_else(default_after);
    validate_after(&after)?;

    let top = args.top.or(cfg.top).unwrap_or(20);
    if top == 0 {
        return Err("Invalid --top value: 0. Must be 1 or greater".to_string());
    }
    let format = args
        .format
        .clone()
        .or(cfg.format.clone())
        .unwrap_or_else(|| "terminal".to_string());
    if format != "terminal" && format != "json" {
        return Err(format!(
            "Invalid --format value: \"{format}\". Expected one of: \"terminal\", \"json\""
        ));
    }
    let output = args.output.clone().or_else(|| cfg.output.clone().map(PathBuf::from));

    let soc_percentile = cfg.soc_percentile.unwrap_or(config::DEFAULT_SOC_PERCENTILE);
    let revisions_percentile = cfg
        .revisions_percentile
        .unwrap_or(config::DEFAULT_REVISIONS_PERCENTILE);
    let min_coupling = cfg
        .min_coupling_percentage
        .unwrap_or(config::DEFAULT_MIN_COUPLING_PERCENTAGE);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .map_err(|e| format!("Progress style failed: {e}"))?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    let total_start = Instant::now();
    let mut step_start = Instant::now();

    // [1/4] Parse the commit log from a spawned `git log`
    pb.set_message("[1/4] Parsing commit log...");
    let commits = match git::spawn::run_git_log(repo_path, &after) {
        Ok(c) if c.is_empty() => {
            pb.finish_and_clear();
            return Err(format!(
                "No commits found in '{}' after {after}. Try an earlier --after date",
                repo_path.display()
            ));
        }
        Ok(c) => c,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.to_string());
        }
    };
    let t1 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [1/4] Parsing commit log            {t1}"));

    // [2/4] Apply include/exclude filters
    pb.set_message("[2/4] Filtering history...");
    let commits = filters::apply_filters(commits, &patterns.include, &patterns.exclude);
    if commits.is_empty() {
        pb.finish_and_clear();
        return Err("No commits left after filtering. Loosen include/exclude patterns".to_string());
    }
    let revision_counts = revisions::revision_counts(&commits, &[]);
    let t2 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [2/4] Filtering history             {t2}"));

    // [3/4] Read file contents and score indentation complexity.
    // Reads are independent and the ranking is fetch-order agnostic,
    // so they run in parallel.
    pb.set_message("[3/4] Scoring file complexity...");
    let files: Vec<&String> = revision_counts.keys().collect();
    let complexity_by_file: HashMap<String, usize> = files
        .par_iter()
        .map(|file| {
            (
                (*file).clone(),
                complexity::score_file(&repo_path.join(file.as_str())),
            )
        })
        .collect();
    let ranked = hotspots::rank_hotspots(&revision_counts, |file| {
        complexity_by_file.get(file).copied().unwrap_or(0)
    });
    let t3 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [3/4] Scoring file complexity       {t3}"));

    // [4/4] Coupling, ownership, vocabulary — and the grouped re-run
    pb.set_message("[4/4] Analyzing coupling & ownership...");
    let all_pairs = coupling::coupled_pairs(&commits);
    let significant =
        coupling::significant_coupled_pairs(&all_pairs, revisions_percentile, min_coupling);
    let display_pairs = coupling::sort_coupled_pairs(&significant);
    let soc_top = soc::soc_percentile(&soc::soc(&commits), soc_percentile);
    let coupling_items = coupling::coupling_overview(&display_pairs, &soc_top);

    let file_ownership = ownership::file_ownership(&commits);
    let distribution = ownership::ownership_distribution(&file_ownership);
    let truck = ownership::truck_factor(&distribution);

    let words = word_count::top_words(&word_count::history_word_count(&commits), 20);

    let grouped = grouped_analysis(
        &commits,
        &ranked,
        &patterns,
        soc_percentile,
        revisions_percentile,
        min_coupling,
    );
    let t4 = fmt_dur(step_start.elapsed());
    pb.println(format!("  ✓ [4/4] Analyzing coupling & ownership {t4}"));

    let total_time = fmt_dur(total_start.elapsed());
    pb.finish_and_clear();
    eprintln!(
        "✔ {} commits, {} files — ⏱ {}",
        commits.len(),
        revision_counts.len(),
        total_time
    );

    let mut top_hotspots = ranked;
    top_hotspots.truncate(top);

    let report = Report {
        meta: ReportMeta {
            repo_path: repo_path.display().to_string(),
            after,
            commit_count: commits.len(),
            file_count: revision_counts.len(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
        },
        hotspots: top_hotspots,
        coupled_pairs: display_pairs,
        soc: soc_top,
        coupling: coupling_items,
        ownership: file_ownership,
        ownership_distribution: distribution,
        truck_factor: truck,
        word_frequencies: words,
        grouped,
    };

    match format.as_str() {
        "json" => reporters::json::report_json(&report, output.as_deref())?,
        _ => reporters::terminal::report_terminal(&report),
    }

    Ok(())
}

/// Re-runs revisions, coupling, SOC, and ownership on the grouped
/// history when architectural groups are configured.
fn grouped_analysis(
    commits: &[Commit],
    ranked: &[Hotspot],
    patterns: &CompiledPatterns,
    soc_percentile: f64,
    revisions_percentile: f64,
    min_coupling: f64,
) -> Option<GroupedAnalysis> {
    if patterns.groups.is_empty() {
        return None;
    }
    let grouped_commits = grouping::group_commits(commits, &patterns.groups);
    let pairs = coupling::coupled_pairs(&grouped_commits);
    let significant =
        coupling::significant_coupled_pairs(&pairs, revisions_percentile, min_coupling);
    Some(GroupedAnalysis {
        hotspots: grouping::group_hotspots(ranked, &patterns.groups),
        revisions: revisions::revision_counts(&grouped_commits, &[]),
        coupled_pairs: coupling::sort_coupled_pairs(&significant),
        soc: soc::soc_percentile(&soc::soc(&grouped_commits), soc_percentile),
        ownership_distribution: ownership::ownership_distribution(&ownership::file_ownership(
            &grouped_commits,
        )),
    })
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// One year back from today, ISO formatted — the default log window.
fn default_after() -> String {
    (chrono::Utc::now() - chrono::Duration::days(365))
        .format("%Y-%m-%d")
        .to_string()
}

fn validate_after(after: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(after, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            format!("Invalid --after value: \"{after}\". Expected an ISO date (YYYY-MM-DD)")
        })
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{ms}ms")
    }
}
