use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use crate::analyzers::coupling::file_proximity;
use crate::types::{AuthorShare, Hotspot, Report};

// Coupled files this many path segments apart get flagged: coupling
// across distant parts of the tree is the architectural surprise.
const DISTANT_COUPLING: usize = 4;

pub fn report_terminal(report: &Report) {
    eprintln!();
    println!(
        "{} — {} since {} ({} commits, {} files)",
        "🔥 git-hotmap".red().bold(),
        report.meta.repo_path.bright_black(),
        report.meta.after.bright_black(),
        report.meta.commit_count.to_string().bright_black(),
        report.meta.file_count.to_string().bright_black(),
    );
    println!();

    // ── Hotspots ───────────────────────────────────────────────────────────
    if report.hotspots.is_empty() {
        println!("{}", "  No hotspots found with current filters.".yellow());
        println!();
    } else {
        println!("{}", "Hotspots — churn × complexity:".bold());
        print_hotspot_table(&report.hotspots);
        if let Some(grouped) = &report.grouped {
            if !grouped.hotspots.is_empty() {
                println!();
                println!("{}", "Hotspots by architectural group:".bold());
                print_hotspot_table(&grouped.hotspots);
            }
        }
    }

    // ── Co-change coupling ─────────────────────────────────────────────────
    if !report.coupled_pairs.is_empty() {
        println!();
        println!("{}", "⚠️  Change coupling detected:".yellow());
        for pair in report.coupled_pairs.iter().take(10) {
            let distant = if file_proximity(&pair.file1, &pair.file2) >= DISTANT_COUPLING {
                " ⚡ distant".red().to_string()
            } else {
                String::new()
            };
            println!(
                "    {} ↔ {} {}{}",
                pair.file1.cyan(),
                pair.file2.cyan(),
                format!(
                    "({}% of {} shared revisions)",
                    (pair.percentage * 100.0).round(),
                    pair.revisions
                )
                .bright_black(),
                distant,
            );
        }
    }

    // ── Sum of coupling ────────────────────────────────────────────────────
    if !report.soc.is_empty() {
        println!();
        println!("{}", "Most coupled files (sum of coupling):".bold());
        for entry in report.soc.iter().take(10) {
            println!(
                "    {:>4}  {}",
                entry.soc.to_string().yellow(),
                entry.file.cyan()
            );
        }
    }

    // ── Knowledge distribution ─────────────────────────────────────────────
    if !report.ownership_distribution.is_empty() {
        println!();
        println!("{}", "Knowledge distribution:".bold());
        for share in report.ownership_distribution.iter().take(10) {
            println!(
                "    {:>5.1}%  {}",
                share.percentage * 100.0,
                share.name.cyan()
            );
        }
        println!();
        print_truck_factor(&report.truck_factor);
    }

    // ── Commit vocabulary ──────────────────────────────────────────────────
    if !report.word_frequencies.is_empty() {
        println!();
        let words: Vec<String> = report
            .word_frequencies
            .iter()
            .take(12)
            .map(|w| format!("{} ({})", w.word, w.count))
            .collect();
        println!(
            "{} {}",
            "Commit message vocabulary:".bold(),
            words.join(", ").bright_black()
        );
    }

    println!();
}

// ─── Sections ─────────────────────────────────────────────────────────────────

fn print_hotspot_table(hotspots: &[Hotspot]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["RANK", "FILE", "REVISIONS", "COMPLEXITY", "SCORE"]);

    for (i, h) in hotspots.iter().enumerate() {
        let score = h.complexity * h.revisions;
        table.add_row(vec![
            Cell::new(format!("{:3}", i + 1)),
            Cell::new(truncate_path(&h.file, 52)),
            Cell::new(h.revisions.to_string()),
            Cell::new(h.complexity.to_string()),
            score_cell(score, hotspots),
        ]);
    }

    println!("{table}");
}

/// Score cell colored by where the score sits relative to the top entry.
/// Plain numeric text so comfy-table measures the real visible width.
fn score_cell(score: usize, hotspots: &[Hotspot]) -> Cell {
    let top = hotspots
        .first()
        .map(|h| h.complexity * h.revisions)
        .unwrap_or(1)
        .max(1);
    let text = score.to_string();
    let ratio = score as f64 / top as f64;
    if ratio >= 0.75 {
        Cell::new(text).fg(Color::Red)
    } else if ratio >= 0.4 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text).fg(Color::Green)
    }
}

fn print_truck_factor(truck: &[AuthorShare]) {
    let names: Vec<&str> = truck.iter().map(|s| s.name.as_str()).collect();
    println!(
        "{} {} {}",
        "🚚 Truck factor:".bold(),
        truck.len().to_string().red().bold(),
        format!("({})", names.join(", ")).bright_black()
    );
    println!(
        "{}",
        "   Contributors whose combined ownership covers half the codebase.".bright_black()
    );
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn truncate_path(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    format!("…{}", &s[s.len().saturating_sub(max - 1)..])
}
