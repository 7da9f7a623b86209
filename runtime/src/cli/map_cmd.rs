//! `harmap [HAR]`: plot the servers in a capture file on a world map.

use crate::cli::output::{self, Styled};
use crate::cli::progress;
use crate::config::MapperConfig;
use crate::pipeline::{self, RunSummary};
use anyhow::Result;
use std::time::Instant;

/// Run the map command.
pub async fn run(config: &MapperConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();
    let show_progress = !output::is_quiet() && !output::is_json();

    if show_progress {
        output::print_header(&s);
        eprintln!("  Reading {}...", config.input.display());
        eprintln!();
    }

    let bar = progress::create_lookup_progress();
    let result = pipeline::run_with_progress(
        config,
        |found, considered| {
            if show_progress {
                print_found(&s, found, considered);
            }
            progress::start_lookups(&bar, considered, show_progress);
        },
        |location| progress::record_lookup(&bar, &location.address, location.is_resolved()),
    )
    .await;

    let summary = match result {
        Ok(summary) => {
            progress::finish_lookups(&bar, &s, summary.resolved);
            summary
        }
        Err(e) => {
            bar.abandon();
            return Err(e);
        }
    };

    if output::is_json() {
        print_summary_json(&summary, start.elapsed());
        return Ok(());
    }

    if !output::is_quiet() {
        print_summary(&s, &summary, start.elapsed());
    }

    Ok(())
}

/// List the servers found in the capture before lookups start.
fn print_found(s: &Styled, found: &[String], considered: usize) {
    for line in found_lines(s, found, considered) {
        eprintln!("{line}");
    }
    if !found.is_empty() {
        eprintln!();
    }
}

fn found_lines(s: &Styled, found: &[String], considered: usize) -> Vec<String> {
    let mut lines: Vec<String> = found
        .iter()
        .map(|address| format!("    {} {:<16} {address}", s.info_sym(), "Found:"))
        .collect();
    if found.len() > considered {
        lines.push(format!(
            "  {} {} servers found, looking up the first {considered}",
            s.warn_sym(),
            found.len()
        ));
    }
    lines
}

/// Print the run summary in branded format.
fn print_summary(s: &Styled, summary: &RunSummary, elapsed: std::time::Duration) {
    eprintln!();
    output::print_section(s, "Capture");
    output::print_check(
        s.ok_sym(),
        "Entries:",
        &format!("{} ({} unique servers)", summary.entries, summary.addresses_found),
    );
    eprintln!();

    output::print_section(s, "Lookups");
    output::print_check(
        s.ok_sym(),
        "Located:",
        &s.green(&format!("{}/{}", summary.resolved, summary.addresses_considered)),
    );
    if !summary.unresolved.is_empty() {
        output::print_check(
            s.warn_sym(),
            "Unresolved:",
            &s.yellow(&summary.unresolved.len().to_string()),
        );
        let shown = if output::is_verbose() {
            summary.unresolved.len()
        } else {
            5
        };
        for address in summary.unresolved.iter().take(shown) {
            output::print_detail(address);
        }
        if summary.unresolved.len() > shown {
            output::print_detail(&s.dim(&format!(
                "... {} more (use --verbose)",
                summary.unresolved.len() - shown
            )));
        }
    }
    eprintln!();

    output::print_section(s, "Map");
    let marker_sym = if summary.markers > 0 {
        s.ok_sym()
    } else {
        s.info_sym()
    };
    output::print_check(marker_sym, "Markers:", &summary.markers.to_string());
    output::print_check(s.ok_sym(), "Saved to:", &summary.output.display().to_string());
    eprintln!();
    eprintln!("  Done in {:.1}s", elapsed.as_secs_f64());
}

/// Print the run summary as JSON.
fn print_summary_json(summary: &RunSummary, elapsed: std::time::Duration) {
    let mut value = serde_json::to_value(summary).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "duration_ms".to_string(),
            serde_json::json!(elapsed.as_millis() as u64),
        );
    }
    output::print_json(&value);
}
