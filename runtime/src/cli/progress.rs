// Copyright 2026 Harmap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress display for the geolocation stage.
//!
//! Uses `indicatif` to show one tick per finished lookup.

use crate::cli::output::Styled;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create the lookup progress bar. It stays hidden until started.
pub fn create_lookup_progress() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg:<22} [{bar:24}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}")
        .progress_chars("\u{2588}\u{2591}\u{2591}");
    bar.set_style(style);
    bar.set_message("Geolocating");
    bar
}

/// Size the bar to the number of lookups and, if `visible`, start drawing.
pub fn start_lookups(bar: &ProgressBar, total: usize, visible: bool) {
    bar.set_length(total as u64);
    if visible {
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(120));
    }
}

/// Advance the bar, showing the address that just finished.
pub fn record_lookup(bar: &ProgressBar, address: &str, resolved: bool) {
    let mark = if resolved { "\u{2713}" } else { "\u{25cb}" };
    bar.set_message(format!("{mark} {address}"));
    bar.inc(1);
}

/// Mark the stage complete.
pub fn finish_lookups(bar: &ProgressBar, s: &Styled, resolved: usize) {
    let total = bar.length().unwrap_or(0);
    bar.set_style(
        ProgressStyle::with_template("  {msg}").unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.finish_with_message(format!(
        "{} {:<22} {}",
        s.ok_sym(),
        "Geolocating",
        s.green(&format!("{resolved}/{total} located"))
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_counts_lookups() {
        let bar = create_lookup_progress();
        start_lookups(&bar, 3, false);
        record_lookup(&bar, "1.2.3.4", true);
        record_lookup(&bar, "::1", false);
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.length(), Some(3));
    }

    #[test]
    fn test_finish_marks_done() {
        let bar = create_lookup_progress();
        start_lookups(&bar, 1, false);
        record_lookup(&bar, "1.2.3.4", true);
        finish_lookups(&bar, &Styled::plain(), 1);
        assert!(bar.is_finished());
    }

    #[test]
    fn test_finish_without_color_has_no_escapes() {
        let bar = create_lookup_progress();
        start_lookups(&bar, 2, false);
        record_lookup(&bar, "1.2.3.4", true);
        record_lookup(&bar, "::1", false);
        finish_lookups(&bar, &Styled::plain(), 1);

        let message = bar.message();
        assert!(!message.contains('\x1b'), "{message:?}");
        assert!(message.starts_with("OK Geolocating"));
        assert!(message.ends_with("1/2 located"));
    }
}
