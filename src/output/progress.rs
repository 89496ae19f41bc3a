//! Spinner shown during foreground loads

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::OutputFormat;

/// Start a spinner on stderr in pretty mode; `None` for machine formats.
///
/// indicatif hides the bar when stderr is not a terminal.
pub fn spinner(format: OutputFormat, message: impl Into<String>) -> Option<ProgressBar> {
    if !matches!(format, OutputFormat::Pretty) {
        return None;
    }

    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

pub fn finish(bar: Option<ProgressBar>) {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
