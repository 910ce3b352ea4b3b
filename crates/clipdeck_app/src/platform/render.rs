//! Plain-text rendering of the upload page and the background indicator.

use clipdeck_core::{Stage, UploadRowView, UploadViewModel};
use clipdeck_engine::TrackerView;

const BAR_WIDTH: usize = 24;

pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn format_duration(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, (seconds / 60) % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

fn row_status(stage: Stage, local_progress: f64, error: Option<&str>) -> String {
    match stage {
        Stage::Error => format!("failed: {}", error.unwrap_or("unknown error")),
        Stage::Idle | Stage::Complete => stage.description().to_string(),
        _ => format!("{} {:.0}%", stage.description(), local_progress),
    }
}

fn page_row(row: &UploadRowView) -> String {
    let mut line = format!(
        "  #{:<3} {:<32} {}",
        row.id,
        row.display_name,
        row_status(row.stage, row.local_progress, row.error_message.as_deref())
    );
    if let Some(seconds) = row.duration_seconds {
        line.push_str(&format!(" ({})", format_duration(seconds)));
    }
    line
}

/// Upload page: one line per item and an overall bar while processing.
pub fn page_lines(view: &UploadViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.items.len() + 1);
    if view.is_processing || view.all_finished {
        lines.push(format!(
            "Upload {} {:.0}%",
            progress_bar(view.aggregate_progress, BAR_WIDTH),
            view.aggregate_progress
        ));
    }
    lines.extend(view.items.iter().map(page_row));
    lines
}

/// Background indicator. Empty when nothing is being tracked.
pub fn toast_lines(view: &TrackerView) -> Vec<String> {
    if !view.is_active {
        return Vec::new();
    }

    let heading = if view.all_finished() {
        match view.failed_count() {
            0 => format!("All {} videos processed", view.completed_count()),
            failed => format!(
                "{} processed, {} failed",
                view.completed_count(),
                failed
            ),
        }
    } else {
        format!("Processing {} videos in background", view.items.len())
    };

    let mut lines = vec![
        heading,
        format!(
            "{} {:.0}%",
            progress_bar(view.aggregate_progress, BAR_WIDTH),
            view.aggregate_progress
        ),
    ];
    lines.extend(view.items.iter().map(|item| {
        format!(
            "  {:<32} {}",
            item.display_name,
            row_status(item.stage, item.local_progress, item.error_message.as_deref())
        )
    }));
    lines
}
