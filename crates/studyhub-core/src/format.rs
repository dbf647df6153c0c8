//! Display helpers shared by the terminal front ends

/// Format a second count as a `MM:SS` clock.
///
/// Minutes are not wrapped into hours, so a 60 minute session reads `60:00`.
pub fn clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Render a fixed-width progress bar for a fraction in `[0, 1]`.
///
/// Out-of-range and NaN fractions are clamped so the bar is always `width`
/// cells wide.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let filled = ((width as f64) * fraction).round() as usize;
    let empty = width - filled.min(width);
    format!(
        "{}{}",
        "\u{2588}".repeat(filled.min(width)), // filled blocks
        "\u{2591}".repeat(empty)               // empty blocks
    )
}

/// Split a minute count into `(hours, minutes)`.
pub fn hours_minutes(total_minutes: u32) -> (u32, u32) {
    (total_minutes / 60, total_minutes % 60)
}
