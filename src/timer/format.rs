//! Duration formatting helpers

/// Label shown in place of the remaining time once a run has completed
pub const DONE_LABEL: &str = "Done";

/// Format a number of seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
///
/// Negative values are clamped to zero.
pub fn format_duration(seconds: i64) -> String {
    let total = seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
