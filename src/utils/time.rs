use chrono::{DateTime, Utc};

/// Format a timestamp for display in key records
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Time remaining until `end`, in human-readable form
pub fn duration_human(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    let seconds = end.signed_duration_since(*start).num_seconds();

    if seconds <= 0 {
        "expired".to_string()
    } else if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{:.1} hours", seconds as f64 / 3600.0)
    } else {
        format!("{:.1} days", seconds as f64 / 86400.0)
    }
}
