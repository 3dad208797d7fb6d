//! Display formatting for quantities, progress and elapsed times.
//!
//! Shared by the replay tool and anything else that renders list state, so
//! the same numbers read the same way everywhere.

/// Format a quantity with thousands separators.
///
/// # Examples
/// ```
/// use tally_types::formatting::format_quantity;
/// assert_eq!(format_quantity(0), "0");
/// assert_eq!(format_quantity(999), "999");
/// assert_eq!(format_quantity(1_500), "1,500");
/// assert_eq!(format_quantity(1_500_000), "1,500,000");
/// ```
pub fn format_quantity(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format craft progress as `fulfilled/required`.
///
/// # Examples
/// ```
/// use tally_types::formatting::format_progress;
/// assert_eq!(format_progress(3, 5), "3/5");
/// assert_eq!(format_progress(1_200, 2_000), "1,200/2,000");
/// ```
pub fn format_progress(fulfilled: u32, required: u32) -> String {
    format!(
        "{}/{}",
        format_quantity(fulfilled as u64),
        format_quantity(required as u64)
    )
}

/// Format a percentage from count/total with 1 decimal place, capped at 100%.
///
/// Returns `0%` when total is zero.
///
/// # Examples
/// ```
/// use tally_types::formatting::format_pct_ratio;
/// assert_eq!(format_pct_ratio(3, 10), "30.0%");
/// assert_eq!(format_pct_ratio(12, 10), "100.0%");
/// assert_eq!(format_pct_ratio(0, 0), "0%");
/// ```
pub fn format_pct_ratio(count: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    let pct = (count as f64 / total as f64 * 100.0).min(100.0);
    format!("{:.1}%", pct)
}

/// Format a duration as `M:SS` from seconds.
///
/// # Examples
/// ```
/// use tally_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format how long ago something was seen, in the coarsest sensible unit.
///
/// # Examples
/// ```
/// use tally_types::formatting::format_elapsed;
/// assert_eq!(format_elapsed(5), "just now");
/// assert_eq!(format_elapsed(90), "1m ago");
/// assert_eq!(format_elapsed(7_300), "2h ago");
/// ```
pub fn format_elapsed(secs: i64) -> String {
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
