//! # Formatting Helpers
//!
//! Time-unit selection, column alignment and histogram bars used by the
//! report renderer.
//!
//! ## Unit Selection
//!
//! A report is printed in exactly one unit, picked from the mean duration so
//! that the mean keeps a useful number of significant digits:
//!
//! | mean            | unit |
//! |-----------------|------|
//! | < 1µs           | ns   |
//! | < 1ms           | µs   |
//! | < 1s            | ms   |
//! | < 1min          | s    |
//! | < 1h            | min  |
//! | otherwise       | h    |
//!
//! ```rust
//! use cmd_timer::utils::TimeUnit;
//!
//! assert_eq!(TimeUnit::for_mean(0.0005), TimeUnit::Microsecond);
//! assert_eq!(TimeUnit::for_mean(5.0), TimeUnit::Second);
//! assert_eq!(TimeUnit::Millisecond.scale(0.25), 250.0);
//! ```

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Display unit for every duration in a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    /// Pick the unit for a mean given in seconds.
    pub fn for_mean(mean_secs: f64) -> Self {
        if mean_secs < 1e-6 {
            TimeUnit::Nanosecond
        } else if mean_secs < 1e-3 {
            TimeUnit::Microsecond
        } else if mean_secs < 1.0 {
            TimeUnit::Millisecond
        } else if mean_secs < 60.0 {
            TimeUnit::Second
        } else if mean_secs < 60.0 * 60.0 {
            TimeUnit::Minute
        } else {
            TimeUnit::Hour
        }
    }

    /// Length of one unit in nanoseconds.
    pub fn nanos(self) -> u128 {
        match self {
            TimeUnit::Nanosecond => 1,
            TimeUnit::Microsecond => 1_000,
            TimeUnit::Millisecond => 1_000_000,
            TimeUnit::Second => 1_000_000_000,
            TimeUnit::Minute => 60 * 1_000_000_000,
            TimeUnit::Hour => 60 * 60 * 1_000_000_000,
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(self) -> f64 {
        self.nanos() as f64 / 1e9
    }

    /// Convert a value in seconds into this unit.
    pub fn scale(self, secs: f64) -> f64 {
        secs * 1e9 / self.nanos() as f64
    }

    /// Whole units contained in `duration`, discarding the remainder.
    pub fn truncate(self, duration: Duration) -> u128 {
        duration.as_nanos() / self.nanos()
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanosecond => "ns",
            TimeUnit::Microsecond => "µs",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Format a scaled figure with the report's fixed precision.
pub fn format_value(value: f64) -> String {
    format!("{:.*}", crate::defaults::DISPLAY_PRECISION, value)
}

/// Lay out rows so that every column starts at the same offset.
///
/// Each column is padded to its widest cell plus `padding` spaces; the last
/// cell of a row is never padded. Widths are measured in characters so that
/// block glyphs and `µ` align like ASCII.
pub fn align_rows(rows: &[Vec<String>], padding: usize) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        // The final cell does not influence alignment.
        for (i, cell) in row.iter().enumerate().take(row.len().saturating_sub(1)) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    let width = widths[i] + padding;
                    line.push_str(cell);
                    line.push_str(&" ".repeat(width - cell.chars().count()));
                }
            }
            line
        })
        .collect()
}

const EIGHTHS: [char; 8] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Horizontal bar for `count`, scaled linearly so `max` fills `width` cells.
///
/// Partial cells are drawn with eighth-block glyphs; any non-zero count
/// shows at least a sliver.
pub fn render_bar(count: usize, max: usize, width: usize) -> String {
    if count == 0 || max == 0 || width == 0 {
        return String::new();
    }

    let eighths = ((count.min(max) as f64 / max as f64) * (width * 8) as f64).round() as usize;
    let eighths = eighths.max(1);
    let full = eighths / 8;
    let remainder = eighths % 8;

    let mut bar = "█".repeat(full);
    if remainder > 0 {
        bar.push(EIGHTHS[remainder - 1]);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_thresholds() {
        assert_eq!(TimeUnit::for_mean(5e-7), TimeUnit::Nanosecond);
        assert_eq!(TimeUnit::for_mean(0.0005), TimeUnit::Microsecond);
        assert_eq!(TimeUnit::for_mean(0.005), TimeUnit::Millisecond);
        assert_eq!(TimeUnit::for_mean(0.999), TimeUnit::Millisecond);
        assert_eq!(TimeUnit::for_mean(1.0), TimeUnit::Second);
        assert_eq!(TimeUnit::for_mean(5.0), TimeUnit::Second);
        assert_eq!(TimeUnit::for_mean(90.0), TimeUnit::Minute);
        assert_eq!(TimeUnit::for_mean(7200.0), TimeUnit::Hour);
        assert_eq!(TimeUnit::for_mean(3.0 * 86_400.0), TimeUnit::Hour);
    }

    #[test]
    fn test_unit_selection_is_monotonic() {
        let means = [1e-9, 1e-7, 1e-5, 1e-4, 1e-2, 0.5, 2.0, 30.0, 600.0, 1e5];
        let units: Vec<TimeUnit> = means.iter().map(|&m| TimeUnit::for_mean(m)).collect();
        for pair in units.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_scale_and_truncate() {
        assert_eq!(TimeUnit::Millisecond.scale(1.5), 1500.0);
        assert_eq!(TimeUnit::Minute.scale(90.0), 1.5);
        assert_eq!(TimeUnit::Millisecond.truncate(Duration::from_micros(2_999)), 2);
        assert_eq!(TimeUnit::Second.truncate(Duration::from_millis(59_999)), 59);
        assert_eq!(TimeUnit::Nanosecond.truncate(Duration::from_nanos(7)), 7);
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(TimeUnit::Microsecond.to_string(), "µs");
        assert_eq!(TimeUnit::Minute.to_string(), "min");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.23456), "1.235");
        assert_eq!(format_value(0.0), "0.000");
    }

    #[test]
    fn test_align_rows() {
        let rows = vec![
            vec!["command".to_string(), "true".to_string()],
            vec!["iterations".to_string(), "5".to_string()],
        ];
        let lines = align_rows(&rows, 4);
        assert_eq!(lines[0], "command       true");
        assert_eq!(lines[1], "iterations    5");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0, 10, 16), "");
        assert_eq!(render_bar(10, 10, 16), "█".repeat(16));
        assert_eq!(render_bar(5, 10, 16), "█".repeat(8));
        assert_eq!(render_bar(1, 1000, 16), "▏");
        assert_eq!(render_bar(3, 16, 16).chars().count(), 3);
    }
}
