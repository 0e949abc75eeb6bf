use crate::{
    cli::RunConfig,
    metrics::{bucket_count_for, HistogramBucket, SummaryStats},
    utils::{align_rows, format_value, render_bar, TimeUnit},
};
use anyhow::Result;
use serde::Serialize;
use std::time::Duration;

/// Output format for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Column-aligned text sections
    Table,
    /// Pretty-printed JSON document
    Json,
}

/// Complete, unit-scaled result of a timing run
///
/// Every figure except the sample count is expressed in `unit`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    pub config: RunConfig,
    pub unit: TimeUnit,
    pub histogram: Vec<HistogramBucket>,
    pub summary: ReportSummary,
}

/// Summary figures of a run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub samples: usize,
    /// Wall-clock time of the whole run, truncated to whole units
    pub total: u64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub p75: f64,
    pub max: f64,
}

/// Run metadata for reproducibility
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
}

impl ReportMetadata {
    fn collect() -> Self {
        Self {
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
        }
    }
}

impl RunReport {
    /// Build the report for a finished run.
    ///
    /// The display unit is chosen from the mean; histogram bounds and all
    /// summary figures are converted into it.
    pub fn new(config: RunConfig, stats: &SummaryStats, total: Duration) -> Self {
        let unit = TimeUnit::for_mean(stats.mean());

        let histogram = stats
            .histogram(bucket_count_for(stats.count()))
            .iter()
            .map(|bucket| bucket.map_bounds(|secs| unit.scale(secs)))
            .collect();

        let summary = ReportSummary {
            samples: stats.count(),
            total: u64::try_from(unit.truncate(total)).unwrap_or(u64::MAX),
            mean: unit.scale(stats.mean()),
            median: unit.scale(stats.median()),
            std_dev: unit.scale(stats.std_dev()),
            min: unit.scale(stats.min()),
            p25: unit.scale(stats.quantile(0.25)),
            p75: unit.scale(stats.quantile(0.75)),
            max: unit.scale(stats.max()),
        };

        Self {
            metadata: ReportMetadata::collect(),
            config,
            unit,
            histogram,
            summary,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Table => Ok(self.render_table()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)? + "\n"),
        }
    }

    /// Render the config, histogram and summary sections.
    ///
    /// When the child's output was forwarded a blank line is emitted first so
    /// the report does not run into it.
    pub fn render_table(&self) -> String {
        let padding = crate::defaults::COLUMN_PADDING;
        let mut out = String::new();

        if !self.config.quiet() {
            out.push('\n');
        }

        push_section(
            &mut out,
            "config",
            &[
                vec!["command".to_string(), self.config.command_line()],
                vec![
                    "iterations".to_string(),
                    self.config.iterations().to_string(),
                ],
                vec![
                    "parallelism".to_string(),
                    self.config.parallelism().to_string(),
                ],
                vec!["unit".to_string(), self.unit.to_string()],
            ],
            padding,
        );

        push_section(&mut out, "histogram", &self.histogram_rows(), padding);

        push_section(
            &mut out,
            "summary",
            &[
                vec![
                    "total".to_string(),
                    format!("{}{}", self.summary.total, self.unit),
                ],
                vec!["mean".to_string(), format_value(self.summary.mean)],
                vec!["median".to_string(), format_value(self.summary.median)],
                vec!["stddev".to_string(), format_value(self.summary.std_dev)],
            ],
            padding,
        );

        out
    }

    fn histogram_rows(&self) -> Vec<Vec<String>> {
        let max_count = self.histogram.iter().map(|b| b.count).max().unwrap_or(0);
        let samples = self.summary.samples.max(1) as f64;

        self.histogram
            .iter()
            .map(|bucket| {
                vec![
                    format!(
                        "{} - {}",
                        format_value(bucket.lower),
                        format_value(bucket.upper)
                    ),
                    bucket.count.to_string(),
                    format!("{:.1}%", bucket.count as f64 * 100.0 / samples),
                    render_bar(bucket.count, max_count, crate::defaults::HISTOGRAM_BAR_WIDTH),
                ]
            })
            .collect()
    }
}

fn push_section(out: &mut String, title: &str, rows: &[Vec<String>], padding: usize) {
    out.push_str("--- ");
    out.push_str(title);
    out.push('\n');
    for line in align_rows(rows, padding) {
        out.push_str(line.trim_end());
        out.push('\n');
    }
}
