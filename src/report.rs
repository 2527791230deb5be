//! Hit rates, latencies and the fixed-column text table.

use std::fmt;

use crate::models::{DetectorResult, Report};

const IMAGE_COL: usize = 22;
const DETECTION_COL: usize = 24;
const MS_COL: usize = 5;
const NO_DETECTION: &str = "—";

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorStats {
    pub name: String,
    pub hits: usize,
    pub total: usize,
    pub avg_latency_ms: f64,
}

impl DetectorStats {
    pub fn hit_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64
        }
    }

    /// `"<hits>/<total>"`
    pub fn hit_fraction(&self) -> String {
        format!("{}/{}", self.hits, self.total)
    }
}

/// Aggregates over a whole run, one entry per detector column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub image_count: usize,
    pub detectors: Vec<DetectorStats>,
}

impl Stats {
    pub fn get(&self, name: &str) -> Option<&DetectorStats> {
        self.detectors.iter().find(|d| d.name == name)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rates: Vec<String> = self
            .detectors
            .iter()
            .map(|d| format!("{} {}", d.name, d.hit_fraction()))
            .collect();
        let latencies: Vec<String> = self
            .detectors
            .iter()
            .map(|d| format!("{} {:.0}ms", d.name, d.avg_latency_ms))
            .collect();
        writeln!(f, "Detection rate:  {}", rates.join("  |  "))?;
        write!(f, "Avg latency:     {}", latencies.join("  |  "))
    }
}

/// Hit counts and mean latency per detector. Every record counts; a missing
/// detection is a miss, and an empty report gives zeros.
pub fn aggregate(report: &Report) -> Stats {
    let total = report.records.len();
    let detectors = report
        .detectors
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let results: Vec<&DetectorResult> = report
                .records
                .iter()
                .filter_map(|r| r.results.get(col))
                .collect();
            let hits = results.iter().filter(|r| r.is_hit()).count();
            let elapsed: f64 = results.iter().map(|r| r.elapsed_ms).sum();
            DetectorStats {
                name: name.clone(),
                hits,
                total,
                avg_latency_ms: if total == 0 {
                    0.0
                } else {
                    elapsed / total as f64
                },
            }
        })
        .collect();

    Stats {
        image_count: total,
        detectors,
    }
}

/// The printable table: header, one row per image, one totals line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub header: String,
    pub rows: Vec<String>,
    pub totals: String,
}

impl ReportTable {
    fn width(&self) -> usize {
        self.header.chars().count()
    }
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(self.width());
        let light = "-".repeat(self.width());
        writeln!(f, "{}", heavy)?;
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{}", light)?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        writeln!(f, "{}", light)?;
        writeln!(f, "{}", self.totals)?;
        write!(f, "{}", heavy)
    }
}

fn describe(result: Option<&DetectorResult>) -> (String, f64) {
    match result {
        Some(r) => (
            r.detection
                .as_ref()
                .map(|d| d.describe())
                .unwrap_or_else(|| NO_DETECTION.to_string()),
            r.elapsed_ms,
        ),
        None => (NO_DETECTION.to_string(), 0.0),
    }
}

pub fn render_table(report: &Report, stats: &Stats) -> ReportTable {
    let mut header = format!("{:<IMAGE_COL$}", "Image");
    for name in &report.detectors {
        header.push_str(&format!(" {:^DETECTION_COL$} {:>MS_COL$} ", name, "ms"));
    }
    let header = header.trim_end().to_string();

    let rows = report
        .records
        .iter()
        .map(|record| {
            let mut line = format!("{:<IMAGE_COL$}", record.image_id);
            for col in 0..report.detectors.len() {
                let (text, ms) = describe(record.results.get(col));
                line.push_str(&format!(" {:<DETECTION_COL$} {:>MS_COL$.0} ", text, ms));
            }
            line.trim_end().to_string()
        })
        .collect();

    let mut totals = format!("{:<IMAGE_COL$}", "TOTAL");
    for s in &stats.detectors {
        let hits = format!("{} detected", s.hit_fraction());
        totals.push_str(&format!(
            " {:<DETECTION_COL$} {:>MS_COL$.0} ",
            hits, s.avg_latency_ms
        ));
    }
    let totals = totals.trim_end().to_string();

    ReportTable {
        header,
        rows,
        totals,
    }
}
