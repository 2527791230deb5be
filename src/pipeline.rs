use image::{DynamicImage, Rgb};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::artifacts;
use crate::config::BenchConfig;
use crate::detection::Detector;
use crate::error::{BenchError, Result};
use crate::models::{ComparisonRow, DetectorResult, ImageRecord, Report};
use crate::normalize;
use crate::render::{ColumnHeader, ComparisonAssembler, PanelRenderer, StatsBar, TextRenderer};
use crate::report::{self, Stats};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub stats: Stats,
    /// Written files, in write order.
    pub artifacts: Vec<PathBuf>,
    /// Inputs that could not be read.
    pub skipped: Vec<PathBuf>,
}

impl RunOutcome {
    pub fn table(&self) -> report::ReportTable {
        report::render_table(&self.report, &self.stats)
    }
}

/// Single-threaded comparison run over a directory of images.
///
/// Detectors are constructed by the caller, added once, and reused for every
/// image. Columns follow [`crate::models::DetectorKind`] order whatever the
/// insertion order.
pub struct Pipeline {
    config: BenchConfig,
    detectors: Vec<Box<dyn Detector>>,
    text: TextRenderer,
}

impl Pipeline {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            detectors: Vec::new(),
            text: TextRenderer::none(),
        }
    }

    pub fn with_text_renderer(mut self, text: TextRenderer) -> Self {
        self.text = text;
        self
    }

    /// Add a detector column.
    pub fn add_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        // stable: same-kind detectors keep insertion order
        self.detectors.sort_by_key(|d| d.kind());
        self
    }

    /// Column names, in column order.
    pub fn detector_names(&self) -> Vec<String> {
        self.detectors
            .iter()
            .map(|d| self.config.style.column(d.kind()).name.clone())
            .collect()
    }

    fn headers(&self) -> Vec<ColumnHeader> {
        self.detectors
            .iter()
            .map(|d| {
                let style = self.config.style.column(d.kind());
                ColumnHeader {
                    title: style.header.clone(),
                    color: Rgb(style.header_color),
                }
            })
            .collect()
    }

    fn stat_columns(&self) -> Vec<ColumnHeader> {
        self.detectors
            .iter()
            .map(|d| {
                let style = self.config.style.column(d.kind());
                ColumnHeader {
                    title: style.header.clone(),
                    color: Rgb(style.accent),
                }
            })
            .collect()
    }

    pub fn panel_renderer(&self) -> PanelRenderer {
        PanelRenderer::new(self.config.canvas.clone(), self.text.clone())
    }

    pub fn assembler(&self) -> ComparisonAssembler {
        ComparisonAssembler::new(self.config.canvas.clone(), self.text.clone(), self.headers())
    }

    /// Run every detector on one decoded image, timing each call on its own,
    /// and render its panels.
    pub fn process_image(
        &self,
        renderer: &PanelRenderer,
        image_id: &str,
        stem: &str,
        image: &DynamicImage,
    ) -> Result<(ImageRecord, ComparisonRow)> {
        let mut results: Vec<DetectorResult> = Vec::with_capacity(self.detectors.len());
        let mut panels = Vec::with_capacity(self.detectors.len());

        for detector in &self.detectors {
            let result = normalize::timed(|| detector.detect(image)).map_err(|e| {
                BenchError::Detector {
                    detector: detector.name().to_string(),
                    image: image_id.to_string(),
                    message: e.to_string(),
                }
            })?;

            let style = self.config.style.column(detector.kind());
            info!(
                "  {:<10} {}  ({:.0}ms)",
                style.name,
                result
                    .detection
                    .as_ref()
                    .map(|d| d.describe())
                    .unwrap_or_else(|| "none".to_string()),
                result.elapsed_ms
            );
            debug!(detector = detector.name(), detection = ?result.detection);

            let title = format!("{}  |  {:.0}ms  |  {}", style.name, result.elapsed_ms, stem);
            let panel = renderer.render(image, &result, result.label(), Rgb(style.accent), &title);
            results.push(result);
            panels.push(panel);
        }

        let record = ImageRecord {
            image_id: image_id.to_string(),
            stem: stem.to_string(),
            results,
        };
        let row = ComparisonRow {
            image_id: stem.to_string(),
            panels,
        };
        Ok((record, row))
    }

    /// Process every image in `input_dir` and write all artifacts to
    /// `output_dir`. Unreadable images are skipped; a failing detector aborts
    /// the run.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<RunOutcome> {
        if self.detectors.is_empty() {
            return Err(BenchError::Config("no detectors configured".into()));
        }
        std::fs::create_dir_all(output_dir)?;

        let output = &self.config.output;
        let inputs = artifacts::list_images(input_dir, output.input_prefix.as_deref())?;
        info!("Found {} images in {}", inputs.len(), input_dir.display());

        let renderer = self.panel_renderer();
        let assembler = self.assembler();

        let mut report = Report::new(self.detector_names());
        let mut rows = Vec::with_capacity(inputs.len());
        let mut written = Vec::new();
        let mut skipped = Vec::new();

        for path in inputs {
            let image_id = artifacts::file_name(&path);
            info!("Processing: {}", image_id);

            let image = match artifacts::load_image(&path) {
                Ok(img) => img,
                Err(e) => {
                    warn!("  skip (cannot read): {}", e);
                    skipped.push(path);
                    continue;
                }
            };

            let stem = artifacts::file_stem(&path);
            let (record, row) = self.process_image(&renderer, &image_id, &stem, &image)?;

            let composite = assembler.compose_row(&row)?;
            let out_path = artifacts::composite_path(output_dir, &stem);
            artifacts::save_jpeg(&composite, &out_path, output.composite_quality)?;
            info!("  saved: {}", out_path.display());
            written.push(out_path);

            rows.push(row);
            report.push(record);
        }

        let grid = assembler.assemble(&rows)?;
        let grid_path = output_dir.join(artifacts::GRID_FILE);
        artifacts::save_jpeg(&grid, &grid_path, output.grid_quality)?;
        info!(
            "Summary: {}  ({}x{})",
            grid_path.display(),
            grid.width(),
            grid.height()
        );
        written.push(grid_path);

        let stats = report::aggregate(&report);

        let bar = StatsBar::new(
            output.stats_bar_height,
            Rgb(self.config.canvas.grid_background),
            self.text.clone(),
        );
        let final_image =
            bar.compose_final(&grid, &stats, &self.stat_columns(), output.final_scale);
        let final_path = output_dir.join(artifacts::FINAL_FILE);
        let bytes = artifacts::save_jpeg(&final_image, &final_path, output.grid_quality)?;
        info!(
            "Saved: {}  ({}x{})  {}KB",
            final_path.display(),
            final_image.width(),
            final_image.height(),
            bytes / 1024
        );
        written.push(final_path);

        Ok(RunOutcome {
            report,
            stats,
            artifacts: written,
            skipped,
        })
    }
}
