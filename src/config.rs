//! Run parameters.
//!
//! Every field has a default matching the reference benchmark setup, so a
//! JSON file only needs to name the values it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::models::DetectorKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub canvas: CanvasConfig,
    pub geometric: HoughConfig,
    pub learned: LearnedConfig,
    pub output: OutputConfig,
    pub style: StyleConfig,
}

impl BenchConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: BenchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(BenchError::Config("canvas size must be non-zero".into()));
        }
        if self.canvas.title_bar_height > self.canvas.height {
            return Err(BenchError::Config(
                "title bar is taller than the canvas".into(),
            ));
        }
        if self.geometric.working_size == 0 {
            return Err(BenchError::Config("working_size must be non-zero".into()));
        }
        if self.geometric.blur_sigma <= 0.0 {
            return Err(BenchError::Config("blur_sigma must be positive".into()));
        }
        if self.geometric.dp < 1.0 {
            return Err(BenchError::Config("dp must be >= 1.0".into()));
        }
        if self.geometric.min_radius_frac > self.geometric.max_radius_frac {
            return Err(BenchError::Config(
                "min_radius_frac exceeds max_radius_frac".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.learned.score_threshold) {
            return Err(BenchError::Config(
                "score_threshold must be within [0, 1]".into(),
            ));
        }
        if !(self.output.final_scale > 0.0 && self.output.final_scale <= 1.0) {
            return Err(BenchError::Config(
                "final_scale must be within (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Panel and grid geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub title_bar_height: u32,
    /// Vertical space reserved above the first grid row.
    pub header_height: u32,
    /// Height of the filled band inside the header space.
    pub header_bar_height: u32,
    pub background: [u8; 3],
    pub grid_background: [u8; 3],
    pub header_background: [u8; 3],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
            title_bar_height: 28,
            header_height: 40,
            header_bar_height: 36,
            background: [20, 20, 30],
            grid_background: [12, 12, 20],
            header_background: [30, 30, 45],
        }
    }
}

/// Parameters of the gradient-voting circle search.
///
/// Radii and the minimum center distance are fractions of the shorter side
/// of the downscaled working image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Longer side of the working image, in pixels.
    pub working_size: u32,
    pub blur_sigma: f32,
    /// Inverse accumulator resolution.
    pub dp: f32,
    pub min_dist_frac: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f32,
    pub acc_threshold: u32,
    pub min_radius_frac: f32,
    pub max_radius_frac: f32,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            working_size: 320,
            blur_sigma: 1.1,
            dp: 1.2,
            min_dist_frac: 0.3,
            canny_high: 80.0,
            acc_threshold: 30,
            min_radius_frac: 0.10,
            max_radius_frac: 0.48,
        }
    }
}

/// How a rectangular box is turned into a circle radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRadius {
    /// Inscribed circle.
    #[default]
    HalfShorterSide,
    /// Circumscribed on the longer axis.
    HalfLongerSide,
    /// Mean of both half sides.
    MeanHalfSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnedConfig {
    pub score_threshold: f32,
    pub max_results: usize,
    pub allow_list: Vec<String>,
    pub box_radius: BoxRadius,
    /// Model input size (width, height).
    pub input_size: (u32, u32),
    /// Optional label map, one category per line, indexed by class id.
    pub labels_path: Option<PathBuf>,
}

impl Default for LearnedConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.25,
            max_results: 10,
            allow_list: ["cup", "bowl", "wine glass", "bottle", "vase"]
                .into_iter()
                .map(String::from)
                .collect(),
            box_radius: BoxRadius::default(),
            input_size: (320, 320),
            labels_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Restrict inputs to file names starting with this prefix.
    pub input_prefix: Option<String>,
    pub composite_quality: u8,
    pub grid_quality: u8,
    pub stats_bar_height: u32,
    pub final_scale: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            input_prefix: None,
            composite_quality: 88,
            grid_quality: 90,
            stats_bar_height: 58,
            final_scale: 0.5,
        }
    }
}

/// Per-column appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStyle {
    /// Short name used in panel titles and the report table.
    pub name: String,
    /// Column header in the aggregate grid.
    pub header: String,
    pub accent: [u8; 3],
    pub header_color: [u8; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub geometric: ColumnStyle,
    pub learned: ColumnStyle,
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
}

impl StyleConfig {
    pub fn column(&self, kind: DetectorKind) -> &ColumnStyle {
        match kind {
            DetectorKind::Geometric => &self.geometric,
            DetectorKind::Learned => &self.learned,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            geometric: ColumnStyle {
                name: "Hough".to_string(),
                header: "Hough circles (classical)".to_string(),
                accent: [100, 180, 255],
                header_color: [180, 220, 255],
            },
            learned: ColumnStyle {
                name: "Detector".to_string(),
                header: "Learned object detector".to_string(),
                accent: [100, 255, 160],
                header_color: [180, 255, 200],
            },
            font_path: None,
            font_size: 14.0,
        }
    }
}
