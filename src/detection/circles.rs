use image::{DynamicImage, GenericImageView};
use tracing::debug;

use super::hough::{self, HoughParams};
use super::{Detector, preprocessing};
use crate::config::HoughConfig;
use crate::error::Result;
use crate::models::{Detection, DetectorKind};
use crate::normalize;

/// Classical circle finder: downscale, grayscale, blur, gradient voting.
#[derive(Debug, Clone)]
pub struct GeometricDetector {
    pub config: HoughConfig,
}

impl GeometricDetector {
    pub fn new(config: HoughConfig) -> Self {
        Self { config }
    }

    /// Search parameters for a working image of the given size.
    pub fn params_for(&self, width: u32, height: u32) -> HoughParams {
        let short = width.min(height) as f32;
        HoughParams {
            dp: self.config.dp,
            min_dist: short * self.config.min_dist_frac,
            canny_high: self.config.canny_high,
            acc_threshold: self.config.acc_threshold,
            min_radius: (short * self.config.min_radius_frac) as u32,
            max_radius: (short * self.config.max_radius_frac) as u32,
        }
    }

    /// Blur applied at working scale. Upscaled inputs get a wider kernel so
    /// the enlarged pixel staircase does not bend gradient directions.
    pub fn blur_sigma_for(&self, scale: f32) -> f32 {
        if scale > 1.0 {
            self.config.blur_sigma * scale.sqrt()
        } else {
            self.config.blur_sigma
        }
    }

    /// Most prominent circle in original image coordinates, if any.
    pub fn find(&self, img: &DynamicImage) -> Option<Detection> {
        let (small, scale) = preprocessing::to_working_size(img, self.config.working_size);
        let gray = preprocessing::to_grayscale(&small);
        let blurred = preprocessing::apply_blur(&gray, self.blur_sigma_for(scale));

        let (sw, sh) = small.dimensions();
        let params = self.params_for(sw, sh);
        let circles = hough::find_circles(&blurred, &params);
        debug!(
            candidates = circles.len(),
            min_radius = params.min_radius,
            max_radius = params.max_radius,
            "circle search finished"
        );

        let best = circles.first()?;
        Some(normalize::from_scaled_circle(
            best.x,
            best.y,
            best.radius,
            scale,
        ))
    }
}

impl Default for GeometricDetector {
    fn default() -> Self {
        Self::new(HoughConfig::default())
    }
}

impl Detector for GeometricDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Geometric
    }

    fn name(&self) -> &str {
        "Hough circles"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Option<Detection>> {
        Ok(self.find(image))
    }
}
