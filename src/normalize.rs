//! Conversion of native detector outputs into [`Detection`] records, and
//! timing of detector invocations into [`DetectorResult`]s.

use std::time::Instant;

use crate::config::BoxRadius;
use crate::error::Result;
use crate::models::{BoundingBox, Detection, DetectorResult};

/// A circle found at working scale, mapped back by dividing by `scale`.
pub fn from_scaled_circle(x: f32, y: f32, radius: f32, scale: f32) -> Detection {
    Detection::new(x / scale, y / scale, radius / scale)
}

/// Approximate a box by a circle at its center.
pub fn from_bounding_box(bbox: &BoundingBox, mode: BoxRadius) -> Detection {
    let (cx, cy) = bbox.center();
    let radius = match mode {
        BoxRadius::HalfShorterSide => bbox.shorter_side() / 2.0,
        BoxRadius::HalfLongerSide => bbox.longer_side() / 2.0,
        BoxRadius::MeanHalfSide => (bbox.width + bbox.height) / 4.0,
    };
    Detection::new(cx, cy, radius)
}

/// `"<category> (<percent>%)"`, percent rounded to an integer.
pub fn format_label(category: &str, score: f32) -> String {
    format!("{} ({:.0}%)", category, score * 100.0)
}

/// Run one detector call and time it. Only the call itself is measured.
pub fn timed<F>(detect: F) -> Result<DetectorResult>
where
    F: FnOnce() -> Result<Option<Detection>>,
{
    let start = Instant::now();
    let detection = detect()?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    Ok(DetectorResult {
        detection,
        elapsed_ms,
    })
}
