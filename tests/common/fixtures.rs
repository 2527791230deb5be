#![allow(dead_code)]

use cupbench::config::LearnedConfig;
use cupbench::detection::{Detector, LearnedDetector, ObjectModel, RawObject};
use cupbench::models::{BoundingBox, Detection, DetectorKind, DetectorResult, ImageRecord};
use cupbench::{BenchError, Result};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::cell::Cell;
use std::path::{Path, PathBuf};

pub const BACKGROUND: Rgb<u8> = Rgb([40, 40, 50]);
pub const DISC: Rgb<u8> = Rgb([225, 225, 215]);

/// A bright filled disc on a dark background.
pub fn disc_image(width: u32, height: u32, center: (i32, i32), radius: i32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    draw_filled_circle_mut(&mut img, center, radius, DISC);
    DynamicImage::ImageRgb8(img)
}

/// A disc at the same relative position and size for any image size.
pub fn scaled_disc_image(width: u32, height: u32) -> (DynamicImage, Detection) {
    let short = width.min(height) as f32;
    let cx = (width as f32 * 0.45) as i32;
    let cy = (height as f32 * 0.5) as i32;
    let r = (short * 0.25) as i32;
    let img = disc_image(width, height, (cx, cy), r);
    (img, Detection::new(cx as f32, cy as f32, r as f32))
}

pub fn flat_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

/// A smooth horizontal ramp: strong texture-free edges nowhere.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, _| {
        let v = (x * 255 / width.max(1)) as u8;
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(img)
}

/// Saves a synthetic disc image under `dir` and returns its path.
pub fn write_disc_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    disc_image(400, 300, (190, 150), 80)
        .save(&path)
        .expect("Failed to save test image");
    path
}

pub fn raw(category: &str, score: f32, bbox: (f32, f32, f32, f32)) -> RawObject {
    RawObject {
        category: category.to_string(),
        score,
        bbox: BoundingBox {
            x: bbox.0,
            y: bbox.1,
            width: bbox.2,
            height: bbox.3,
        },
    }
}

/// Returns the same objects for every image.
pub struct StubModel {
    pub objects: Vec<RawObject>,
    pub calls: Cell<usize>,
}

impl StubModel {
    pub fn new(objects: Vec<RawObject>) -> Self {
        Self {
            objects,
            calls: Cell::new(0),
        }
    }
}

impl ObjectModel for StubModel {
    fn infer(&self, _image: &RgbImage) -> Result<Vec<RawObject>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.objects.clone())
    }
}

pub struct FailingModel;

impl ObjectModel for FailingModel {
    fn infer(&self, _image: &RgbImage) -> Result<Vec<RawObject>> {
        Err(BenchError::Model("inference backend unavailable".into()))
    }
}

pub fn learned_with(objects: Vec<RawObject>) -> LearnedDetector {
    LearnedDetector::new(Box::new(StubModel::new(objects)), LearnedConfig::default())
}

/// Replays a fixed list of answers, one per call, then reports nothing.
pub struct ScriptedDetector {
    pub kind: DetectorKind,
    pub name: String,
    pub script: Vec<Option<Detection>>,
    pub calls: Cell<usize>,
}

impl ScriptedDetector {
    pub fn new(kind: DetectorKind, script: Vec<Option<Detection>>) -> Self {
        Self {
            kind,
            name: format!("scripted {:?}", kind),
            script,
            calls: Cell::new(0),
        }
    }
}

impl Detector for ScriptedDetector {
    fn kind(&self) -> DetectorKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Option<Detection>> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        Ok(self.script.get(call).cloned().flatten())
    }
}

/// Always fails, to check that detector errors abort a run.
pub struct BrokenDetector;

impl Detector for BrokenDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Learned
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Option<Detection>> {
        Err(BenchError::Model("weights corrupted".into()))
    }
}

pub fn hit(x: f32, y: f32, r: f32, ms: f64) -> DetectorResult {
    DetectorResult {
        detection: Some(Detection::new(x, y, r)),
        elapsed_ms: ms,
    }
}

pub fn miss(ms: f64) -> DetectorResult {
    DetectorResult {
        detection: None,
        elapsed_ms: ms,
    }
}

pub fn record(image_id: &str, results: Vec<DetectorResult>) -> ImageRecord {
    let stem = image_id
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(image_id)
        .to_string();
    ImageRecord {
        image_id: image_id.to_string(),
        stem,
        results,
    }
}
