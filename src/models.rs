use image::RgbImage;

/// Which family a detector belongs to. The derived order is the fixed column
/// order of every composite and of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetectorKind {
    Geometric,
    Learned,
}

/// A circular region found by a detector, in original image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub label: Option<String>,
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius: radius.max(0.0),
            label: None,
            confidence: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Short text form: the label when present, otherwise `(x,y) r=R`.
    pub fn describe(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!(
                "({},{}) r={}",
                self.x as i32, self.y as i32, self.radius as i32
            ),
        }
    }
}

/// Axis-aligned box in image pixels, as produced by the object model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn longer_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// Timed outcome of one detector on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResult {
    pub detection: Option<Detection>,
    pub elapsed_ms: f64,
}

impl DetectorResult {
    pub fn is_hit(&self) -> bool {
        self.detection.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.detection.as_ref().and_then(|d| d.label.as_deref())
    }
}

/// One rendered visualization of a single detector result.
///
/// Only the panel renderer builds these, so every panel has the configured
/// canvas size.
#[derive(Debug, Clone)]
pub struct Panel {
    image: RgbImage,
}

impl Panel {
    pub(crate) fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// The panels of one image, in column order.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub image_id: String,
    pub panels: Vec<Panel>,
}

/// Per-image results, in column order.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub image_id: String,
    pub stem: String,
    pub results: Vec<DetectorResult>,
}

/// All records of a run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub detectors: Vec<String>,
    pub records: Vec<ImageRecord>,
}

impl Report {
    pub fn new(detectors: Vec<String>) -> Self {
        Self {
            detectors,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ImageRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
