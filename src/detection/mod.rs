pub mod preprocessing;
pub mod hough;
pub mod circles;
pub mod objects;
pub mod rten_model;

use image::DynamicImage;

use crate::error::Result;
use crate::models::{Detection, DetectorKind};

pub use circles::GeometricDetector;
pub use objects::{LearnedDetector, ObjectModel, RawObject};
pub use rten_model::RtenObjectModel;

/// Anything that turns an image into at most one circular detection.
///
/// `Ok(None)` means nothing was found. `Err` means the detector itself
/// malfunctioned and must not be mistaken for an empty scene.
pub trait Detector {
    fn kind(&self) -> DetectorKind;

    /// Human-readable name (used in diagnostics)
    fn name(&self) -> &str;

    fn detect(&self, image: &DynamicImage) -> Result<Option<Detection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn kind(&self) -> DetectorKind {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, image: &DynamicImage) -> Result<Option<Detection>> {
        (**self).detect(image)
    }
}
