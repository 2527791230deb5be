use image::{DynamicImage, RgbImage};
use tracing::debug;

use super::Detector;
use crate::config::LearnedConfig;
use crate::error::Result;
use crate::models::{BoundingBox, Detection, DetectorKind};
use crate::normalize;

/// One labeled box straight out of the object model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject {
    pub category: String,
    pub score: f32,
    pub bbox: BoundingBox,
}

/// A pretrained multi-class detector, treated as a black box.
///
/// Implementations run a single forward pass and return every object they
/// see, in their native order, with boxes in the pixel space of `image`.
pub trait ObjectModel {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawObject>>;
}

impl<M: ObjectModel + ?Sized> ObjectModel for Box<M> {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawObject>> {
        (**self).infer(image)
    }
}

/// Picks the most confident container-like object from an [`ObjectModel`].
pub struct LearnedDetector {
    model: Box<dyn ObjectModel>,
    config: LearnedConfig,
}

impl LearnedDetector {
    /// The model is loaded by the caller once and owned here for the run.
    pub fn new(model: Box<dyn ObjectModel>, config: LearnedConfig) -> Self {
        Self { model, config }
    }

    pub fn is_allowed(&self, category: &str) -> bool {
        self.config.allow_list.iter().any(|c| c == category)
    }

    /// Apply the score threshold and result cap, then the allow-list, and
    /// return the winner. Ties keep the first object in model order.
    pub fn select<'a>(&self, objects: &'a [RawObject]) -> Option<&'a RawObject> {
        let mut ranked: Vec<&RawObject> = objects
            .iter()
            .filter(|o| o.score >= self.config.score_threshold)
            .collect();
        // stable: equal scores stay in model order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.config.max_results);

        let mut best: Option<&RawObject> = None;
        for obj in ranked.into_iter().filter(|o| self.is_allowed(&o.category)) {
            match best {
                Some(b) if obj.score <= b.score => {}
                _ => best = Some(obj),
            }
        }
        best
    }

    /// Best allowed detection and its display label.
    pub fn detect_labeled(
        &self,
        image: &DynamicImage,
    ) -> Result<(Option<Detection>, Option<String>)> {
        let rgb = image.to_rgb8();
        let objects = self.model.infer(&rgb)?;
        debug!(objects = objects.len(), "object model finished");

        let Some(winner) = self.select(&objects) else {
            return Ok((None, None));
        };

        let label = normalize::format_label(&winner.category, winner.score);
        let detection = normalize::from_bounding_box(&winner.bbox, self.config.box_radius)
            .with_label(label.clone())
            .with_confidence(winner.score);
        Ok((Some(detection), Some(label)))
    }
}

impl Detector for LearnedDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Learned
    }

    fn name(&self) -> &str {
        "Object detector"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Option<Detection>> {
        let (detection, _) = self.detect_labeled(image)?;
        Ok(detection)
    }
}
