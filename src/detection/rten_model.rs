use image::RgbImage;
use image::imageops::{self, FilterType};
use rten::{Model, NodeId};
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::Path;

use super::objects::{ObjectModel, RawObject};
use crate::config::LearnedConfig;
use crate::error::{BenchError, Result};
use crate::models::BoundingBox;

/// COCO label map in the 90-id layout used by SSD/EfficientDet exports.
/// Unused ids are `???`.
pub const COCO_LABELS: [&str; 90] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "???", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "???", "backpack",
    "umbrella", "???", "???", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard",
    "sports ball", "kite", "baseball bat", "baseball glove", "skateboard", "surfboard",
    "tennis racket", "bottle", "???", "wine glass", "cup", "fork", "knife", "spoon", "bowl",
    "banana", "apple", "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut",
    "cake", "chair", "couch", "potted plant", "bed", "???", "dining table", "???", "???",
    "toilet", "???", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone", "microwave",
    "oven", "toaster", "sink", "refrigerator", "???", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Object detector exported to the `.rten` format with post-processing
/// included.
///
/// Expected graph: one `[1, 3, H, W]` float input in `[0, 1]`, and the first
/// three outputs being boxes `[1, N, 4]` (normalized `ymin, xmin, ymax,
/// xmax`), class ids `[1, N]` and scores `[1, N]`.
pub struct RtenObjectModel {
    model: Model,
    input_id: NodeId,
    output_ids: [NodeId; 3],
    input_size: (u32, u32),
    labels: Vec<String>,
}

impl RtenObjectModel {
    /// Load the model file once; the instance is reused for every image.
    pub fn load(path: &Path, config: &LearnedConfig) -> Result<Self> {
        if !path.exists() {
            return Err(BenchError::Model(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let model = Model::load_file(path).map_err(|e| {
            BenchError::Model(format!("failed to load {}: {}", path.display(), e))
        })?;

        let input_id = *model
            .input_ids()
            .first()
            .ok_or_else(|| BenchError::Model("model has no inputs".into()))?;
        let output_ids: [NodeId; 3] = match model.output_ids() {
            [boxes, classes, scores, ..] => [*boxes, *classes, *scores],
            other => {
                return Err(BenchError::Model(format!(
                    "expected at least 3 outputs (boxes, classes, scores), found {}",
                    other.len()
                )));
            }
        };

        let labels = match &config.labels_path {
            Some(p) => load_labels(p)?,
            None => COCO_LABELS.iter().map(|s| s.to_string()).collect(),
        };

        let (w, h) = config.input_size;
        if w == 0 || h == 0 {
            return Err(BenchError::Config("model input size must be non-zero".into()));
        }

        Ok(Self {
            model,
            input_id,
            output_ids,
            input_size: config.input_size,
            labels,
        })
    }

    fn category(&self, class_id: f32) -> String {
        let id = class_id.round();
        if id >= 0.0 {
            if let Some(label) = self.labels.get(id as usize) {
                return label.clone();
            }
        }
        format!("class {}", id as i64)
    }

    /// Resize to the model input and lay out as planar RGB.
    fn to_input(&self, image: &RgbImage) -> NdTensor<f32, 4> {
        let (w, h) = self.input_size;
        let resized = imageops::resize(image, w, h, FilterType::Triangle);
        let plane = (w * h) as usize;
        let mut data = vec![0.0f32; 3 * plane];
        for (i, px) in resized.pixels().enumerate() {
            for c in 0..3 {
                data[c * plane + i] = px[c] as f32 / 255.0;
            }
        }
        NdTensor::from_data([1, 3, h as usize, w as usize], data)
    }
}

impl ObjectModel for RtenObjectModel {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawObject>> {
        let (iw, ih) = image.dimensions();
        let input = self.to_input(image);

        let outputs = self
            .model
            .run(
                vec![(self.input_id, input.view().into())],
                &self.output_ids,
                None,
            )
            .map_err(|e| BenchError::Model(format!("inference failed: {}", e)))?;
        let [boxes, classes, scores]: [_; 3] = outputs
            .try_into()
            .map_err(|_| BenchError::Model("unexpected number of outputs".into()))?;

        let boxes: NdTensor<f32, 3> = boxes
            .try_into()
            .map_err(|e| BenchError::Model(format!("boxes output: {:?}", e)))?;
        let classes: NdTensor<f32, 2> = classes
            .try_into()
            .map_err(|e| BenchError::Model(format!("classes output: {:?}", e)))?;
        let scores: NdTensor<f32, 2> = scores
            .try_into()
            .map_err(|e| BenchError::Model(format!("scores output: {:?}", e)))?;

        if boxes.shape()[2] < 4 {
            return Err(BenchError::Model("boxes output must have 4 coordinates".into()));
        }
        let n = boxes.shape()[1]
            .min(classes.shape()[1])
            .min(scores.shape()[1]);

        let (fw, fh) = (iw as f32, ih as f32);
        let mut objects = Vec::with_capacity(n);
        for i in 0..n {
            let ymin = boxes[[0, i, 0]].clamp(0.0, 1.0);
            let xmin = boxes[[0, i, 1]].clamp(0.0, 1.0);
            let ymax = boxes[[0, i, 2]].clamp(0.0, 1.0);
            let xmax = boxes[[0, i, 3]].clamp(0.0, 1.0);
            objects.push(RawObject {
                category: self.category(classes[[0, i]]),
                score: scores[[0, i]],
                bbox: BoundingBox {
                    x: xmin * fw,
                    y: ymin * fh,
                    width: ((xmax - xmin) * fw).max(0.0),
                    height: ((ymax - ymin) * fh).max(0.0),
                },
            });
        }

        Ok(objects)
    }
}

/// One label per line; line `i` names class id `i`.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)?;
    let labels: Vec<String> = raw.lines().map(|l| l.trim().to_string()).collect();
    if labels.is_empty() {
        return Err(BenchError::Config(format!(
            "label map {} is empty",
            path.display()
        )));
    }
    Ok(labels)
}
