pub mod artifacts;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod report;

pub use config::BenchConfig;
pub use detection::{Detector, GeometricDetector, LearnedDetector, ObjectModel, RawObject};
pub use error::{BenchError, Result};
pub use models::{BoundingBox, Detection, DetectorKind, DetectorResult, Report};
pub use pipeline::{Pipeline, RunOutcome};
pub use report::{Stats, aggregate, render_table};
