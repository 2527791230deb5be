mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cupbench for tests
pub use cupbench::config::{BenchConfig, BoxRadius, CanvasConfig, HoughConfig, LearnedConfig};
pub use cupbench::detection::{
    Detector, GeometricDetector, LearnedDetector, ObjectModel, RawObject,
};
pub use cupbench::models::{
    BoundingBox, Detection, DetectorKind, DetectorResult, ImageRecord, Report,
};
pub use cupbench::{BenchError, Result};
