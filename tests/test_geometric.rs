//! Integration tests for the classical circle detector.
//!
//! Tests cover:
//! - Locating a single synthetic disc
//! - Consistent results across input resolutions
//! - No detection on images without circular structure

mod common;

use approx::assert_abs_diff_eq;
use common::*;

#[test]
fn test_finds_known_disc() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();
    let img = disc_image(400, 300, (190, 150), 80);

    let found = detector.detect(&img)?.expect("disc should be detected");

    assert_abs_diff_eq!(found.x, 190.0, epsilon = 4.0);
    assert_abs_diff_eq!(found.y, 150.0, epsilon = 4.0);
    assert_abs_diff_eq!(found.radius, 80.0, epsilon = 80.0 * 0.15);
    assert!(found.label.is_none());
    assert!(found.confidence.is_none());
    Ok(())
}

#[test]
fn test_detection_is_resolution_independent() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();

    for (w, h) in [(400, 300), (800, 600), (1600, 1200)] {
        let (img, truth) = scaled_disc_image(w, h);
        // one working-image pixel, mapped back to this resolution
        let px = w.max(h) as f32 / 320.0;

        let found = detector
            .detect(&img)?
            .unwrap_or_else(|| panic!("no circle at {}x{}", w, h));

        assert_abs_diff_eq!(found.x, truth.x, epsilon = 3.0 * px);
        assert_abs_diff_eq!(found.y, truth.y, epsilon = 3.0 * px);
        assert_abs_diff_eq!(found.radius, truth.radius, epsilon = truth.radius * 0.15);
    }
    Ok(())
}

#[test]
fn test_small_images_are_upscaled_and_still_found() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();

    for (w, h) in [(50, 37), (100, 75), (200, 150)] {
        let (img, truth) = scaled_disc_image(w, h);

        let found = detector
            .detect(&img)?
            .unwrap_or_else(|| panic!("no circle at {}x{}", w, h));

        // within two source pixels; the disc edge is pixel-quantized
        assert_abs_diff_eq!(found.x, truth.x, epsilon = 2.0);
        assert_abs_diff_eq!(found.y, truth.y, epsilon = 2.0);
        assert_abs_diff_eq!(found.radius, truth.radius, epsilon = truth.radius * 0.15);
    }
    Ok(())
}

#[test]
fn test_upscaled_input_gets_wider_blur() {
    let detector = GeometricDetector::default();
    assert_abs_diff_eq!(detector.blur_sigma_for(0.4), 1.1);
    assert_abs_diff_eq!(detector.blur_sigma_for(1.0), 1.1);
    assert_abs_diff_eq!(detector.blur_sigma_for(4.0), 2.2, epsilon = 1e-5);
}

#[test]
fn test_portrait_image() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();
    let (img, truth) = scaled_disc_image(300, 500);

    let found = detector.detect(&img)?.expect("disc should be detected");

    assert_abs_diff_eq!(found.x, truth.x, epsilon = 6.0);
    assert_abs_diff_eq!(found.y, truth.y, epsilon = 6.0);
    Ok(())
}

#[test]
fn test_flat_image_has_no_detection() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();
    assert!(detector.detect(&flat_image(400, 300, 128))?.is_none());
    assert!(detector.detect(&flat_image(64, 64, 0))?.is_none());
    Ok(())
}

#[test]
fn test_smooth_gradient_has_no_detection() -> anyhow::Result<()> {
    let detector = GeometricDetector::default();
    assert!(detector.detect(&gradient_image(640, 480))?.is_none());
    Ok(())
}

#[test]
fn test_search_parameters_follow_working_size() {
    let detector = GeometricDetector::default();
    let params = detector.params_for(320, 240);

    assert_abs_diff_eq!(params.min_dist, 72.0, epsilon = 1e-3);
    assert_eq!(params.min_radius, 24);
    assert_eq!(params.max_radius, 115);
    assert_abs_diff_eq!(params.dp, 1.2);
}

#[test]
fn test_detector_identity() {
    let detector = GeometricDetector::default();
    assert_eq!(detector.kind(), DetectorKind::Geometric);
    assert!(!detector.name().is_empty());
}
