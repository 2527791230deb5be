//! Integration tests for panel rendering.

mod common;

use common::*;
use cupbench::render::{Letterbox, PanelRenderer, TextRenderer, label_origin};
use image::Rgb;

const ACCENT: Rgb<u8> = Rgb([100, 180, 255]);

fn renderer() -> PanelRenderer {
    PanelRenderer::new(CanvasConfig::default(), TextRenderer::none())
}

fn missed() -> DetectorResult {
    DetectorResult {
        detection: None,
        elapsed_ms: 3.0,
    }
}

#[test]
fn test_panel_size_is_fixed_for_any_aspect_ratio() {
    let renderer = renderer();
    let found = DetectorResult {
        detection: Some(Detection::new(10.0, 10.0, 8.0)),
        elapsed_ms: 1.0,
    };

    for (w, h) in [(1, 1), (2000, 50), (50, 2000), (480, 320), (4032, 3024), (17, 913)] {
        let img = flat_image(w, h, 200);
        for result in [&found, &missed()] {
            let panel = renderer.render(&img, result, Some("cup (90%)"), ACCENT, "title");
            assert_eq!(panel.dimensions(), (480, 320), "source {}x{}", w, h);
        }
    }
}

#[test]
fn test_title_bar_is_dark() {
    let panel = renderer().render(&flat_image(480, 320, 255), &missed(), None, ACCENT, "t");
    let px = panel.image().get_pixel(240, 10);
    assert!(px[0] < 80 && px[1] < 80 && px[2] < 80, "title bar pixel {:?}", px);
    // below the bar the white source shows through
    assert_eq!(*panel.image().get_pixel(20, 300), Rgb([255, 255, 255]));
}

#[test]
fn test_letterbox_fills_background() {
    // a wide source leaves background bands above and below
    let panel = renderer().render(&flat_image(960, 100, 255), &missed(), None, ACCENT, "");
    assert_eq!(*panel.image().get_pixel(240, 300), Rgb([20, 20, 30]));
}

#[test]
fn test_detection_and_miss_render_differently() {
    let img = flat_image(480, 320, 90);
    let found = DetectorResult {
        detection: Some(Detection::new(240.0, 180.0, 60.0)),
        elapsed_ms: 1.0,
    };
    let renderer = renderer();
    let hit = renderer.render(&img, &found, None, ACCENT, "");
    let miss = renderer.render(&img, &missed(), None, ACCENT, "");

    assert_ne!(hit.image().as_raw(), miss.image().as_raw());

    // center dot in the accent color
    let dot = hit.image().get_pixel(240, 180);
    for c in 0..3 {
        assert!(dot[c].abs_diff(ACCENT[c]) <= 2, "dot pixel {:?}", dot);
    }
    // red cross at the canvas center on a miss
    let px = miss.image().get_pixel(240, 160);
    assert!(px[0] > px[1] && px[0] > px[2], "cross pixel {:?}", px);
}

#[test]
fn test_letterbox_geometry() {
    let fit = Letterbox::fit((960, 320), (480, 320));
    assert_eq!((fit.width, fit.height), (480, 160));
    assert_eq!((fit.offset_x, fit.offset_y), (0, 80));
    assert_eq!(fit.project(480.0, 160.0), (240, 160));

    let tall = Letterbox::fit((100, 400), (480, 320));
    assert_eq!((tall.width, tall.height), (80, 320));
    assert_eq!(tall.offset_x, 200);

    let empty = Letterbox::fit((0, 0), (480, 320));
    assert_eq!((empty.width, empty.height), (0, 0));
}

/// 960x640 gray source: the letterbox scale is exactly 0.5.
fn hit_at_half_scale(renderer: &PanelRenderer, label: Option<&str>) -> cupbench::models::Panel {
    let found = DetectorResult {
        detection: Some(Detection::new(480.0, 360.0, 120.0)),
        elapsed_ms: 1.0,
    };
    let img = flat_image(960, 640, 90);
    renderer.render(&img, &found, label, ACCENT, "Hough  |  4ms  |  mug")
}

#[test]
fn test_hit_panel_has_title_bar_and_scaled_rings() {
    let panel = hit_at_half_scale(&renderer(), None);
    let img = panel.image();

    let bar = img.get_pixel(240, 10);
    assert!(bar[0] < 40 && bar[1] < 40 && bar[2] < 40, "title bar pixel {:?}", bar);

    // projected center (240, 180), ring radius 120 * 0.5 = 60
    let ring = img.get_pixel(300, 180);
    assert!(ring[0] < 130 && ring[1] > 150 && ring[2] > 200, "ring pixel {:?}", ring);
    let ring_left = img.get_pixel(180, 180);
    assert!(ring_left[2] > 200, "ring pixel {:?}", ring_left);

    // halo just outside the ring: tinted, but fainter than the ring
    for x in [301, 302] {
        let halo = img.get_pixel(x, 180);
        assert!(halo[2] > 110, "halo pixel {:?}", halo);
        assert!(halo[2] + 20 < ring[2], "halo {:?} vs ring {:?}", halo, ring);
    }

    // between ring and dot the source is untouched
    let inside = img.get_pixel(270, 180);
    assert!(inside[2] < 100, "inside pixel {:?}", inside);
}

#[test]
fn test_label_sits_above_the_ring() {
    assert_eq!(label_origin((240, 180), 60), (180, 102));

    let text = TextRenderer::discover(None, 14.0);
    if !text.has_font() {
        return;
    }
    let renderer = PanelRenderer::new(CanvasConfig::default(), text);
    let plain = hit_at_half_scale(&renderer, None);
    let labeled = hit_at_half_scale(&renderer, Some("cup (90%)"));

    let differs = |y0: u32, y1: u32| {
        (y0..y1).any(|y| {
            (0..480).any(|x| plain.image().get_pixel(x, y) != labeled.image().get_pixel(x, y))
        })
    };
    assert!(differs(100, 120), "label not drawn above the ring");
    assert!(!differs(200, 320), "label drawn below the ring");
}
