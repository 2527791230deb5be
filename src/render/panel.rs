use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, Rgba, RgbaImage};
use imageproc::drawing::{
    Blend, draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut,
    draw_line_segment_mut,
};
use imageproc::rect::Rect;

use super::text::TextRenderer;
use crate::config::CanvasConfig;
use crate::models::{Detection, DetectorResult, Panel};

const HALO_ALPHA: u8 = 80;
const RING_ALPHA: u8 = 220;
const LABEL_ALPHA: u8 = 230;
const RING_WIDTH: i32 = 3;
const DOT_RADIUS: i32 = 5;
const LABEL_OFFSET: i32 = 18;
const MISSING_COLOR: Rgba<u8> = Rgba([200, 80, 80, 255]);
const TITLE_BAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 200]);
const TITLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Where a source image lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Letterbox {
    /// Fit `source` inside `canvas` with one uniform scale, centered.
    pub fn fit(source: (u32, u32), canvas: (u32, u32)) -> Self {
        let (iw, ih) = source;
        let (cw, ch) = canvas;
        if iw == 0 || ih == 0 {
            return Self {
                scale: 0.0,
                width: 0,
                height: 0,
                offset_x: cw / 2,
                offset_y: ch / 2,
            };
        }
        let scale = (cw as f32 / iw as f32).min(ch as f32 / ih as f32);
        let width = ((iw as f32 * scale) as u32).clamp(1, cw);
        let height = ((ih as f32 * scale) as u32).clamp(1, ch);
        Self {
            scale,
            width,
            height,
            offset_x: (cw - width) / 2,
            offset_y: (ch - height) / 2,
        }
    }

    /// Map a point from source coordinates onto the canvas.
    pub fn project(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x * self.scale) as i32 + self.offset_x as i32,
            (y * self.scale) as i32 + self.offset_y as i32,
        )
    }
}

/// Top-left corner of a detection label: level with the ring's left edge,
/// one text line above its top.
pub fn label_origin(center: (i32, i32), radius: i32) -> (i32, i32) {
    (center.0 - radius, center.1 - radius - LABEL_OFFSET)
}

fn with_alpha(color: Rgb<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

/// Draws one detector's result on a fixed-size canvas.
#[derive(Clone)]
pub struct PanelRenderer {
    canvas: CanvasConfig,
    text: TextRenderer,
}

impl PanelRenderer {
    pub fn new(canvas: CanvasConfig, text: TextRenderer) -> Self {
        Self { canvas, text }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    /// Letterboxed source, detection overlay or "not detected" marker, title
    /// bar. The result is always exactly the configured canvas size.
    pub fn render(
        &self,
        image: &DynamicImage,
        result: &DetectorResult,
        label: Option<&str>,
        accent: Rgb<u8>,
        title: &str,
    ) -> Panel {
        let (cw, ch) = self.canvas_size();
        let [br, bg, bb] = self.canvas.background;
        let mut canvas = Blend(RgbaImage::from_pixel(cw, ch, Rgba([br, bg, bb, 255])));

        let fit = Letterbox::fit(image.dimensions(), (cw, ch));
        if fit.width > 0 && fit.height > 0 {
            let resized = image
                .resize_exact(fit.width, fit.height, FilterType::Lanczos3)
                .to_rgba8();
            imageops::overlay(
                &mut canvas.0,
                &resized,
                fit.offset_x as i64,
                fit.offset_y as i64,
            );
        }

        match &result.detection {
            Some(detection) => self.draw_detection(&mut canvas, &fit, detection, label, accent),
            None => self.draw_not_detected(&mut canvas),
        }

        self.draw_title_bar(&mut canvas, title);

        Panel::new(DynamicImage::ImageRgba8(canvas.0).to_rgb8())
    }

    fn draw_detection(
        &self,
        canvas: &mut Blend<RgbaImage>,
        fit: &Letterbox,
        detection: &Detection,
        label: Option<&str>,
        accent: Rgb<u8>,
    ) {
        let center = fit.project(detection.x, detection.y);
        let radius = (detection.radius * fit.scale) as i32;

        for r in [radius + 1, radius + 2] {
            draw_hollow_circle_mut(canvas, center, r, with_alpha(accent, HALO_ALPHA));
        }
        for r in (radius - RING_WIDTH + 1).max(0)..=radius {
            draw_hollow_circle_mut(canvas, center, r, with_alpha(accent, RING_ALPHA));
        }
        draw_filled_circle_mut(canvas, center, DOT_RADIUS, with_alpha(accent, 255));

        if let Some(label) = label {
            let (x, y) = label_origin(center, radius);
            self.text
                .draw(canvas, with_alpha(accent, LABEL_ALPHA), x, y, label);
        }
    }

    /// A red cross with a caption, centered on the canvas.
    fn draw_not_detected(&self, canvas: &mut Blend<RgbaImage>) {
        let (cw, ch) = self.canvas_size();
        let mx = cw as f32 / 2.0;
        let my = ch as f32 / 2.0;
        let arm = 12.0;

        for offset in [-1.0f32, 0.0, 1.0] {
            draw_line_segment_mut(
                canvas,
                (mx - arm + offset, my - arm),
                (mx + arm + offset, my + arm),
                MISSING_COLOR,
            );
            draw_line_segment_mut(
                canvas,
                (mx + arm + offset, my - arm),
                (mx - arm + offset, my + arm),
                MISSING_COLOR,
            );
        }

        let caption = "not detected";
        let (tw, _) = self.text.size(caption);
        self.text.draw(
            canvas,
            MISSING_COLOR,
            mx as i32 - tw as i32 / 2,
            (my + arm) as i32 + 6,
            caption,
        );
    }

    fn draw_title_bar(&self, canvas: &mut Blend<RgbaImage>, title: &str) {
        let bar = self.canvas.title_bar_height;
        if bar > 0 {
            draw_filled_rect_mut(
                canvas,
                Rect::at(0, 0).of_size(self.canvas.width, bar),
                TITLE_BAR_COLOR,
            );
        }
        self.text.draw(canvas, TITLE_COLOR, 8, 6, title);
    }
}
