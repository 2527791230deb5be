use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::grid::ColumnHeader;
use super::text::TextRenderer;
use crate::report::Stats;

const BAR_COLOR: Rgb<u8> = Rgb([25, 25, 40]);
const RULE_COLOR: Rgb<u8> = Rgb([60, 60, 80]);
const VALUE_COLOR: Rgb<u8> = Rgb([200, 200, 200]);

/// Appends a statistics bar under the aggregate grid and shrinks the result
/// for distribution.
#[derive(Clone)]
pub struct StatsBar {
    pub height: u32,
    pub background: Rgb<u8>,
    text: TextRenderer,
}

impl StatsBar {
    pub fn new(height: u32, background: Rgb<u8>, text: TextRenderer) -> Self {
        Self {
            height,
            background,
            text,
        }
    }

    /// Grid plus bar, before scaling.
    pub fn attach(&self, grid: &RgbImage, stats: &Stats, columns: &[ColumnHeader]) -> RgbImage {
        let (w, h) = grid.dimensions();
        let bar = self.height;
        let mut out = RgbImage::from_pixel(w, h + bar, self.background);
        imageops::replace(&mut out, grid, 0, 0);
        if bar == 0 || w == 0 {
            return out;
        }

        draw_filled_rect_mut(&mut out, Rect::at(0, h as i32).of_size(w, bar), BAR_COLOR);
        draw_line_segment_mut(
            &mut out,
            (0.0, (h + 1) as f32),
            (w as f32, (h + 1) as f32),
            RULE_COLOR,
        );

        let n = columns.len().max(1) as u32;
        let col_w = w / n;
        for (i, column) in columns.iter().enumerate() {
            let x = (col_w * i as u32 + 12) as i32;
            self.text
                .draw(&mut out, column.color, x, (h + 10) as i32, &column.title);
            let summary = match stats.detectors.get(i) {
                Some(s) => format!(
                    "{}/{} detected  |  avg {:.0}ms",
                    s.hits, s.total, s.avg_latency_ms
                ),
                None => "no data".to_string(),
            };
            self.text
                .draw(&mut out, VALUE_COLOR, x, (h + 30) as i32, &summary);
        }

        for i in 1..n {
            let x = (col_w * i) as f32;
            draw_line_segment_mut(
                &mut out,
                (x, (h + 8) as f32),
                (x, (h + bar).saturating_sub(8) as f32),
                RULE_COLOR,
            );
        }

        out
    }

    /// Grid plus bar, uniformly scaled by `scale`.
    pub fn compose_final(
        &self,
        grid: &RgbImage,
        stats: &Stats,
        columns: &[ColumnHeader],
        scale: f32,
    ) -> RgbImage {
        let full = self.attach(grid, stats, columns);
        let (w, h) = full.dimensions();
        let sw = ((w as f32 * scale) as u32).max(1);
        let sh = ((h as f32 * scale) as u32).max(1);
        imageops::resize(&full, sw, sh, FilterType::Lanczos3)
    }
}
