use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use super::text::TextRenderer;
use crate::config::CanvasConfig;
use crate::error::{BenchError, Result};
use crate::models::ComparisonRow;

/// Title and color of one detector column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    pub title: String,
    pub color: Rgb<u8>,
}

/// Lays panels out as one row per image and one column per detector.
#[derive(Clone)]
pub struct ComparisonAssembler {
    canvas: CanvasConfig,
    text: TextRenderer,
    columns: Vec<ColumnHeader>,
}

impl ComparisonAssembler {
    pub fn new(canvas: CanvasConfig, text: TextRenderer, columns: Vec<ColumnHeader>) -> Self {
        Self {
            canvas,
            text,
            columns,
        }
    }

    /// (width, height) of the aggregate grid for `rows` images.
    pub fn grid_size(&self, rows: usize) -> (u32, u32) {
        (
            self.canvas.width * self.columns.len() as u32,
            self.canvas.header_height + self.canvas.height * rows as u32,
        )
    }

    /// Top-left corner of panel (`column`, `row`) in the aggregate grid.
    pub fn panel_origin(&self, column: usize, row: usize) -> (u32, u32) {
        (
            column as u32 * self.canvas.width,
            self.canvas.header_height + row as u32 * self.canvas.height,
        )
    }

    fn check_row(&self, row: &ComparisonRow) -> Result<()> {
        if row.panels.len() != self.columns.len() {
            return Err(BenchError::Layout(format!(
                "row '{}' has {} panels for {} columns",
                row.image_id,
                row.panels.len(),
                self.columns.len()
            )));
        }
        let expected = (self.canvas.width, self.canvas.height);
        if let Some(panel) = row.panels.iter().find(|p| p.dimensions() != expected) {
            return Err(BenchError::Layout(format!(
                "row '{}' has a {:?} panel, expected {:?}",
                row.image_id,
                panel.dimensions(),
                expected
            )));
        }
        Ok(())
    }

    /// The full grid: a header band with one centered title per column, then
    /// every row in order. An empty row sequence yields the header alone.
    pub fn assemble(&self, rows: &[ComparisonRow]) -> Result<RgbImage> {
        if self.columns.is_empty() {
            return Err(BenchError::Layout("no detector columns".into()));
        }
        for row in rows {
            self.check_row(row)?;
        }

        let (w, h) = self.grid_size(rows.len());
        let mut out = RgbImage::from_pixel(w, h, Rgb(self.canvas.grid_background));

        let band = self.canvas.header_bar_height.min(self.canvas.header_height);
        if band > 0 {
            draw_filled_rect_mut(
                &mut out,
                Rect::at(0, 0).of_size(w, band),
                Rgb(self.canvas.header_background),
            );
        }
        for (col, header) in self.columns.iter().enumerate() {
            let (tw, _) = self.text.size(&header.title);
            let x = col as i32 * self.canvas.width as i32 + self.canvas.width as i32 / 2
                - tw as i32 / 2;
            self.text.draw(&mut out, header.color, x, 10, &header.title);
        }

        for (r, row) in rows.iter().enumerate() {
            for (c, panel) in row.panels.iter().enumerate() {
                let (x, y) = self.panel_origin(c, r);
                imageops::replace(&mut out, panel.image(), x as i64, y as i64);
            }
        }

        Ok(out)
    }

    /// One image's panels side by side, for standalone export.
    pub fn compose_row(&self, row: &ComparisonRow) -> Result<RgbImage> {
        self.check_row(row)?;
        let mut out = RgbImage::new(
            self.canvas.width * self.columns.len() as u32,
            self.canvas.height,
        );
        for (c, panel) in row.panels.iter().enumerate() {
            imageops::replace(
                &mut out,
                panel.image(),
                (c as u32 * self.canvas.width) as i64,
                0,
            );
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Panel;

    fn assembler() -> ComparisonAssembler {
        let columns = vec![
            ColumnHeader {
                title: "a".into(),
                color: Rgb([255, 0, 0]),
            },
            ColumnHeader {
                title: "b".into(),
                color: Rgb([0, 255, 0]),
            },
        ];
        ComparisonAssembler::new(CanvasConfig::default(), TextRenderer::none(), columns)
    }

    fn panel(w: u32, h: u32) -> Panel {
        Panel::new(RgbImage::new(w, h))
    }

    #[test]
    fn test_rejects_wrong_panel_count() {
        let row = ComparisonRow {
            image_id: "x".into(),
            panels: vec![panel(480, 320)],
        };
        assert!(matches!(assembler().assemble(&[row]), Err(BenchError::Layout(_))));
    }

    #[test]
    fn test_rejects_wrong_panel_size() {
        let row = ComparisonRow {
            image_id: "x".into(),
            panels: vec![panel(480, 320), panel(100, 100)],
        };
        assert!(matches!(assembler().compose_row(&row), Err(BenchError::Layout(_))));
    }

    #[test]
    fn test_panels_land_at_their_origin() {
        let mut red = RgbImage::new(480, 320);
        red.pixels_mut().for_each(|p| *p = Rgb([200, 0, 0]));
        let mut blue = RgbImage::new(480, 320);
        blue.pixels_mut().for_each(|p| *p = Rgb([0, 0, 200]));
        let rows = vec![
            ComparisonRow {
                image_id: "one".into(),
                panels: vec![Panel::new(red.clone()), Panel::new(blue.clone())],
            },
            ComparisonRow {
                image_id: "two".into(),
                panels: vec![Panel::new(blue), Panel::new(red)],
            },
        ];
        let grid = assembler().assemble(&rows).unwrap();
        assert_eq!(grid.dimensions(), (960, 40 + 640));
        assert_eq!(*grid.get_pixel(0, 40), Rgb([200, 0, 0]));
        assert_eq!(*grid.get_pixel(480, 40), Rgb([0, 0, 200]));
        assert_eq!(*grid.get_pixel(0, 360), Rgb([0, 0, 200]));
        assert_eq!(*grid.get_pixel(959, 679), Rgb([200, 0, 0]));
        // header band
        assert_eq!(*grid.get_pixel(5, 5), Rgb([30, 30, 45]));
    }
}
