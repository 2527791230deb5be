use ab_glyph::{FontArc, PxScale};
use image::Pixel;
use imageproc::definitions::Clamp;
use imageproc::drawing::{Canvas, draw_text_mut, text_size};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{BenchError, Result};

/// Places tried, in order, when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws labels and titles. Without a font every call is a no-op, so the
/// geometry of panels and grids never depends on font availability.
#[derive(Clone)]
pub struct TextRenderer {
    font: Option<FontArc>,
    scale: PxScale,
}

impl TextRenderer {
    pub fn none() -> Self {
        Self {
            font: None,
            scale: PxScale::from(14.0),
        }
    }

    pub fn from_file(path: &Path, size: f32) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            BenchError::Config(format!("invalid font {}: {}", path.display(), e))
        })?;
        Ok(Self {
            font: Some(font),
            scale: PxScale::from(size),
        })
    }

    /// Use `explicit` when given, otherwise the first usable system font.
    pub fn discover(explicit: Option<&Path>, size: f32) -> Self {
        if let Some(path) = explicit {
            match Self::from_file(path, size) {
                Ok(text) => return text,
                Err(e) => warn!("{}", e),
            }
        }

        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            if let Ok(text) = Self::from_file(path, size) {
                debug!(font = %path.display(), "using font");
                return text;
            }
        }

        warn!("no usable font found; titles and labels will not be drawn");
        Self {
            font: None,
            scale: PxScale::from(size),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Rendered (width, height) of `text`; zero without a font.
    pub fn size(&self, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.scale, font, text),
            None => (0, 0),
        }
    }

    pub fn draw<C>(&self, canvas: &mut C, color: C::Pixel, x: i32, y: i32, text: &str)
    where
        C: Canvas,
        <C::Pixel as Pixel>::Subpixel: Into<f32> + Clamp<f32>,
    {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, color, x, y, self.scale, font, text);
        }
    }
}
