//! Typefaces used by the layout, loaded once at start-up

use std::path::Path;

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_7X14, FONT_10X20},
    },
    pixelcolor::PixelColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::info;

use crate::error::FontError;

pub const HEADING_FONT_FILE: &str = "Roboto-Regular.ttf";
pub const BODY_FONT_FILE: &str = "Roboto-Regular.ttf";

pub const HEADING_SIZE_PX: f32 = 20.0;
pub const BODY_SIZE_PX: f32 = 14.0;

/// Coverage at or above which an anti-aliased glyph pixel is set.
const COVERAGE_THRESHOLD: f32 = 0.5;

#[cfg(test)]
pub(crate) const TEST_FONT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/DejaVuSans.ttf");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Heading,
    Body,
}

/// A sized typeface able to measure and draw a single line of text.
#[derive(Clone)]
pub enum Typeface {
    Outline { font: FontArc, scale: PxScale },
    Bitmap(&'static MonoFont<'static>),
}

impl Typeface {
    /// Outline font sized so that one em is `size_px` pixels.
    pub fn outline(font: FontArc, size_px: f32) -> Self {
        let units_per_em = font.units_per_em().unwrap_or(font.height_unscaled());
        let scale = PxScale::from(size_px * font.height_unscaled() / units_per_em);
        Typeface::Outline { font, scale }
    }

    /// Horizontal advance of `text` in pixels.
    pub fn text_width(&self, text: &str) -> u32 {
        match self {
            Typeface::Outline { font, scale } => {
                let (_, width) = layout_line(font, *scale, text);
                width.ceil() as u32
            }
            Typeface::Bitmap(font) => {
                let count = text.chars().count() as u32;
                if count == 0 {
                    0
                } else {
                    count * font.character_size.width + (count - 1) * font.character_spacing
                }
            }
        }
    }

    /// Draw `text` with its line box's top-left corner at `top_left`.
    pub fn draw<D, C>(&self, text: &str, top_left: Point, color: C, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor,
    {
        match self {
            Typeface::Outline { font, scale } => {
                let (glyphs, _) = layout_line(font, *scale, text);
                let mut pixels = Vec::new();
                for glyph in glyphs {
                    let Some(outlined) = font.outline_glyph(glyph) else {
                        continue;
                    };
                    let bounds = outlined.px_bounds();
                    let origin = top_left + Point::new(bounds.min.x.floor() as i32, bounds.min.y.floor() as i32);
                    outlined.draw(|x, y, coverage| {
                        if coverage >= COVERAGE_THRESHOLD {
                            pixels.push(Pixel(origin + Point::new(x as i32, y as i32), color));
                        }
                    });
                }
                target.draw_iter(pixels)
            }
            Typeface::Bitmap(font) => {
                let style = MonoTextStyle::new(font, color);
                Text::with_baseline(text, top_left, style, Baseline::Top)
                    .draw(target)
                    .map(|_| ())
            }
        }
    }
}

/// Positions glyphs on a line whose ascender sits at y = 0.
fn layout_line(font: &FontArc, scale: PxScale, text: &str) -> (Vec<Glyph>, f32) {
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = 0.0;
    let mut previous = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    (glyphs, caret)
}

/// Immutable set of typefaces keyed by their role in the layout.
#[derive(Clone)]
pub struct FontBundle {
    heading: Typeface,
    body: Typeface,
}

impl FontBundle {
    pub fn new(heading: Typeface, body: Typeface) -> Self {
        Self { heading, body }
    }

    /// Load the TrueType assets from `dir`.
    pub fn load(dir: &Path) -> Result<Self, FontError> {
        let heading = load_font(&dir.join(HEADING_FONT_FILE))?;
        let body = load_font(&dir.join(BODY_FONT_FILE))?;
        info!("[FONT] Loaded fonts from {}", dir.display());

        Ok(Self {
            heading: Typeface::outline(heading, HEADING_SIZE_PX),
            body: Typeface::outline(body, BODY_SIZE_PX),
        })
    }

    /// Bitmap fonts compiled into the binary, no assets needed.
    pub fn builtin() -> Self {
        Self {
            heading: Typeface::Bitmap(&FONT_10X20),
            body: Typeface::Bitmap(&FONT_7X14),
        }
    }

    pub fn face(&self, role: FontRole) -> &Typeface {
        match role {
            FontRole::Heading => &self.heading,
            FontRole::Body => &self.body,
        }
    }
}

fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| FontError::Invalid(path.to_path_buf()))
}
