//! Boundary to text shaping.
//!
//! A [`TextShaper`] lays text out into line fragments, each carrying an
//! alpha mask. [`Canvas::draw_text`] composites those masks as coverage
//! for a color. [`BlockShaper`] is a minimal monospace shaper that draws
//! every visible character as a solid cell; real fonts plug in through the
//! same trait.

use crate::color::Color;
use crate::compositor::{BlendMode, Canvas};
use crate::error::{RasterError, Result};
use crate::surface::{PixelBuffer, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    /// Pixel height of a line
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
    pub font: FontSpec,
    pub alignment: Alignment,
    /// Wrap lines wider than this
    pub max_width: Option<u32>,
    /// Drop lines that would end below this
    pub max_height: Option<u32>,
    /// Strip leading and trailing whitespace from each line
    pub trim: bool,
}

impl TextRequest {
    pub fn new(text: impl Into<String>, font: FontSpec) -> Self {
        Self {
            text: text.into(),
            font,
            alignment: Alignment::Left,
            max_width: None,
            max_height: None,
            trim: false,
        }
    }
}

/// One laid-out line. `mask` alpha is coverage, its size is `width x height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub mask: PixelBuffer,
}

pub trait TextShaper {
    fn shape(&self, request: &TextRequest) -> Result<Vec<TextFragment>>;
}

impl Canvas<'_> {
    /// Shape `request` and blend every fragment at `origin` in `color`.
    /// Shaping finishes before any pixel is written.
    pub fn draw_text(
        &mut self,
        shaper: &dyn TextShaper,
        request: &TextRequest,
        origin: (i32, i32),
        color: Color,
    ) -> Result<()> {
        let fragments = shaper.shape(request)?;
        for frag in &fragments {
            self.blend_coverage(&frag.mask, origin.0 + frag.x, origin.1 + frag.y, color);
        }
        Ok(())
    }
}

// ============================================================================
// Block shaper
// ============================================================================

/// Monospace shaper drawing each non-whitespace character as a filled cell
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockShaper;

impl BlockShaper {
    /// Advance of one character for a font size
    pub fn cell_width(size: u32) -> u32 {
        (size * 3 / 5).max(1)
    }

    fn wrap<'t>(line: &'t str, max_chars: Option<usize>) -> Vec<&'t str> {
        let Some(limit) = max_chars else {
            return vec![line];
        };
        let mut out = Vec::new();
        let mut rest = line;
        while rest.chars().count() > limit {
            let cut = rest
                .char_indices()
                .take(limit + 1)
                .filter(|(_, c)| c.is_whitespace())
                .map(|(i, _)| i)
                .last()
                .filter(|&i| i > 0)
                .unwrap_or_else(|| rest.char_indices().nth(limit).map_or(rest.len(), |(i, _)| i));
            out.push(&rest[..cut]);
            rest = rest[cut..].trim_start();
        }
        out.push(rest);
        out
    }

    fn render_line(line: &str, cell: u32, size: u32) -> Result<Option<PixelBuffer>> {
        let chars = line.chars().count() as u32;
        if chars == 0 {
            return Ok(None);
        }
        let mut mask = PixelBuffer::new(chars * cell, size)?;
        let mut canvas = Canvas::unclipped(&mut mask);
        for (i, c) in line.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            // one pixel of spacing on the right and top
            let glyph = Rect::new(i as i32 * cell as i32, 1, (cell - 1).max(1), size.saturating_sub(1).max(1));
            canvas.fill_rect(glyph, Color::WHITE, BlendMode::Overwrite);
        }
        Ok(Some(mask))
    }
}

impl TextShaper for BlockShaper {
    fn shape(&self, request: &TextRequest) -> Result<Vec<TextFragment>> {
        let size = request.font.size;
        if size == 0 {
            return Err(RasterError::InvalidArgument("font size must be positive".to_string()));
        }
        let cell = Self::cell_width(size);
        let max_chars = request.max_width.map(|w| (w / cell).max(1) as usize);

        let mut lines: Vec<&str> = Vec::new();
        for raw in request.text.split('\n') {
            let raw = if request.trim { raw.trim() } else { raw };
            lines.extend(Self::wrap(raw, max_chars));
        }
        if request.trim {
            for line in &mut lines {
                *line = line.trim();
            }
        }

        let widest = lines.iter().map(|l| l.chars().count() as u32 * cell).max().unwrap_or(0);
        let box_width = request.max_width.unwrap_or(widest);

        let mut fragments = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            let y = row as u32 * size;
            if request.max_height.is_some_and(|h| y + size > h) {
                break;
            }
            let Some(mask) = Self::render_line(line, cell, size)? else {
                continue;
            };
            let width = mask.width();
            let x = match request.alignment {
                Alignment::Left => 0,
                Alignment::Center => (box_width.saturating_sub(width) / 2) as i32,
                Alignment::Right => box_width.saturating_sub(width) as i32,
            };
            fragments.push(TextFragment {
                x,
                y: y as i32,
                width,
                height: size,
                mask,
            });
        }
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> TextRequest {
        TextRequest::new(text, FontSpec::new("block", 10))
    }

    #[test]
    fn test_single_line_layout() {
        let frags = BlockShaper.shape(&request("ab c")).unwrap();
        assert_eq!(frags.len(), 1);
        let f = &frags[0];
        assert_eq!((f.x, f.y, f.width, f.height), (0, 0, 24, 10));
        // glyph cell filled, space empty, right spacing column empty
        assert_eq!(f.mask.get_pixel(0, 5).unwrap().alpha(), 255);
        assert_eq!(f.mask.get_pixel(5, 5).unwrap().alpha(), 0);
        assert_eq!(f.mask.get_pixel(13, 5).unwrap().alpha(), 0);
        assert_eq!(f.mask.get_pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn test_wrap_and_height_limit() {
        let mut req = request("one two three");
        req.max_width = Some(30);
        let frags = BlockShaper.shape(&req).unwrap();
        assert_eq!(frags.len(), 3);
        assert_eq!(frags[2].y, 20);
        assert_eq!(frags[2].width, 30);

        req.max_height = Some(25);
        assert_eq!(BlockShaper.shape(&req).unwrap().len(), 2);
    }

    #[test]
    fn test_alignment_and_trim() {
        let mut req = request("  hi  \nlonger");
        req.trim = true;
        req.alignment = Alignment::Right;
        let frags = BlockShaper.shape(&req).unwrap();
        assert_eq!(frags[0].width, 12);
        assert_eq!(frags[0].x, 24);
        assert_eq!(frags[1].x, 0);

        req.alignment = Alignment::Center;
        assert_eq!(BlockShaper.shape(&req).unwrap()[0].x, 12);
    }

    #[test]
    fn test_zero_size_rejected() {
        let req = TextRequest::new("x", FontSpec::new("block", 0));
        assert!(BlockShaper.shape(&req).is_err());
    }

    #[test]
    fn test_draw_text_blends_color() {
        let mut buf = PixelBuffer::filled(30, 12, Color::BLACK).unwrap();
        Canvas::unclipped(&mut buf)
            .draw_text(&BlockShaper, &request("A"), (2, 1), Color::RED)
            .unwrap();
        assert_eq!(buf.get_pixel(2, 5).unwrap(), Color::RED);
        assert_eq!(buf.get_pixel(1, 5).unwrap(), Color::BLACK);
        assert_eq!(buf.get_pixel(2, 1).unwrap(), Color::BLACK);
    }

    struct Broken;

    impl TextShaper for Broken {
        fn shape(&self, _request: &TextRequest) -> Result<Vec<TextFragment>> {
            Err(RasterError::InvalidArgument("no such font".to_string()))
        }
    }

    #[test]
    fn test_shaper_error_leaves_pixels() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        let before = buf.clone();
        assert!(Canvas::unclipped(&mut buf)
            .draw_text(&Broken, &request("x"), (0, 0), Color::RED)
            .is_err());
        assert_eq!(buf, before);
    }
}
