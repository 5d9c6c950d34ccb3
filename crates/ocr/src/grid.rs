use image::{ImageBuffer, Rgb, RgbImage};
use std::fmt;

/// Binarized pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    Ink,
    Background,
}

impl Pixel {
    pub fn is_ink(self) -> bool {
        self == Pixel::Ink
    }

    /// Channel value used when writing the grid back out as an image.
    pub fn level(self) -> u8 {
        match self {
            Pixel::Ink => 0,
            Pixel::Background => 255,
        }
    }
}

/// Inclusive pixel rectangle, `top..=bottom` by `left..=right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl Rect {
    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self { top, left, bottom, right }
    }

    pub fn height(&self) -> usize {
        self.bottom + 1 - self.top
    }

    pub fn width(&self) -> usize {
        self.right + 1 - self.left
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.top..=self.bottom).contains(&row) && (self.left..=self.right).contains(&col)
    }
}

/// Rectangular grid of ink/background pixels stored row-major.
///
/// A zero-size grid stands for "no glyph" (an empty crop) and is skipped by
/// every later stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    height: usize,
    width: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    pub fn empty() -> Self {
        Self { height: 0, width: 0, pixels: Vec::new() }
    }

    pub fn filled(height: usize, width: usize, value: Pixel) -> Self {
        Self { height, width, pixels: vec![value; height * width] }
    }

    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(row, col));
            }
        }
        Self { height, width, pixels }
    }

    /// Parses an ASCII picture, `#` for ink and anything else for background.
    /// Short rows are padded with background up to the longest row.
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<&str> = art.lines().collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Self::from_fn(rows.len(), width, |row, col| match rows[row].chars().nth(col) {
            Some('#') => Pixel::Ink,
            _ => Pixel::Background,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Whole-grid rectangle; `None` for an empty grid.
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::new(0, 0, self.height - 1, self.width - 1))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.pixels[row * self.width + col])
    }

    pub fn is_ink(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Pixel::is_ink)
    }

    pub fn set(&mut self, row: usize, col: usize, value: Pixel) {
        if row < self.height && col < self.width {
            self.pixels[row * self.width + col] = value;
        }
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_ink()).count()
    }

    /// Clamps `rect` to the grid, `None` if nothing of it lies inside.
    pub fn clamp(&self, rect: Rect) -> Option<Rect> {
        let bounds = self.bounds()?;
        let clamped = Rect::new(
            rect.top,
            rect.left,
            rect.bottom.min(bounds.bottom),
            rect.right.min(bounds.right),
        );
        (clamped.top <= clamped.bottom && clamped.left <= clamped.right).then_some(clamped)
    }

    /// Copies `rect` into a new grid. Out-of-range parts are clamped away.
    pub fn crop(&self, rect: Rect) -> PixelGrid {
        let Some(r) = self.clamp(rect) else {
            return PixelGrid::empty();
        };
        let mut pixels = Vec::with_capacity(r.height() * r.width());
        for row in r.top..=r.bottom {
            let start = row * self.width;
            pixels.extend_from_slice(&self.pixels[start + r.left..=start + r.right]);
        }
        PixelGrid { height: r.height(), width: r.width(), pixels }
    }

    /// Copies `rect` and surrounds it with `border` background pixels on every side.
    pub fn crop_padded(&self, rect: Rect, border: usize) -> PixelGrid {
        let inner = self.crop(rect);
        if inner.is_empty() {
            return inner;
        }
        PixelGrid::from_fn(inner.height + 2 * border, inner.width + 2 * border, |row, col| {
            if row < border || col < border {
                return Pixel::Background;
            }
            inner.get(row - border, col - border).unwrap_or(Pixel::Background)
        })
    }

    pub fn row_has_ink(&self, row: usize, left: usize, right: usize) -> bool {
        (left..=right).any(|col| self.is_ink(row, col))
    }

    pub fn col_has_ink(&self, col: usize, top: usize, bottom: usize) -> bool {
        (top..=bottom).any(|row| self.is_ink(row, col))
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let v = self.get(y as usize, x as usize).unwrap_or(Pixel::Background).level();
            Rgb([v, v, v])
        })
    }
}

impl fmt::Display for PixelGrid {
    /// ASCII dump: `.` for ink, `*` for background.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.height, self.width)?;
        for row in 0..self.height {
            for col in 0..self.width {
                let c = if self.is_ink(row, col) { '.' } else { '*' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ascii_pads_short_rows() {
        let g = PixelGrid::from_ascii("#\n###\n");
        assert_eq!((g.height(), g.width()), (2, 3));
        assert!(g.is_ink(0, 0));
        assert!(!g.is_ink(0, 2));
        assert_eq!(g.ink_count(), 4);
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let g = PixelGrid::filled(2, 2, Pixel::Ink);
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.get(0, 2), None);
        assert!(!g.is_ink(5, 5));
    }

    #[test]
    fn crop_copies_and_clamps() {
        let g = PixelGrid::from_ascii("....\n.##.\n.##.\n....");
        let c = g.crop(Rect::new(1, 1, 2, 10));
        assert_eq!((c.height(), c.width()), (2, 3));
        assert_eq!(c.ink_count(), 4);
        // source untouched
        assert_eq!(g.ink_count(), 4);
        assert!(g.crop(Rect::new(9, 0, 12, 1)).is_empty());
    }

    #[test]
    fn crop_padded_adds_background_border() {
        let g = PixelGrid::filled(1, 1, Pixel::Ink);
        let p = g.crop_padded(Rect::new(0, 0, 0, 0), 2);
        assert_eq!((p.height(), p.width()), (5, 5));
        assert!(p.is_ink(2, 2));
        assert_eq!(p.ink_count(), 1);
    }

    #[test]
    fn display_renders_ascii() {
        let g = PixelGrid::from_ascii("#.\n.#");
        assert_eq!(g.to_string(), "2 2\n.*\n*.\n");
    }

    #[test]
    fn rgb_image_uses_black_ink() {
        let g = PixelGrid::from_ascii("#.");
        let img = g.to_rgb_image();
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }
}
