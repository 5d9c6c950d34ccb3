//! Band and glyph segmentation plus bounding-box tightening.
//!
//! Both scans use the same blank-run rule: a run of blank rows (or columns)
//! longer than the gap threshold ends the current ink run, shorter blank
//! runs are bridged, and an ink run is only kept when its extent is longer
//! than the threshold as well.

use std::collections::{HashSet, VecDeque};

use crate::grid::{PixelGrid, Rect};

/// Ink components smaller than this cannot establish a glyph boundary.
pub const MIN_COMPONENT_PIXELS: usize = 10;

/// Background margin added around every tightened grid.
pub const GLYPH_BORDER: usize = 2;

/// Row gap separating two text bands.
pub const BAND_GAP: usize = 10;

/// Column gap separating glyphs inside an amount/date band.
pub const GLYPH_GAP: usize = 1;

/// Column gap separating glyphs in free-text regions.
pub const REGION_GAP: usize = 10;

const NEIGHBOURS: [(isize, isize); 8] =
    [(-1, 0), (0, -1), (1, 0), (0, 1), (-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParams {
    pub band_gap: usize,
    pub glyph_gap: usize,
    pub region_gap: usize,
    pub min_component_pixels: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            band_gap: BAND_GAP,
            glyph_gap: GLYPH_GAP,
            region_gap: REGION_GAP,
            min_component_pixels: MIN_COMPONENT_PIXELS,
        }
    }
}

/// One line of text, rows `top..=bottom` of the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBand {
    pub top: usize,
    pub bottom: usize,
}

/// One candidate glyph, columns `left..=right` of a band grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBox {
    pub left: usize,
    pub right: usize,
}

/// Inclusive `(start, end)` ink runs over a sequence of blank flags.
pub fn ink_runs(blank: impl IntoIterator<Item = bool>, threshold: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut blank_streak = 0usize;

    let close = |run: (usize, usize), runs: &mut Vec<(usize, usize)>| {
        if run.1 - run.0 + 1 > threshold {
            runs.push(run);
        }
    };

    for (i, is_blank) in blank.into_iter().enumerate() {
        if is_blank {
            blank_streak += 1;
            if blank_streak > threshold {
                if let Some(run) = open.take() {
                    close(run, &mut runs);
                }
            }
        } else {
            blank_streak = 0;
            open = Some(match open {
                Some((start, _)) => (start, i),
                None => (i, i),
            });
        }
    }
    if let Some(run) = open {
        close(run, &mut runs);
    }
    runs
}

pub fn find_bands(grid: &PixelGrid, threshold: usize) -> Vec<TextBand> {
    let Some(b) = grid.bounds() else {
        return Vec::new();
    };
    let blank = (b.top..=b.bottom).map(|row| !grid.row_has_ink(row, b.left, b.right));
    ink_runs(blank, threshold)
        .into_iter()
        .map(|(top, bottom)| TextBand { top, bottom })
        .collect()
}

pub fn find_glyphs(grid: &PixelGrid, threshold: usize) -> Vec<GlyphBox> {
    let Some(b) = grid.bounds() else {
        return Vec::new();
    };
    let blank = (b.left..=b.right).map(|col| !grid.col_has_ink(col, b.top, b.bottom));
    ink_runs(blank, threshold)
        .into_iter()
        .map(|(left, right)| GlyphBox { left, right })
        .collect()
}

/// Whether the ink pixel at `(row, col)` belongs to an 8-connected component
/// of at least `min_pixels` pixels inside `region`.
///
/// The breadth-first fill stops as soon as `min_pixels` pixels are found.
pub fn is_anchored(grid: &PixelGrid, region: Rect, row: usize, col: usize, min_pixels: usize) -> bool {
    if !region.contains(row, col) || !grid.is_ink(row, col) {
        return false;
    }
    let mut seen = HashSet::from([(row, col)]);
    let mut queue = VecDeque::from([(row, col)]);
    while let Some((r, c)) = queue.pop_front() {
        if seen.len() >= min_pixels {
            return true;
        }
        for (dr, dc) in NEIGHBOURS {
            let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc)) else {
                continue;
            };
            if !region.contains(nr, nc) || !grid.is_ink(nr, nc) || !seen.insert((nr, nc)) {
                continue;
            }
            queue.push_back((nr, nc));
        }
    }
    seen.len() >= min_pixels
}

/// Shrinks `region` to the tightest box whose edges touch anchored ink and
/// returns that box padded with [`GLYPH_BORDER`] background pixels.
///
/// Returns an empty grid when no anchored ink exists in the region.
pub fn tighten(grid: &PixelGrid, region: Rect, min_pixels: usize) -> PixelGrid {
    let Some(region) = grid.clamp(region) else {
        return PixelGrid::empty();
    };
    let anchored = |row: usize, col: usize| is_anchored(grid, region, row, col, min_pixels);
    let rows = region.top..=region.bottom;
    let cols = region.left..=region.right;

    let top = rows.clone().find(|&r| cols.clone().any(|c| anchored(r, c)));
    let bottom = rows.clone().rev().find(|&r| cols.clone().any(|c| anchored(r, c)));
    let left = cols.clone().find(|&c| rows.clone().any(|r| anchored(r, c)));
    let right = cols.clone().rev().find(|&c| rows.clone().any(|r| anchored(r, c)));

    match (top, bottom, left, right) {
        (Some(top), Some(bottom), Some(left), Some(right)) => {
            grid.crop_padded(Rect::new(top, left, bottom, right), GLYPH_BORDER)
        }
        _ => PixelGrid::empty(),
    }
}

/// Tightens the whole grid.
pub fn tighten_all(grid: &PixelGrid, min_pixels: usize) -> PixelGrid {
    match grid.bounds() {
        Some(b) => tighten(grid, b, min_pixels),
        None => PixelGrid::empty(),
    }
}

/// Splits an already-tightened line into tightened glyph grids, left to right.
/// Boxes that tighten to nothing are dropped.
pub fn split_glyphs(line: &PixelGrid, threshold: usize, min_pixels: usize) -> Vec<PixelGrid> {
    let Some(b) = line.bounds() else {
        return Vec::new();
    };
    find_glyphs(line, threshold)
        .into_iter()
        .map(|g| tighten(line, Rect::new(b.top, g.left, b.bottom, g.right), min_pixels))
        .filter(|g| !g.is_empty())
        .collect()
}

/// Background grid with `blocks` of ink painted in, used by tests across the crate.
#[cfg(test)]
pub(crate) fn grid_with_blocks(height: usize, width: usize, blocks: &[Rect]) -> PixelGrid {
    use crate::grid::Pixel;
    PixelGrid::from_fn(height, width, |row, col| {
        if blocks.iter().any(|b| b.contains(row, col)) {
            Pixel::Ink
        } else {
            Pixel::Background
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Pixel;

    fn blocks_with_column_gap(gap: usize) -> PixelGrid {
        let first = Rect::new(2, 2, 14, 13);
        let second = Rect::new(2, 14 + gap, 14, 25 + gap);
        grid_with_blocks(17, 28 + gap, &[first, second])
    }

    #[test]
    fn eleven_pixel_gap_splits_two_glyphs() {
        let g = blocks_with_column_gap(11);
        let boxes = find_glyphs(&g, REGION_GAP);
        assert_eq!(
            boxes,
            vec![GlyphBox { left: 2, right: 13 }, GlyphBox { left: 25, right: 36 }]
        );
    }

    #[test]
    fn eight_pixel_gap_is_bridged() {
        let g = blocks_with_column_gap(8);
        assert_eq!(find_glyphs(&g, REGION_GAP), vec![GlyphBox { left: 2, right: 33 }]);
    }

    #[test]
    fn narrow_gap_still_splits_band_glyphs() {
        let g = blocks_with_column_gap(2);
        assert_eq!(find_glyphs(&g, GLYPH_GAP).len(), 2);
        // a single blank column is bridged
        assert_eq!(find_glyphs(&blocks_with_column_gap(1), GLYPH_GAP).len(), 1);
    }

    #[test]
    fn short_runs_are_dropped() {
        // the trailing run is exactly as long as the threshold
        let flags = [false; 12].into_iter().chain([true; 11]).chain([false; 10]);
        assert_eq!(ink_runs(flags, 10), vec![(0, 11)]);
    }

    #[test]
    fn run_touching_the_end_is_kept() {
        let flags = [true; 3].into_iter().chain([false; 4]);
        assert_eq!(ink_runs(flags, 1), vec![(3, 6)]);
    }

    #[test]
    fn bands_need_a_wide_row_gap() {
        let g = grid_with_blocks(
            60,
            20,
            &[Rect::new(0, 0, 11, 5), Rect::new(23, 0, 34, 5), Rect::new(40, 0, 51, 5)],
        );
        let bands = find_bands(&g, BAND_GAP);
        // 11 blank rows split the first band off; 5 blank rows are bridged
        assert_eq!(
            bands,
            vec![TextBand { top: 0, bottom: 11 }, TextBand { top: 23, bottom: 51 }]
        );
    }

    #[test]
    fn empty_grid_has_no_bands() {
        assert!(find_bands(&PixelGrid::empty(), BAND_GAP).is_empty());
        assert!(find_bands(&PixelGrid::filled(30, 30, Pixel::Background), BAND_GAP).is_empty());
    }

    #[test]
    fn flood_fill_needs_ten_connected_pixels() {
        let g = PixelGrid::from_ascii(
            "#.........\n\
             ..........\n\
             ..#.#.#.#.\n\
             ...#.#.#..\n\
             ..........\n\
             ###.......",
        );
        let region = g.bounds().unwrap();
        // diagonal zigzag of 7 pixels
        assert!(!is_anchored(&g, region, 2, 2, 7 + 1));
        assert!(is_anchored(&g, region, 2, 2, 7));
        assert!(!is_anchored(&g, region, 0, 0, 2));
        assert!(!is_anchored(&g, region, 1, 1, 1));
    }

    #[test]
    fn flood_fill_stays_inside_region() {
        let g = PixelGrid::filled(4, 4, Pixel::Ink);
        assert!(is_anchored(&g, Rect::new(0, 0, 3, 3), 0, 0, 16));
        assert!(!is_anchored(&g, Rect::new(0, 0, 1, 3), 0, 0, 9));
    }

    #[test]
    fn tighten_ignores_specks_and_pads_border() {
        let mut g = grid_with_blocks(30, 30, &[Rect::new(10, 12, 19, 16)]);
        g.set(1, 1, Pixel::Ink);
        g.set(28, 28, Pixel::Ink);
        g.set(27, 27, Pixel::Ink);
        let t = tighten_all(&g, MIN_COMPONENT_PIXELS);
        assert_eq!((t.height(), t.width()), (10 + 4, 5 + 4));
        assert_eq!(t.ink_count(), 50);
        assert!(t.is_ink(2, 2));
        assert!(!t.row_has_ink(1, 0, t.width() - 1));
    }

    #[test]
    fn tighten_is_a_fixed_point() {
        let mut g = grid_with_blocks(
            40,
            40,
            &[Rect::new(5, 5, 20, 8), Rect::new(18, 9, 20, 25), Rect::new(30, 30, 31, 31)],
        );
        // a speck inside the final box survives both passes
        g.set(10, 20, Pixel::Ink);
        let once = tighten_all(&g, MIN_COMPONENT_PIXELS);
        let twice = tighten_all(&once, MIN_COMPONENT_PIXELS);
        assert!(!once.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn degenerate_region_yields_empty_grid() {
        let mut g = PixelGrid::filled(20, 20, Pixel::Background);
        g.set(5, 5, Pixel::Ink);
        assert!(tighten_all(&g, MIN_COMPONENT_PIXELS).is_empty());
        assert!(tighten(&g, Rect::new(50, 50, 60, 60), MIN_COMPONENT_PIXELS).is_empty());
        assert!(tighten_all(&PixelGrid::empty(), MIN_COMPONENT_PIXELS).is_empty());
    }

    #[test]
    fn split_glyphs_tightens_each_box() {
        let g = grid_with_blocks(20, 40, &[Rect::new(4, 3, 15, 8), Rect::new(9, 14, 15, 20)]);
        let line = tighten_all(&g, MIN_COMPONENT_PIXELS);
        let glyphs = split_glyphs(&line, GLYPH_GAP, MIN_COMPONENT_PIXELS);
        assert_eq!(glyphs.len(), 2);
        assert_eq!((glyphs[0].height(), glyphs[0].width()), (12 + 4, 6 + 4));
        assert_eq!((glyphs[1].height(), glyphs[1].width()), (7 + 4, 7 + 4));
    }
}
