use crate::grid::PixelGrid;

pub const ROW_BUCKETS: usize = 10;
pub const COL_BUCKETS: usize = 10;
pub const GRID_BUCKETS: usize = 20;
pub const FEATURE_LEN: usize = ROW_BUCKETS + COL_BUCKETS + GRID_BUCKETS;

/// Written into every bucket of a group that saw no ink, so an empty glyph
/// lands far away from every real template.
pub const EMPTY_SENTINEL: f64 = 10_000.0;

const GROUPS: [(usize, usize); 3] = [
    (0, ROW_BUCKETS),
    (ROW_BUCKETS, ROW_BUCKETS + COL_BUCKETS),
    (ROW_BUCKETS + COL_BUCKETS, FEATURE_LEN),
];

/// Fixed-length shape descriptor of one glyph: row-band, column-band and
/// 3×4 cell histograms of its ink, each normalized to sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn extract(grid: &PixelGrid) -> Self {
        let (h, w) = (grid.height(), grid.width());
        let mut v = [0.0f64; FEATURE_LEN];

        let row_band = h / 5 + 1;
        let col_band = w / 5 + 1;
        let cell_h = h / 3 + 1;
        let cell_w = w / 4 + 1;

        for row in 0..h {
            for col in 0..w {
                if !grid.is_ink(row, col) {
                    continue;
                }
                v[(row / row_band).min(ROW_BUCKETS - 1)] += 1.0;
                v[ROW_BUCKETS + (col / col_band).min(COL_BUCKETS - 1)] += 1.0;
                let cell = (row / cell_h * 4 + col / cell_w).min(GRID_BUCKETS - 1);
                v[ROW_BUCKETS + COL_BUCKETS + cell] += 1.0;
            }
        }

        for (start, end) in GROUPS {
            let group = &mut v[start..end];
            let total: f64 = group.iter().sum();
            if total < 0.1 {
                group.fill(EMPTY_SENTINEL);
            } else {
                group.iter_mut().for_each(|x| *x /= total);
            }
        }
        FeatureVector(v)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Sum of squared component differences. Not square-rooted; only used for ranking.
    pub fn squared_distance(&self, other: &FeatureVector) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
    }
}
