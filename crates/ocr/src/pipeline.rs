use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use billscan_core::ExtractedRecord;

use crate::binarize::{self, DecodeError};
use crate::config::{ConfigError, LayoutProfile, OcrConfig};
use crate::extract::FieldInterpreter;
use crate::grid::{PixelGrid, Rect};
use crate::matcher::GlyphClassifier;
use crate::segment::{self, SegmentParams};
use crate::templates::TemplateStore;

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("No band pair matching an amount and a timestamp was found")]
    PatternNotFound,
}

/// Reads amounts, timestamps and free-text regions out of screenshots.
///
/// Every call works on its own grids and takes a single snapshot of the
/// template store, so concurrent calls and reloads do not interfere.
pub struct ScreenshotReader {
    store: Arc<TemplateStore>,
    params: SegmentParams,
    interpreter: FieldInterpreter,
}

impl ScreenshotReader {
    pub fn new(store: Arc<TemplateStore>, params: SegmentParams, interpreter: FieldInterpreter) -> Self {
        Self { store, params, interpreter }
    }

    pub fn from_config(store: Arc<TemplateStore>, config: &OcrConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(store, config.segment_params(), config.interpreter()?))
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    /// Recognized text of every band, top to bottom.
    pub fn read_bands(&self, grid: &PixelGrid) -> Vec<String> {
        let library = self.store.snapshot();
        self.bands(grid)
            .map(|line| self.read_line(&line, self.params.glyph_gap, &*library))
            .collect()
    }

    /// Scans bands top to bottom until both an amount and a timestamp have
    /// been read. Anything less is [`RecognizeError::PatternNotFound`].
    pub fn recognize_band(&self, grid: &PixelGrid) -> Result<ExtractedRecord, RecognizeError> {
        let library = self.store.snapshot();
        let mut record = ExtractedRecord::default();
        for line in self.bands(grid) {
            let text = self.read_line(&line, self.params.glyph_gap, &*library);
            tracing::debug!(%text, "Read band");
            if self.interpreter.absorb(&mut record, &text) {
                return Ok(record);
            }
        }
        tracing::debug!(?record, "Amount/timestamp pair not found");
        Err(RecognizeError::PatternNotFound)
    }

    pub fn recognize_band_file(&self, path: &Path) -> Result<ExtractedRecord, RecognizeError> {
        let grid = binarize::load_grid(path)?;
        self.recognize_band(&grid)
    }

    pub fn recognize_band_bytes(&self, data: &[u8]) -> Result<ExtractedRecord, RecognizeError> {
        let grid = binarize::grid_from_bytes(data)?;
        self.recognize_band(&grid)
    }

    /// Reads one free-text region using the wide glyph gap. The rectangle is
    /// clamped to the grid; an empty or blank region reads as `""`.
    pub fn recognize_region(&self, grid: &PixelGrid, rect: Rect) -> String {
        let library = self.store.snapshot();
        let region = segment::tighten(grid, rect, self.params.min_component_pixels);
        self.read_line(&region, self.params.region_gap, &*library)
    }

    /// The tightened region and the glyph crops [`recognize_region`](Self::recognize_region)
    /// would classify, for inspecting segmentation.
    pub fn region_crops(&self, grid: &PixelGrid, rect: Rect) -> (PixelGrid, Vec<PixelGrid>) {
        let region = segment::tighten(grid, rect, self.params.min_component_pixels);
        let glyphs = segment::split_glyphs(&region, self.params.region_gap, self.params.min_component_pixels);
        (region, glyphs)
    }

    /// Reads every field of `profile`, appending each field's suffix, joined by three spaces.
    pub fn recognize_layout(&self, grid: &PixelGrid, profile: &LayoutProfile) -> String {
        profile
            .fields
            .iter()
            .map(|f| self.recognize_region(grid, f.rect()) + &f.suffix)
            .collect::<Vec<_>>()
            .join("   ")
    }

    /// One `"<name> | <text>"` line per profile.
    pub fn describe_layouts(&self, grid: &PixelGrid, profiles: &[LayoutProfile]) -> String {
        profiles
            .iter()
            .map(|p| format!("{} | {}", p.name, self.recognize_layout(grid, p)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tightened band grids, skipping bands that tighten to nothing.
    fn bands<'a>(&'a self, grid: &'a PixelGrid) -> impl Iterator<Item = PixelGrid> + 'a {
        let right = grid.width().saturating_sub(1);
        segment::find_bands(grid, self.params.band_gap)
            .into_iter()
            .map(move |b| {
                segment::tighten(grid, Rect::new(b.top, 0, b.bottom, right), self.params.min_component_pixels)
            })
            .filter(|line| !line.is_empty())
    }

    fn read_line(&self, line: &PixelGrid, gap: usize, classifier: &dyn GlyphClassifier) -> String {
        segment::split_glyphs(line, gap, self.params.min_component_pixels)
            .iter()
            .filter_map(|glyph| classifier.classify(glyph))
            .map(|m| m.label)
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
