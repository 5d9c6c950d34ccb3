pub mod binarize;
pub mod config;
pub mod extract;
pub mod feature;
pub mod grid;
pub mod matcher;
pub mod pipeline;
pub mod segment;
pub mod templates;
pub mod watch;

#[cfg(test)]
pub(crate) mod testfont;

pub use binarize::{binarize, grid_from_bytes, load_grid, DecodeError};
pub use config::{ConfigError, LayoutProfile, OcrConfig, RegionField};
pub use extract::{Field, FieldInterpreter};
pub use feature::FeatureVector;
pub use grid::{Pixel, PixelGrid, Rect};
pub use matcher::{GlyphClassifier, GlyphMatch};
pub use pipeline::{RecognizeError, ScreenshotReader};
pub use segment::{GlyphBox, SegmentParams, TextBand};
pub use templates::{GlyphTemplate, LoadError, TemplateEntry, TemplateLibrary, TemplateStore};
pub use watch::{spawn_intake_watcher, spawn_template_watcher};
