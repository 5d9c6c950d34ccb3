use image::DynamicImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::binarize::{self, DecodeError};
use crate::feature::FeatureVector;
use crate::grid::PixelGrid;
use crate::segment;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode template {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("No usable templates found in {0}")]
    Empty(PathBuf),
}

/// Maps a reference file name to the glyph it depicts.
///
/// The part of the name before the first `.` is the stem; an optional
/// `_variant` suffix is ignored, so `minus.png` and `minus_bold.png` both
/// yield `'-'`.
pub fn label_for_file_name(file_name: &str) -> Option<char> {
    let stem = file_name.split('.').next()?;
    let name = stem.split('_').next()?;
    match name {
        "plus" => Some('+'),
        "minus" => Some('-'),
        "colon" => Some(':'),
        "point" => Some('.'),
        d if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() => d.chars().next(),
        _ => None,
    }
}

/// A tightened reference glyph and its precomputed descriptor.
#[derive(Debug, Clone)]
pub struct GlyphTemplate {
    pub label: char,
    pub grid: PixelGrid,
    pub features: FeatureVector,
    pub source: Option<PathBuf>,
}

impl GlyphTemplate {
    /// `grid` must already be tightened.
    pub fn new(label: char, grid: PixelGrid, source: Option<PathBuf>) -> Self {
        let features = FeatureVector::extract(&grid);
        Self { label, grid, features, source }
    }
}

/// Listing row for one stored template.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TemplateEntry {
    pub label: char,
    pub source: Option<PathBuf>,
    pub height: usize,
    pub width: usize,
}

/// Immutable set of templates, keyed by label in sorted order.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    by_label: BTreeMap<char, Vec<GlyphTemplate>>,
}

impl TemplateLibrary {
    /// Binarizes and tightens each `(label, image)` pair. Images that
    /// tighten to nothing are skipped.
    pub fn from_images<I>(pairs: I, min_pixels: usize) -> Self
    where
        I: IntoIterator<Item = (char, DynamicImage)>,
    {
        let mut lib = Self::default();
        for (label, img) in pairs {
            lib.insert_raw(label, &binarize::binarize(&img), None, min_pixels);
        }
        lib
    }

    /// Loads every recognized reference image under `dir`, recursively.
    /// Files are visited in sorted path order so variant order is stable.
    pub fn load_dir(dir: &Path, min_pixels: usize) -> Result<Self, LoadError> {
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        files.sort();

        let mut lib = Self::default();
        for path in files {
            let Some(label) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(label_for_file_name)
            else {
                tracing::warn!(path = %path.display(), "Skipping unrecognized template file");
                continue;
            };
            let raw = binarize::load_grid(&path)
                .map_err(|source| LoadError::Decode { path: path.clone(), source })?;
            lib.insert_raw(label, &raw, Some(path), min_pixels);
        }

        if lib.is_empty() {
            return Err(LoadError::Empty(dir.to_path_buf()));
        }
        tracing::info!(
            dir = %dir.display(),
            labels = lib.label_count(),
            templates = lib.len(),
            "Loaded glyph templates"
        );
        Ok(lib)
    }

    fn insert_raw(&mut self, label: char, raw: &PixelGrid, source: Option<PathBuf>, min_pixels: usize) {
        let grid = segment::tighten_all(raw, min_pixels);
        if grid.is_empty() {
            tracing::warn!(%label, source = ?source, "Template has no usable ink, skipped");
            return;
        }
        self.insert(GlyphTemplate::new(label, grid, source));
    }

    pub fn insert(&mut self, template: GlyphTemplate) {
        self.by_label.entry(template.label).or_default().push(template);
    }

    /// Templates in canonical order: labels ascending, variants in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GlyphTemplate> {
        self.by_label.values().flatten()
    }

    pub fn variants(&self, label: char) -> &[GlyphTemplate] {
        self.by_label.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entries(&self) -> Vec<TemplateEntry> {
        self.iter()
            .map(|t| TemplateEntry {
                label: t.label,
                source: t.source.clone(),
                height: t.grid.height(),
                width: t.grid.width(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_label.values().map(Vec::len).sum()
    }

    pub fn label_count(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io { path: dir.to_path_buf(), source };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Shared, reloadable handle to the current [`TemplateLibrary`].
///
/// Readers take an `Arc` snapshot and keep matching against it even if a
/// reload publishes a new library in the meantime.
#[derive(Debug)]
pub struct TemplateStore {
    current: RwLock<Arc<TemplateLibrary>>,
    min_pixels: usize,
}

impl TemplateStore {
    pub fn new(library: TemplateLibrary, min_pixels: usize) -> Self {
        Self { current: RwLock::new(Arc::new(library)), min_pixels }
    }

    pub fn open(dir: &Path, min_pixels: usize) -> Result<Self, LoadError> {
        Ok(Self::new(TemplateLibrary::load_dir(dir, min_pixels)?, min_pixels))
    }

    pub fn snapshot(&self) -> Arc<TemplateLibrary> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rebuilds the library from `dir` and swaps it in. On error the
    /// previous library stays published.
    pub fn reload_templates(&self, dir: &Path) -> Result<(), LoadError> {
        let fresh = TemplateLibrary::load_dir(dir, self.min_pixels)?;
        self.replace(fresh);
        Ok(())
    }

    pub fn replace(&self, library: TemplateLibrary) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(library);
    }
}
