use crate::feature::FeatureVector;
use crate::grid::PixelGrid;
use crate::templates::{TemplateLibrary, TemplateStore};

/// Closest template found for one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMatch {
    pub label: char,
    /// Squared feature distance to the winning template.
    pub distance: f64,
}

/// Something that can put a label on a tightened glyph grid.
///
/// The classifier always answers with its best candidate; rejecting weak
/// matches is left to the caller (see [`GlyphMatch::distance`]).
pub trait GlyphClassifier: Send + Sync {
    fn classify(&self, glyph: &PixelGrid) -> Option<GlyphMatch>;
}

impl TemplateLibrary {
    /// Linear nearest-neighbour scan over every template.
    ///
    /// A template only replaces the running best when it is strictly
    /// closer, so exact ties go to the first template in canonical order.
    pub fn nearest(&self, features: &FeatureVector) -> Option<GlyphMatch> {
        let mut best: Option<GlyphMatch> = None;
        for template in self.iter() {
            let distance = features.squared_distance(&template.features);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(GlyphMatch { label: template.label, distance });
            }
        }
        best
    }
}

impl GlyphClassifier for TemplateLibrary {
    fn classify(&self, glyph: &PixelGrid) -> Option<GlyphMatch> {
        self.nearest(&FeatureVector::extract(glyph))
    }
}

impl GlyphClassifier for TemplateStore {
    fn classify(&self, glyph: &PixelGrid) -> Option<GlyphMatch> {
        self.snapshot().classify(glyph)
    }
}
