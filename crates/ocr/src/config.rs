use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::FieldInterpreter;
use crate::grid::Rect;
use crate::segment::{SegmentParams, BAND_GAP, GLYPH_GAP, MIN_COMPONENT_PIXELS, REGION_GAP};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("file/charlib")
}

fn default_utc_offset_minutes() -> i32 {
    8 * 60
}

/// Reader settings. Every key is optional; an empty document gives the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub template_dir: PathBuf,
    pub band_gap: usize,
    pub glyph_gap: usize,
    pub region_gap: usize,
    pub min_component_pixels: usize,
    /// Offset of the civil zone timestamps are read in, east of UTC.
    pub utc_offset_minutes: i32,
    pub keep_time_of_day: bool,
    #[serde(rename = "layout")]
    pub layouts: Vec<LayoutProfile>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            band_gap: BAND_GAP,
            glyph_gap: GLYPH_GAP,
            region_gap: REGION_GAP,
            min_component_pixels: MIN_COMPONENT_PIXELS,
            utc_offset_minutes: default_utc_offset_minutes(),
            keep_time_of_day: false,
            layouts: LayoutProfile::builtin(),
        }
    }
}

impl OcrConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let gaps = [
            ("band_gap", self.band_gap),
            ("glyph_gap", self.glyph_gap),
            ("region_gap", self.region_gap),
            ("min_component_pixels", self.min_component_pixels),
        ];
        if let Some((name, _)) = gaps.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }
        self.zone()?;

        let mut names = HashSet::new();
        for layout in &self.layouts {
            if !names.insert(layout.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate layout '{}'", layout.name)));
            }
            if let Some(f) = layout.fields.iter().find(|f| f.top > f.bottom || f.left > f.right) {
                return Err(ConfigError::Invalid(format!(
                    "layout '{}' has an inverted region ({}, {}, {}, {})",
                    layout.name, f.top, f.left, f.bottom, f.right
                )));
            }
        }
        Ok(())
    }

    pub fn zone(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn segment_params(&self) -> SegmentParams {
        SegmentParams {
            band_gap: self.band_gap,
            glyph_gap: self.glyph_gap,
            region_gap: self.region_gap,
            min_component_pixels: self.min_component_pixels,
        }
    }

    pub fn interpreter(&self) -> Result<FieldInterpreter, ConfigError> {
        Ok(FieldInterpreter::new(self.zone()?, self.keep_time_of_day))
    }

    pub fn layout(&self, name: &str) -> Option<&LayoutProfile> {
        self.layouts.iter().find(|l| l.name == name)
    }
}

/// One free-text region of a screenshot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionField {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
    /// Appended verbatim to whatever was read.
    #[serde(default)]
    pub suffix: String,
}

impl RegionField {
    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self { top, left, bottom, right, suffix: String::new() }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.top, self.left, self.bottom, self.right)
    }
}

/// Pixel regions worth reading on one known screenshot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutProfile {
    pub name: String,
    pub fields: Vec<RegionField>,
}

impl LayoutProfile {
    /// The four screenshot layouts the reader ships with.
    pub fn builtin() -> Vec<LayoutProfile> {
        vec![
            LayoutProfile {
                name: "1".into(),
                fields: vec![RegionField::new(370, 200, 500, 500), RegionField::new(760, 200, 800, 550)],
            },
            LayoutProfile {
                name: "2".into(),
                fields: vec![RegionField::new(220, 100, 320, 600), RegionField::new(600, 380, 670, 740)],
            },
            LayoutProfile {
                name: "3".into(),
                fields: vec![
                    RegionField::new(410, 200, 550, 900),
                    RegionField::new(1090, 740, 1170, 1210).with_suffix(":00"),
                ],
            },
            LayoutProfile {
                name: "4".into(),
                fields: vec![
                    RegionField::new(230, 200, 310, 700),
                    RegionField::new(820, 450, 880, 730).with_suffix(":00"),
                ],
            },
        ]
    }
}
