use anyhow::{bail, Context, Result};
use billscan_core::ExtractedRecord;
use billscan_ocr::{
    load_grid, spawn_intake_watcher, spawn_template_watcher, OcrConfig, PixelGrid, Rect, ScreenshotReader,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Serialize, PartialEq)]
pub struct ScanOutput {
    pub path: String,
    pub amount_cents: Option<i64>,
    /// Human-readable amount, e.g. `-$9.99`.
    pub amount: Option<String>,
    /// RFC 3339 with the configured offset.
    pub timestamp: Option<String>,
}

impl ScanOutput {
    pub fn new(path: &Path, record: &ExtractedRecord) -> Self {
        Self {
            path: path.display().to_string(),
            amount_cents: record.amount_cents(),
            amount: record.amount.map(|m| m.to_string()),
            timestamp: record.timestamp.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }
}

pub fn scan(reader: &ScreenshotReader, images: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;
    for path in images {
        match reader.recognize_band_file(path) {
            Ok(record) => println!("{}", serde_json::to_string(&ScanOutput::new(path, &record))?),
            Err(e) => {
                failed += 1;
                tracing::warn!("{}: {e}", path.display());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} screenshots could not be read", images.len());
    }
    Ok(())
}

pub fn region(reader: &ScreenshotReader, image: &Path, rect: Rect, dump_dir: Option<&Path>) -> Result<()> {
    let grid = load_grid(image).with_context(|| format!("Failed to read {}", image.display()))?;
    println!("{}", reader.recognize_region(&grid, rect));
    if let Some(dir) = dump_dir {
        let written = dump_crops(reader, &grid, rect, dir)?;
        tracing::info!(files = written, "Wrote crops to {}", dir.display());
    }
    Ok(())
}

/// Writes `region.png` plus `glyph_NN.png` per glyph into `dir`. Returns the number of files written.
fn dump_crops(reader: &ScreenshotReader, grid: &PixelGrid, rect: Rect, dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let (region, glyphs) = reader.region_crops(grid, rect);
    if region.is_empty() {
        return Ok(0);
    }
    let mut crops = vec![("region.png".to_string(), region)];
    crops.extend(glyphs.into_iter().enumerate().map(|(i, g)| (format!("glyph_{i:02}.png"), g)));
    for (name, crop) in &crops {
        let path = dir.join(name);
        crop.to_rgb_image()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(crops.len())
}

pub fn layout(reader: &ScreenshotReader, config: &OcrConfig, image: &Path, profile: Option<&str>) -> Result<()> {
    let grid = load_grid(image).with_context(|| format!("Failed to read {}", image.display()))?;
    let profiles = match profile {
        Some(name) => match config.layout(name) {
            Some(p) => std::slice::from_ref(p),
            None => bail!("Unknown layout profile '{name}'"),
        },
        None => config.layouts.as_slice(),
    };
    println!("{}", reader.describe_layouts(&grid, profiles));
    Ok(())
}

pub fn templates(reader: &ScreenshotReader) -> Result<()> {
    let entries = reader.store().snapshot().entries();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Rebuilds the template library on the blocking pool and returns the new template count.
async fn reload_off_runtime(reader: &Arc<ScreenshotReader>, dir: &Path) -> Result<usize> {
    let reader = Arc::clone(reader);
    let dir = dir.to_path_buf();
    let count = tokio::task::spawn_blocking(move || {
        reader.store().reload_templates(&dir)?;
        anyhow::Ok(reader.store().snapshot().len())
    })
    .await
    .context("Template reload task failed")??;
    Ok(count)
}

/// Runs until Ctrl-C: new screenshots in `intake_dir` are scanned on the
/// blocking pool, and any change under the template directory triggers a reload.
pub async fn watch(reader: Arc<ScreenshotReader>, config: &OcrConfig, intake_dir: &Path) -> Result<()> {
    // The channels bridge the notify watcher threads and the async loop.
    let (image_tx, mut image_rx) = mpsc::channel::<PathBuf>(64);
    let (reload_tx, mut reload_rx) = mpsc::channel::<()>(1);

    let _intake = spawn_intake_watcher(intake_dir, image_tx)
        .with_context(|| format!("Failed to watch {}", intake_dir.display()))?;
    let _templates = spawn_template_watcher(&config.template_dir, reload_tx)
        .with_context(|| format!("Failed to watch {}", config.template_dir.display()))?;

    tracing::info!("Watching intake folder: {}", intake_dir.display());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(path) = image_rx.recv() => {
                tracing::info!("Processing screenshot: {}", path.display());
                let reader = Arc::clone(&reader);
                let result = tokio::task::spawn_blocking(move || {
                    let out = reader.recognize_band_file(&path);
                    (path, out)
                })
                .await;
                match result {
                    Ok((path, Ok(record))) => {
                        println!("{}", serde_json::to_string(&ScanOutput::new(&path, &record))?);
                    }
                    Ok((path, Err(e))) => tracing::warn!("{}: {e}", path.display()),
                    Err(e) => tracing::warn!("Recognition task failed: {e}"),
                }
            }
            Some(()) = reload_rx.recv() => {
                match reload_off_runtime(&reader, &config.template_dir).await {
                    Ok(count) => tracing::info!(templates = count, "Reloaded glyph templates"),
                    Err(e) => tracing::warn!("Template reload failed, keeping previous set: {e:#}"),
                }
            }
            res = &mut shutdown => {
                if let Err(e) = res {
                    tracing::warn!("Ctrl-C handler failed: {e}");
                }
                tracing::info!("Shutting down");
                return Ok(());
            }
        }
    }
}
