use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::bundle::{ImportFailure, ImportReport};
use crate::assets::decode::ImageAsset;
use crate::capture::scheduler::DEFAULT_TAIL_MS;
use crate::effects::transitions::Transition;
use crate::encode::sink::VideoFormat;
use crate::foundation::error::{StageError, StageResult};
use crate::layout::stage::{MIN_STAGE_SIDE, StageArea};
use crate::session::studio::{Studio, StudioSettings};

fn default_gap() -> u32 {
    8
}

fn default_seed() -> u32 {
    1
}

fn default_per_item_ms() -> u64 {
    800
}

fn default_gap_ms() -> u64 {
    150
}

fn default_fps() -> u32 {
    30
}

fn default_tail_ms() -> u64 {
    DEFAULT_TAIL_MS
}

fn default_alpha_threshold() -> u8 {
    crate::assets::trim::DEFAULT_ALPHA_THRESHOLD
}

fn default_true() -> bool {
    true
}

/// JSON project file: the background, the bundle, and every session setting.
///
/// Relative paths resolve against the directory passed to [`ProjectConfig::into_studio`]
/// (normally the project file's directory).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Background image.
    pub background: PathBuf,
    /// Foreground images, in insertion order.
    #[serde(default)]
    pub items: Vec<PathBuf>,
    /// Stage area; centered 70% x 50% of the background when absent.
    #[serde(default)]
    pub area: Option<StageArea>,
    /// Grid columns, `0` for automatic.
    #[serde(default)]
    pub columns: u32,
    /// Gap between cells in pixels.
    #[serde(default = "default_gap")]
    pub gap: u32,
    /// Shuffle seed.
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Reveal effect.
    #[serde(default)]
    pub transition: Transition,
    /// Reveal duration per item, at least 100.
    #[serde(default = "default_per_item_ms")]
    pub per_item_ms: u64,
    /// Pause before each item after the first.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
    /// Animation frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Hold on the final frame.
    #[serde(default = "default_tail_ms")]
    pub tail_ms: u64,
    /// Trim threshold.
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
    /// Export one still per item.
    #[serde(default = "default_true")]
    pub export_singles: bool,
    /// Animation container.
    #[serde(default)]
    pub video_format: VideoFormat,
}

impl ProjectConfig {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StageResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StageError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StageError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Session settings carried by this project.
    pub fn settings(&self) -> StudioSettings {
        StudioSettings {
            seed: self.seed,
            columns: self.columns,
            gap: self.gap,
            transition: self.transition,
            per_item_ms: self.per_item_ms,
            gap_ms: self.gap_ms,
            fps: self.fps,
            tail_ms: self.tail_ms,
            alpha_threshold: self.alpha_threshold,
            export_singles: self.export_singles,
            video_format: self.video_format,
        }
    }

    /// Check everything that does not need the image files.
    pub fn validate(&self) -> StageResult<()> {
        if self.background.as_os_str().is_empty() {
            return Err(StageError::validation("project background path is empty"));
        }
        if let Some(area) = self.area
            && (area.w < MIN_STAGE_SIDE || area.h < MIN_STAGE_SIDE)
        {
            return Err(StageError::validation(format!(
                "stage area must be at least {MIN_STAGE_SIDE}x{MIN_STAGE_SIDE}, got {}x{}",
                area.w, area.h
            )));
        }
        self.settings().validate()
    }

    /// Load every image and build a session. The background must load; item files that cannot
    /// be read or decoded are reported and skipped.
    #[tracing::instrument(skip(self), fields(items = self.items.len()))]
    pub fn into_studio(&self, root: &Path) -> StageResult<(Studio, ImportReport)> {
        self.validate()?;
        let mut studio = Studio::new(self.settings())?;

        let bg_path = resolve(root, &self.background);
        let bg_bytes = std::fs::read(&bg_path)
            .with_context(|| format!("read background '{}'", bg_path.display()))?;
        studio.set_background(ImageAsset::decode(display_name(&bg_path), &bg_bytes)?);
        if let Some(area) = self.area {
            studio.set_area(area);
        }

        let mut files = Vec::with_capacity(self.items.len());
        let mut unreadable = Vec::new();
        for item in &self.items {
            let path = resolve(root, item);
            match std::fs::read(&path) {
                Ok(bytes) => files.push((display_name(&path), bytes)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable item");
                    unreadable.push(ImportFailure {
                        name: display_name(&path),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut report = studio.import(&files);
        report.failed.extend(unreadable);
        Ok((studio, report))
    }
}

fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/config/project.rs"]
mod tests;
