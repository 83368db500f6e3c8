use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::bundle::{Bundle, ItemId, ImportReport};
use crate::assets::decode::{ImageAsset, encode_png};
use crate::assets::trim::{DEFAULT_ALPHA_THRESHOLD, TrimResult};
use crate::assets::trim_cache::TrimCache;
use crate::capture::scheduler::{CaptureLock, CaptureOpts, DEFAULT_TAIL_MS, Pacing, capture};
use crate::effects::transitions::Transition;
use crate::encode::sink::{FrameSink, VideoArtifact, VideoFormat};
use crate::export::naming::{COLLAGE_FILE_NAME, single_file_name};
use crate::export::writer::ArtifactWriter;
use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{StageError, StageResult};
use crate::layout::grid::{GridLayout, GridParams, LayoutItem, layout_grid};
use crate::layout::stage::{Corner, DragHandle, StageArea};
use crate::order::shuffle::display_order;
use crate::render::reveal::{RevealEntry, RevealRenderer, compose_collage, compose_single_in_frame};
use crate::render::surface::Surface;
use crate::render::timeline::RevealTiming;

/// Shortest per-item reveal the session accepts.
pub const MIN_PER_ITEM_MS: u64 = 100;

/// Seeds drawn by [`Studio::randomize`] lie in `[0, RANDOM_SEED_SPAN)`.
pub const RANDOM_SEED_SPAN: u64 = 1_000_000_000;

/// User-tunable knobs of an editing session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioSettings {
    /// Shuffle seed for the display order.
    pub seed: u32,
    /// Grid columns, `0` for automatic.
    pub columns: u32,
    /// Gap between grid cells in pixels.
    pub gap: u32,
    /// Reveal effect.
    pub transition: Transition,
    /// Reveal duration per item.
    pub per_item_ms: u64,
    /// Pause before each item after the first.
    pub gap_ms: u64,
    /// Animation frame rate.
    pub fps: u32,
    /// Hold on the final frame.
    pub tail_ms: u64,
    /// Pixels with alpha above this survive trimming.
    pub alpha_threshold: u8,
    /// Export one still per item next to the collage.
    pub export_singles: bool,
    /// Container of the exported animation.
    pub video_format: VideoFormat,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            seed: 1,
            columns: 0,
            gap: 8,
            transition: Transition::Fade,
            per_item_ms: 800,
            gap_ms: 150,
            fps: 30,
            tail_ms: DEFAULT_TAIL_MS,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            export_singles: true,
            video_format: VideoFormat::Webm,
        }
    }
}

impl StudioSettings {
    /// Reject settings the renderer cannot honor.
    pub fn validate(&self) -> StageResult<()> {
        if self.fps == 0 || self.fps > 240 {
            return Err(StageError::validation(format!(
                "fps must be in 1..=240, got {}",
                self.fps
            )));
        }
        if self.per_item_ms < MIN_PER_ITEM_MS {
            return Err(StageError::validation(format!(
                "per_item_ms must be at least {MIN_PER_ITEM_MS}, got {}",
                self.per_item_ms
            )));
        }
        Ok(())
    }

    /// Frame rate as [`Fps`].
    pub fn frame_rate(&self) -> StageResult<Fps> {
        Fps::integer(self.fps)
    }

    /// Reveal frame budget at the configured rate.
    pub fn timing(&self) -> StageResult<RevealTiming> {
        Ok(RevealTiming::from_millis(
            self.frame_rate()?,
            self.per_item_ms,
            self.gap_ms,
        ))
    }
}

/// Names of the artifacts an export wrote, in write order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Written file names.
    pub files: Vec<String>,
}

/// The editing session: background, bundle, stage area and settings, plus the derived trim
/// table. Every derived view (order, layout, frames) is recomputed on demand.
#[derive(Debug)]
pub struct Studio {
    settings: StudioSettings,
    background: Option<ImageAsset>,
    area: StageArea,
    bundle: Bundle,
    trims: TrimCache,
    capture_lock: CaptureLock,
}

impl Studio {
    /// Empty session with validated settings.
    pub fn new(settings: StudioSettings) -> StageResult<Self> {
        settings.validate()?;
        Ok(Self {
            trims: TrimCache::new(settings.alpha_threshold),
            settings,
            background: None,
            area: StageArea::new(60, 60, 800, 500),
            bundle: Bundle::new(),
            capture_lock: CaptureLock::new(),
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    /// Replace every setting. A new alpha threshold retrims the whole bundle.
    pub fn set_settings(&mut self, settings: StudioSettings) -> StageResult<()> {
        settings.validate()?;
        if settings.alpha_threshold != self.trims.alpha_threshold() {
            self.trims = TrimCache::new(settings.alpha_threshold).patched(&self.bundle);
        }
        self.settings = settings;
        Ok(())
    }

    /// Set the background and reset the stage area to its default for that size.
    pub fn set_background(&mut self, background: ImageAsset) {
        self.area = StageArea::default_for(background.size());
        self.background = Some(background);
    }

    /// Current background, if one was set.
    pub fn background(&self) -> Option<&ImageAsset> {
        self.background.as_ref()
    }

    fn require_background(&self) -> StageResult<&ImageAsset> {
        self.background
            .as_ref()
            .ok_or_else(|| StageError::validation("no background image set"))
    }

    /// Items in insertion order.
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Trim results for the current bundle.
    pub fn trims(&self) -> &TrimCache {
        &self.trims
    }

    fn refresh_trims(&mut self) {
        self.trims = self.trims.patched(&self.bundle);
    }

    /// Decode and add many files; undecodable files are reported, not fatal.
    pub fn import<N, B>(&mut self, files: &[(N, B)]) -> ImportReport
    where
        N: AsRef<str> + Sync,
        B: AsRef<[u8]> + Sync,
    {
        let report = self.bundle.import(files);
        self.refresh_trims();
        report
    }

    /// Add one decoded image.
    pub fn add_item(&mut self, asset: ImageAsset) -> ItemId {
        let id = self.bundle.push(asset);
        self.refresh_trims();
        id
    }

    /// Remove an item; `false` when it did not exist.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let removed = self.bundle.remove(id).is_some();
        if removed {
            self.refresh_trims();
        }
        removed
    }

    /// Swap the image behind `id` and retrim it.
    pub fn replace_item(&mut self, id: ItemId, asset: ImageAsset) -> StageResult<()> {
        self.bundle
            .replace_asset(id, asset)
            .ok_or_else(|| StageError::validation(format!("unknown bundle item {id}")))?;
        self.trims = self.trims.invalidated(id).patched(&self.bundle);
        Ok(())
    }

    /// Drop every item.
    pub fn reset_bundle(&mut self) {
        self.bundle.clear();
        self.refresh_trims();
    }

    /// Current shuffle seed.
    pub fn seed(&self) -> u32 {
        self.settings.seed
    }

    /// Replay the order of a known seed.
    pub fn set_seed(&mut self, seed: u32) {
        self.settings.seed = seed;
    }

    /// Pick a fresh seed and return it.
    pub fn randomize(&mut self) -> u32 {
        static NONCE: AtomicU64 = AtomicU64::new(0);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut h = Fnv1a64::new();
        h.write_u64(nanos);
        h.write_u64(NONCE.fetch_add(1, Ordering::Relaxed));
        h.write_u64(u64::from(self.settings.seed));
        let seed = (h.finish() % RANDOM_SEED_SPAN) as u32;
        tracing::debug!(seed, "randomized display order");
        self.settings.seed = seed;
        seed
    }

    /// Current stage area.
    pub fn area(&self) -> StageArea {
        self.area
    }

    fn background_size(&self) -> Option<Size> {
        self.background.as_ref().map(ImageAsset::size)
    }

    /// Replace the stage area, clamped into the background when one is set.
    pub fn set_area(&mut self, area: StageArea) {
        self.area = match self.background_size() {
            Some(bg) => area.clamp_to(bg),
            None => area,
        };
    }

    /// Move the stage area. Requires a background to clamp against.
    pub fn move_area(&mut self, dx: f64, dy: f64) -> StageResult<StageArea> {
        self.drag_area(DragHandle::Move, dx, dy)
    }

    /// Resize the stage area from `corner`. Requires a background to clamp against.
    pub fn resize_area(&mut self, corner: Corner, dx: f64, dy: f64) -> StageResult<StageArea> {
        self.drag_area(DragHandle::Resize(corner), dx, dy)
    }

    /// Apply a pointer drag that started on `handle`.
    pub fn drag_area(&mut self, handle: DragHandle, dx: f64, dy: f64) -> StageResult<StageArea> {
        let bg = self.require_background()?.size();
        self.area = self.area.drag(handle, dx, dy, bg);
        Ok(self.area)
    }

    /// Every bundle item, shuffled by the current seed.
    pub fn display_order(&self) -> Vec<ItemId> {
        display_order(&self.bundle.ids(), self.settings.seed)
    }

    // Display-ordered items with a drawable trim.
    fn drawable_in_order(&self) -> Vec<(ItemId, Size, Arc<TrimResult>)> {
        self.display_order()
            .into_iter()
            .filter_map(|id| {
                let item = self.bundle.get(id)?;
                let trim = self.trims.get(id)?;
                trim.is_drawable()
                    .then(|| (id, item.asset.size(), Arc::clone(trim)))
            })
            .collect()
    }

    /// Grid placements for the drawable items, in display order.
    pub fn layout(&self) -> GridLayout {
        self.layout_of(&self.drawable_in_order())
    }

    fn layout_of(&self, drawable: &[(ItemId, Size, Arc<TrimResult>)]) -> GridLayout {
        let items: Vec<LayoutItem> = drawable
            .iter()
            .map(|(id, original, trim)| LayoutItem {
                id: *id,
                trimmed: Some(trim.size()),
                original: *original,
            })
            .collect();
        layout_grid(&items, self.grid_params())
    }

    fn grid_params(&self) -> GridParams {
        GridParams {
            area_w: self.area.w.max(1),
            area_h: self.area.h.max(1),
            columns: self.settings.columns,
            gap: self.settings.gap,
        }
    }

    fn reveal_entries(&self) -> Vec<RevealEntry> {
        let drawable = self.drawable_in_order();
        self.layout_of(&drawable)
            .placements
            .into_iter()
            .zip(drawable)
            .map(|(placement, (_, _, trim))| RevealEntry { placement, trim })
            .collect()
    }

    /// Background with every item at its grid placement.
    pub fn collage(&self) -> StageResult<Surface> {
        let bg = self.require_background()?;
        Ok(compose_collage(bg.surface(), self.area, &self.reveal_entries()))
    }

    /// One still per drawable item: background plus that item contain-fitted into the stage
    /// area, named by display position.
    pub fn singles(&self) -> StageResult<Vec<(String, Surface)>> {
        let bg = self.require_background()?;
        Ok(self
            .display_order()
            .into_iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let item = self.bundle.get(id)?;
                let trim = self.trims.get(id).filter(|t| t.is_drawable())?;
                Some((
                    single_file_name(i + 1, item.asset.name()),
                    compose_single_in_frame(bg.surface(), self.area, trim),
                ))
            })
            .collect())
    }

    /// Frame renderer for the current state.
    pub fn renderer(&self) -> StageResult<RevealRenderer> {
        let bg = self.require_background()?;
        Ok(RevealRenderer::new(
            bg.shared_surface(),
            self.area,
            &self.reveal_entries(),
            self.settings.timing()?,
            self.settings.transition,
        ))
    }

    /// Capture settings derived from the session.
    pub fn capture_opts(&self, pacing: Pacing) -> StageResult<CaptureOpts> {
        Ok(CaptureOpts::new(self.settings.frame_rate()?)
            .with_tail_millis(self.settings.tail_ms)
            .with_pacing(pacing))
    }

    /// Render the reveal animation into `sink`. Only one capture runs at a time.
    pub async fn render_video<S>(&self, sink: &mut S, pacing: Pacing) -> StageResult<VideoArtifact>
    where
        S: FrameSink + ?Sized,
    {
        let _guard = self.capture_lock.try_acquire()?;
        let renderer = self.renderer()?;
        if renderer.is_empty() {
            return Err(StageError::validation("no drawable items to animate"));
        }
        let opts = self.capture_opts(pacing)?;
        capture(
            sink,
            renderer.size(),
            renderer.total_frames(),
            opts,
            |idx| Ok(renderer.draw_frame(idx)),
        )
        .await
    }

    /// Write the collage and, when enabled, every single still as PNG.
    #[tracing::instrument(skip_all)]
    pub fn export_stills(&self, writer: &mut dyn ArtifactWriter) -> StageResult<ExportSummary> {
        let mut summary = ExportSummary::default();
        writer.write(COLLAGE_FILE_NAME, &encode_png(&self.collage()?)?)?;
        summary.files.push(COLLAGE_FILE_NAME.to_string());

        if self.settings.export_singles {
            for (name, surface) in self.singles()? {
                writer.write(&name, &encode_png(&surface)?)?;
                summary.files.push(name);
            }
        }
        tracing::info!(files = summary.files.len(), "stills exported");
        Ok(summary)
    }

    /// Stills first, then the animation. A failed capture leaves the stills in place.
    pub async fn export_all<S>(
        &self,
        writer: &mut dyn ArtifactWriter,
        sink: &mut S,
        pacing: Pacing,
    ) -> StageResult<ExportSummary>
    where
        S: FrameSink + ?Sized,
    {
        let mut summary = self.export_stills(writer)?;
        let video = self.render_video(sink, pacing).await?;
        let name = video.file_name();
        writer.write(&name, &video.bytes)?;
        summary.files.push(name);
        Ok(summary)
    }
}

// FNV-1a, used to mix seed entropy.
#[derive(Clone, Copy, Debug)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    fn write_u64(&mut self, v: u64) {
        for b in v.to_le_bytes() {
            self.0 = (self.0 ^ u64::from(b)).wrapping_mul(Self::PRIME);
        }
    }

    fn finish(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
