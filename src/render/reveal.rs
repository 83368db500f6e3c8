use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::bundle::ItemId;
use crate::assets::trim::TrimResult;
use crate::effects::transitions::{Transition, reveal_draw};
use crate::foundation::core::{FrameIndex, PxRect, Size};
use crate::layout::grid::Placement;
use crate::layout::stage::StageArea;
use crate::render::surface::{BlitOpts, Surface};
use crate::render::timeline::{RevealState, RevealTiming};

/// A placed item paired with its trimmed pixels, in display order.
#[derive(Clone, Debug)]
pub struct RevealEntry {
    /// Where the item rests, relative to the stage area.
    pub placement: Placement,
    /// Alpha-trimmed pixels of the item.
    pub trim: Arc<TrimResult>,
}

#[derive(Clone, Debug)]
struct Sprite {
    id: ItemId,
    rest: PxRect,
    pixels: Surface,
}

impl Sprite {
    fn paint_settled(&self, canvas: &mut Surface) {
        canvas.blit(
            &self.pixels,
            PxRect::from_size(self.pixels.size()),
            self.rest,
            BlitOpts::default(),
        );
    }

    fn paint_revealing(&self, canvas: &mut Surface, transition: Transition, progress: f32) {
        let draw = reveal_draw(transition, progress, self.rest.to_rect());
        canvas.draw_scaled(
            &self.pixels,
            PxRect::from_rect_round(draw.rect),
            BlitOpts {
                opacity: draw.opacity,
                clip: draw.clip.map(PxRect::from_rect_round),
            },
        );
    }
}

// Resampled once to the resting size so settled items are plain copies per frame.
fn build_sprites(area: StageArea, entries: &[RevealEntry]) -> Vec<Sprite> {
    entries
        .par_iter()
        .filter(|e| e.trim.is_drawable())
        .map(|e| {
            let rest = e.placement.rect_at(area.x, area.y);
            Sprite {
                id: e.placement.id,
                rest,
                pixels: e.trim.surface().resized(rest.w, rest.h),
            }
        })
        .collect()
}

/// Renders any frame of the reveal animation from scratch.
///
/// `draw_frame` holds no state between calls: the same index always yields the same pixels,
/// whatever was drawn before.
#[derive(Clone, Debug)]
pub struct RevealRenderer {
    background: Arc<Surface>,
    sprites: Vec<Sprite>,
    timing: RevealTiming,
    transition: Transition,
}

impl RevealRenderer {
    /// Prepare the renderer. Entries with an empty trim take no part in the animation.
    #[tracing::instrument(skip_all, fields(entries = entries.len(), transition = %transition))]
    pub fn new(
        background: Arc<Surface>,
        area: StageArea,
        entries: &[RevealEntry],
        timing: RevealTiming,
        transition: Transition,
    ) -> Self {
        let sprites = build_sprites(area, entries);
        if sprites.len() != entries.len() {
            tracing::warn!(
                skipped = entries.len() - sprites.len(),
                "items with an empty trim are not animated"
            );
        }
        Self {
            background,
            sprites,
            timing,
            transition,
        }
    }

    /// Number of animated items.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// True when nothing would be revealed.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Ids of the animated items, in reveal order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.sprites.iter().map(|s| s.id).collect()
    }

    /// Output frame size (the background's size).
    pub fn size(&self) -> Size {
        self.background.size()
    }

    /// Frame budget in use.
    pub fn timing(&self) -> RevealTiming {
        self.timing
    }

    /// Active transition.
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Length of the animation in frames.
    pub fn total_frames(&self) -> u64 {
        self.timing.total_frames(self.sprites.len())
    }

    /// Timeline state at `frame`.
    pub fn state_at(&self, frame: FrameIndex) -> RevealState {
        self.timing.state_at(self.sprites.len(), frame)
    }

    /// Background, every completed item, then the revealing item at its current progress.
    pub fn draw_frame(&self, frame: FrameIndex) -> Surface {
        let state = self.state_at(frame);
        let mut canvas = (*self.background).clone();
        for sprite in &self.sprites[..state.revealed] {
            sprite.paint_settled(&mut canvas);
        }
        if let Some(active) = state.active
            && let Some(sprite) = self.sprites.get(active.index)
        {
            sprite.paint_revealing(&mut canvas, self.transition, active.progress);
        }
        canvas
    }

    /// Every item at rest.
    pub fn draw_final(&self) -> Surface {
        let mut canvas = (*self.background).clone();
        for sprite in &self.sprites {
            sprite.paint_settled(&mut canvas);
        }
        canvas
    }
}

/// Background with every placement drawn at `area.origin + placement`.
pub fn compose_collage(background: &Surface, area: StageArea, entries: &[RevealEntry]) -> Surface {
    let mut canvas = background.clone();
    for sprite in build_sprites(area, entries) {
        sprite.paint_settled(&mut canvas);
    }
    canvas
}

/// Largest rectangle with the aspect ratio of `content` that fits in `area`, centered.
pub fn contain_fit(area: StageArea, content: Size) -> PxRect {
    let ratio = f64::from(content.width) / f64::from(content.height.max(1));
    let mut dw = f64::from(area.w);
    let mut dh = f64::from(area.h);
    if dw / dh.max(1.0) > ratio {
        dw = (dh * ratio).round();
    } else if ratio > 0.0 {
        dh = (dw / ratio).round();
    }
    let dw = dw.max(1.0);
    let dh = dh.max(1.0);
    let dx = (f64::from(area.x) + (f64::from(area.w) - dw) / 2.0).round();
    let dy = (f64::from(area.y) + (f64::from(area.h) - dh) / 2.0).round();
    PxRect::new(dx as i32, dy as i32, dw as u32, dh as u32)
}

/// Background with one item contain-fitted into the stage area. An empty trim leaves the
/// background untouched.
pub fn compose_single_in_frame(background: &Surface, area: StageArea, trim: &TrimResult) -> Surface {
    let mut canvas = background.clone();
    if trim.is_drawable() {
        canvas.draw_scaled(
            trim.surface(),
            contain_fit(area, trim.size()),
            BlitOpts::default(),
        );
    }
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/render/reveal.rs"]
mod tests;
