//! # stagegrid guide
//!
//! A walkthrough of how a collage and its reveal animation are produced, and which types own
//! each step. For command-line usage see the repository `README.md`.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Studio`](crate::Studio): the editing session (background, bundle, stage area, settings)
//! - [`Bundle`](crate::Bundle): the foreground images, each with a stable [`ItemId`](crate::ItemId)
//! - [`TrimResult`](crate::TrimResult): an image cropped to its opaque bounding box
//! - [`StageArea`](crate::StageArea): the rectangle of the background the grid is drawn into
//! - [`GridLayout`](crate::GridLayout): one [`Placement`](crate::Placement) per drawable item
//! - [`RevealRenderer`](crate::RevealRenderer): draws any animation frame from scratch
//! - [`FrameSink`](crate::FrameSink): consumes frames and produces a
//!   [`VideoArtifact`](crate::VideoArtifact)
//!
//! The pipeline is a chain of pure derivations:
//!
//! 1. Trim every item once: [`TrimCache::patched`](crate::TrimCache::patched)
//! 2. Order items by seed: [`display_order`](crate::display_order)
//! 3. Place them in the stage area: [`layout_grid`](crate::layout_grid)
//! 4. Render frames: [`RevealRenderer::draw_frame`](crate::RevealRenderer::draw_frame)
//! 5. Capture frames into a sink: [`capture`](crate::capture)
//!
//! Stills reuse steps 1 to 3 and skip the animation:
//! [`compose_collage`](crate::compose_collage) and
//! [`compose_single_in_frame`](crate::compose_single_in_frame).
//!
//! ---
//!
//! ## Pixels
//!
//! Every [`Surface`](crate::Surface) stores **premultiplied RGBA8**. Decoding premultiplies,
//! PNG encoding un-premultiplies, and the ffmpeg sink flattens alpha over an opaque color before
//! writing raw frames.
//!
//! ## Trimming
//!
//! [`trim_surface`](crate::trim_surface) keeps pixels whose alpha is strictly above the
//! threshold (1 by default). An image with no such pixel yields an empty result; empty results
//! take no grid cell, no animation slot and no single still.
//!
//! ## Ordering
//!
//! The display order is a Fisher-Yates shuffle driven by [`XorShift32`](crate::XorShift32).
//! The same seed always yields the same order, on every platform. Seed `0` is replaced by
//! `123456789`.
//!
//! ## Layout
//!
//! With `columns == 0` the column count is `round(sqrt(n * w / h))`. Cells are
//! `floor((area - gap * (count - 1)) / count)` on each axis; items are scaled uniformly to fit
//! their cell and centered in it. If the area cannot hold the cells, the gap shrinks, cells clamp
//! to one pixel, and [`GridLayout::degenerate`](crate::GridLayout::degenerate) is set.
//!
//! ## Timeline
//!
//! Items reveal strictly one after another. Item 0 owns `per_item_frames`; every later item owns
//! `gap_frames + per_item_frames`. Inside a gap only completed items are visible. The last
//! animation frame shows every item at rest.
//!
//! ## Capture
//!
//! [`capture`](crate::capture) ticks `total + tail` times. Tick `t` draws frame
//! `min(t, total - 1)`, so the final composite is held for the tail. With
//! [`Pacing::RealTime`](crate::Pacing::RealTime) ticks follow a tokio interval that delays after
//! an overrun instead of bursting. Only one capture per [`Studio`](crate::Studio) runs at a time;
//! a second one fails with [`StageError::CaptureBusy`](crate::StageError::CaptureBusy).
