//! stagegrid composites alpha-trimmed foreground images into a grid over a background image
//! and replays the composition as a timed reveal animation captured to video.
//!
//! # Pipeline overview
//!
//! 1. **Trim**: crop each image to its opaque bounds, once per item ([`TrimCache`])
//! 2. **Order**: seeded, reproducible shuffle ([`display_order`])
//! 3. **Layout**: place the items in a grid inside the stage area ([`layout_grid`])
//! 4. **Render**: draw any frame of the reveal from scratch ([`RevealRenderer`])
//! 5. **Capture**: drive the renderer at a fixed frame rate into a [`FrameSink`]
//!    (optionally the system `ffmpeg` binary for WebM/MP4 output)
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: ordering, layout and frames are pure functions of their inputs.
//! - **Premultiplied RGBA8** end-to-end inside [`Surface`].
//!
//! See [`crate::guide`] for a walkthrough.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod capture;
mod config;
mod effects;
mod encode;
mod export;
mod foundation;
mod layout;
mod order;
mod render;
mod session;

/// Standalone documentation of stagegrid's concepts.
pub mod guide;

pub use assets::bundle::{Bundle, BundleItem, ImportFailure, ImportReport, ItemId};
pub use assets::decode::{ImageAsset, decode_image, encode_png};
pub use assets::trim::{DEFAULT_ALPHA_THRESHOLD, TrimResult, trim_surface};
pub use assets::trim_cache::TrimCache;
pub use capture::scheduler::{
    CaptureGuard, CaptureLock, CaptureOpts, DEFAULT_TAIL_MS, Pacing, capture,
};
pub use config::project::ProjectConfig;
pub use effects::composite::{
    PremulRgba8, flatten_premul_over_bg_to_opaque_rgba8, over, over_row_in_place, unpremultiply,
};
pub use effects::transitions::{RevealDraw, Transition, reveal_draw};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig, VideoArtifact, VideoFormat};
pub use export::naming::{
    COLLAGE_FILE_NAME, VIDEO_FILE_STEM, single_file_name, slug, video_file_name,
};
pub use export::writer::{ArtifactWriter, DirWriter, MemoryWriter};
pub use foundation::core::{Affine, Fps, FrameIndex, Point, PxRect, Rect, Size, Vec2};
pub use foundation::error::{StageError, StageResult};
pub use layout::grid::{GridLayout, GridParams, LayoutItem, Placement, column_count, layout_grid};
pub use layout::stage::{Corner, DragHandle, HANDLE_MARGIN, MIN_STAGE_SIDE, StageArea};
pub use order::shuffle::{DEFAULT_SEED, XorShift32, display_order, shuffle_in_place, shuffled};
pub use render::reveal::{
    RevealEntry, RevealRenderer, compose_collage, compose_single_in_frame, contain_fit,
};
pub use render::surface::{BlitOpts, Surface};
pub use render::timeline::{ActiveReveal, RevealState, RevealTiming};
pub use session::studio::{
    ExportSummary, MIN_PER_ITEM_MS, RANDOM_SEED_SPAN, Studio, StudioSettings,
};
