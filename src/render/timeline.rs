use crate::foundation::core::{Fps, FrameIndex};

/// Frame budget of the sequential reveal.
///
/// Item `0` owns `per_item_frames` frames; every later item owns `gap_frames` of idle time
/// followed by `per_item_frames` of transition. Items never overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevealTiming {
    /// Frames spent revealing one item, at least 1.
    pub per_item_frames: u64,
    /// Idle frames before every item except the first.
    pub gap_frames: u64,
}

/// The item currently running its transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveReveal {
    /// Position in display order.
    pub index: usize,
    /// Transition progress in `(0, 1]`.
    pub progress: f32,
}

/// What a given frame shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealState {
    /// Items `0..revealed` are drawn settled.
    pub revealed: usize,
    /// Item mid-transition, if the frame is not inside a gap.
    pub active: Option<ActiveReveal>,
}

impl RevealTiming {
    /// Build a timing; `per_item_frames` is floored at 1.
    pub fn new(per_item_frames: u64, gap_frames: u64) -> Self {
        Self {
            per_item_frames: per_item_frames.max(1),
            gap_frames,
        }
    }

    /// Convert millisecond durations at `fps`, rounding to the nearest frame.
    pub fn from_millis(fps: Fps, per_item_ms: u64, gap_ms: u64) -> Self {
        Self::new(
            fps.millis_to_frames_round(per_item_ms),
            fps.millis_to_frames_round(gap_ms),
        )
    }

    /// Frames owned by item `k`.
    pub fn segment_len(&self, k: usize) -> u64 {
        if k == 0 {
            self.per_item_frames
        } else {
            self.gap_frames + self.per_item_frames
        }
    }

    /// `per + (n - 1) * (gap + per)`, or `0` for no items.
    pub fn total_frames(&self, n: usize) -> u64 {
        if n == 0 {
            return 0;
        }
        self.per_item_frames + (n as u64 - 1) * (self.gap_frames + self.per_item_frames)
    }

    /// Locate `frame` on the timeline of `n` items. Frames past the end show every item settled.
    pub fn state_at(&self, n: usize, frame: FrameIndex) -> RevealState {
        let f = frame.0;
        if f >= self.total_frames(n) {
            return RevealState {
                revealed: n,
                active: None,
            };
        }

        let per = self.per_item_frames;
        let (index, offset, gap) = if f < per {
            (0usize, f, 0u64)
        } else {
            let span = self.gap_frames + per;
            let rest = f - per;
            (1 + (rest / span) as usize, rest % span, self.gap_frames)
        };

        let active = (offset >= gap).then(|| ActiveReveal {
            index,
            progress: (((offset - gap + 1) as f64) / per as f64).clamp(0.0, 1.0) as f32,
        });
        RevealState {
            revealed: index,
            active,
        }
    }
}

impl RevealState {
    /// True when every one of `n` items is drawn at its resting state.
    pub fn is_complete(&self, n: usize) -> bool {
        match self.active {
            Some(a) => a.index + 1 == n && a.progress >= 1.0,
            None => self.revealed == n,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/timeline.rs"]
mod tests;
