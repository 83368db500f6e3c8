use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{StageError, StageResult};

/// Visual effect applied to the item that is currently being revealed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Opacity ramps from 0 to 1.
    #[default]
    Fade,
    /// Enters from the left, offset by `(1 - p) * -width`.
    Slide,
    /// Grows from 60% to 100% about the item center.
    Scale,
    /// Clipped to a left-to-right growing rectangle.
    Wipe,
}

impl Transition {
    /// Every selectable transition, in menu order.
    pub const ALL: [Transition; 4] = [
        Transition::Fade,
        Transition::Slide,
        Transition::Scale,
        Transition::Wipe,
    ];

    /// Stable lowercase identifier.
    pub fn id(self) -> &'static str {
        match self {
            Transition::Fade => "fade",
            Transition::Slide => "slide",
            Transition::Scale => "scale",
            Transition::Wipe => "wipe",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Transition {
    type Err = StageError;

    fn from_str(s: &str) -> StageResult<Self> {
        let kind = s.trim().to_ascii_lowercase();
        if kind.is_empty() {
            return Err(StageError::validation("transition kind must be non-empty"));
        }
        Transition::ALL
            .into_iter()
            .find(|t| t.id() == kind)
            .ok_or_else(|| StageError::validation(format!("unknown transition kind '{kind}'")))
    }
}

/// How to draw the revealing item at a given progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealDraw {
    /// Destination rectangle in surface coordinates.
    pub rect: Rect,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Optional clip in surface coordinates.
    pub clip: Option<Rect>,
}

/// Resolve the draw parameters of `transition` at progress `p` for an item resting at `rest`.
///
/// Pure in `(transition, p, rest)`; `p` is clamped to `[0, 1]` and `p = 1` always yields the
/// resting rectangle at full opacity without a clip.
pub fn reveal_draw(transition: Transition, p: f32, rest: Rect) -> RevealDraw {
    let p = p.clamp(0.0, 1.0);
    let pf = f64::from(p);
    let settled = RevealDraw {
        rect: rest,
        opacity: 1.0,
        clip: None,
    };
    if p >= 1.0 {
        return settled;
    }

    match transition {
        Transition::Fade => RevealDraw {
            opacity: p,
            ..settled
        },
        Transition::Slide => RevealDraw {
            rect: rest + Vec2::new((1.0 - pf) * -rest.width(), 0.0),
            ..settled
        },
        Transition::Scale => {
            let s = 0.6 + 0.4 * pf;
            let c: Point = rest.center();
            let about = Affine::translate(c.to_vec2())
                * Affine::scale(s)
                * Affine::translate(-c.to_vec2());
            RevealDraw {
                rect: about.transform_rect_bbox(rest),
                ..settled
            }
        }
        Transition::Wipe => RevealDraw {
            clip: Some(Rect::new(
                rest.x0,
                rest.y0,
                rest.x0 + rest.width() * pf,
                rest.y1,
            )),
            ..settled
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
