//! Character transition shapes
//!
//! Each shape maps transition progress to a pose for the outgoing and the
//! incoming character. Only `Instant` reads the raw progress; every other
//! shape reads the eased value.

use crate::math::saw_to_tri;
use crate::state::{Pose, TransitionType};

/// Poses for both characters at one instant of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub outgoing: Pose,
    pub incoming: Pose,
}

/// Horizontal travel of the push-left/right shapes
pub const PUSH_X_DISTANCE: f32 = 12.0;

/// Vertical travel of the push-up/down shapes
pub const PUSH_Y_DISTANCE: f32 = 17.0;

/// Evaluate a transition shape
pub fn evaluate(kind: TransitionType, progress: f32, shaped: f32) -> TransitionFrame {
    let p = shaped;
    match kind {
        TransitionType::Instant => crossfade(progress),
        TransitionType::Fade => crossfade(p),
        TransitionType::FadeOut => {
            let fade = 1.0 - saw_to_tri(p);
            let (outgoing, incoming) = swap_at_half(p);
            TransitionFrame {
                outgoing: Pose::with_opacity(outgoing * fade),
                incoming: Pose::with_opacity(incoming * fade),
            }
        }
        TransitionType::FlipHorizontal => fold(p, |v| (v, 1.0)),
        TransitionType::FlipVertical => fold(p, |v| (1.0, v)),
        TransitionType::Shrink => fold(p, |v| (v, v)),
        TransitionType::SpinLeft => spin(p, 360.0),
        TransitionType::SpinRight => spin(p, -360.0),
        TransitionType::SpinLeftHalf => spin(p, 180.0),
        TransitionType::SpinRightHalf => spin(p, -180.0),
        TransitionType::PushUp => push_vertical(p, -PUSH_Y_DISTANCE),
        TransitionType::PushDown => push_vertical(p, PUSH_Y_DISTANCE),
        TransitionType::PushLeft => push_horizontal(p, PUSH_X_DISTANCE),
        TransitionType::PushRight => push_horizontal(p, -PUSH_X_DISTANCE),
    }
}

fn crossfade(p: f32) -> TransitionFrame {
    TransitionFrame {
        outgoing: Pose::with_opacity(1.0 - p),
        incoming: Pose::with_opacity(p),
    }
}

/// (outgoing, incoming) visibility, switching over at the midpoint
fn swap_at_half(p: f32) -> (f32, f32) {
    if p < 0.5 {
        (1.0, 0.0)
    } else {
        (0.0, 1.0)
    }
}

/// Collapse to nothing at the midpoint and expand back with the new glyph
fn fold(p: f32, scale: impl Fn(f32) -> (f32, f32)) -> TransitionFrame {
    let (outgoing, incoming) = swap_at_half(p);
    let s = scale(1.0 - saw_to_tri(p));
    TransitionFrame {
        outgoing: Pose {
            opacity: outgoing,
            scale: s,
            ..Pose::IDENTITY
        },
        incoming: Pose {
            opacity: incoming,
            scale: s,
            ..Pose::IDENTITY
        },
    }
}

fn spin(p: f32, turn: f32) -> TransitionFrame {
    TransitionFrame {
        outgoing: Pose {
            opacity: 1.0 - p,
            rotation: turn * p,
            ..Pose::IDENTITY
        },
        incoming: Pose {
            opacity: p,
            rotation: turn + turn * p,
            ..Pose::IDENTITY
        },
    }
}

/// The incoming glyph starts at `start` and both travel together
fn push_vertical(p: f32, start: f32) -> TransitionFrame {
    TransitionFrame {
        outgoing: Pose {
            opacity: 1.0 - p,
            offset: (0.0, -start * p),
            ..Pose::IDENTITY
        },
        incoming: Pose {
            opacity: p,
            offset: (0.0, start * (1.0 - p)),
            ..Pose::IDENTITY
        },
    }
}

/// Horizontal pushes keep both glyphs opaque; the matrix edge hides them
fn push_horizontal(p: f32, start: f32) -> TransitionFrame {
    TransitionFrame {
        outgoing: Pose {
            offset: (-start * p, 0.0),
            ..Pose::IDENTITY
        },
        incoming: Pose {
            offset: (start * (1.0 - p), 0.0),
            ..Pose::IDENTITY
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_midpoint() {
        let frame = evaluate(TransitionType::Fade, 0.5, 0.5);
        assert_eq!(frame.outgoing.opacity, 0.5);
        assert_eq!(frame.incoming.opacity, 0.5);
    }

    #[test]
    fn test_instant_reads_raw_progress() {
        let frame = evaluate(TransitionType::Instant, 1.0, 0.0);
        assert_eq!(frame.incoming.opacity, 1.0);
        assert_eq!(frame.outgoing.opacity, 0.0);
    }

    #[test]
    fn test_push_left_travel() {
        let start = evaluate(TransitionType::PushLeft, 0.0, 0.0);
        assert_eq!(start.outgoing.offset.0, 0.0);
        assert_eq!(start.incoming.offset.0, 12.0);

        let end = evaluate(TransitionType::PushLeft, 1.0, 1.0);
        assert_eq!(end.outgoing.offset.0, -12.0);
        assert_eq!(end.incoming.offset.0, 0.0);

        // No fade while pushing sideways
        let mid = evaluate(TransitionType::PushLeft, 0.5, 0.5);
        assert_eq!(mid.outgoing.opacity, 1.0);
        assert_eq!(mid.incoming.opacity, 1.0);
    }

    #[test]
    fn test_push_up_enters_from_below() {
        let start = evaluate(TransitionType::PushUp, 0.0, 0.0);
        assert_eq!(start.incoming.offset.1, -17.0);
        let end = evaluate(TransitionType::PushUp, 1.0, 1.0);
        assert_eq!(end.outgoing.offset.1, 17.0);
    }

    #[test]
    fn test_shrink_collapses_at_midpoint() {
        let frame = evaluate(TransitionType::Shrink, 0.5, 0.5);
        assert_eq!(frame.incoming.scale, (0.0, 0.0));
        assert_eq!(frame.incoming.opacity, 1.0);
        assert_eq!(frame.outgoing.opacity, 0.0);

        let early = evaluate(TransitionType::Shrink, 0.25, 0.25);
        assert_eq!(early.outgoing.scale, (0.5, 0.5));
        assert_eq!(early.outgoing.opacity, 1.0);
    }

    #[test]
    fn test_flip_horizontal_keeps_height() {
        let frame = evaluate(TransitionType::FlipHorizontal, 0.25, 0.25);
        assert_eq!(frame.outgoing.scale, (0.5, 1.0));
    }

    #[test]
    fn test_fade_out_is_dark_at_midpoint() {
        let frame = evaluate(TransitionType::FadeOut, 0.5, 0.5);
        assert_eq!(frame.outgoing.opacity, 0.0);
        assert_eq!(frame.incoming.opacity, 0.0);
        let end = evaluate(TransitionType::FadeOut, 1.0, 1.0);
        assert_eq!(end.incoming.opacity, 1.0);
    }

    #[test]
    fn test_spin_directions() {
        let left = evaluate(TransitionType::SpinLeft, 0.5, 0.5);
        assert_eq!(left.outgoing.rotation, 180.0);
        assert_eq!(left.incoming.rotation, 540.0);

        let right = evaluate(TransitionType::SpinRightHalf, 0.5, 0.5);
        assert_eq!(right.outgoing.rotation, -90.0);
        assert_eq!(right.incoming.rotation, -270.0);
    }
}
