use super::*;

#[test]
fn millis_convert_with_rounding() {
    let fps = Fps::integer(30).unwrap();
    let t = RevealTiming::from_millis(fps, 800, 150);
    assert_eq!(t, RevealTiming::new(24, 5));
    // 10ms at 30fps rounds to zero and is floored to one frame.
    assert_eq!(RevealTiming::from_millis(fps, 10, 0).per_item_frames, 1);
}

#[test]
fn totals_match_closed_form() {
    let t = RevealTiming::new(24, 5);
    assert_eq!(t.total_frames(0), 0);
    assert_eq!(t.total_frames(1), 24);
    for n in 1..20usize {
        let sum: u64 = (0..n).map(|k| t.segment_len(k)).sum();
        assert_eq!(t.total_frames(n), sum);
        assert_eq!(t.total_frames(n), 24 + (n as u64 - 1) * 29);
    }
}

#[test]
fn first_item_starts_immediately() {
    let t = RevealTiming::new(4, 2);
    let s = t.state_at(3, FrameIndex(0));
    assert_eq!(s.revealed, 0);
    assert_eq!(
        s.active,
        Some(ActiveReveal {
            index: 0,
            progress: 0.25
        })
    );
}

#[test]
fn gap_frames_show_only_settled_items() {
    let t = RevealTiming::new(4, 2);
    for f in [4u64, 5] {
        let s = t.state_at(3, FrameIndex(f));
        assert_eq!(s.revealed, 1, "frame {f}");
        assert_eq!(s.active, None, "frame {f}");
    }
    let s = t.state_at(3, FrameIndex(6));
    assert_eq!(
        s.active,
        Some(ActiveReveal {
            index: 1,
            progress: 0.25
        })
    );
}

#[test]
fn last_frame_is_fully_assembled() {
    let t = RevealTiming::new(7, 3);
    for n in 1..8usize {
        let last = FrameIndex(t.total_frames(n) - 1);
        let s = t.state_at(n, last);
        assert_eq!(s.revealed, n - 1);
        assert_eq!(s.active.map(|a| (a.index, a.progress)), Some((n - 1, 1.0)));
        assert!(s.is_complete(n));
    }
}

#[test]
fn frames_past_the_end_show_everything() {
    let t = RevealTiming::new(3, 1);
    let s = t.state_at(2, FrameIndex(100));
    assert_eq!(s.revealed, 2);
    assert!(s.active.is_none());
    assert!(s.is_complete(2));
    assert!(t.state_at(0, FrameIndex(0)).is_complete(0));
}

#[test]
fn progress_is_monotonic_within_a_segment() {
    let t = RevealTiming::new(10, 4);
    let mut last = 0.0f32;
    for f in 14..24u64 {
        let a = t.state_at(3, FrameIndex(f)).active.unwrap();
        assert_eq!(a.index, 1);
        assert!(a.progress > last);
        last = a.progress;
    }
    assert_eq!(last, 1.0);
}
