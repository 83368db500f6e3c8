use super::*;
use crate::encode::sink::InMemorySink;

fn fps(n: u32) -> Fps {
    Fps::integer(n).unwrap()
}

fn blank(_: FrameIndex) -> StageResult<Surface> {
    Ok(Surface::new(4, 4))
}

#[test]
fn default_tail_is_half_a_second() {
    assert_eq!(CaptureOpts::new(fps(30)).tail_frames, 15);
    assert_eq!(CaptureOpts::new(fps(25)).tail_frames, 13);
    assert_eq!(CaptureOpts::new(fps(30)).with_tail_millis(0).tail_frames, 0);
    assert_eq!(CaptureOpts::new(fps(30)).pacing, Pacing::RealTime);
}

#[tokio::test(start_paused = true)]
async fn draws_total_plus_tail_with_clamped_indices() {
    let mut sink = InMemorySink::new();
    let mut seen = Vec::new();
    let opts = CaptureOpts {
        fps: fps(10),
        tail_frames: 3,
        pacing: Pacing::RealTime,
    };

    let start = Instant::now();
    let art = capture(&mut sink, Size::new(4, 4), 5, opts, |idx| {
        seen.push(idx.0);
        blank(idx)
    })
    .await
    .unwrap();

    assert_eq!(seen, vec![0, 1, 2, 3, 4, 4, 4, 4]);
    assert_eq!(art.frame_count, 8);
    let pushed: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(pushed, (0..8).collect::<Vec<_>>());

    // First tick fires immediately; the other seven wait one interval each.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(700), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn offline_pacing_does_not_wait() {
    let mut sink = InMemorySink::new();
    let opts = CaptureOpts::new(fps(1)).with_pacing(Pacing::Offline);
    let start = Instant::now();
    let art = capture(&mut sink, Size::new(4, 4), 3, opts, blank)
        .await
        .unwrap();
    assert_eq!(art.frame_count, 3 + 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn empty_animation_is_rejected() {
    let mut sink = InMemorySink::new();
    let err = capture(&mut sink, Size::new(4, 4), 0, CaptureOpts::new(fps(30)), blank)
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::Validation(_)));
}

struct BrokenSink {
    aborted: bool,
}

impl FrameSink for BrokenSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StageResult<()> {
        Err(StageError::encode("no capture stream"))
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Surface) -> StageResult<()> {
        Ok(())
    }

    fn end(&mut self) -> StageResult<VideoArtifact> {
        Err(StageError::encode("unreachable"))
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[tokio::test(start_paused = true)]
async fn sink_that_cannot_start_is_capture_unavailable() {
    let mut sink = BrokenSink { aborted: false };
    let mut draws = 0;
    let err = capture(&mut sink, Size::new(4, 4), 3, CaptureOpts::new(fps(30)), |i| {
        draws += 1;
        blank(i)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, StageError::CaptureUnavailable(_)), "{err}");
    assert_eq!(draws, 0);
    assert!(!sink.aborted);
}

#[tokio::test(start_paused = true)]
async fn draw_failure_aborts_without_artifact() {
    let mut sink = InMemorySink::new();
    let err = capture(&mut sink, Size::new(4, 4), 5, CaptureOpts::new(fps(30)), |i| {
        if i.0 == 2 {
            Err(StageError::validation("boom"))
        } else {
            blank(i)
        }
    })
    .await
    .unwrap_err();
    assert!(matches!(err, StageError::Validation(_)));
    assert!(sink.frames().is_empty());
    assert!(sink.config().is_none());
}

#[test]
fn lock_admits_one_capture_at_a_time() {
    let lock = CaptureLock::new();
    let guard = lock.try_acquire().unwrap();
    assert!(lock.is_busy());
    let second = lock.clone().try_acquire().unwrap_err();
    assert!(matches!(second, StageError::CaptureBusy(_)));
    drop(guard);
    assert!(!lock.is_busy());
    assert!(lock.try_acquire().is_ok());
}
