//! Frame loop with a soft frame-rate cap.
//!
//! Frames are pulled from a [`FrameSource`] as fast as it delivers them. A
//! frame is only run through the overlay pipeline when more than
//! `1 / frame_rate` seconds passed since the last processed one; other
//! frames are dropped. Processed frames go to the [`FrameSink`] either
//! composited or, when the markers are not usable, unmodified. The sink is
//! asked after every frame whether the loop should stop.

use crate::config::frame_interval;
use crate::core::ColorImage;
use crate::markers::{DetectedMarkers, MarkerDetector};
use crate::pipeline::{FrameOutcome, OverlayPipeline};
use std::time::{Duration, Instant};

/// One captured frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pub image: ColorImage,
    /// Marker detections recorded alongside the frame. When `None` the
    /// loop's detector is run on the image.
    pub markers: Option<DetectedMarkers>,
}

impl Frame {
    pub fn new(image: ColorImage) -> Self {
        Self {
            image,
            markers: None,
        }
    }

    pub fn with_markers(image: ColorImage, markers: DetectedMarkers) -> Self {
        Self {
            image,
            markers: Some(markers),
        }
    }
}

/// Where frames come from (a camera, a recording, ...).
pub trait FrameSource {
    type Error: std::error::Error + 'static;

    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Where processed frames go (a window, files, ...).
pub trait FrameSink {
    type Error: std::error::Error + 'static;

    fn show(&mut self, frame: &ColorImage) -> Result<(), Self::Error>;

    /// Polled after every frame; `true` ends the loop (e.g. escape pressed).
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Time source for the frame-rate cap.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Decides whether a frame arriving at `now` should be processed.
#[derive(Clone, Debug)]
pub struct FrameRateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameRateLimiter {
    /// `frame_rate <= 0` lets every frame through.
    pub fn new(frame_rate: f64) -> Self {
        Self {
            interval: frame_interval(frame_rate),
            last: None,
        }
    }

    /// `true` for the first frame and whenever strictly more than the
    /// interval elapsed since the last accepted frame.
    pub fn ready(&mut self, now: Instant) -> bool {
        let accept = match self.last {
            None => true,
            Some(prev) => self.interval.is_zero() || now.duration_since(prev) > self.interval,
        };
        if accept {
            self.last = Some(now);
        }
        accept
    }
}

/// Counters reported when the loop ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_read: u64,
    pub frames_processed: u64,
    pub composited: u64,
    pub passthrough: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum LiveError<S, K>
where
    S: std::error::Error + 'static,
    K: std::error::Error + 'static,
{
    #[error("frame source failed: {0}")]
    Source(#[source] S),
    #[error("frame sink failed: {0}")]
    Sink(#[source] K),
}

/// Drives a source through the pipeline into a sink.
pub struct LiveLoop<'a, D: ?Sized> {
    pipeline: &'a OverlayPipeline,
    detector: &'a D,
    limiter: FrameRateLimiter,
}

impl<'a, D> LiveLoop<'a, D>
where
    D: MarkerDetector + ?Sized,
{
    pub fn new(pipeline: &'a OverlayPipeline, detector: &'a D, frame_rate: f64) -> Self {
        Self {
            pipeline,
            detector,
            limiter: FrameRateLimiter::new(frame_rate),
        }
    }

    /// Run until the source is exhausted or the sink asks to stop.
    pub fn run<S, K, C>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        clock: &mut C,
    ) -> Result<LoopStats, LiveError<S::Error, K::Error>>
    where
        S: FrameSource,
        K: FrameSink,
        C: Clock,
    {
        let mut stats = LoopStats::default();

        while let Some(frame) = source.next_frame().map_err(LiveError::Source)? {
            stats.frames_read += 1;

            if self.limiter.ready(clock.now()) {
                stats.frames_processed += 1;
                match self.process(&frame) {
                    FrameOutcome::Composited(out) => {
                        stats.composited += 1;
                        sink.show(&out).map_err(LiveError::Sink)?;
                    }
                    FrameOutcome::Passthrough { reason } => {
                        log::debug!("frame {}: no overlay ({reason})", stats.frames_read);
                        stats.passthrough += 1;
                        sink.show(&frame.image).map_err(LiveError::Sink)?;
                    }
                }
            }

            if sink.should_stop() {
                log::info!("stop requested after {} frames", stats.frames_read);
                break;
            }
        }

        log::info!(
            "live loop done: read={} processed={} composited={} passthrough={}",
            stats.frames_read,
            stats.frames_processed,
            stats.composited,
            stats.passthrough
        );
        Ok(stats)
    }

    fn process(&self, frame: &Frame) -> FrameOutcome {
        let view = frame.image.view();
        match &frame.markers {
            Some(recorded) => self.pipeline.apply_or_passthrough(&view, &recorded.markers),
            None => self.pipeline.run(&view, self.detector).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{FixedDetections, MarkerDetection, MarkerLayout};
    use std::collections::VecDeque;
    use std::convert::Infallible;

    struct VecSource(VecDeque<Frame>);

    impl FrameSource for VecSource {
        type Error = Infallible;

        fn next_frame(&mut self) -> Result<Option<Frame>, Infallible> {
            Ok(self.0.pop_front())
        }
    }

    #[derive(Default)]
    struct CollectSink {
        shown: Vec<ColorImage>,
        stop_after: Option<usize>,
        polls: usize,
    }

    impl FrameSink for CollectSink {
        type Error = Infallible;

        fn show(&mut self, frame: &ColorImage) -> Result<(), Infallible> {
            self.shown.push(frame.clone());
            Ok(())
        }

        fn should_stop(&mut self) -> bool {
            self.polls += 1;
            self.stop_after.is_some_and(|n| self.polls >= n)
        }
    }

    /// Advances by a fixed step on every call.
    struct StepClock {
        now: Instant,
        step: Duration,
    }

    impl Clock for StepClock {
        fn now(&mut self) -> Instant {
            let t = self.now;
            self.now += self.step;
            t
        }
    }

    fn card() -> DetectedMarkers {
        DetectedMarkers::new(vec![
            MarkerDetection::square(923, 2.0, 2.0, 2.0),
            MarkerDetection::square(1001, 12.0, 2.0, 2.0),
            MarkerDetection::square(241, 12.0, 12.0, 2.0),
            MarkerDetection::square(1007, 2.0, 12.0, 2.0),
        ])
    }

    fn pipeline() -> OverlayPipeline {
        OverlayPipeline::new(ColorImage::filled(4, 4, &[255, 0, 0]), MarkerLayout::default())
    }

    fn frames(n: usize) -> VecSource {
        VecSource(
            (0..n)
                .map(|i| Frame::new(ColorImage::filled(16, 16, &[i as u8, 0, 0])))
                .collect(),
        )
    }

    #[test]
    fn limiter_accepts_first_frame_then_waits() {
        let mut limiter = FrameRateLimiter::new(10.0);
        let t0 = Instant::now();
        assert!(limiter.ready(t0));
        assert!(!limiter.ready(t0 + Duration::from_millis(50)));
        assert!(!limiter.ready(t0 + Duration::from_millis(100)));
        assert!(limiter.ready(t0 + Duration::from_millis(101)));
    }

    #[test]
    fn tiny_rate_only_lets_the_first_frame_through() {
        let mut limiter = FrameRateLimiter::new(1e-30);
        let t0 = Instant::now();
        assert!(limiter.ready(t0));
        assert!(!limiter.ready(t0 + Duration::from_secs(3600)));
    }

    #[test]
    fn zero_rate_processes_every_frame() {
        let mut limiter = FrameRateLimiter::new(0.0);
        let t0 = Instant::now();
        assert!(limiter.ready(t0));
        assert!(limiter.ready(t0));
    }

    #[test]
    fn frames_between_ticks_are_dropped() {
        let pipeline = pipeline();
        let detector = FixedDetections(card());
        let mut live = LiveLoop::new(&pipeline, &detector, 10.0);
        let mut sink = CollectSink::default();
        let mut clock = StepClock {
            now: Instant::now(),
            step: Duration::from_millis(40),
        };

        // Arrivals at 0, 40, 80, 120, 160, 200, 240 ms: accepted at 0, 120, 240.
        let stats = live.run(&mut frames(7), &mut sink, &mut clock).unwrap();
        assert_eq!(stats.frames_read, 7);
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.composited, 3);
        assert_eq!(sink.shown.len(), 3);
        assert_eq!(sink.shown[0].pixel(8, 8), &[255, 0, 0]);
    }

    #[test]
    fn failed_frames_are_shown_unmodified() {
        let pipeline = pipeline();
        let detector = FixedDetections(DetectedMarkers::default());
        let mut live = LiveLoop::new(&pipeline, &detector, 0.0);
        let mut sink = CollectSink::default();
        let mut source = VecSource(VecDeque::from(vec![
            Frame::new(ColorImage::filled(16, 16, &[7, 7, 7])),
            Frame::with_markers(ColorImage::filled(16, 16, &[9, 9, 9]), card()),
        ]));

        let stats = live.run(&mut source, &mut sink, &mut SystemClock).unwrap();
        assert_eq!(stats.passthrough, 1);
        assert_eq!(stats.composited, 1);
        assert_eq!(sink.shown[0], ColorImage::filled(16, 16, &[7, 7, 7]));
        assert_eq!(sink.shown[1].pixel(8, 8), &[255, 0, 0]);
        assert_eq!(sink.shown[1].pixel(0, 0), &[9, 9, 9]);
    }

    #[test]
    fn sink_can_stop_the_loop() {
        let pipeline = pipeline();
        let detector = FixedDetections(card());
        let mut live = LiveLoop::new(&pipeline, &detector, 0.0);
        let mut sink = CollectSink {
            stop_after: Some(2),
            ..CollectSink::default()
        };

        let stats = live
            .run(&mut frames(10), &mut sink, &mut SystemClock)
            .unwrap();
        assert_eq!(stats.frames_read, 2);
        assert_eq!(sink.shown.len(), 2);
    }
}
