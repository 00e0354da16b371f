//! Destination carousel controller.
//!
//! The auto-advance timer is a single deadline, driven by [`Carousel::tick`].
//! Nothing runs in the background: the host calls `tick` from its event loop.

use crate::config::CarouselConfig;
use std::time::{Duration, Instant};

/// Number of copies of the list laid out on the track for seamless wrapping.
pub const TRACK_COPIES: usize = 3;

/// Cyclic slide index over the destination list.
#[derive(Debug, Clone)]
pub struct Carousel {
    current: usize,
    count: usize,
    interval: Duration,
    deadline: Option<Instant>,
    mounted: bool,
}

impl Carousel {
    /// Carousel advancing every `interval` (at least 1 ms).
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            current: 0,
            count: 0,
            interval: interval.max(Duration::from_millis(1)),
            deadline: None,
            mounted: true,
        }
    }

    /// Carousel using the configured period.
    #[must_use]
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms))
    }

    /// Follow the destination list length.
    ///
    /// Any change restarts the timer (or stops it when the list is empty).
    /// The slide index itself is kept.
    pub fn sync_len(&mut self, count: usize, now: Instant) {
        if !self.mounted || count == self.count {
            return;
        }
        self.count = count;
        self.deadline = (count > 0).then(|| now + self.interval);
    }

    /// Fire the timer for every period elapsed up to `now`. Returns the number
    /// of periods that elapsed (each one advances the slide).
    pub fn tick(&mut self, now: Instant) -> usize {
        let Some(deadline) = self.deadline else {
            return 0;
        };
        if self.count == 0 || now < deadline {
            return 0;
        }

        let elapsed = now.duration_since(deadline).as_nanos();
        let period = self.interval.as_nanos();
        let steps = usize::try_from(elapsed / period + 1).unwrap_or(usize::MAX);
        self.current = (self.current % self.count + steps % self.count) % self.count;

        let into_period = u64::try_from(elapsed % period).unwrap_or(u64::MAX);
        let remaining = self.interval.saturating_sub(Duration::from_nanos(into_period));
        self.deadline = Some(now + remaining);
        steps
    }

    /// Manual forward step. Stops auto-play for good.
    pub fn next(&mut self) {
        self.deadline = None;
        if self.count > 0 {
            self.current = (self.current % self.count + 1) % self.count;
        }
    }

    /// Manual backward step. Stops auto-play for good.
    pub fn prev(&mut self) {
        self.deadline = None;
        if self.count > 0 {
            self.current = (self.current % self.count + self.count - 1) % self.count;
        }
    }

    /// Jump to `index` (normalised only when rendered). Stops auto-play.
    pub fn go_to(&mut self, index: usize) {
        self.deadline = None;
        self.current = index;
    }

    /// Stop the timer; later length changes no longer restart it.
    pub fn teardown(&mut self) {
        self.deadline = None;
        self.mounted = false;
    }

    /// Raw slide index.
    #[must_use]
    pub fn current_slide(&self) -> usize {
        self.current
    }

    /// Number of destinations the carousel cycles through.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Highlighted dot, or `None` for the empty state.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        (self.count > 0).then(|| self.current % self.count)
    }

    /// Track translation in percent, or `None` for the empty state.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn track_offset_percent(&self) -> Option<f64> {
        (self.count > 0).then(|| {
            (self.current % self.count + self.count) as f64 * (100.0 / TRACK_COPIES as f64)
        })
    }

    /// The list laid out [`TRACK_COPIES`] times.
    #[must_use]
    pub fn track<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().cycle().take(items.len() * TRACK_COPIES).collect()
    }

    /// Whether the auto-advance timer is live.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the timer fires next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
