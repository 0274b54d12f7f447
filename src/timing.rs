//! Lesson time keeping and simple property tweens.

/// Time elapsed since a lesson started, advanced by the frame loop's deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clock {
    elapsed: f32,
    delta: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by one frame. Negative deltas count as zero.
    pub fn tick(&mut self, delta: f32) {
        self.delta = delta.max(0.0);
        self.elapsed += self.delta;
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of the last frame in seconds.
    pub fn delta(&self) -> f32 {
        self.delta
    }
}

/// Animates a scalar from `from` to `to` over `duration` seconds, starting `delay` seconds after
/// `start`.
///
/// Progress is eased with a quadratic ease-out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub start: f32,
    pub delay: f32,
    pub duration: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, start: f32, delay: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            start,
            delay,
            duration,
        }
    }

    fn progress(&self, time: f32) -> f32 {
        let local = time - self.start - self.delay;
        if local <= 0.0 {
            0.0
        } else if self.duration <= 0.0 || local >= self.duration {
            1.0
        } else {
            local / self.duration
        }
    }

    /// Value of the tween at the given time.
    pub fn sample(&self, time: f32) -> f32 {
        let p = self.progress(time);
        let eased = 1.0 - (1.0 - p) * (1.0 - p);
        self.from + (self.to - self.from) * eased
    }

    /// Whether the tween has reached its target at the given time.
    pub fn finished(&self, time: f32) -> bool {
        self.progress(time) >= 1.0
    }
}

/// A chain of tweens on the same property, where each later tween overrides earlier ones once
/// its delay has elapsed.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tween that starts from wherever the previous tween ended.
    pub fn then_to(mut self, initial: f32, to: f32, delay: f32, duration: f32) -> Self {
        let from = self.tweens.last().map(|t| t.to).unwrap_or(initial);
        self.tweens.push(Tween::new(from, to, 0.0, delay, duration));
        self
    }

    /// Value at `time`, or `initial` before the first tween begins.
    pub fn sample(&self, initial: f32, time: f32) -> f32 {
        self.tweens
            .iter()
            .rev()
            .find(|t| time >= t.start + t.delay)
            .map(|t| t.sample(time))
            .unwrap_or(initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates_frames() {
        let mut clock = Clock::new();
        assert_eq!((clock.elapsed(), clock.delta()), (0.0, 0.0));
        clock.tick(0.25);
        clock.tick(0.5);
        assert_eq!(clock.elapsed(), 0.75);
        assert_eq!(clock.delta(), 0.5);
        clock.tick(-1.0);
        assert_eq!(clock.elapsed(), 0.75);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_tween_holds_start_before_delay() {
        let tween = Tween::new(0.0, 2.0, 0.0, 1.0, 1.0);
        assert_eq!(tween.sample(0.0), 0.0);
        assert_eq!(tween.sample(0.99), 0.0);
        assert!(!tween.finished(1.5));
    }

    #[test]
    fn test_tween_reaches_target() {
        let tween = Tween::new(0.0, 2.0, 0.0, 1.0, 1.0);
        assert_eq!(tween.sample(2.0), 2.0);
        assert_eq!(tween.sample(100.0), 2.0);
        assert!(tween.finished(2.0));
    }

    #[test]
    fn test_tween_eases_monotonically() {
        let tween = Tween::new(1.0, 3.0, 5.0, 0.0, 2.0);
        let mut last = tween.sample(5.0);
        for i in 1..=20 {
            let value = tween.sample(5.0 + i as f32 * 0.1);
            assert!(value >= last);
            last = value;
        }
        // Ease-out covers more than half the distance at the midpoint.
        assert!(tween.sample(6.0) > 2.0);
    }

    #[test]
    fn test_timeline_there_and_back() {
        let timeline = Timeline::new()
            .then_to(0.0, 2.0, 1.0, 1.0)
            .then_to(0.0, 0.0, 2.0, 1.0);
        assert_eq!(timeline.sample(0.0, 0.5), 0.0);
        assert_eq!(timeline.sample(0.0, 2.0), 2.0);
        assert_eq!(timeline.sample(0.0, 3.5), 0.0);
        let mid = timeline.sample(0.0, 2.5);
        assert!(mid > 0.0 && mid < 2.0);
    }
}
