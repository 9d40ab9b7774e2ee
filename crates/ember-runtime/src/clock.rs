//! Game clock with fixed-timestep accumulator

use std::time::Instant;

/// Tracks frame time and accumulates it for fixed-rate simulation steps.
///
/// The wall-clock path ([`tick`](GameClock::tick)) reports a zero delta on
/// the first frame and clamps long frames to 250 ms so a stall cannot
/// snowball into an ever-growing backlog of fixed steps. Headless callers
/// feed explicit deltas through [`advance`](GameClock::advance) instead.
pub struct GameClock {
    total_time: f64,
    delta_time: f64,
    fixed_timestep: f64,
    accumulator: f64,
    last_instant: Instant,
    first_tick: bool,
}

/// Longest frame delta the clock will accept, in seconds.
const MAX_FRAME_SECS: f64 = 0.25;

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            accumulator: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    /// A clock with the default 60 Hz fixed timestep.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::default()
        }
    }

    /// Seconds accepted by the most recent tick or advance.
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Total accepted time in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn fixed_timestep(&self) -> f64 {
        self.fixed_timestep
    }

    /// Measure elapsed wall time since the previous tick. Call once per
    /// frame. The first call establishes the baseline and reports zero.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Accept an explicit frame delta, clamped to [`MAX_FRAME_SECS`].
    pub fn advance(&mut self, elapsed: f64) {
        self.delta_time = elapsed.clamp(0.0, MAX_FRAME_SECS);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    /// True while enough time is banked for another fixed step.
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Withdraw one fixed step from the accumulator.
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_sixty_hertz() {
        let clock = GameClock::new();
        assert!((clock.fixed_timestep() - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time(), 0.0);
        assert_eq!(clock.delta_time(), 0.0);
    }

    #[test]
    fn custom_timestep() {
        let clock = GameClock::with_fixed_timestep(30.0);
        assert!((clock.fixed_timestep() - 1.0 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn first_tick_reports_zero_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time(), 0.0);
        assert!(!clock.should_fixed_update());
    }

    #[test]
    fn accumulator_yields_one_step_per_timestep() {
        let mut clock = GameClock::new();
        clock.advance(1.0 / 30.0);

        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(!clock.should_fixed_update());
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clock = GameClock::new();
        clock.advance(10.0);
        assert_eq!(clock.delta_time(), 0.25);
        assert_eq!(clock.total_time(), 0.25);
    }

    #[test]
    fn negative_deltas_are_rejected() {
        let mut clock = GameClock::new();
        clock.advance(-1.0);
        assert_eq!(clock.delta_time(), 0.0);
        assert_eq!(clock.total_time(), 0.0);
    }
}
