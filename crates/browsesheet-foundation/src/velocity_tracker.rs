//! Release velocity estimation for drags.
//!
//! Uses the impulse strategy: every pair of consecutive samples contributes
//! the kinetic energy it would impart on a unit mass, and the accumulated
//! energy is turned back into a velocity.

/// Samples kept in the ring.
const HISTORY_SIZE: usize = 20;

/// Samples older than this (relative to the newest) are ignored.
const HORIZON_MS: i64 = 100;

/// A gap this long between samples means the pointer had stopped.
pub const ASSUME_STOPPED_MS: i64 = 40;

#[derive(Clone, Copy, Debug)]
struct Sample {
    time_ms: i64,
    position: f32,
}

/// Tracks absolute positions along one axis.
#[derive(Clone, Debug)]
pub struct VelocityTracker1D {
    samples: [Option<Sample>; HISTORY_SIZE],
    newest: usize,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            newest: 0,
        }
    }

    pub fn add_position(&mut self, time_ms: i64, position: f32) {
        self.newest = (self.newest + 1) % HISTORY_SIZE;
        self.samples[self.newest] = Some(Sample { time_ms, position });
    }

    /// Velocity in px/sec, or 0 with fewer than two usable samples.
    pub fn velocity(&self) -> f32 {
        let Some(newest) = self.samples[self.newest] else {
            return 0.0;
        };

        // Recent samples, newest first, as (age in ms, position).
        let mut window: Vec<(f32, f32)> = Vec::with_capacity(HISTORY_SIZE);
        let mut index = self.newest;
        while let Some(sample) = self.samples[index] {
            let age = newest.time_ms - sample.time_ms;
            let gap = window
                .last()
                .map(|(previous_age, _)| age as f32 - previous_age)
                .unwrap_or(0.0);
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS as f32 {
                break;
            }
            window.push((age as f32, sample.position));
            if window.len() == HISTORY_SIZE {
                break;
            }
            index = (index + HISTORY_SIZE - 1) % HISTORY_SIZE;
        }

        if window.len() < 2 {
            return 0.0;
        }
        impulse_velocity(&window) * 1000.0
    }

    /// [`velocity`](Self::velocity) clamped to `±max_velocity`.
    pub fn velocity_capped(&self, max_velocity: f32) -> f32 {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return 0.0;
        }
        let velocity = self.velocity();
        if velocity.is_nan() {
            return 0.0;
        }
        velocity.clamp(-max_velocity, max_velocity)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// `window` is newest first. Returns px/ms.
fn impulse_velocity(window: &[(f32, f32)]) -> f32 {
    let mut work = 0.0f32;
    let oldest = window.len() - 1;
    // Walk from the oldest pair to the newest.
    for i in (1..=oldest).rev() {
        let (older_age, older_position) = window[i];
        let (newer_age, newer_position) = window[i - 1];
        let dt = older_age - newer_age;
        if dt == 0.0 {
            continue;
        }
        let v_curr = (newer_position - older_position) / dt;
        let v_prev = energy_to_velocity(work);
        work += (v_curr - v_prev) * v_curr.abs();
        if i == oldest {
            work *= 0.5;
        }
    }
    energy_to_velocity(work)
}

/// Inverts `E = v^2 / 2`, keeping the sign of the energy.
fn energy_to_velocity(energy: f32) -> f32 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_two_samples() {
        let mut tracker = VelocityTracker1D::new();
        assert_eq!(tracker.velocity(), 0.0);
        tracker.add_position(0, 100.0);
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn steady_downward_drag() {
        let mut tracker = VelocityTracker1D::new();
        for step in 0..4 {
            tracker.add_position(step * 10, step as f32 * 50.0);
        }

        let velocity = tracker.velocity();
        assert!((velocity - 5000.0).abs() < 500.0, "got {velocity}");
    }

    #[test]
    fn upward_drag_is_negative() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_position(0, 300.0);
        tracker.add_position(8, 260.0);
        tracker.add_position(16, 220.0);

        assert!(tracker.velocity() < 0.0);
    }

    #[test]
    fn capped_to_maximum() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_position(0, 0.0);
        tracker.add_position(1, 10_000.0);
        assert_eq!(tracker.velocity_capped(8_000.0), 8_000.0);

        tracker.reset();
        tracker.add_position(0, 10_000.0);
        tracker.add_position(1, 0.0);
        assert_eq!(tracker.velocity_capped(8_000.0), -8_000.0);
    }

    #[test]
    fn pause_before_release_reads_as_stopped() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_position(0, 0.0);
        tracker.add_position(ASSUME_STOPPED_MS + 1, 100.0);

        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn stale_samples_fall_outside_horizon() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_position(0, 0.0);
        tracker.add_position(150, 100.0);
        tracker.add_position(160, 200.0);
        tracker.add_position(170, 300.0);

        let velocity = tracker.velocity();
        assert!((velocity - 10_000.0).abs() < 1_000.0, "got {velocity}");
    }
}
