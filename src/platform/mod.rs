//! Platform abstraction layer
//!
//! Wall-clock pacing for the fixed-timestep loop. A late frame is never made
//! up with extra ticks: the schedule re-bases on the current time instead.

use std::thread;
use std::time::{Duration, Instant};

/// Paces a loop to a fixed number of ticks per second
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next_deadline: Instant,
    /// Frames that started after their deadline
    pub late_frames: u64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs(1) / fps.max(1);
        Self {
            period,
            next_deadline: Instant::now() + period,
            late_frames: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the next tick is due
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
            self.next_deadline += self.period;
        } else {
            self.late_frames += 1;
            self.next_deadline = now + self.period;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period() {
        let clock = FrameClock::new(50);
        assert_eq!(clock.period(), Duration::from_millis(20));
        assert_eq!(FrameClock::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_wait_paces_frames() {
        let mut clock = FrameClock::new(200);
        let start = Instant::now();
        for _ in 0..4 {
            clock.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_late_frame_rebases_without_catch_up() {
        let mut clock = FrameClock::new(100);
        thread::sleep(Duration::from_millis(35));
        clock.wait();
        assert_eq!(clock.late_frames, 1);
        // The next deadline is a full period away, not in the past
        let start = Instant::now();
        clock.wait();
        assert!(start.elapsed() >= Duration::from_millis(5));
        assert_eq!(clock.late_frames, 1);
    }
}
