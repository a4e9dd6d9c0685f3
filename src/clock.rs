//! Session timers
//!
//! The host feeds wall-clock deltas in; timers turn them into discrete
//! firings. A cancelled timer never fires again.

/// Fires once every `period` seconds of accumulated time
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: f32,
    accumulator: f32,
    cancelled: bool,
}

impl PeriodicTimer {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            accumulator: 0.0,
            cancelled: false,
        }
    }

    /// Accumulate `dt` seconds and return how many periods elapsed.
    /// At most `max_fires` are returned; the backlog beyond that is dropped.
    pub fn advance(&mut self, dt: f32, max_fires: u32) -> u32 {
        if self.cancelled || self.period <= 0.0 {
            return 0;
        }
        self.accumulator += dt.max(0.0);

        let mut fires = 0;
        while self.accumulator >= self.period && fires < max_fires {
            self.accumulator -= self.period;
            fires += 1;
        }
        if fires == max_fires {
            self.accumulator = self.accumulator.min(self.period);
        }
        fires
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.accumulator = 0.0;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Fires exactly once after `delay` seconds
#[derive(Debug, Clone)]
pub struct OneShotTimer {
    remaining: f32,
    done: bool,
}

impl OneShotTimer {
    pub fn new(delay: f32) -> Self {
        Self {
            remaining: delay,
            done: false,
        }
    }

    /// True on the call during which the delay runs out, false otherwise
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.done {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.done = true;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_accumulates() {
        let mut timer = PeriodicTimer::new(1.0);
        assert_eq!(timer.advance(0.6, u32::MAX), 0);
        assert_eq!(timer.advance(0.6, u32::MAX), 1);
        assert_eq!(timer.advance(2.0, u32::MAX), 2);
    }

    #[test]
    fn test_periodic_caps_backlog() {
        let mut timer = PeriodicTimer::new(0.25);
        assert_eq!(timer.advance(5.0, 4), 4);
        // Backlog dropped down to at most one period
        assert_eq!(timer.advance(0.0, 4), 1);
        assert_eq!(timer.advance(0.0, 4), 0);
    }

    #[test]
    fn test_cancelled_never_fires() {
        let mut timer = PeriodicTimer::new(1.0);
        timer.advance(0.9, u32::MAX);
        timer.cancel();
        assert!(timer.is_cancelled());
        assert_eq!(timer.advance(10.0, u32::MAX), 0);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timer = OneShotTimer::new(2.0);
        assert!(!timer.advance(1.5));
        assert!(timer.advance(0.5));
        assert!(!timer.advance(5.0));
        assert!(timer.is_done());

        let mut cancelled = OneShotTimer::new(0.1);
        cancelled.cancel();
        assert!(!cancelled.advance(1.0));
    }
}
