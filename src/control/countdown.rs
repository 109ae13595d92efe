use crate::constants::LAUNCH_SYNC_PERIOD;

/// Whole-second launch countdown driven by simulation time.
///
/// The counter drops by one each time the clock crosses a second boundary and the
/// countdown expires on the crossing after it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    remaining: u64,
    last_second: f64,
}

impl Countdown {
    pub fn new(seconds: u32, now: f64) -> Self {
        Countdown {
            remaining: u64::from(seconds.saturating_sub(1)),
            last_second: now.floor(),
        }
    }

    /// Countdown resized so that ignition lands on the next launch-window boundary.
    pub fn synchronized(seconds: u32, now: f64) -> Self {
        let remaining = synchronized_counter(now, LAUNCH_SYNC_PERIOD);
        if remaining + 1 < u64::from(seconds) {
            warn!("Next launch window is {}s away, shorter than the {}s countdown", remaining + 1, seconds);
        }
        info!(
            "Launch synchronized to the {}s grid: T-{} at t={:.1}",
            LAUNCH_SYNC_PERIOD,
            remaining + 1,
            now
        );
        Countdown {
            remaining,
            last_second: now.floor(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns true once, on the tick the countdown expires.
    pub fn tick(&mut self, now: f64) -> bool {
        let second = now.floor();
        if second <= self.last_second {
            return false;
        }
        self.last_second = second;

        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        event!("T-{}", self.remaining + 1);
        false
    }
}

/// Counter value that makes ignition fall on the next multiple of `period`.
pub fn synchronized_counter(now: f64, period: u64) -> u64 {
    let second = now.max(0.0).floor() as u64;
    period - (second % period) - 1
}
