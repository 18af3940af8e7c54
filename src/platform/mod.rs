//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Frame deltas
//! - Run seeds
//! - Storage (LocalStorage on web)

#[cfg(target_arch = "wasm32")]
pub mod storage;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a fresh run when none is configured
pub fn fresh_seed() -> u64 {
    now_ms() as u64
}

/// Longest frame fed to the simulation, so a backgrounded tab does not
/// burst timers on return
pub const MAX_FRAME_MS: f64 = 1000.0;

/// Turns fractional animation-frame deltas into whole simulation
/// milliseconds without losing the remainder
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    carry_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole milliseconds to advance for a frame of `dt_ms`
    pub fn tick(&mut self, dt_ms: f64) -> u64 {
        if !dt_ms.is_finite() {
            return 0;
        }
        let total = self.carry_ms + dt_ms.clamp(0.0, MAX_FRAME_MS);
        let whole = total.floor();
        self.carry_ms = total - whole;
        whole as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_keeps_fractions() {
        let mut clock = FrameClock::new();
        let elapsed: u64 = (0..60).map(|_| clock.tick(1000.0 / 60.0)).sum();
        assert!((999..=1000).contains(&elapsed), "{}", elapsed);

        let mut clock = FrameClock::new();
        let elapsed: u64 = (0..144).map(|_| clock.tick(6.944)).sum();
        assert_eq!(elapsed, 999);
        assert_eq!(clock.tick(0.1), 1);
    }

    #[test]
    fn test_frame_clock_clamps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(5000.0), 1000);
        assert_eq!(clock.tick(-20.0), 0);
        assert_eq!(clock.tick(f64::NAN), 0);
        assert_eq!(clock.tick(16.5), 16);
        assert_eq!(clock.tick(16.5), 17);
    }

    #[test]
    fn test_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(now_ms() > 1_577_836_800_000.0);
    }
}
