use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform integer in `[min, max)`. Collapses to `min` when the range is empty.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Uniformly random lowercase ASCII letter.
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    rng.gen_range('a'..='z')
}

/// Bounds of the human "thinking pause" taken before each UI action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionWindow {
    #[serde(rename = "from")]
    pub from_ms: u64,
    #[serde(rename = "to")]
    pub to_ms: u64,
}

impl Default for ReactionWindow {
    fn default() -> Self {
        Self {
            from_ms: 1000,
            to_ms: 1600,
        }
    }
}

impl ReactionWindow {
    pub fn new(from_ms: u64, to_ms: u64) -> Self {
        Self { from_ms, to_ms }
    }

    pub fn is_valid(&self) -> bool {
        self.from_ms <= self.to_ms
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(random_int(rng, self.from_ms, self.to_ms))
    }
}

/// Suspend-for-duration seam. Every pause the bot takes goes through here so
/// tests can run the session loop without real sleeping.
pub trait Pacer {
    fn pause(&self, duration: Duration);

    fn pause_ms(&self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.pause(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

/// Production pacer: blocks the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
