use std::collections::VecDeque;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::timing::{random_int, random_letter};

/// Characters typed per "word" when converting WPM to a keystroke rate.
const CHARS_PER_WORD: f64 = 5.0;
const HESITATION_CHANCE: f64 = 0.1;
const HESITATION_FACTOR: f64 = 1.5;
const TYPO_KEY_FACTOR: f64 = 0.8;
const TYPO_FIX_FACTOR: f64 = 2.0;
const FALLBACK_WPM: f64 = 40.0;

/// Typing speed and error configuration for one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingProfile {
    pub wpm: f64,
    pub typo_rate: f64,
}

impl Default for TypingProfile {
    fn default() -> Self {
        Self {
            wpm: 40.0,
            typo_rate: 0.05,
        }
    }
}

impl TypingProfile {
    pub fn new(wpm: f64, typo_rate: f64) -> Self {
        Self { wpm, typo_rate }
    }

    pub fn is_valid(&self) -> bool {
        self.wpm.is_finite() && self.wpm > 0.0 && (0.0..=1.0).contains(&self.typo_rate)
    }

    /// Mean milliseconds between keystrokes at the configured speed.
    pub fn base_delay_ms(&self) -> f64 {
        let wpm = if self.wpm.is_finite() && self.wpm > 0.0 {
            self.wpm
        } else {
            FALLBACK_WPM
        };
        60_000.0 / (wpm * CHARS_PER_WORD)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Erase the previously typed character.
    Backspace,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeystrokeEvent {
    pub key: Key,
    /// Pause after pressing the key, in milliseconds.
    pub delay_ms: f64,
}

/// Extra pause applied after clause and sentence boundaries.
pub fn pause_factor(ch: char) -> Option<f64> {
    match ch {
        '!' => Some(1.8),
        '?' => Some(1.7),
        '.' => Some(1.6),
        ';' | ',' | ':' => Some(1.3),
        ' ' => Some(1.2),
        _ => None,
    }
}

/// Lazily produces the keystrokes a human would make typing `input`.
///
/// Every pulled character may expand into a wrong letter followed by a
/// backspace before the real key; those are buffered and drained first.
pub struct Typist<R: Rng> {
    chars: Vec<char>,
    index: usize,
    base_delay: f64,
    typo_rate: f64,
    pending: VecDeque<KeystrokeEvent>,
    rng: R,
}

impl<R: Rng> Typist<R> {
    pub fn new(input: &str, profile: &TypingProfile, rng: R) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            base_delay: profile.base_delay_ms(),
            typo_rate: profile.typo_rate.clamp(0.0, 1.0),
            pending: VecDeque::with_capacity(3),
            rng,
        }
    }

    fn emit_char(&mut self, index: usize, ch: char) {
        let mut jitter = self.base_delay * self.rng.gen_range(0.5..1.5);

        if let Some(factor) = pause_factor(ch) {
            jitter *= factor;
        }

        let stride = random_int(&mut self.rng, 15, 25) as usize;
        if index % stride == 0 && self.rng.gen_bool(HESITATION_CHANCE) {
            jitter += self.base_delay * HESITATION_FACTOR;
        }

        if self.typo_rate > 0.0 && self.rng.gen_bool(self.typo_rate) {
            let typo = random_letter(&mut self.rng);
            self.pending.push_back(KeystrokeEvent {
                key: Key::Char(typo),
                delay_ms: jitter * TYPO_KEY_FACTOR,
            });
            self.pending.push_back(KeystrokeEvent {
                key: Key::Backspace,
                delay_ms: jitter * TYPO_FIX_FACTOR,
            });
        }

        self.pending.push_back(KeystrokeEvent {
            key: Key::Char(ch),
            delay_ms: jitter,
        });
    }
}

impl<R: Rng> Iterator for Typist<R> {
    type Item = KeystrokeEvent;

    fn next(&mut self) -> Option<KeystrokeEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let ch = *self.chars.get(self.index)?;
        let index = self.index;
        self.index += 1;
        self.emit_char(index, ch);
        self.pending.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chars.len() - self.index;
        (
            remaining + self.pending.len(),
            Some(remaining * 3 + self.pending.len()),
        )
    }
}

/// Fresh, independently randomized keystroke sequence for `input`.
pub fn simulate_typing(input: &str, profile: &TypingProfile) -> Typist<SmallRng> {
    Typist::new(input, profile, SmallRng::from_entropy())
}

/// Consumer-side echo of what has been typed so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadowBuffer {
    text: String,
}

impl ShadowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, key: Key) {
        match key {
            Key::Char(ch) => self.text.push(ch),
            Key::Backspace => {
                self.text.pop();
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(input: &str, profile: &TypingProfile, seed: u64) -> Vec<KeystrokeEvent> {
        Typist::new(input, profile, SmallRng::seed_from_u64(seed)).collect()
    }

    fn replay(events: &[KeystrokeEvent]) -> String {
        let mut buffer = ShadowBuffer::new();
        for event in events {
            buffer.apply(event.key);
        }
        buffer.as_str().to_string()
    }

    #[test]
    fn test_replay_reconstructs_input() {
        let inputs = [
            "",
            "a",
            "Hi!",
            "The quick brown fox jumps over the lazy dog.",
            "zażółć gęślą jaźń",
            "  spaced,  out; text: ok?  ",
        ];
        let profile = TypingProfile::new(55.0, 0.3);
        for input in inputs {
            for seed in 0..25 {
                let events = seeded(input, &profile, seed);
                assert_eq!(replay(&events), input, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_replay_reconstructs_input_with_constant_typos() {
        let profile = TypingProfile::new(80.0, 1.0);
        let events = seeded("abc", &profile, 11);
        assert_eq!(events.len(), 9);
        assert_eq!(events[1].key, Key::Backspace);
        assert_eq!(events[2].key, Key::Char('a'));
        assert_eq!(replay(&events), "abc");
    }

    #[test]
    fn test_zero_typo_rate_never_backspaces() {
        let profile = TypingProfile::new(40.0, 0.0);
        for seed in 0..50 {
            let events = seeded("hello there, general kenobi", &profile, seed);
            assert!(events.iter().all(|e| e.key != Key::Backspace));
            assert_eq!(events.len(), 27);
        }
    }

    #[test]
    fn test_delays_positive_and_finite() {
        let profiles = [
            TypingProfile::new(1.0, 0.5),
            TypingProfile::new(40.0, 0.05),
            TypingProfile::new(250.0, 1.0),
        ];
        for profile in &profiles {
            for seed in 0..20 {
                for event in seeded("Ready? Set; go: now!", profile, seed) {
                    assert!(event.delay_ms.is_finite());
                    assert!(event.delay_ms > 0.0, "{event:?}");
                }
            }
        }
    }

    #[test]
    fn test_hi_scenario() {
        let profile = TypingProfile::new(40.0, 0.0);
        assert!((profile.base_delay_ms() - 1500.0).abs() < 1e-9);

        for seed in 0..50 {
            let events = seeded("Hi!", &profile, seed);
            let keys: Vec<Key> = events.iter().map(|e| e.key).collect();
            assert_eq!(keys, vec![Key::Char('H'), Key::Char('i'), Key::Char('!')]);

            // 0.5..1.5 of base, times 1.8, plus an optional 1.5x base hesitation
            let bang = events[2].delay_ms;
            assert!(bang >= 1500.0 * 0.5 * 1.8, "{bang}");
            assert!(bang < 1500.0 * 1.5 * 1.8 + 1500.0 * 1.5, "{bang}");
        }
    }

    #[test]
    fn test_typo_delays_scale_with_jitter() {
        let profile = TypingProfile::new(60.0, 1.0);
        let events = seeded("x", &profile, 5);
        let real = events[2].delay_ms;
        assert!((events[0].delay_ms - real * 0.8).abs() < 1e-9);
        assert!((events[1].delay_ms - real * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_sequences_are_independent() {
        let profile = TypingProfile::new(40.0, 0.0);
        let a: Vec<f64> = simulate_typing("independent", &profile)
            .map(|e| e.delay_ms)
            .collect();
        let b: Vec<f64> = simulate_typing("independent", &profile)
            .map(|e| e.delay_ms)
            .collect();
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn test_pause_factor_table() {
        assert_eq!(pause_factor('!'), Some(1.8));
        assert_eq!(pause_factor('?'), Some(1.7));
        assert_eq!(pause_factor('.'), Some(1.6));
        assert_eq!(pause_factor(','), Some(1.3));
        assert_eq!(pause_factor(' '), Some(1.2));
        assert_eq!(pause_factor('a'), None);
    }

    #[test]
    fn test_shadow_buffer_backspace_on_empty_is_noop() {
        let mut buffer = ShadowBuffer::new();
        buffer.apply(Key::Backspace);
        buffer.apply(Key::Char('ą'));
        assert_eq!(buffer.as_str(), "ą");
        assert_eq!(buffer.char_count(), 1);
    }

    #[test]
    fn test_profile_validation() {
        assert!(TypingProfile::default().is_valid());
        assert!(!TypingProfile::new(0.0, 0.1).is_valid());
        assert!(!TypingProfile::new(40.0, 1.5).is_valid());
        assert!(!TypingProfile::new(f64::NAN, 0.1).is_valid());
    }
}
