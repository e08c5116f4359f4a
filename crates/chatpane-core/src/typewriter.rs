//! Character-by-character reveal with a randomized pause between characters.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

pub const DEFAULT_MIN_DELAY_MS: u64 = 10;
pub const DEFAULT_MAX_DELAY_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typewriter {
    min_delay: Duration,
    max_delay: Duration,
    seed: Option<u64>,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            seed: None,
        }
    }
}

impl Typewriter {
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Result<Self, ConfigError> {
        if min_delay_ms > max_delay_ms {
            return Err(ConfigError::DelayRange {
                min: min_delay_ms,
                max: max_delay_ms,
            });
        }
        Ok(Self {
            min_delay: Duration::from_millis(min_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
            seed: None,
        })
    }

    /// Fix the delay sequence, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Draw one pause uniformly from `min_delay..=max_delay` (whole milliseconds).
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }

    /// Feed `text` to `on_char` one character at a time, sleeping between
    /// characters. Stops early if `on_char` returns false.
    pub async fn reveal<F>(&self, text: &str, mut on_char: F)
    where
        F: FnMut(char) -> bool,
    {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for (i, ch) in text.chars().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.next_delay(&mut rng)).await;
            }
            if !on_char(ch) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            Typewriter::new(50, 10),
            Err(ConfigError::DelayRange { min: 50, max: 10 })
        ));
        assert!(Typewriter::new(20, 20).is_ok());
    }

    #[test]
    fn delays_stay_inside_closed_interval() {
        let typewriter = Typewriter::new(10, 12).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let delay = typewriter.next_delay(&mut rng).as_millis();
            assert!((10..=12).contains(&delay));
            seen.insert(delay);
        }
        // both endpoints are reachable
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_emits_every_char_with_bounded_total_delay() {
        let typewriter = Typewriter::new(10, 50).unwrap().with_seed(1);
        let start = Instant::now();
        let mut out = String::new();

        typewriter
            .reveal("héllo", |ch| {
                out.push(ch);
                true
            })
            .await;

        assert_eq!(out, "héllo");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4 * 10));
        assert!(elapsed <= Duration::from_millis(4 * 50));
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_stops_when_callback_refuses() {
        let typewriter = Typewriter::default();
        let mut count = 0;
        typewriter
            .reveal("abcdef", |_| {
                count += 1;
                count < 3
            })
            .await;
        assert_eq!(count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_returns_immediately() {
        let start = Instant::now();
        Typewriter::default().reveal("", |_| true).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
