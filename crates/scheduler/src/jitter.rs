//! Jittered interval helper shared by the poll, heartbeat, and reclamation
//! loops, so independently running machines don't lock-step against each
//! other on every tick.

use std::time::Duration;

use rand::Rng;

/// Returns `base` scaled by a random factor in `[1 - fraction, 1 + fraction]`.
/// `fraction` is clamped to `[0.0, 1.0]`.
pub fn jittered(base: Duration, fraction: f64) -> Duration {
    let fraction = fraction.clamp(0.0, 1.0);
    let factor = 1.0 + rand::thread_rng().gen_range(-fraction..=fraction);
    Duration::from_secs_f64((base.as_secs_f64() * factor).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_stays_within_bounds() {
        let base = Duration::from_secs(10);
        for _ in 0..100 {
            let d = jittered(base, 0.2);
            assert!(d >= Duration::from_secs(8) && d <= Duration::from_secs(12), "{d:?} out of bounds");
        }
    }

    #[test]
    fn zero_fraction_is_exact() {
        assert_eq!(jittered(Duration::from_secs(5), 0.0), Duration::from_secs(5));
    }
}
