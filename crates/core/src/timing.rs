//! Heartbeat interval `H` and reclamation grace `G`: the two timing knobs
//! that govern liveness, validated once at startup (B1).

use std::time::Duration;

use crate::error::GridError;

/// Recommended defaults from the concurrency & resource model.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_RECLAMATION_GRACE: Duration = Duration::from_secs(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub heartbeat_interval: Duration,
    pub reclamation_grace: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reclamation_grace: DEFAULT_RECLAMATION_GRACE,
        }
    }
}

impl Timing {
    pub fn new(heartbeat_interval: Duration, reclamation_grace: Duration) -> Self {
        Self {
            heartbeat_interval,
            reclamation_grace,
        }
    }

    /// `H < G/2` is required at startup (B1); anything else is
    /// `ConfigInvalid` and the process refuses to start.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.heartbeat_interval >= self.reclamation_grace / 2 {
            return Err(GridError::ConfigInvalid(format!(
                "heartbeat interval {:?} must be less than half the reclamation grace {:?}",
                self.heartbeat_interval, self.reclamation_grace
            )));
        }
        Ok(())
    }
}

/// Parse timing strings like `"30s"`, `"5m"`, `"1h"` from settings files.
///
/// Accepts a trailing `s`/`m`/`h` unit; a bare integer is interpreted as
/// seconds.
pub fn parse_duration(s: &str) -> Result<Duration, GridError> {
    let s = s.trim();
    let invalid = || GridError::ConfigInvalid(format!("invalid duration: {s:?}"));

    let (digits, unit) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - 1], c),
        Some(_) => (s, 's'),
        None => return Err(invalid()),
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let secs = match unit {
        's' => value,
        'm' => value * 60,
        'h' => value * 3600,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(secs))
}
