//! Challenge policy.
//!
//! Decides from a failure count whether the next attempt must carry a
//! camera capture. Once crossed, the threshold stays crossed until the
//! count is reset.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Failures before the first challenge, as the auth service counts them.
pub const DEFAULT_CHALLENGE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengePolicy {
    /// Failed attempts at which the challenge becomes mandatory.
    pub threshold: u32,
}

impl Default for ChallengePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CHALLENGE_THRESHOLD,
        }
    }
}

impl ChallengePolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// True for every count at or above the threshold.
    #[inline]
    pub fn requires_challenge(&self, failed_count: u32) -> bool {
        failed_count >= self.threshold
    }

    /// Failures left before the challenge kicks in.
    #[inline]
    pub fn remaining(&self, failed_count: u32) -> u32 {
        self.threshold.saturating_sub(failed_count)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        Ok(())
    }
}
