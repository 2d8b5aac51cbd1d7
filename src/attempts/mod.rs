//! Failed-attempt tracking and challenge policy.
//!
//! Pure state and policy: decides, per identity, whether the next login
//! attempt must include a camera challenge.

mod identity;
mod policy;
mod store;
mod tracker;

pub use identity::Identity;
pub use policy::{ChallengePolicy, DEFAULT_CHALLENGE_THRESHOLD};
pub use store::{AttemptStore, MemoryAttemptStore, StorageAttemptStore, ATTEMPT_KEY_PREFIX};
pub use tracker::AttemptTracker;
