//! Login orchestration.
//!
//! Binds the attempt tracker and the camera session to the auth service:
//! decides per submission whether to capture, runs the capture as one
//! scoped operation and updates the counters from the server's answer.

mod account;
mod flow;
mod form;
mod outcome;
mod status;

pub use account::AccountSession;
pub use flow::ChallengeOrchestrator;
pub use form::{Credentials, LoginForm, ValidationError};
pub use outcome::{ChallengeOutcome, ChallengeResult, LoginOutcome};
pub use status::{Loading, RecordingStatus, StatusKind, StatusMessage, StatusSink};
