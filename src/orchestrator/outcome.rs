//! Results handed back to the host after a challenge or a submission.

use crate::attempts::Identity;
use crate::auth::NetworkError;
use crate::capture::{CameraError, CapturedImage};

use super::{StatusMessage, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    Captured,
    CameraUnavailable,
    UserAborted,
}

/// What a challenge produced.
#[derive(Debug, Clone)]
pub struct ChallengeResult {
    /// The capture, present only when `outcome` is `Captured`.
    pub image: Option<CapturedImage>,
    /// Failure count at the moment of the challenge.
    pub attempt_number: u32,
    pub outcome: ChallengeOutcome,
    /// Camera failure behind a `CameraUnavailable` outcome.
    pub error: Option<CameraError>,
}

impl ChallengeResult {
    pub fn captured(image: CapturedImage, attempt_number: u32) -> Self {
        Self {
            image: Some(image),
            attempt_number,
            outcome: ChallengeOutcome::Captured,
            error: None,
        }
    }

    pub fn unavailable(error: CameraError, attempt_number: u32) -> Self {
        Self {
            image: None,
            attempt_number,
            outcome: ChallengeOutcome::CameraUnavailable,
            error: Some(error),
        }
    }

    pub fn aborted(attempt_number: u32) -> Self {
        Self {
            image: None,
            attempt_number,
            outcome: ChallengeOutcome::UserAborted,
            error: None,
        }
    }
}

/// How a login submission ended. Every variant carries the message to
/// show the user.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// The auth service accepted the credentials.
    Authenticated {
        identity: Identity,
        token: Option<String>,
        challenged: bool,
        message: StatusMessage,
    },
    /// The auth service refused the credentials.
    Failed {
        identity: Identity,
        failed_count: u32,
        locked: bool,
        challenged: bool,
        /// Whether the next attempt will require a capture.
        challenge_next: bool,
        message: StatusMessage,
    },
    /// The form was incomplete; nothing was sent.
    Rejected {
        error: ValidationError,
        message: StatusMessage,
    },
    /// A capture was mandatory but the camera failed; nothing was sent.
    ChallengeUnavailable {
        identity: Identity,
        challenge: ChallengeResult,
        message: StatusMessage,
    },
    /// The user declined the capture; nothing was sent.
    ChallengeAborted {
        identity: Identity,
        challenge: ChallengeResult,
        message: StatusMessage,
    },
    /// The auth service could not be reached.
    ConnectionError {
        identity: Identity,
        error: NetworkError,
        message: StatusMessage,
    },
}

impl LoginOutcome {
    pub fn message(&self) -> &StatusMessage {
        match self {
            Self::Authenticated { message, .. }
            | Self::Failed { message, .. }
            | Self::Rejected { message, .. }
            | Self::ChallengeUnavailable { message, .. }
            | Self::ChallengeAborted { message, .. }
            | Self::ConnectionError { message, .. } => message,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// True when a capture was sent with the credentials.
    pub fn was_challenged(&self) -> bool {
        match self {
            Self::Authenticated { challenged, .. } | Self::Failed { challenged, .. } => *challenged,
            _ => false,
        }
    }
}
