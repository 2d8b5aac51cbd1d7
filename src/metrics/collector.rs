//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus counters for the login and challenge flow.
///
/// Counter handles are shared, so clones update the same registry.
#[derive(Clone)]
pub struct ChallengeMetrics {
    registry: Registry,

    // Login metrics
    pub(crate) submissions: IntCounter,
    pub(crate) failures: IntCounter,
    pub(crate) lockouts: IntCounter,

    // Challenge metrics
    pub(crate) challenges_required: IntCounter,
    pub(crate) captures: IntCounter,
    pub(crate) camera_failures: IntCounter,
}

impl ChallengeMetrics {
    /// Creates a registry with all flow counters registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let submissions = IntCounter::new(
            "face_gate_login_submissions_total",
            "Login submissions that passed form validation",
        )?;
        let failures = IntCounter::new(
            "face_gate_login_failures_total",
            "Logins refused by the auth service",
        )?;
        let lockouts = IntCounter::new(
            "face_gate_lockouts_total",
            "Refusals reporting a locked account",
        )?;
        let challenges_required = IntCounter::new(
            "face_gate_challenges_required_total",
            "Submissions that required a camera challenge",
        )?;
        let captures = IntCounter::new(
            "face_gate_captures_total",
            "Challenge captures taken",
        )?;
        let camera_failures = IntCounter::new(
            "face_gate_camera_failures_total",
            "Challenges aborted because the camera was unavailable",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(lockouts.clone()))?;
        registry.register(Box::new(challenges_required.clone()))?;
        registry.register(Box::new(captures.clone()))?;
        registry.register(Box::new(camera_failures.clone()))?;

        Ok(Self {
            registry,
            submissions,
            failures,
            lockouts,
            challenges_required,
            captures,
            camera_failures,
        })
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn submissions(&self) -> u64 {
        self.submissions.get()
    }

    pub fn failures(&self) -> u64 {
        self.failures.get()
    }

    pub fn challenges_required(&self) -> u64 {
        self.challenges_required.get()
    }

    pub fn captures(&self) -> u64 {
        self.captures.get()
    }

    pub fn camera_failures(&self) -> u64 {
        self.camera_failures.get()
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for ChallengeMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeMetrics")
            .field("submissions", &self.submissions.get())
            .field("failures", &self.failures.get())
            .field("challenges_required", &self.challenges_required.get())
            .finish()
    }
}
