//! Prometheus metrics for the login flow.
//!
//! # Metrics Exposed
//!
//! - `face_gate_login_submissions_total` - Validated login submissions
//! - `face_gate_login_failures_total` - Refused logins
//! - `face_gate_lockouts_total` - Refusals reporting a locked account
//! - `face_gate_challenges_required_total` - Submissions that needed a capture
//! - `face_gate_captures_total` - Captures taken
//! - `face_gate_camera_failures_total` - Challenges lost to camera failures
//!
//! # Example
//!
//! ```
//! use face_gate::metrics::ChallengeMetrics;
//!
//! let metrics = ChallengeMetrics::new().expect("Failed to create registry");
//! let text = metrics.encode().unwrap();
//! assert!(text.contains("face_gate_captures_total"));
//! ```

mod collector;

pub use collector::{ChallengeMetrics, MetricsError};
