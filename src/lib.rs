//! Face Gate Library
//!
//! Login client with an escalating, failure-triggered camera challenge.
//! Failed logins are counted per identity; once the count reaches the
//! challenge threshold every further attempt must carry a webcam capture,
//! mirrored and JPEG-encoded, alongside the credentials.
//!
//! # Architecture
//!
//! One submission flows strictly in order:
//!
//! ```text
//! form → context → [challenge: acquire → ready → capture → release] → login
//!                         ↑                                          ↓
//!                   attempts (per-identity failure counters) ←───────┘
//! ```
//!
//! # Design Principles
//!
//! - **Camera is scoped**: the device is held only for one challenge and
//!   released on every exit path, including cancellation
//! - **Counters are client-side**: the persisted `failed_attempts_<email>`
//!   value decides when to challenge, whatever the server reports
//! - **Nothing is global**: the orchestrator owns its session, tracker and
//!   storage handles
//!
//! # Example
//!
//! ```no_run
//! use face_gate::{
//!     attempts::ChallengePolicy,
//!     auth::ScriptedAuthService,
//!     capture::MockCamera,
//!     orchestrator::{ChallengeOrchestrator, LoginForm, RecordingStatus},
//!     storage::{MemoryStorage, SharedStorage},
//! };
//!
//! # async fn demo() {
//! let auth = ScriptedAuthService::new().rejecting_then_accepting(3, "token");
//! let storage = SharedStorage::new(MemoryStorage::new());
//! let mut flow =
//!     ChallengeOrchestrator::new(auth, MockCamera::new(), storage, ChallengePolicy::default());
//!
//! let form = LoginForm::new("Ada", "ada@example.com", "hunter2");
//! for _ in 0..4 {
//!     let outcome = flow.submit(&form, &mut RecordingStatus::new()).await;
//!     println!("{}", outcome.message());
//! }
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod attempts;
pub mod auth;
pub mod capture;
pub mod config;
pub mod context;
pub mod metrics;
pub mod orchestrator;
pub mod storage;

// Re-export commonly used types at crate root
pub use attempts::{AttemptTracker, ChallengePolicy, Identity};
pub use auth::{AuthService, NetworkError};
pub use capture::{CameraDevice, CameraError, CameraSession, CaptureConstraints, MockCamera};
pub use config::FileConfig;
pub use orchestrator::{ChallengeOrchestrator, LoginForm, LoginOutcome, StatusSink};
pub use storage::{KeyValueStorage, SharedStorage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
