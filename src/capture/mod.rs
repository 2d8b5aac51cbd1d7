//! Camera input and challenge capture.
//!
//! This module provides the device abstraction, the session that owns a
//! device through one acquisition, and the mirrored JPEG stills the
//! challenge sends to the server.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod session;
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
mod slot;
mod surface;

pub use camera::{CameraDevice, CameraError, HandleProbe, MockBehavior, MockCamera};
pub use config::{CaptureConstraints, Facing};
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use native::NativeCamera;
pub use session::{ActiveCamera, CameraSession, CaptureCue, NoCue, PartialCapture, SessionState};
pub use surface::{CapturedImage, ImageBytes, Surface};
