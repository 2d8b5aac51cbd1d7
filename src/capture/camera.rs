//! Camera device abstraction.
//!
//! This module provides a trait-based abstraction over the video input
//! device, allowing for both real camera input and scriptable mock
//! devices for testing the challenge lifecycle.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::{CaptureConstraints, Frame};

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("no camera device available")]
    NoDevice,
    #[error("camera access denied")]
    AccessDenied,
    #[error("camera is not active")]
    NotActive,
    #[error("camera did not become ready in time")]
    Timeout,
    #[error("camera is already in use by another capture")]
    Busy,
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("failed to encode capture: {0}")]
    EncodeFailed(String),
}

/// Trait for video input devices.
///
/// `open` and `wait_ready` are suspension points (permission prompt,
/// stream start). Implementations must make `close` idempotent and must
/// not hold an open handle after `open` returns an error.
#[async_trait(?Send)]
pub trait CameraDevice {
    /// Requests access to the device and starts the stream.
    async fn open(&mut self, constraints: &CaptureConstraints) -> Result<(), CameraError>;

    /// Resolves once the stream has delivered a usable first frame.
    async fn wait_ready(&mut self) -> Result<(), CameraError>;

    /// Grabs the current frame of the live stream.
    fn grab(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the device handle is currently open.
    fn is_open(&self) -> bool;

    /// Stops all tracks and releases the device handle.
    fn close(&mut self);
}

/// Counts the device handles a [`MockCamera`] currently holds.
///
/// Clones share the count, so tests can keep a probe after the camera has
/// moved into a session.
#[derive(Debug, Clone, Default)]
pub struct HandleProbe {
    open: Rc<Cell<usize>>,
    opened_total: Rc<Cell<usize>>,
}

impl HandleProbe {
    /// Handles open right now.
    pub fn open_handles(&self) -> usize {
        self.open.get()
    }

    /// Handles ever opened.
    pub fn opened_total(&self) -> usize {
        self.opened_total.get()
    }

    fn acquire(&self) {
        self.open.set(self.open.get() + 1);
        self.opened_total.set(self.opened_total.get() + 1);
    }

    fn release(&self) {
        self.open.set(self.open.get().saturating_sub(1));
    }
}

/// How a [`MockCamera`] answers `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Grants access and becomes ready immediately.
    #[default]
    Ready,
    /// The user or platform refuses access.
    Denied,
    /// No video input exists.
    NoDevice,
    /// Grants access but never delivers a first frame.
    NeverReady,
}

/// Mock camera that generates synthetic gradient frames.
///
/// The red channel ramps from left to right and the green channel from
/// top to bottom, so mirroring is observable in encoded captures.
#[derive(Debug, Default)]
pub struct MockCamera {
    behavior: MockBehavior,
    open_delay: Option<Duration>,
    fail_grab_after: Option<u64>,
    frame_size: Option<(u32, u32)>,
    constraints: Option<CaptureConstraints>,
    sequence: u64,
    probe: HandleProbe,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose access request is refused.
    pub fn denied() -> Self {
        Self::with_behavior(MockBehavior::Denied)
    }

    /// A platform without video input.
    pub fn no_device() -> Self {
        Self::with_behavior(MockBehavior::NoDevice)
    }

    /// A camera that opens but never reports ready.
    pub fn never_ready() -> Self {
        Self::with_behavior(MockBehavior::NeverReady)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Holds the handle open for `delay` before `open` completes, the way a
    /// permission prompt suspends the caller.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Fails every grab after the first `frames` succeed.
    pub fn failing_after(mut self, frames: u64) -> Self {
        self.fail_grab_after = Some(frames);
        self
    }

    /// Delivers frames of this size regardless of the requested constraints.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    /// A probe sharing this camera's handle count.
    pub fn probe(&self) -> HandleProbe {
        self.probe.clone()
    }

    fn dimensions(&self, constraints: &CaptureConstraints) -> (u32, u32) {
        self.frame_size
            .unwrap_or((constraints.width, constraints.height))
    }
}

#[async_trait(?Send)]
impl CameraDevice for MockCamera {
    async fn open(&mut self, constraints: &CaptureConstraints) -> Result<(), CameraError> {
        match self.behavior {
            MockBehavior::Denied => return Err(CameraError::AccessDenied),
            MockBehavior::NoDevice => return Err(CameraError::NoDevice),
            MockBehavior::Ready | MockBehavior::NeverReady => {}
        }

        self.probe.acquire();
        self.constraints = Some(constraints.clone());
        self.sequence = 0;

        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }

        tracing::info!(facing = ?constraints.facing, "MockCamera opened");
        Ok(())
    }

    async fn wait_ready(&mut self) -> Result<(), CameraError> {
        if !self.is_open() {
            return Err(CameraError::NotActive);
        }
        if self.behavior == MockBehavior::NeverReady {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame, CameraError> {
        let constraints = self.constraints.as_ref().ok_or(CameraError::NotActive)?;
        if let Some(limit) = self.fail_grab_after {
            if self.sequence >= limit {
                return Err(CameraError::CaptureFailed("mock stream stalled".into()));
            }
        }

        let (width, height) = self.dimensions(constraints);
        let x_span = width.saturating_sub(1).max(1);
        let y_span = height.saturating_sub(1).max(1);
        let mut pixels = Vec::with_capacity((width * height) as usize * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / x_span) as u8);
                pixels.push((y * 255 / y_span) as u8);
                pixels.push((self.sequence % 256) as u8);
            }
        }

        self.sequence += 1;
        Ok(Frame::new(pixels, width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.constraints.is_some()
    }

    fn close(&mut self) {
        if self.constraints.take().is_some() {
            self.probe.release();
            tracing::info!("MockCamera closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let probe = camera.probe();
        let constraints = CaptureConstraints::with_dimensions(8, 4);

        assert!(!camera.is_open());

        camera.open(&constraints).await.unwrap();
        camera.wait_ready().await.unwrap();
        assert!(camera.is_open());
        assert_eq!(probe.open_handles(), 1);

        let frame = camera.grab().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.grab().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.close();
        assert!(!camera.is_open());
        assert_eq!(probe.open_handles(), 0);

        camera.close();
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_grab_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(camera.grab(), Err(CameraError::NotActive)));
    }

    #[tokio::test]
    async fn test_denied_holds_no_handle() {
        let mut camera = MockCamera::denied();
        let probe = camera.probe();

        let result = camera.open(&CaptureConstraints::default()).await;
        assert_eq!(result, Err(CameraError::AccessDenied));
        assert_eq!(probe.opened_total(), 0);
    }

    #[tokio::test]
    async fn test_failing_after_limit() {
        let mut camera = MockCamera::new().failing_after(1);
        camera
            .open(&CaptureConstraints::with_dimensions(4, 4))
            .await
            .unwrap();

        assert!(camera.grab().is_ok());
        assert!(matches!(camera.grab(), Err(CameraError::CaptureFailed(_))));
    }

    #[tokio::test]
    async fn test_gradient_runs_left_to_right() {
        let mut camera = MockCamera::new().with_frame_size(10, 2);
        camera.open(&CaptureConstraints::default()).await.unwrap();

        let frame = camera.grab().unwrap();
        assert_eq!(frame.width(), 10);
        assert_eq!(frame.pixel(0, 0).unwrap()[0], 0);
        assert_eq!(frame.pixel(9, 0).unwrap()[0], 255);
    }
}
