//! Camera session lifecycle.
//!
//! A [`CameraSession`] owns one device and walks it through
//! acquire → wait ready → capture → release. The device handle is closed on
//! every exit path: explicit release, failed acquisition, cancelled futures,
//! dropped guards and dropping the session itself.
//!
//! ```text
//! Idle --acquire()--> Acquiring --(granted)--> Active
//! Acquiring --(denied)--> Failed --(release / acquire)--> Idle
//! Active --capture_frame()--> Active
//! Active --release()--> Releasing --> Idle
//! ```

use std::time::Duration;

use thiserror::Error;

use super::{CameraDevice, CameraError, CaptureConstraints, CapturedImage, Surface};

/// Lifecycle state of a [`CameraSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Acquiring,
    Active,
    Releasing,
    Failed,
}

/// Hook invoked right before each shot of a multi-frame capture, used by the
/// host to flash a visual cue.
pub trait CaptureCue {
    fn before_capture(&mut self, shot: u32, total: u32);
}

impl<F: FnMut(u32, u32)> CaptureCue for F {
    fn before_capture(&mut self, shot: u32, total: u32) {
        self(shot, total)
    }
}

/// A cue that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCue;

impl CaptureCue for NoCue {
    fn before_capture(&mut self, _shot: u32, _total: u32) {}
}

/// A multi-frame capture that stopped early.
#[derive(Debug, Error)]
#[error("capture aborted after {} frame(s): {source}", .captured.len())]
pub struct PartialCapture {
    /// Frames captured before the failure.
    pub captured: Vec<CapturedImage>,
    /// The failure that stopped the burst.
    #[source]
    pub source: CameraError,
}

/// Owns a camera device and the surface captures are drawn into.
pub struct CameraSession<D: CameraDevice> {
    device: D,
    surface: Surface,
    state: SessionState,
    constraints: CaptureConstraints,
}

impl<D: CameraDevice> CameraSession<D> {
    /// Creates an idle session around `device` with a fresh surface.
    pub fn new(device: D) -> Self {
        Self::with_surface(device, Surface::new())
    }

    /// Creates an idle session drawing into a caller-provided surface.
    pub fn with_surface(device: D, surface: Surface) -> Self {
        Self {
            device,
            surface,
            state: SessionState::Idle,
            constraints: CaptureConstraints::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// The surface the last capture was drawn into.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Requests device access.
    ///
    /// Allowed from `Idle` and `Failed`; an already active session answers
    /// [`CameraError::Busy`] until it is released. On denial the session is
    /// left `Failed` with no handle open.
    pub async fn acquire(&mut self, constraints: &CaptureConstraints) -> Result<(), CameraError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Failed => self.release(),
            SessionState::Acquiring | SessionState::Active | SessionState::Releasing => {
                return Err(CameraError::Busy);
            }
        }

        self.state = SessionState::Acquiring;
        tracing::debug!(
            facing = ?constraints.facing,
            width = constraints.width,
            height = constraints.height,
            "Requesting camera access"
        );

        let mut pending = PendingAcquire {
            session: self,
            armed: true,
        };
        let opened = pending.session.device.open(constraints).await;
        match opened {
            Ok(()) => {
                pending.armed = false;
                pending.session.constraints = constraints.clone();
                pending.session.state = SessionState::Active;
                tracing::info!("Camera acquired");
                Ok(())
            }
            Err(err) => {
                drop(pending);
                tracing::warn!(error = %err, "Camera acquisition failed");
                Err(err)
            }
        }
    }

    /// Waits for the stream's first usable frame, bounded by the
    /// constraints' ready timeout.
    pub async fn wait_ready(&mut self) -> Result<(), CameraError> {
        if self.state != SessionState::Active {
            return Err(CameraError::NotActive);
        }

        let limit = self.constraints.ready_timeout();
        match tokio::time::timeout(limit, self.device.wait_ready()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = limit.as_millis() as u64,
                    "Camera stream never became ready"
                );
                Err(CameraError::Timeout)
            }
        }
    }

    /// Captures the current frame as a mirrored JPEG.
    ///
    /// Only valid while `Active`; otherwise returns
    /// [`CameraError::NotActive`] without touching the surface.
    pub fn capture_frame(&mut self) -> Result<CapturedImage, CameraError> {
        if self.state != SessionState::Active {
            return Err(CameraError::NotActive);
        }

        let frame = self.device.grab()?;
        self.surface.draw_mirrored(&frame)?;
        let bytes = self.surface.encode_jpeg(self.constraints.jpeg_quality)?;

        tracing::trace!(
            width = frame.width(),
            height = frame.height(),
            sequence = frame.sequence(),
            encoded_bytes = bytes.len(),
            "Frame captured"
        );
        Ok(CapturedImage::new(bytes, frame.width(), frame.height()))
    }

    /// Captures `count` frames, pausing `interval` between them and calling
    /// the cue before each shot.
    pub async fn capture_multiple<C>(
        &mut self,
        count: u32,
        interval: Duration,
        cue: &mut C,
    ) -> Result<Vec<CapturedImage>, PartialCapture>
    where
        C: CaptureCue + ?Sized,
    {
        let mut captured = Vec::with_capacity(count as usize);
        for shot in 1..=count {
            if shot > 1 {
                tokio::time::sleep(interval).await;
            }
            cue.before_capture(shot, count);
            match self.capture_frame() {
                Ok(image) => captured.push(image),
                Err(source) => return Err(PartialCapture { captured, source }),
            }
        }
        Ok(captured)
    }

    /// Stops the device and detaches the surface. Safe from any state.
    pub fn release(&mut self) {
        let previous = self.state;
        self.state = SessionState::Releasing;
        self.device.close();
        self.surface.clear();
        self.state = SessionState::Idle;

        if previous == SessionState::Active {
            tracing::info!("Camera released");
        } else {
            tracing::debug!(previous = ?previous, "Camera session reset");
        }
    }

    /// Acquires the device and waits for it to become ready, returning a
    /// guard that releases the camera when dropped.
    ///
    /// Any failure along the way releases before the error is returned.
    pub async fn activate(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<ActiveCamera<'_, D>, CameraError> {
        if let Err(err) = self.acquire(constraints).await {
            if self.state == SessionState::Failed {
                self.release();
            }
            return Err(err);
        }

        let mut active = ActiveCamera { session: self };
        active.session.wait_ready().await?;
        Ok(active)
    }
}

impl<D: CameraDevice> Drop for CameraSession<D> {
    fn drop(&mut self) {
        if self.state != SessionState::Idle || self.device.is_open() {
            self.release();
        }
    }
}

impl<D: CameraDevice> std::fmt::Debug for CameraSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("state", &self.state)
            .field("device_open", &self.device.is_open())
            .finish()
    }
}

/// Closes a half-opened device if the acquire future is dropped or fails.
struct PendingAcquire<'a, D: CameraDevice> {
    session: &'a mut CameraSession<D>,
    armed: bool,
}

impl<D: CameraDevice> Drop for PendingAcquire<'_, D> {
    fn drop(&mut self) {
        if self.armed {
            self.session.device.close();
            self.session.state = SessionState::Failed;
        }
    }
}

/// A ready camera. Releases the session when dropped.
pub struct ActiveCamera<'a, D: CameraDevice> {
    session: &'a mut CameraSession<D>,
}

impl<D: CameraDevice> ActiveCamera<'_, D> {
    pub fn capture_frame(&mut self) -> Result<CapturedImage, CameraError> {
        self.session.capture_frame()
    }

    pub async fn capture_multiple<C>(
        &mut self,
        count: u32,
        interval: Duration,
        cue: &mut C,
    ) -> Result<Vec<CapturedImage>, PartialCapture>
    where
        C: CaptureCue + ?Sized,
    {
        self.session.capture_multiple(count, interval, cue).await
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Releases the camera now.
    pub fn release(self) {}
}

impl<D: CameraDevice> Drop for ActiveCamera<'_, D> {
    fn drop(&mut self) {
        self.session.release();
    }
}
