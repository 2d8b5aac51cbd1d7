//! Native camera backend built on nokhwa.
//!
//! nokhwa's threaded camera pushes every decoded buffer into a
//! [`FrameSlot`]. The session task only ever reads the slot, so the ready
//! wait suspends between checks and stays bounded by the session timeout.

use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Buffer, CallbackCamera};

use super::slot::{FrameSlot, READY_POLL_INTERVAL};
use super::{CameraDevice, CameraError, CaptureConstraints, Facing, Frame};

/// A platform video input opened through nokhwa.
pub struct NativeCamera {
    index: u32,
    camera: Option<CallbackCamera>,
    latest: FrameSlot<Buffer>,
    sequence: u64,
}

impl NativeCamera {
    /// Targets the device at `index` (0 is the system default).
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
            latest: FrameSlot::new(),
            sequence: 0,
        }
    }
}

#[async_trait(?Send)]
impl CameraDevice for NativeCamera {
    async fn open(&mut self, constraints: &CaptureConstraints) -> Result<(), CameraError> {
        if constraints.facing != Facing::User {
            tracing::debug!("Native backend ignores facing; using the configured device index");
        }

        let format = CameraFormat::new(
            Resolution::new(constraints.width, constraints.height),
            FrameFormat::MJPEG,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        self.latest.clear();
        let slot = self.latest.clone();
        let mut camera =
            CallbackCamera::new(CameraIndex::Index(self.index), requested, move |buffer| {
                slot.put(buffer)
            })
            .map_err(|e| {
                tracing::warn!(index = self.index, error = %e, "Camera device not found");
                CameraError::NoDevice
            })?;
        camera.open_stream().map_err(|e| {
            tracing::warn!(index = self.index, error = %e, "Camera stream refused");
            CameraError::AccessDenied
        })?;

        self.sequence = 0;
        self.camera = Some(camera);
        tracing::info!(index = self.index, "Native camera opened");
        Ok(())
    }

    async fn wait_ready(&mut self) -> Result<(), CameraError> {
        if self.camera.is_none() {
            return Err(CameraError::NotActive);
        }
        // The first delivered buffer stands in for "metadata loaded".
        self.latest.filled(READY_POLL_INTERVAL).await;
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame, CameraError> {
        if self.camera.is_none() {
            return Err(CameraError::NotActive);
        }
        let buffer = self
            .latest
            .latest()
            .ok_or_else(|| CameraError::CaptureFailed("no frame delivered yet".into()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        self.sequence += 1;
        let (width, height) = (decoded.width(), decoded.height());
        Ok(Frame::new(decoded.into_raw(), width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream cleanly");
            }
            self.latest.clear();
            tracing::info!(index = self.index, "Native camera closed");
        }
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        self.close();
    }
}
