//! Off-screen drawing surface and the encoded capture it produces.
//!
//! A capture is drawn into the surface horizontally mirrored so the
//! result matches the selfie preview the user sees, then JPEG-encoded.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use image::{codecs::jpeg::JpegEncoder, RgbImage};

use super::frame::{Frame, BYTES_PER_PIXEL};
use super::CameraError;

/// Encoded still-image payload.
pub type ImageBytes = Vec<u8>;

/// Off-screen RGB surface the live frame is rendered into.
///
/// The caller creates it and hands it to the camera session; the session
/// resizes it to each frame and clears it on release.
#[derive(Debug, Default, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when nothing has been drawn since creation or the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Resizes the surface to the frame and draws it flipped left to right.
    pub fn draw_mirrored(&mut self, frame: &Frame) -> Result<(), CameraError> {
        if !frame.is_valid() {
            return Err(CameraError::CaptureFailed(format!(
                "frame buffer does not match {}x{}",
                frame.width(),
                frame.height()
            )));
        }

        self.width = frame.width();
        self.height = frame.height();
        self.pixels.clear();
        self.pixels.reserve(frame.byte_len());

        let row_len = self.width as usize * BYTES_PER_PIXEL;
        for row in frame.pixels().chunks_exact(row_len) {
            for px in row.chunks_exact(BYTES_PER_PIXEL).rev() {
                self.pixels.extend_from_slice(px);
            }
        }
        Ok(())
    }

    /// Encodes the current contents as JPEG at the given quality (1-100).
    pub fn encode_jpeg(&self, quality: u8) -> Result<ImageBytes, CameraError> {
        let image = RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| CameraError::EncodeFailed("surface is empty".into()))?;

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        image
            .write_with_encoder(encoder)
            .map_err(|e| CameraError::EncodeFailed(e.to_string()))?;
        Ok(buffer)
    }

    /// Drops the drawn contents.
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pixels.clear();
    }
}

/// A mirrored, JPEG-encoded still captured during a challenge.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: ImageBytes,
    width: u32,
    height: u32,
    captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(bytes: ImageBytes, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            captured_at: Utc::now(),
        }
    }

    /// The encoded JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Renders the image as a `data:image/jpeg;base64,` URI, the format the
    /// auth service expects for `face_image`.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.bytes))
    }
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoded_bytes", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
