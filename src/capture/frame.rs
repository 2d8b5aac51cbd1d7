//! Frame type representing one live image from the camera stream.

/// Bytes per pixel of a frame (packed RGB8).
pub const BYTES_PER_PIXEL: usize = 3;

/// A single frame grabbed from the camera.
///
/// Pixels are packed RGB8, row-major, top row first, exactly as the
/// device delivers them (not mirrored).
#[derive(Clone)]
pub struct Frame {
    /// Raw RGB pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Monotonic sequence number within one acquisition.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the RGB triple at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2]])
    }

    /// Returns the expected buffer length (width * height * 3).
    #[inline]
    pub fn byte_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * BYTES_PER_PIXEL
    }

    /// Validates that the pixel buffer size matches dimensions and
    /// the frame is not empty.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.byte_len()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480 * 3];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_pixel_lookup() {
        let pixels = vec![1, 2, 3, 4, 5, 6];
        let frame = Frame::new(pixels, 2, 1, 1);

        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
    }
}
