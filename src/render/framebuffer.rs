//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a view into the color and stencil buffers with bounds-checked
//! access. The stencil holds one bit per pixel, used to mask the light's mesh
//! to the silhouette of its curved boundary.

/// A view into color and stencil buffers.
///
/// Wraps 1D slices with width/height metadata to enable safe 2D pixel access.
/// This is a borrowed view, not an owning type: create it when buffers and
/// dimensions need to travel together.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    stencil_buffer: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    ///
    /// # Panics
    /// Panics (in debug builds) if buffer lengths don't match width * height
    pub fn new(
        color_buffer: &'a mut [u32],
        stencil_buffer: &'a mut [u8],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            (width * height) as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            stencil_buffer.len(),
            (width * height) as usize,
            "Stencil buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            stencil_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Set a pixel. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx] = color;
        }
    }

    /// Flip the stencil bit at (x, y).
    #[inline]
    pub fn invert_stencil(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.index(x, y) {
            self.stencil_buffer[idx] ^= 1;
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    /// Get the stencil bit at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_stencil(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|idx| self.stencil_buffer[idx] & 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut color = vec![0u32; 4];
        let mut stencil = vec![0u8; 4];
        let mut fb = FrameBuffer::new(&mut color, &mut stencil, 2, 2);
        fb.set_pixel(-1, 0, 7);
        fb.set_pixel(2, 1, 7);
        fb.invert_stencil(0, 5);
        assert_eq!(fb.get_pixel(2, 0), None);
        assert_eq!(fb.get_stencil(0, -1), None);
        assert!(color.iter().all(|&c| c == 0));
        assert!(stencil.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_stencil_is_one_bit() {
        let mut color = vec![0u32; 4];
        let mut stencil = vec![0u8; 4];
        let mut fb = FrameBuffer::new(&mut color, &mut stencil, 2, 2);
        fb.invert_stencil(1, 0);
        fb.invert_stencil(1, 1);
        fb.invert_stencil(1, 1);
        fb.set_pixel(1, 0, 0xFFFFFFFF);
        assert_eq!(fb.get_stencil(1, 0), Some(1));
        assert_eq!(fb.get_stencil(1, 1), Some(0));
        assert_eq!(fb.get_pixel(1, 0), Some(0xFFFFFFFF));
        assert_eq!(fb.get_pixel(0, 0), Some(0));
    }
}
