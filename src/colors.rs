//! Packed ARGB8888 colors, the pixel format of the color buffer.

/// Clear color, RGB 0.3 gray.
pub const BACKGROUND: u32 = 0xFF4D4D4D;

/// Packs `[0, 1]` float channels into `0xAARRGGBB`. Out-of-range values clamp.
#[inline]
pub fn pack_color(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (to_u8(a) << 24) | (to_u8(r) << 16) | (to_u8(g) << 8) | to_u8(b)
}

/// Reorders `0xAARRGGBB` pixels into RGBA bytes for image encoders.
pub fn to_rgba8(pixels: &[u32]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|&p| {
            let [a, r, g, b] = p.to_be_bytes();
            [r, g, b, a]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_thirty_percent_gray() {
        assert_eq!(pack_color(0.3, 0.3, 0.3, 1.0), BACKGROUND);
    }

    #[test]
    fn test_pack_clamps() {
        assert_eq!(pack_color(2.0, -1.0, 1.0, 1.0), 0xFFFF00FF);
    }

    #[test]
    fn test_rgba_byte_order() {
        assert_eq!(to_rgba8(&[0x80112233]), vec![0x11, 0x22, 0x33, 0x80]);
    }
}
