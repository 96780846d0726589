//! Packed ARGB color values and the per-channel math shared by every
//! compositing path: the canonical alpha blend, linear interpolation and the
//! RGB <-> YUV conversions used by the color-space filters.

use serde::{Deserialize, Serialize};

/// 32-bit packed color, `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque color from RGB
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((a as u32) << 24))
    }

    /// (a, r, g, b)
    #[inline]
    pub const fn channels(self) -> (u8, u8, u8, u8) {
        (self.alpha(), self.red(), self.green(), self.blue())
    }

    /// Largest absolute per-channel difference, alpha included.
    /// This is the distance every tolerance comparison uses.
    #[inline]
    pub fn max_channel_diff(self, other: Color) -> u8 {
        let d = |a: u8, b: u8| a.abs_diff(b);
        d(self.alpha(), other.alpha())
            .max(d(self.red(), other.red()))
            .max(d(self.green(), other.green()))
            .max(d(self.blue(), other.blue()))
    }

    /// True when every channel is within `tolerance` of `other`
    #[inline]
    pub fn matches(self, other: Color, tolerance: u8) -> bool {
        self.max_channel_diff(other) <= tolerance
    }

    /// Luma (Y) of this color, 0.0 - 255.0
    #[inline]
    pub fn luma(self) -> f32 {
        rgb_to_yuv(self.red(), self.green(), self.blue()).0
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<Color> for u32 {
    fn from(c: Color) -> Self {
        c.0
    }
}

/// Blend one channel: `(s*a + d*(256-a)) >> 8`
#[inline]
pub fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (256 - a)) >> 8) as u8
}

/// Mix `src` over `dst` with an explicit alpha weight.
///
/// `alpha == 255` short-circuits to an overwrite of the RGB channels and
/// `alpha == 0` returns `dst` untouched. Destination alpha accumulates as
/// `min(255, alpha + dst.alpha)`.
#[inline]
pub fn blend(dst: Color, src: Color, alpha: u8) -> Color {
    match alpha {
        0 => dst,
        255 => src.with_alpha(255),
        a => Color::from_argb(
            (a as u16 + dst.alpha() as u16).min(255) as u8,
            blend_channel(src.red(), dst.red(), a),
            blend_channel(src.green(), dst.green(), a),
            blend_channel(src.blue(), dst.blue(), a),
        ),
    }
}

/// Source-over using the source color's own alpha
#[inline]
pub fn blend_over(dst: Color, src: Color) -> Color {
    blend(dst, src, src.alpha())
}

/// Linear interpolation between two colors, all four channels, `t` clamped to [0, 1]
#[inline]
pub fn lerp(c1: Color, c2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::from_argb(
        mix(c1.alpha(), c2.alpha()),
        mix(c1.red(), c2.red()),
        mix(c1.green(), c2.green()),
        mix(c1.blue(), c2.blue()),
    )
}

/// Clamp a float channel into a byte
#[inline]
pub fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// YUV
// ============================================================================

/// RGB -> (Y, U, V). Y in [0, 255]; U and V are signed, centred on zero.
#[inline]
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = -0.14713 * r - 0.28886 * g + 0.436 * b;
    let v = 0.615 * r - 0.51499 * g - 0.10001 * b;
    (y, u, v)
}

/// (Y, U, V) -> clamped RGB
#[inline]
pub fn yuv_to_rgb(y: f32, u: f32, v: f32) -> (u8, u8, u8) {
    let r = y + 1.13983 * v;
    let g = y - 0.39465 * u - 0.58060 * v;
    let b = y + 2.03211 * u;
    (clamp_channel(r), clamp_channel(g), clamp_channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_packing() {
        let c = Color::from_argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x12345678);
        assert_eq!(c.channels(), (0x12, 0x34, 0x56, 0x78));
        assert_eq!(c.with_alpha(0xFF).0, 0xFF345678);
    }

    #[test]
    fn test_blend_full_alpha_is_overwrite() {
        let dst = Color::from_argb(40, 10, 20, 30);
        let src = Color::from_rgb(200, 100, 50);
        assert_eq!(blend(dst, src, 255), Color::from_rgb(200, 100, 50));
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let dst = Color::from_argb(40, 10, 20, 30);
        assert_eq!(blend(dst, Color::WHITE, 0), dst);
    }

    #[test]
    fn test_blend_half_alpha() {
        for (s, d) in [(0u8, 255u8), (255, 0), (17, 203), (128, 128), (1, 254)] {
            let src = Color::from_rgb(s, s, s);
            let dst = Color::from_argb(0, d, d, d);
            let out = blend(dst, src, 128);
            let expected = ((s as u32 * 128 + d as u32 * 128) >> 8) as u8;
            assert_eq!(out.red(), expected);
            assert_eq!(out.green(), expected);
            assert_eq!(out.blue(), expected);
            assert_eq!(out.alpha(), 128);
        }
    }

    #[test]
    fn test_blend_alpha_saturates() {
        let dst = Color::from_argb(200, 0, 0, 0);
        assert_eq!(blend(dst, Color::WHITE, 100).alpha(), 255);
    }

    #[test]
    fn test_max_channel_diff() {
        let a = Color::from_argb(255, 10, 20, 30);
        let b = Color::from_argb(250, 12, 40, 29);
        assert_eq!(a.max_channel_diff(b), 20);
        assert!(a.matches(b, 20));
        assert!(!a.matches(b, 19));
    }

    #[test]
    fn test_yuv_round_trip_is_close() {
        for &(r, g, b) in &[(0u8, 0u8, 0u8), (255, 255, 255), (200, 30, 90), (12, 240, 17)] {
            let (y, u, v) = rgb_to_yuv(r, g, b);
            let (r2, g2, b2) = yuv_to_rgb(y, u, v);
            assert!(r.abs_diff(r2) <= 1 && g.abs_diff(g2) <= 1 && b.abs_diff(b2) <= 1);
        }
    }

    #[test]
    fn test_luma_of_white() {
        assert!((Color::WHITE.luma() - 255.0).abs() < 0.01);
        assert_eq!(Color::BLACK.luma(), 0.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::from_argb(0, 0, 100, 200);
        let b = Color::from_argb(255, 255, 0, 0);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, 2.0), b);
    }
}
