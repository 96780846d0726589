//! Bit-packed 1-bit-per-pixel stencil.
//!
//! Bit `i = y * width + x` lives in byte `i >> 3` at bit `i & 7` (LSB first).
//! A set bit is "on" (opaque), a clear bit is "off" (hole). The serialized
//! form is big-endian `i32 width`, `i32 height`, `i32 byte_count`, followed by
//! the packed bytes.

use std::io::{Read, Write};

use crate::error::{RasterError, Result};
use crate::surface::PixelBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPlane {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    (width as usize * height as usize).div_ceil(8)
}

impl MaskPlane {
    /// All-off mask
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidArgument(format!(
                "mask dimensions must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            bits: vec![0; byte_len(width, height)],
        })
    }

    /// Mask whose bits are on wherever `buffer` alpha is at least `threshold`
    pub fn from_alpha(buffer: &PixelBuffer, threshold: u8) -> Self {
        let (width, height) = buffer.dimensions();
        let mut bits = vec![0u8; byte_len(width, height)];
        for (i, &p) in buffer.as_argb().iter().enumerate() {
            if (p >> 24) as u8 >= threshold {
                bits[i >> 3] |= 1 << (i & 7);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn bit_index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn test(&self, i: usize) -> bool {
        self.bits[i >> 3] & (1 << (i & 7)) != 0
    }

    #[inline]
    fn raise(&mut self, i: usize) {
        self.bits[i >> 3] |= 1 << (i & 7);
    }

    /// Read a bit
    pub fn get(&self, x: i32, y: i32) -> Result<bool> {
        if !self.in_bounds(x, y) {
            return Err(RasterError::OutOfBounds { x, y });
        }
        Ok(self.test(self.bit_index(x, y)))
    }

    /// Read a bit with bounds already verified by the caller
    #[inline]
    pub(crate) fn is_on(&self, x: i32, y: i32) -> bool {
        self.test(self.bit_index(x, y))
    }

    /// Write a bit
    pub fn set(&mut self, x: i32, y: i32, on: bool) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(RasterError::OutOfBounds { x, y });
        }
        let i = self.bit_index(x, y);
        if on {
            self.raise(i);
        } else {
            self.bits[i >> 3] &= !(1 << (i & 7));
        }
        Ok(())
    }

    /// Flood the 4-connected "off" region containing `(x, y)` to "on".
    ///
    /// Growth stops at "on" pixels, so the region is filled up to its
    /// boundary. An "on" seed is a no-op. Uses an explicit stack so the
    /// depth is bounded by the heap, not the call stack.
    pub fn fill(&mut self, x: i32, y: i32) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(RasterError::OutOfBounds { x, y });
        }
        let seed = self.bit_index(x, y);
        if self.test(seed) {
            return Ok(());
        }

        let w = self.width as i32;
        let h = self.height as i32;
        let mut stack = vec![(x, y)];
        self.raise(seed);
        let mut filled = 0usize;

        while let Some((cx, cy)) = stack.pop() {
            filled += 1;
            for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let i = self.bit_index(nx, ny);
                if !self.test(i) {
                    self.raise(i);
                    stack.push((nx, ny));
                }
            }
        }
        log::trace!("mask fill from ({}, {}) set {} bits", x, y, filled);
        Ok(())
    }

    /// Number of "on" bits
    pub fn count_on(&self) -> usize {
        let total = self.width as usize * self.height as usize;
        let full = total / 8;
        let mut count: usize = self.bits[..full].iter().map(|b| b.count_ones() as usize).sum();
        for i in full * 8..total {
            if self.test(i) {
                count += 1;
            }
        }
        count
    }

    /// Packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Write `i32 width, i32 height, i32 len, [u8; len]`, all big-endian
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&(self.width as i32).to_be_bytes())?;
        writer.write_all(&(self.height as i32).to_be_bytes())?;
        writer.write_all(&(self.bits.len() as i32).to_be_bytes())?;
        writer.write_all(&self.bits)?;
        Ok(())
    }

    /// Read the format produced by `write_to`
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut word = [0u8; 4];
        let mut next_i32 = |reader: &mut R| -> Result<i32> {
            reader.read_exact(&mut word)?;
            Ok(i32::from_be_bytes(word))
        };
        let width = next_i32(&mut reader)?;
        let height = next_i32(&mut reader)?;
        let len = next_i32(&mut reader)?;
        if width <= 0 || height <= 0 {
            return Err(RasterError::Decode(format!(
                "mask dimensions {}x{} are not positive",
                width, height
            )));
        }
        let expected = byte_len(width as u32, height as u32);
        if len < 0 || len as usize != expected {
            return Err(RasterError::Decode(format!(
                "mask of {}x{} needs {} bytes, stream declares {}",
                width, height, expected, len
            )));
        }
        // grow with the data actually present, not the declared length
        let mut bits = Vec::new();
        reader.take(expected as u64).read_to_end(&mut bits)?;
        if bits.len() != expected {
            return Err(RasterError::Decode(format!(
                "mask payload truncated: {} of {} bytes",
                bits.len(),
                expected
            )));
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            bits,
        })
    }

    /// Serialize into a fresh byte vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.bits.len());
        out.extend_from_slice(&(self.width as i32).to_be_bytes());
        out.extend_from_slice(&(self.height as i32).to_be_bytes());
        out.extend_from_slice(&(self.bits.len() as i32).to_be_bytes());
        out.extend_from_slice(&self.bits);
        out
    }
}
