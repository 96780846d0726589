use serde::{Deserialize, Serialize};

use crate::color::Color;

use super::Canvas;

/// 3x3 smoothing kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// Uniform weights
    #[default]
    Box,
    /// 1-2-1 binomial weights
    Gaussian,
}

impl Kernel {
    /// Row-major weights and their sum
    fn weights(self) -> ([u32; 9], u32) {
        match self {
            Kernel::Box => ([1; 9], 9),
            Kernel::Gaussian => ([1, 2, 1, 2, 4, 2, 1, 2, 1], 16),
        }
    }
}

impl Canvas<'_> {
    /// Convolve every channel (alpha included) inside the clip with `kernel`.
    ///
    /// Reads come from a snapshot with a one-pixel border that repeats the
    /// edge pixels, so results never depend on already-blurred neighbours.
    pub fn blur(&mut self, kernel: Kernel) {
        let clip = self.clip;
        if clip.is_empty() {
            return;
        }
        let (weights, total) = kernel.weights();
        let w = self.buffer.width() as i32;
        let h = self.buffer.height() as i32;
        let bw = (w + 2) as usize;

        // Border row/column indices map back onto the nearest edge pixel
        let mut bordered = Vec::with_capacity(bw * (h + 2) as usize);
        for by in -1..=h {
            let sy = by.clamp(0, h - 1);
            for bx in -1..=w {
                let sx = bx.clamp(0, w - 1);
                bordered.push(self.buffer.at(sx, sy).0);
            }
        }

        for y in clip.y_min..=clip.y_max {
            for x in clip.x_min..=clip.x_max {
                let mut acc = [0u32; 4];
                let mut k = 0;
                for dy in 0..3 {
                    // (x, y) sits at (x + 1, y + 1) in the bordered copy
                    let row = (y + dy) as usize * bw;
                    for dx in 0..3 {
                        let p = bordered[row + (x + dx) as usize];
                        let wgt = weights[k];
                        acc[0] += ((p >> 24) & 0xFF) * wgt;
                        acc[1] += ((p >> 16) & 0xFF) * wgt;
                        acc[2] += ((p >> 8) & 0xFF) * wgt;
                        acc[3] += (p & 0xFF) * wgt;
                        k += 1;
                    }
                }
                let ch = |v: u32| ((v + total / 2) / total) as u8;
                self.buffer.put(x, y, Color::from_argb(ch(acc[0]), ch(acc[1]), ch(acc[2]), ch(acc[3])));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PixelBuffer, Rect};

    #[test]
    fn test_flat_image_unchanged() {
        let c = Color::from_argb(200, 10, 120, 250);
        let mut b = PixelBuffer::filled(4, 3, c).unwrap();
        Canvas::unclipped(&mut b).blur(Kernel::Gaussian);
        assert_eq!(b, PixelBuffer::filled(4, 3, c).unwrap());
        Canvas::unclipped(&mut b).blur(Kernel::Box);
        assert_eq!(b.get_pixel(0, 0).unwrap(), c);
    }

    #[test]
    fn test_box_blur_single_dot() {
        let mut b = PixelBuffer::filled(3, 3, Color::BLACK).unwrap();
        b.set_pixel(1, 1, Color::from_rgb(90, 9, 180)).unwrap();
        Canvas::unclipped(&mut b).blur(Kernel::Box);
        let center = b.get_pixel(1, 1).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (10, 1, 20));
        assert_eq!(b.get_pixel(0, 0).unwrap().red(), 10);
        assert_eq!(center.alpha(), 255);
    }

    #[test]
    fn test_gaussian_weights_center() {
        let mut b = PixelBuffer::filled(3, 3, Color::BLACK).unwrap();
        b.set_pixel(1, 1, Color::from_rgb(160, 0, 0)).unwrap();
        Canvas::unclipped(&mut b).blur(Kernel::Gaussian);
        assert_eq!(b.get_pixel(1, 1).unwrap().red(), 40);
        assert_eq!(b.get_pixel(1, 0).unwrap().red(), 20);
    }

    #[test]
    fn test_edges_replicate() {
        // A bright left column stays bright at the edge instead of fading to black
        let mut b = PixelBuffer::filled(3, 1, Color::BLACK).unwrap();
        b.set_pixel(0, 0, Color::from_rgb(90, 0, 0)).unwrap();
        Canvas::unclipped(&mut b).blur(Kernel::Box);
        assert_eq!(b.get_pixel(0, 0).unwrap().red(), 60);
    }

    #[test]
    fn test_blur_only_inside_clip() {
        let mut b = PixelBuffer::filled(3, 3, Color::BLACK).unwrap();
        b.set_pixel(1, 1, Color::WHITE).unwrap();
        Canvas::new(&mut b, Rect::new(0, 0, 1, 3)).blur(Kernel::Box);
        assert_eq!(b.get_pixel(1, 1).unwrap(), Color::WHITE);
        assert_eq!(b.get_pixel(0, 1).unwrap().red(), 28);
    }

    #[test]
    fn test_kernel_serde_names() {
        let k: Kernel = serde_json::from_str("\"gaussian\"").unwrap();
        assert_eq!(k, Kernel::Gaussian);
        assert_eq!(serde_json::to_string(&Kernel::Box).unwrap(), "\"box\"");
    }
}
