//! Boundary to image codecs.
//!
//! Decoders turn a byte stream into raw ARGB pixels; the engine wraps the
//! result in a [`PixelBuffer`]. Decoder and I/O errors reach the caller
//! unchanged.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::ImageFormat;

use crate::color::Color;
use crate::error::Result;
use crate::surface::{PixelBuffer, Surface};

/// Output of a decoder: row-major ARGB pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

pub trait ImageDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<DecodedImage>;
}

impl PixelBuffer {
    /// Decode a stream into a new buffer
    pub fn decode(decoder: &dyn ImageDecoder, reader: &mut dyn Read) -> Result<Self> {
        let image = decoder.decode(reader)?;
        PixelBuffer::from_argb(image.width, image.height, image.pixels)
    }
}

impl Surface {
    /// Surface holding the decoded contents of an image file
    pub fn load(decoder: &dyn ImageDecoder, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let buffer = PixelBuffer::decode(decoder, &mut reader)?;
        log::debug!(
            "loaded {}x{} image from {}",
            buffer.width(),
            buffer.height(),
            path.display()
        );
        Ok(Surface::from_buffer(buffer))
    }
}

// ============================================================================
// Format decoder
// ============================================================================

/// Decoder backed by the `image` crate. The format is sniffed from the
/// leading bytes unless one is fixed with [`FormatDecoder::with_format`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatDecoder {
    format: Option<ImageFormat>,
}

impl FormatDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: ImageFormat) -> Self {
        Self { format: Some(format) }
    }
}

impl ImageDecoder for FormatDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<DecodedImage> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let image = match self.format {
            Some(format) => image::load_from_memory_with_format(&bytes, format)?,
            None => image::load_from_memory(&bytes)?,
        };

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                Color::from_argb(a, r, g, b).0
            })
            .collect();
        Ok(DecodedImage {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RasterError;

    struct Failing;

    impl ImageDecoder for Failing {
        fn decode(&self, _reader: &mut dyn Read) -> Result<DecodedImage> {
            Err(RasterError::Decode("unsupported format".to_string()))
        }
    }

    struct Mismatched;

    impl ImageDecoder for Mismatched {
        fn decode(&self, _reader: &mut dyn Read) -> Result<DecodedImage> {
            Ok(DecodedImage {
                width: 2,
                height: 2,
                pixels: vec![0; 3],
            })
        }
    }

    #[test]
    fn test_ppm_decode() {
        let mut data = b"P6\n# tiny\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let buf = PixelBuffer::decode(&FormatDecoder::new(), &mut data.as_slice()).unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Color::RED);
        assert_eq!(buf.get_pixel(1, 0).unwrap(), Color::BLUE);
    }

    #[test]
    fn test_png_keeps_alpha() {
        let rgba = image::RgbaImage::from_raw(2, 1, vec![10, 20, 30, 128, 0, 0, 0, 0]).unwrap();
        let mut png = std::io::Cursor::new(Vec::new());
        rgba.write_to(&mut png, ImageFormat::Png).unwrap();

        let decoder = FormatDecoder::with_format(ImageFormat::Png);
        let buf = PixelBuffer::decode(&decoder, &mut png.get_ref().as_slice()).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Color::from_argb(128, 10, 20, 30));
        assert_eq!(buf.get_pixel(1, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = PixelBuffer::decode(&FormatDecoder::new(), &mut &b"not an image"[..]).unwrap_err();
        assert!(matches!(err, RasterError::Decode(_)));
        let short = PixelBuffer::decode(&FormatDecoder::new(), &mut &b"P6 2 2 255\n\x01\x02"[..]).unwrap_err();
        assert!(matches!(short, RasterError::Decode(_) | RasterError::Io(_)));
        let wrong = FormatDecoder::with_format(ImageFormat::Png);
        let mut ppm = b"P6 1 1 255\n".to_vec();
        ppm.extend_from_slice(&[1, 2, 3]);
        assert!(PixelBuffer::decode(&wrong, &mut ppm.as_slice()).is_err());
    }

    #[test]
    fn test_decoder_errors_pass_through() {
        let err = PixelBuffer::decode(&Failing, &mut &b""[..]).unwrap_err();
        assert_eq!(err.to_string(), "decode error: unsupported format");
        let err = PixelBuffer::decode(&Mismatched, &mut &b""[..]).unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Surface::load(&FormatDecoder::new(), "/nonexistent/rasterlab/image.ppm").err();
        assert!(matches!(err, Some(RasterError::Io(_))));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("rasterlab-load-{}.ppm", std::process::id()));
        let mut data = b"P6 1 1 255\n".to_vec();
        data.extend_from_slice(&[0, 255, 0]);
        std::fs::write(&path, &data).unwrap();
        let surface = Surface::load(&FormatDecoder::new(), &path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(surface.unwrap().get_pixel(0, 0).unwrap(), Color::GREEN);
    }
}
