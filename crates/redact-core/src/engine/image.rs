//! Watermark image decoding and embedding

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, ObjectId, Stream};

use crate::error::EngineError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
        }
    }
}

/// Decoded 8-bit image with its alpha channel split out.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub samples: Vec<u8>,
    /// One byte per pixel; `None` when the image is fully opaque.
    pub alpha: Option<Vec<u8>>,
}

impl WatermarkImage {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let bytes = std::fs::read(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::decode(&bytes, &path.display().to_string())
    }

    /// Decode PNG bytes. `label` names the image in errors.
    pub fn decode(bytes: &[u8], label: &str) -> Result<Self, EngineError> {
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(EngineError::UnsupportedImage(label.to_string()));
        }

        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| EngineError::InvalidImage(format!("{}: {}", label, e)))?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| EngineError::InvalidImage(format!("{}: {}", label, e)))?;
        buf.truncate(info.buffer_size());

        let (color_space, samples, alpha) = match info.color_type {
            png::ColorType::Grayscale => (ColorSpace::Gray, buf, None),
            png::ColorType::Rgb => (ColorSpace::Rgb, buf, None),
            png::ColorType::GrayscaleAlpha => {
                let (samples, alpha) = split_alpha(&buf, 2);
                (ColorSpace::Gray, samples, Some(alpha))
            }
            png::ColorType::Rgba => {
                let (samples, alpha) = split_alpha(&buf, 4);
                (ColorSpace::Rgb, samples, Some(alpha))
            }
            png::ColorType::Indexed => {
                return Err(EngineError::InvalidImage(format!(
                    "{}: palette was not expanded",
                    label
                )))
            }
        };

        // Opaque alpha channels add nothing but an extra stream.
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != u8::MAX));

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            samples,
            alpha,
        })
    }

    /// Add the image (and its soft mask) to `doc` as an image XObject.
    pub(super) fn embed(&self, doc: &mut Document) -> Result<ObjectId, EngineError> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space.pdf_name(),
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if let Some(alpha) = &self.alpha {
            let mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => self.width as i64,
                    "Height" => self.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(alpha)?,
            )
            .with_compression(false);
            let mask_id = doc.add_object(mask);
            dict.set("SMask", mask_id);
        }

        let image = Stream::new(dict, deflate(&self.samples)?).with_compression(false);
        Ok(doc.add_object(image))
    }
}

/// Split interleaved samples into colour samples and an alpha channel.
fn split_alpha(buf: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = buf.len() / channels;
    let mut samples = Vec::with_capacity(pixels * (channels - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in buf.chunks_exact(channels) {
        samples.extend_from_slice(&pixel[..channels - 1]);
        alpha.push(pixel[channels - 1]);
    }
    (samples, alpha)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| EngineError::OperationError(format!("image compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::create_test_png;

    fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        bytes
    }

    #[test]
    fn test_rgba_splits_alpha_channel() {
        let png = create_test_png(3, 2, [10, 20, 30, 128]);
        let image = WatermarkImage::decode(&png, "logo.png").unwrap();

        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.color_space, ColorSpace::Rgb);
        assert_eq!(image.samples.len(), 3 * 2 * 3);
        assert_eq!(&image.samples[..3], &[10, 20, 30]);
        assert_eq!(image.alpha, Some(vec![128; 6]));
    }

    #[test]
    fn test_opaque_alpha_is_dropped() {
        let png = create_test_png(2, 2, [255, 255, 255, 255]);
        let image = WatermarkImage::decode(&png, "logo.png").unwrap();
        assert!(image.alpha.is_none());
    }

    #[test]
    fn test_grayscale_image() {
        let png = encode_png(2, 1, png::ColorType::Grayscale, &[0, 255]);
        let image = WatermarkImage::decode(&png, "gray.png").unwrap();
        assert_eq!(image.color_space, ColorSpace::Gray);
        assert_eq!(image.samples, vec![0, 255]);
        assert!(image.alpha.is_none());
    }

    #[test]
    fn test_non_png_is_unsupported() {
        let err = WatermarkImage::decode(b"\xFF\xD8\xFF\xE0 jpeg data", "logo.jpg").unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedImage(_)));
    }

    #[test]
    fn test_truncated_png_is_invalid() {
        let png = create_test_png(4, 4, [0, 0, 0, 255]);
        let err = WatermarkImage::decode(&png[..20], "logo.png").unwrap_err();
        assert!(matches!(err, EngineError::InvalidImage(_)));
    }

    #[test]
    fn test_embed_adds_image_and_soft_mask() {
        let png = create_test_png(4, 4, [0, 0, 0, 100]);
        let image = WatermarkImage::decode(&png, "logo.png").unwrap();

        let mut doc = Document::with_version("1.7");
        let id = image.embed(&mut doc).unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 4);
        let mask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        assert!(doc.get_object(mask_id).unwrap().as_stream().is_ok());
    }
}
