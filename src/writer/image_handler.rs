//! Raster images as PDF Image XObjects.
//!
//! Symbol rasters are JPEG encoded once and embedded as-is under the
//! `DCTDecode` filter (ISO 32000-1:2008, Section 8.9).

use crate::object::{dict, Dict, Object};

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
    /// CMYK color (4 components per pixel)
    DeviceCMYK,
}

impl ColorSpace {
    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// JPEG image data ready for PDF embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (usually 8)
    pub bits_per_component: u8,
    /// Color space
    pub color_space: ColorSpace,
    /// Encoded JPEG bytes
    pub data: Vec<u8>,
}

impl ImageData {
    /// Wrap JPEG bytes for pass-through embedding.
    ///
    /// Dimensions, precision and color space come from the first
    /// start-of-frame segment; the data itself is not decoded.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let frame = JpegFrame::scan(&data)?;
        Ok(Self {
            width: frame.width,
            height: frame.height,
            bits_per_component: frame.precision,
            color_space: frame.color_space(),
            data,
        })
    }

    /// Encode a grayscale raster as a quality-100 JPEG.
    pub fn from_gray(img: &image::GrayImage) -> Result<Self, ImageError> {
        use image::codecs::jpeg::JpegEncoder;

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, 100)
            .encode(img.as_raw(), img.width(), img.height(), image::ColorType::L8)
            .map_err(|e| ImageError::EncodeError(e.to_string()))?;

        Self::from_jpeg(buf)
    }

    /// Image XObject dictionary.
    pub fn build_xobject_dict(&self) -> Dict {
        dict([
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Image")),
            ("Width", Object::Integer(self.width as i64)),
            ("Height", Object::Integer(self.height as i64)),
            ("ColorSpace", Object::name(self.color_space.pdf_name())),
            ("BitsPerComponent", Object::Integer(self.bits_per_component as i64)),
            ("Filter", Object::name("DCTDecode")),
        ])
    }

    /// Image XObject stream.
    pub fn to_xobject(&self) -> Object {
        Object::stream(self.build_xobject_dict(), self.data.clone())
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Failed to encode the raster
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Fields of a JPEG start-of-frame segment.
struct JpegFrame {
    precision: u8,
    height: u32,
    width: u32,
    components: u8,
}

impl JpegFrame {
    /// Walk marker segments from SOI up to the first SOFn.
    fn scan(data: &[u8]) -> Result<Self, ImageError> {
        if !data.starts_with(&[0xFF, 0xD8]) {
            return Err(ImageError::InvalidData("Not a valid JPEG".to_string()));
        }

        let mut pos = 2;
        while let Some(&[0xFF, marker]) = data.get(pos..pos + 2) {
            pos += 2;
            match marker {
                // Fill bytes and standalone markers carry no length
                0xFF | 0x00 | 0x01 | 0xD0..=0xD7 => {
                    if marker == 0xFF {
                        pos -= 1;
                    }
                    continue;
                },
                0xD9 | 0xDA => break,
                // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
                0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                    let segment = data
                        .get(pos + 2..pos + 8)
                        .ok_or_else(|| ImageError::InvalidData("Truncated JPEG header".to_string()))?;
                    return Ok(Self {
                        precision: segment[0],
                        height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                        width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                        components: segment[5],
                    });
                },
                _ => {
                    let length = match data.get(pos..pos + 2) {
                        Some(&[hi, lo]) => u16::from_be_bytes([hi, lo]) as usize,
                        _ => break,
                    };
                    pos += length;
                },
            }
        }

        Err(ImageError::InvalidData("Could not find JPEG dimensions".to_string()))
    }

    fn color_space(&self) -> ColorSpace {
        match self.components {
            1 => ColorSpace::DeviceGray,
            4 => ColorSpace::DeviceCMYK,
            _ => ColorSpace::DeviceRGB,
        }
    }
}
