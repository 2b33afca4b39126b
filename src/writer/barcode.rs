//! Barcode and QR code rasterization.
//!
//! Symbols are encoded with `barcoders` (Code 128) and `qrcode` (QR), then
//! scaled by a whole number of pixels per module into an 8-bit grayscale
//! raster of exactly the requested size. Any leftover pixels become white
//! padding split evenly on both sides.
//!
//! ## Example
//!
//! ```ignore
//! use fastpdf::writer::barcode::{BarcodeGenerator, QrCodeOptions};
//!
//! let bars = BarcodeGenerator::generate_code128("A-1001", 200, 60)?;
//! let qr = BarcodeGenerator::generate_qr("https://example.com", &QrCodeOptions::new().size(96))?;
//! ```

use crate::error::{Error, Result};
use image::{GrayImage, Luma};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Code 128 start characters selecting set A, B or C.
const CODE128_SET_SELECTORS: [char; 3] = ['\u{00C0}', '\u{0181}', '\u{0106}'];

/// QR code error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorCorrection {
    /// Low (~7% correction capability)
    Low,
    /// Medium (~15% correction capability)
    #[default]
    Medium,
    /// Quartile (~25% correction capability)
    Quartile,
    /// High (~30% correction capability)
    High,
}

/// Options for QR code generation.
#[derive(Debug, Clone)]
pub struct QrCodeOptions {
    /// Size of the QR code in pixels (width = height)
    pub size: u32,
    /// Error correction level
    pub error_correction: QrErrorCorrection,
    /// Quiet zone (border) in modules
    pub quiet_zone: u32,
}

impl Default for QrCodeOptions {
    fn default() -> Self {
        Self {
            size: 200,
            error_correction: QrErrorCorrection::Medium,
            quiet_zone: 0,
        }
    }
}

impl QrCodeOptions {
    /// Create new QR code options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size in pixels.
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set the error correction level.
    pub fn error_correction(mut self, level: QrErrorCorrection) -> Self {
        self.error_correction = level;
        self
    }

    /// Set the quiet zone (border) in modules.
    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }
}

/// Barcode generator producing grayscale rasters.
pub struct BarcodeGenerator;

impl BarcodeGenerator {
    /// Encode `data` as Code 128 and render it into a `width` x `height` raster.
    ///
    /// Data made only of digits uses the double-density set C (an odd
    /// trailing digit falls back to set B). Anything else uses set B, unless
    /// `data` already starts with a set selector (`\u{00C0}` A, `\u{0181}` B,
    /// `\u{0106}` C). Negative or zero sizes are rejected.
    pub fn generate_code128(data: &str, width: i32, height: i32) -> Result<GrayImage> {
        use barcoders::sym::code128::Code128;

        let modules = Code128::new(with_start_set(data))
            .map_err(|e| symbol_error(format!("Code128 encoding error for {:?}: {}", data, e)))?
            .encode();

        let module_count = modules.len() as u32;
        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if h > 0 && w >= module_count => (w, h),
            _ => {
                return Err(symbol_error(format!(
                    "Code128 of {} modules cannot be scaled to {}x{}",
                    module_count, width, height
                )))
            },
        };

        let scale = width / module_count;
        let padding = (width - module_count * scale) / 2;

        Ok(GrayImage::from_fn(width, height, |x, _| {
            let module = x
                .checked_sub(padding)
                .and_then(|offset| modules.get((offset / scale) as usize));
            shade(module == Some(&1))
        }))
    }

    /// Encode `data` as a QR symbol rendered into a `size` x `size` raster.
    pub fn generate_qr(data: &str, options: &QrCodeOptions) -> Result<GrayImage> {
        use qrcode::{EcLevel, QrCode};

        let ec_level = match options.error_correction {
            QrErrorCorrection::Low => EcLevel::L,
            QrErrorCorrection::Medium => EcLevel::M,
            QrErrorCorrection::Quartile => EcLevel::Q,
            QrErrorCorrection::High => EcLevel::H,
        };

        let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level)
            .map_err(|e| symbol_error(format!("QR code encoding error: {}", e)))?;

        let qr_width = code.width() as u32;
        let too_small = || {
            symbol_error(format!(
                "QR code of {} modules with a quiet zone of {} cannot be scaled to {}x{}",
                qr_width, options.quiet_zone, options.size, options.size
            ))
        };
        let module_count = options
            .quiet_zone
            .checked_mul(2)
            .and_then(|border| border.checked_add(qr_width))
            .ok_or_else(too_small)?;
        let module_size = options.size / module_count;
        if module_size == 0 {
            return Err(too_small());
        }

        let slack = options.size - module_count * module_size;
        let padding = options
            .quiet_zone
            .checked_mul(module_size)
            .and_then(|border| border.checked_add(slack / 2))
            .ok_or_else(too_small)?;

        let colors = code.to_colors();
        let dark = |x: u32, y: u32| -> Option<bool> {
            let column = x.checked_sub(padding)? / module_size;
            let row = y.checked_sub(padding)? / module_size;
            if column >= qr_width || row >= qr_width {
                return None;
            }
            Some(colors[(row * qr_width + column) as usize] == qrcode::Color::Dark)
        };

        Ok(GrayImage::from_fn(options.size, options.size, |x, y| {
            shade(dark(x, y).unwrap_or(false))
        }))
    }
}

/// Prefix `data` with the start character set unless it names one itself.
fn with_start_set(data: &str) -> String {
    if data.starts_with(&CODE128_SET_SELECTORS[..]) {
        return data.to_string();
    }
    if data.len() < 2 || !data.bytes().all(|b| b.is_ascii_digit()) {
        return format!("\u{0181}{}", data);
    }

    // Set C packs digit pairs
    let paired = data.len() - data.len() % 2;
    let (pairs, rest) = data.split_at(paired);
    if rest.is_empty() {
        format!("\u{0106}{}", pairs)
    } else {
        format!("\u{0106}{}\u{0181}{}", pairs, rest)
    }
}

fn shade(dark: bool) -> Luma<u8> {
    if dark {
        DARK
    } else {
        LIGHT
    }
}

fn symbol_error(message: String) -> Error {
    log::warn!("{}", message);
    Error::SymbolEncode(message)
}
