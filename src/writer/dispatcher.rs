//! Item dispatch: turns each [`Item`] into drawing calls on a [`Canvas`].

use super::barcode::{BarcodeGenerator, QrCodeOptions};
use super::image_handler::ImageData;
use super::table_renderer::{draw_grid, draw_table, TableLayout};
use super::Canvas;
use crate::error::Result;
use crate::items::Item;

/// Settings shared by all items drawn in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOptions {
    /// Quiet zone around QR symbols, in modules
    pub qr_quiet_zone: u32,
}

/// Draw `items` in order. The first failing item aborts the pass.
pub fn draw_items<C: Canvas + ?Sized>(
    canvas: &mut C,
    items: &[Item],
    options: &DrawOptions,
) -> Result<()> {
    for item in items {
        draw_item(canvas, item, options)?;
    }
    Ok(())
}

/// Draw a single item.
pub fn draw_item<C: Canvas + ?Sized>(canvas: &mut C, item: &Item, options: &DrawOptions) -> Result<()> {
    match item {
        Item::Text {
            left,
            top,
            size,
            text,
        } => canvas.draw_text(*left, *top, *size as f32, text),
        Item::BarCode {
            left,
            top,
            width,
            height,
            text,
        } => {
            let raster = BarcodeGenerator::generate_code128(text, *width, *height)?;
            let image = ImageData::from_gray(&raster)?;
            canvas.draw_image(*left, *top, *width as f32, *height as f32, &image)
        },
        Item::QrCode {
            left,
            top,
            size,
            text,
        } => {
            let options = QrCodeOptions::new()
                .size(*size)
                .quiet_zone(options.qr_quiet_zone);
            let raster = BarcodeGenerator::generate_qr(text, &options)?;
            let image = ImageData::from_gray(&raster)?;
            canvas.draw_image(*left, *top, *size as f32, *size as f32, &image)
        },
        Item::Line {
            left,
            top,
            width,
            height,
        } => canvas.draw_line(*left, *top, left + width, top + height),
        Item::Grid {
            left,
            top,
            width,
            height,
            row,
            column,
        } => draw_grid(canvas, *left, *top, *width as f32, *height as f32, *row, *column),
        Item::Table {
            left,
            top,
            height,
            columns,
            data,
        } => draw_table(canvas, &TableLayout::new(*left, *top, *height).compute(columns, data)),
    }
}
