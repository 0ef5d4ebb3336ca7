use std::io::Cursor;

use crate::foundation::error::{QuoteError, QuoteResult};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

/// Decode image bytes and stretch them to exactly `width`×`height` (no aspect preservation).
pub fn decode_image_stretched(bytes: &[u8], width: u32, height: u32) -> QuoteResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| QuoteError::avatar_fetch(format!("decode image: {e}")))?;
    if dyn_img.width() == 0 || dyn_img.height() == 0 {
        return Err(QuoteError::avatar_fetch("decoded image has zero size"));
    }
    let rgba = image::imageops::resize(
        &dyn_img.to_rgba8(),
        width,
        height,
        image::imageops::FilterType::Triangle,
    );

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul,
    })
}

/// Encode premultiplied RGBA8 pixels as a straight-alpha PNG.
pub fn encode_png_from_premul(bytes_premul: &[u8], width: u32, height: u32) -> QuoteResult<Vec<u8>> {
    let mut straight = bytes_premul.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(width, height, straight)
        .ok_or_else(|| QuoteError::encoding("pixel buffer length does not match dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| QuoteError::encoding(format!("encode png: {e}")))?;
    Ok(buf)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        let unpremul = |c: u8| -> u8 { ((c as u16 * 255 + a / 2) / a).min(255) as u8 };
        px[0] = unpremul(px[0]);
        px[1] = unpremul(px[1]);
        px[2] = unpremul(px[2]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
