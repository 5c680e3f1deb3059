use image::{ColorType, DynamicImage, ImageEncoder};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::RenderError;

pub fn load_image(path: &Path) -> Result<DynamicImage, RenderError> {
    let bytes = fs::read(path).map_err(|e| RenderError::from_io(path.to_path_buf(), e))?;
    image::load_from_memory(&bytes).map_err(|e| RenderError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    let (w, h) = (img.width(), img.height());
    let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut cursor);
    let img_rgba = img.to_rgba8();
    encoder
        .write_image(&img_rgba, w, h, ColorType::Rgba8.into())
        .map_err(RenderError::Encode)?;
    Ok(cursor.into_inner())
}
