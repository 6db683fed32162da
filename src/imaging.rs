use crate::error::ImagingError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// An encoded PNG or JPEG image.
///
/// The original bytes are kept so that converting back to base64 reproduces
/// the input exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn decode(&self) -> Result<DynamicImage, ImagingError> {
        Ok(image::load_from_memory_with_format(&self.bytes, self.format)?)
    }
}

/// Encode an image as PNG or JPEG
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<EncodedImage, ImagingError> {
    check_format(format)?;

    let mut bytes = Vec::new();
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut Cursor::new(&mut bytes), format)?,
        _ => image.write_to(&mut Cursor::new(&mut bytes), format)?,
    }

    Ok(EncodedImage { bytes, format })
}

/// Decode a base64 PNG/JPEG string. A `data:image/...;base64,` prefix is
/// accepted and dropped.
pub fn base64_to_image(encoded: &str) -> Result<EncodedImage, ImagingError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    let bytes = STANDARD.decode(payload.trim())?;
    let format = image::guess_format(&bytes)?;
    check_format(format)?;

    let image = EncodedImage { bytes, format };
    image.decode()?;
    Ok(image)
}

pub fn image_to_base64(image: &EncodedImage) -> String {
    STANDARD.encode(&image.bytes)
}

fn check_format(format: ImageFormat) -> Result<(), ImagingError> {
    match format {
        ImageFormat::Png | ImageFormat::Jpeg => Ok(()),
        other => Err(ImagingError::UnsupportedFormat(format!("{:?}", other))),
    }
}
