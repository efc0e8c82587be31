//! Conversion between images and the base64 / data-URI strings that carry
//! them across the JSON boundary

use crate::error::{Result, ServiceError};
use base64::{engine::general_purpose, Engine as _};
use image::{GrayImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;
use tracing::trace;

/// Prefix attached to every PNG this service hands back
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Strip an optional `data:<mime>;base64,` header, leaving the payload
pub fn strip_data_uri(input: &str) -> &str {
    match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    }
}

/// Decode a base64 payload. Line breaks and other whitespace that clients
/// sometimes wrap long strings with are ignored.
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let payload = strip_data_uri(input);
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}

/// Decode a base64 (optionally data-URI prefixed) bitmap into 3-channel
/// 8-bit color. Grayscale is expanded and alpha is dropped.
pub fn decode_data_uri(input: &str) -> Result<RgbImage> {
    let bytes = decode_base64(input)?;
    if bytes.is_empty() {
        return Err(ServiceError::decode("image payload is empty"));
    }
    let image = image::load_from_memory(&bytes)?;
    trace!(
        "decoded {}x{} {:?} image",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image.to_rgb8())
}

/// PNG-encode a color image and wrap it as a data URI
pub fn encode_data_uri(image: &RgbImage) -> Result<String> {
    let mut png: Vec<u8> = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(format!(
        "{PNG_DATA_URI_PREFIX}{}",
        general_purpose::STANDARD.encode(png)
    ))
}

/// PNG-encode a single-channel mask
pub fn encode_png(mask: &GrayImage) -> Result<Vec<u8>> {
    let mut png: Vec<u8> = Vec::new();
    mask.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn data_uri_round_trip_is_lossless() {
        let image = gradient(37, 21);
        let uri = encode_data_uri(&image).unwrap();
        assert!(uri.starts_with(PNG_DATA_URI_PREFIX));

        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.dimensions(), image.dimensions());
        assert_eq!(decoded.as_raw(), image.as_raw());
    }

    #[test]
    fn bare_base64_is_accepted() {
        let image = gradient(4, 4);
        let uri = encode_data_uri(&image).unwrap();
        let bare = strip_data_uri(&uri);
        assert!(!bare.starts_with("data:"));
        assert_eq!(decode_data_uri(bare).unwrap().as_raw(), image.as_raw());
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let image = gradient(8, 3);
        let uri = encode_data_uri(&image).unwrap();
        let bare = strip_data_uri(&uri);
        let wrapped: String = bare
            .as_bytes()
            .chunks(16)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(decode_data_uri(&wrapped).unwrap().as_raw(), image.as_raw());
    }

    #[test]
    fn grayscale_input_is_expanded_to_color() {
        let gray = GrayImage::from_pixel(3, 2, image::Luma([90]));
        let png = encode_png(&gray).unwrap();
        let b64 = general_purpose::STANDARD.encode(png);

        let decoded = decode_data_uri(&b64).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert!(decoded.pixels().all(|p| p.0 == [90, 90, 90]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_data_uri("data:image/png;base64,@@@@").unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));

        // valid base64, but not an image
        let not_png = general_purpose::STANDARD.encode(b"hello world");
        let err = decode_data_uri(&not_png).unwrap_err();
        assert!(err.is_client_error(), "{err:?}");
    }
}
