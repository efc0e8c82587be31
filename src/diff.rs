//! Thresholded absolute difference between two color images.
//!
//! This is a raw per-channel comparison, not a perceptual one: a difference
//! in a single channel is enough to light that channel up in the output.

use crate::error::{Result, ServiceError};
use anyhow::anyhow;
use image::RgbImage;

/// Binary threshold applied to a difference image. Channel values strictly
/// greater than the threshold become 255, everything else becomes 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Threshold(pub u8);

impl TryFrom<i64> for Threshold {
    type Error = ServiceError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map(Threshold)
            .map_err(|_| ServiceError::InvalidThreshold(value))
    }
}

impl TryFrom<Option<i64>> for Threshold {
    type Error = ServiceError;

    fn try_from(value: Option<i64>) -> Result<Self> {
        value.map_or(Ok(Threshold::default()), Threshold::try_from)
    }
}

/// Per-channel `|a - b|`. Fails before touching any pixel when the two
/// images differ in size.
pub fn absdiff(a: &RgbImage, b: &RgbImage) -> Result<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(ServiceError::ShapeMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    let (width, height) = a.dimensions();
    let raw = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x.abs_diff(y))
        .collect::<Vec<u8>>();

    RgbImage::from_raw(width, height, raw)
        .ok_or_else(|| anyhow!("difference buffer does not match {width}x{height}").into())
}

/// Binarize every channel of `image` in place
pub fn threshold_binary(image: &mut RgbImage, threshold: Threshold) {
    for channel in image.iter_mut() {
        *channel = if *channel > threshold.0 { u8::MAX } else { 0 };
    }
}

/// Difference `a` and `b`, then binarize the result
pub fn image_diff(a: &RgbImage, b: &RgbImage, threshold: Threshold) -> Result<RgbImage> {
    let mut diff = absdiff(a, b)?;
    threshold_binary(&mut diff, threshold);
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn noise(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) % 200;
            Rgb([v as u8, (v + 20) as u8, (v + 40) as u8])
        })
    }

    fn offset(image: &RgbImage, d: u8) -> RgbImage {
        let mut out = image.clone();
        out.iter_mut().for_each(|c| *c += d);
        out
    }

    #[test]
    fn identical_images_are_black_for_any_threshold() {
        let image = noise(16, 9);
        for t in [0, 1, 127, 254, 255] {
            let diff = image_diff(&image, &image, Threshold(t)).unwrap();
            assert!(diff.iter().all(|&c| c == 0), "threshold {t}");
        }
    }

    #[test]
    fn uniform_offset_is_compared_strictly() {
        let a = noise(10, 10);
        let b = offset(&a, 12);

        let above = image_diff(&a, &b, Threshold(11)).unwrap();
        assert!(above.iter().all(|&c| c == 255));

        let equal = image_diff(&a, &b, Threshold(12)).unwrap();
        assert!(equal.iter().all(|&c| c == 0));

        // argument order does not matter
        let swapped = image_diff(&b, &a, Threshold(11)).unwrap();
        assert_eq!(swapped, above);
    }

    #[test]
    fn channels_are_thresholded_independently() {
        let a = RgbImage::from_pixel(1, 1, Rgb([10, 10, 10]));
        let b = RgbImage::from_pixel(1, 1, Rgb([10, 50, 13]));
        let diff = image_diff(&a, &b, Threshold(5)).unwrap();
        assert_eq!(diff.get_pixel(0, 0), &Rgb([0, 255, 0]));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = absdiff(&noise(4, 4), &noise(4, 5)).unwrap_err();
        match err {
            ServiceError::ShapeMismatch { left, right } => {
                assert_eq!(left, (4, 4));
                assert_eq!(right, (4, 5));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn threshold_defaults_to_zero_and_rejects_out_of_range() {
        assert_eq!(Threshold::try_from(None).unwrap(), Threshold(0));
        assert_eq!(Threshold::try_from(Some(255)).unwrap(), Threshold(255));
        assert!(matches!(
            Threshold::try_from(Some(256)),
            Err(ServiceError::InvalidThreshold(256))
        ));
        assert!(matches!(
            Threshold::try_from(-1),
            Err(ServiceError::InvalidThreshold(-1))
        ));
    }
}
