use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Neighbourhood size of the adaptive threshold (pixels, odd).
pub const BLOCK_SIZE: u32 = 11;
/// Subtracted from the local weighted mean before comparing.
pub const OFFSET: i16 = 2;
/// Longest side handed to the OCR engine.
const MAX_OCR_SIDE: u32 = 2800;
/// Fractional bits carried through the Gaussian blur before rounding.
const MEAN_FRACTION_BITS: u32 = 8;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage, PreprocessError> {
    Ok(image::open(path)?)
}

/// Decode raw image bytes (JPEG / PNG / …).
pub fn load_image_from_bytes(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(data)?)
}

/// Grayscale + adaptive Gaussian threshold. Output pixels are 0 or 255 and
/// the dimensions are those of the input.
pub fn binarize(img: &DynamicImage) -> GrayImage {
    adaptive_threshold(&img.to_luma8(), BLOCK_SIZE, OFFSET)
}

/// Decode, binarize and re-encode as PNG (for display next to the original).
pub fn binarize_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = load_image_from_bytes(data)?;
    encode_as_png(&DynamicImage::ImageLuma8(binarize(&img)))
}

pub fn encode_as_png(img: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Scale the image down, keeping its aspect ratio, when either side exceeds
/// what the OCR engine is given. Smaller images are passed through untouched.
pub fn fit_for_ocr(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    if img.width() > MAX_OCR_SIDE || img.height() > MAX_OCR_SIDE {
        Cow::Owned(img.resize(MAX_OCR_SIDE, MAX_OCR_SIDE, image::imageops::FilterType::Lanczos3))
    } else {
        Cow::Borrowed(img)
    }
}

/// Weights of a normalised 1-D Gaussian of `size` taps.
///
/// Sigma follows the usual derivation from the aperture:
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian-weighted mean of each pixel's `block_size`×`block_size`
/// neighbourhood, rounded to the nearest 8-bit value. Borders replicate the
/// edge pixels.
pub fn local_mean(gray: &GrayImage, block_size: u32) -> GrayImage {
    // Blur in 8.8 fixed point so the final rounding sees the fraction.
    let scaled: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([u16::from(gray.get_pixel(x, y)[0]) << MEAN_FRACTION_BITS])
        });
    let blurred = separable_filter_equal(&scaled, &gaussian_kernel(block_size));

    let half = 1u32 << (MEAN_FRACTION_BITS - 1);
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let fixed = u32::from(blurred.get_pixel(x, y)[0]);
        Luma([((fixed + half) >> MEAN_FRACTION_BITS).min(255) as u8])
    })
}

/// A pixel turns white when it is brighter than its [`local_mean`] minus
/// `offset`; black otherwise.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    let mean = local_mean(gray, block_size);

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let src = gray.get_pixel(x, y)[0] as i16;
        let local = mean.get_pixel(x, y)[0] as i16;
        if src > local - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
