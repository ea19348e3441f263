//! Captcha image cleanup before OCR.
//!
//! Grayscale, sharpen, then a hard threshold at the middle of the 0-255
//! range. The result is a pure black/white image tesseract reads far more
//! reliably than the noisy capture.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

use super::CaptchaError;

/// 3x3 sharpening kernel, row-major, applied with a divisor of [`SHARPEN_SCALE`].
pub const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];

const SHARPEN_SCALE: i32 = 16;

/// Pixels strictly above this become white, the rest black.
pub const THRESHOLD: u8 = 128;

/// Preprocess the image at `input` and write the result to `output` as PNG.
pub fn preprocess(input: &Path, output: &Path) -> Result<PathBuf, CaptchaError> {
    let gray = image::open(input)?.to_luma8();
    preprocess_image(&gray).save(output)?;
    Ok(output.to_path_buf())
}

/// Sharpen and binarise a grayscale image.
pub fn preprocess_image(gray: &GrayImage) -> GrayImage {
    binarize(&sharpen(gray), THRESHOLD)
}

/// Convolve with [`SHARPEN_KERNEL`]. Border pixels are copied unchanged.
fn sharpen(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut out = img.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = 0i32;
            for (i, weight) in SHARPEN_KERNEL.iter().enumerate() {
                let px = x + (i as u32 % 3) - 1;
                let py = y + (i as u32 / 3) - 1;
                acc += weight * i32::from(img.get_pixel(px, py)[0]);
            }
            let value = (acc + SHARPEN_SCALE / 2).div_euclid(SHARPEN_SCALE).clamp(0, 255);
            out.put_pixel(x, y, Luma([value as u8]));
        }
    }
    out
}

fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        *pixel = if pixel[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Black glyph-ish strokes on white, already binarised.
    fn binary_fixture() -> GrayImage {
        GrayImage::from_fn(24, 10, |x, y| {
            if (x / 3 + y / 2) % 3 == 0 || x == 12 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_output_is_pure_black_and_white() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 16 + y) % 256) as u8]));
        let out = preprocess_image(&img);
        assert_eq!(out.dimensions(), (16, 16));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_idempotent_on_binary_image() {
        let img = binary_fixture();
        let once = preprocess_image(&img);
        assert_eq!(once, img);
        assert_eq!(preprocess_image(&once), once);
    }

    #[test]
    fn test_sharpen_keeps_flat_regions() {
        let flat = GrayImage::from_pixel(5, 5, Luma([90]));
        assert_eq!(sharpen(&flat), flat);
    }

    #[test]
    fn test_sharpen_boosts_contrast() {
        let mut img = GrayImage::from_pixel(3, 3, Luma([100]));
        img.put_pixel(1, 1, Luma([120]));
        // (32*120 - 2*8*100) / 16 = 140
        assert_eq!(sharpen(&img).get_pixel(1, 1)[0], 140);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(binarize(&GrayImage::from_pixel(2, 2, Luma([128])), THRESHOLD).get_pixel(0, 0)[0], 0);
        assert_eq!(binarize(&GrayImage::from_pixel(2, 2, Luma([129])), THRESHOLD).get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_preprocess_file_roundtrip() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("captcha.png");
        let output = temp.path().join("captcha_processed.png");
        binary_fixture().save(&input).unwrap();

        let written = preprocess(&input, &output).unwrap();
        assert_eq!(written, output);

        let reloaded = image::open(&output).unwrap().to_luma8();
        assert_eq!(reloaded, binary_fixture());
    }

    #[test]
    fn test_preprocess_missing_input() {
        let temp = TempDir::new().unwrap();
        let result = preprocess(&temp.path().join("nope.png"), &temp.path().join("out.png"));
        assert!(result.is_err());
    }
}
