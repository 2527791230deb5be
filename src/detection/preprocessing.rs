use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Downscale so the longer side equals `working_size`.
///
/// Returns the resized image and the factor that maps original coordinates
/// onto it.
pub fn to_working_size(img: &DynamicImage, working_size: u32) -> (DynamicImage, f32) {
    let (w, h) = img.dimensions();
    let scale = working_size as f32 / w.max(h) as f32;
    let sw = ((w as f32 * scale) as u32).max(1);
    let sh = ((h as f32 * scale) as u32).max(1);
    (img.resize_exact(sw, sh, FilterType::Triangle), scale)
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
