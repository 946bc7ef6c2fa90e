use crate::config::PreprocessConfig;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::filter;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Edge-preserving smoothing over a `diameter`-wide window.
/// An empty image is returned as is.
pub fn bilateral_filter(img: &GrayImage, diameter: u32, sigma_color: f32, sigma_space: f32) -> GrayImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    filter::bilateral_filter(img, diameter, sigma_color, sigma_space)
}

/// Grayscale conversion followed by edge-preserving smoothing
pub fn preprocess(img: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    bilateral_filter(
        &to_grayscale(img),
        config.bilateral_diameter,
        config.bilateral_sigma_color,
        config.bilateral_sigma_space,
    )
}

/// Detect edges using Canny edge detector.
/// `canny` smooths with a sigma 1.4 Gaussian before the gradient pass.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Binarize with a fixed cutoff: pixels above `threshold` become 255.
/// With `inverted` set, pixels above the cutoff become 0 instead.
pub fn binarize(img: &GrayImage, threshold: u8, inverted: bool) -> GrayImage {
    let (on, off) = if inverted { (0u8, 255u8) } else { (255u8, 0u8) };
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([if img.get_pixel(x, y)[0] > threshold { on } else { off }])
    })
}

/// Inverted Otsu binarization: dark strokes on a light plate become
/// white foreground.
pub fn binarize_otsu_inverted(img: &GrayImage) -> GrayImage {
    binarize(img, otsu_level(img), true)
}

/// Zero the outermost one-pixel frame.
///
/// Contour tracing treats the image frame as background, so a thin ring
/// left at the border by rectification never encloses the characters.
pub fn clear_border(img: &mut GrayImage) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    for x in 0..width {
        img.put_pixel(x, 0, Luma([0]));
        img.put_pixel(x, height - 1, Luma([0]));
    }
    for y in 0..height {
        img.put_pixel(0, y, Luma([0]));
        img.put_pixel(width - 1, y, Luma([0]));
    }
}

/// Crop to the bounding box of non-zero pixels.
/// An all-zero image is returned unchanged.
pub fn crop_to_content(img: &GrayImage) -> GrayImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        });
    }

    match bounds {
        Some((min_x, min_y, max_x, max_y)) => {
            image::imageops::crop_imm(img, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image()
        }
        None => img.clone(),
    }
}

/// Per destination index: the source indices it covers and their weights
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f32)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = (start + ratio).min(src_len as f64);
            let mut weights = Vec::new();
            let mut s = start.floor() as usize;
            while (s as f64) < end && s < src_len as usize {
                let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                if overlap > 1e-9 {
                    weights.push((s, (overlap / ratio) as f32));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

/// Resize by area averaging: every destination pixel is the mean of the
/// source area it covers.
pub fn resize_area(img: &GrayImage, width: u32, height: u32) -> GrayImage {
    let (src_w, src_h) = img.dimensions();
    if (src_w, src_h) == (width, height) {
        return img.clone();
    }
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let x_weights = area_weights(src_w, width);
    let y_weights = area_weights(src_h, height);
    let src = img.as_raw();

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0.0f32;
        for &(sy, wy) in &y_weights[y as usize] {
            let row = sy * src_w as usize;
            for &(sx, wx) in &x_weights[x as usize] {
                acc += src[row + sx] as f32 * wx * wy;
            }
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}
