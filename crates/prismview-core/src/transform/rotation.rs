//! Free rotation of pixel buffers.
//!
//! Multiples of 90° are plain pixel moves and keep the input format. Any
//! other angle is resampled into the rotated bounding box:
//! - **Bilinear**: the viewer default while rendering
//! - **Lanczos3**: sharper, six taps per axis
//!
//! # Mapping
//!
//! Each output pixel centre is mapped back into the source around the two
//! image centres. Rows grow downwards, so a positive angle is clockwise:
//! ```text
//! src_x = (dst_x - cx) * cos(-θ) - (dst_y - cy) * sin(-θ) + src_cx
//! src_y = (dst_x - cx) * sin(-θ) + (dst_y - cy) * cos(-θ) + src_cy
//! ```
//!
//! Corners that fall outside the source are transparent, so resampled
//! output is always [`PixelFormat::Rgba8`].

use serde::{Deserialize, Serialize};

use super::with_dynamic;
use crate::decode::{PixelBuffer, PixelFormat};

/// Angles closer than this to a quarter turn are treated as exact.
const ANGLE_EPSILON: f64 = 0.001;

/// Resampling used for angles that are not quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    #[default]
    Bilinear,
    Lanczos3,
}

/// Which lossless path, if any, an angle takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuarterTurn {
    None,
    Cw90,
    Cw180,
    Cw270,
}

fn quarter_turn(angle_degrees: f64) -> Option<QuarterTurn> {
    let a = angle_degrees.rem_euclid(360.0);
    let near = |target: f64| (a - target).abs() < ANGLE_EPSILON;

    if near(0.0) || near(360.0) {
        Some(QuarterTurn::None)
    } else if near(90.0) {
        Some(QuarterTurn::Cw90)
    } else if near(180.0) {
        Some(QuarterTurn::Cw180)
    } else if near(270.0) {
        Some(QuarterTurn::Cw270)
    } else {
        None
    }
}

/// Returns true if rotating by `angle_degrees` leaves the image untouched.
pub fn is_identity_angle(angle_degrees: f64) -> bool {
    quarter_turn(angle_degrees) == Some(QuarterTurn::None)
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// # Arguments
///
/// * `width` - Original image width
/// * `height` - Original image height
/// * `angle_degrees` - Rotation angle in degrees (positive = clockwise)
///
/// # Returns
///
/// Tuple of (new_width, new_height) for the rotated bounding box.
///
/// # Example
///
/// ```
/// use prismview_core::transform::compute_rotated_bounds;
///
/// // 90-degree rotation swaps dimensions
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
/// assert_eq!(compute_rotated_bounds(100, 50, 0.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turn(angle_degrees) {
        Some(QuarterTurn::None) | Some(QuarterTurn::Cw180) => return (width, height),
        Some(QuarterTurn::Cw90) | Some(QuarterTurn::Cw270) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // new_w = |w*cos| + |h*sin|
    // new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate `buffer` clockwise by `angle_degrees` around its center.
///
/// Angles within a small tolerance of 0 (or a full turn) return a copy of the
/// input. Exact multiples of 90° move pixels without resampling and keep the
/// pixel format. Every other angle grows the canvas to the rotated bounds.
///
/// # Example
///
/// ```ignore
/// use prismview_core::transform::{rotate, InterpolationFilter};
///
/// let tilted = rotate(&buffer, 15.0, InterpolationFilter::Bilinear);
/// ```
pub fn rotate(buffer: &PixelBuffer, angle_degrees: f64, filter: InterpolationFilter) -> PixelBuffer {
    if buffer.is_empty() {
        return buffer.clone();
    }

    match quarter_turn(angle_degrees) {
        Some(QuarterTurn::None) => buffer.clone(),
        Some(QuarterTurn::Cw90) => with_dynamic(buffer, |img| img.rotate90()),
        Some(QuarterTurn::Cw180) => with_dynamic(buffer, |img| img.rotate180()),
        Some(QuarterTurn::Cw270) => with_dynamic(buffer, |img| img.rotate270()),
        None => rotate_resampled(buffer, angle_degrees, filter),
    }
}

fn rotate_resampled(
    buffer: &PixelBuffer,
    angle_degrees: f64,
    filter: InterpolationFilter,
) -> PixelBuffer {
    let (src_w, src_h) = (buffer.width as f64, buffer.height as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(buffer.width, buffer.height, angle_degrees);

    let angle_rad = -angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; dst_w as usize * dst_h as usize * 4];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Work on pixel centers
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx;
            let src_y = dx * sin + dy * cos + src_cy;

            // Outside the source footprint: leave transparent
            if src_x < 0.0 || src_x >= src_w || src_y < 0.0 || src_y >= src_h {
                continue;
            }

            let (u, v) = (src_x - 0.5, src_y - 0.5);
            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(buffer, u, v),
                InterpolationFilter::Lanczos3 => sample_lanczos3(buffer, u, v),
            };

            let dst_idx = (dst_y as usize * dst_w as usize + dst_x as usize) * 4;
            output[dst_idx..dst_idx + 4].copy_from_slice(&pixel);
        }
    }

    PixelBuffer::new(dst_w, dst_h, PixelFormat::Rgba8, output)
}

/// Get a pixel as RGBA [f64; 4]; RGB sources read as opaque.
#[inline]
fn get_pixel_f64(buffer: &PixelBuffer, px: usize, py: usize) -> [f64; 4] {
    let c = buffer.format.channels();
    let idx = (py * buffer.width as usize + px) * c;
    let p = &buffer.pixels[idx..idx + c];
    let alpha = if c == 4 { p[3] as f64 } else { 255.0 };
    [p[0] as f64, p[1] as f64, p[2] as f64, alpha]
}

#[inline]
fn to_u8(values: [f64; 4]) -> [u8; 4] {
    values.map(|v| v.clamp(0.0, 255.0).round() as u8)
}

/// Sample a pixel using bilinear interpolation.
///
/// Coordinates are clamped to the pixel grid, so samples within half a
/// pixel of the border repeat the edge instead of fading to black.
fn sample_bilinear(buffer: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let max_x = (buffer.width - 1) as f64;
    let max_y = (buffer.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(buffer.width as usize - 1);
    let y1 = (y0 + 1).min(buffer.height as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(buffer, x0, y0);
    let p10 = get_pixel_f64(buffer, x1, y0);
    let p01 = get_pixel_f64(buffer, x0, y1);
    let p11 = get_pixel_f64(buffer, x1, y1);

    let mut result = [0.0f64; 4];
    for (i, out) in result.iter_mut().enumerate() {
        *out = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }

    to_u8(result)
}

/// Sample a pixel using Lanczos3 interpolation over a 6x6 neighborhood.
fn sample_lanczos3(buffer: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (buffer.width as i64, buffer.height as i64);

    // Fall back to bilinear where the kernel would leave the image
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(buffer, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_pixel_f64(buffer, px as usize, py as usize);
            for (acc, v) in sum.iter_mut().zip(pixel) {
                *acc += v * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum <= 0.0 {
        return sample_bilinear(buffer, x, y);
    }
    to_u8(sum.map(|v| v / weight_sum))
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a simple test image with a gradient pattern.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 8) as u8;
                pixels.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        PixelBuffer::new(width, height, PixelFormat::Rgb8, pixels)
    }

    #[test]
    fn test_no_rotation() {
        let img = test_image(100, 50);
        assert_eq!(rotate(&img, 0.0, InterpolationFilter::Bilinear), img);
    }

    #[test]
    fn test_tiny_rotation_fast_path() {
        let img = test_image(10, 5);
        assert_eq!(rotate(&img, 0.0001, InterpolationFilter::Bilinear), img);
        assert_eq!(rotate(&img, -0.0001, InterpolationFilter::Bilinear), img);
    }

    #[test]
    fn test_full_turns_are_identity() {
        let img = test_image(7, 3);
        for angle in [360.0, -360.0, 720.0, 359.9999] {
            assert_eq!(rotate(&img, angle, InterpolationFilter::Lanczos3), img);
        }
        assert!(is_identity_angle(1080.0));
        assert!(!is_identity_angle(1.0));
    }

    #[test]
    fn test_quarter_turn_is_clockwise_and_lossless() {
        // 2x1: [A, B] rotated clockwise becomes a 1x2 column [A / B]
        let img = PixelBuffer::new(2, 1, PixelFormat::Rgb8, vec![1, 1, 1, 2, 2, 2]);
        let turned = rotate(&img, 90.0, InterpolationFilter::Bilinear);
        assert_eq!((turned.width, turned.height), (1, 2));
        assert_eq!(turned.format, PixelFormat::Rgb8);
        assert_eq!(turned.pixels, vec![1, 1, 1, 2, 2, 2]);

        // 270 = counter-clockwise: [B / A]
        let back = rotate(&img, 270.0, InterpolationFilter::Bilinear);
        assert_eq!(back.pixels, vec![2, 2, 2, 1, 1, 1]);

        // Negative angles normalize onto the same quarter turns
        assert_eq!(rotate(&img, -90.0, InterpolationFilter::Bilinear), back);
    }

    #[test]
    fn test_four_quarter_turns_restore() {
        let img = test_image(9, 4);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate(&out, 90.0, InterpolationFilter::Bilinear);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn test_180_rotation_reverses_pixels() {
        let img = PixelBuffer::new(3, 1, PixelFormat::Rgb8, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
        let out = rotate(&img, 180.0, InterpolationFilter::Bilinear);
        assert_eq!(out.pixels, vec![3, 3, 3, 2, 2, 2, 1, 1, 1]);
    }

    #[test]
    fn test_90_degree_rotation_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 270.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 450.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
        assert_eq!(compute_rotated_bounds(100, 50, 720.0), (100, 50));
    }

    #[test]
    fn test_45_degree_rotation_bounds() {
        let (w, h) = compute_rotated_bounds(100, 100, 45.0);
        // Diagonal of 100x100 square is ~141.4
        assert!(w > 140 && w < 143, "width was {}", w);
        assert!(h > 140 && h < 143, "height was {}", h);
    }

    #[test]
    fn test_opposite_rotations_same_bounds() {
        assert_eq!(
            compute_rotated_bounds(100, 80, 30.0),
            compute_rotated_bounds(100, 80, -30.0)
        );
    }

    #[test]
    fn test_arbitrary_rotation_is_clockwise() {
        // A red bar right of center on a black square
        let size = 21u32;
        let mut pixels = vec![0u8; (size * size * 3) as usize];
        for y in 9..=11u32 {
            for x in 13..=19u32 {
                let idx = ((y * size + x) * 3) as usize;
                pixels[idx] = 255;
            }
        }
        let img = PixelBuffer::new(size, size, PixelFormat::Rgb8, pixels);

        let out = rotate(&img, 45.0, InterpolationFilter::Bilinear);
        assert_eq!((out.width, out.height), (30, 30));
        assert_eq!(out.format, PixelFormat::Rgba8);

        // Clockwise: the bar swings from the right towards the bottom-right
        assert_eq!(out.pixel(20, 20)[0], 255);
        assert_eq!(out.pixel(20, 9)[0], 0);
    }

    #[test]
    fn test_resampled_corners_are_transparent() {
        let img = test_image(20, 20);
        let out = rotate(&img, 30.0, InterpolationFilter::Bilinear);
        assert_eq!(out.pixel(0, 0)[3], 0);
        let (cx, cy) = (out.width / 2, out.height / 2);
        assert_eq!(out.pixel(cx, cy)[3], 255);
    }

    #[test]
    fn test_alpha_is_interpolated() {
        let img = PixelBuffer::new(4, 4, PixelFormat::Rgba8, vec![10, 20, 30, 100].repeat(16));
        let out = rotate(&img, 10.0, InterpolationFilter::Bilinear);
        let (cx, cy) = (out.width / 2, out.height / 2);
        assert_eq!(out.pixel(cx, cy), &[10, 20, 30, 100]);
    }

    #[test]
    fn test_bilinear_vs_lanczos() {
        let img = test_image(50, 50);
        let bilinear = rotate(&img, 15.0, InterpolationFilter::Bilinear);
        let lanczos = rotate(&img, 15.0, InterpolationFilter::Lanczos3);
        assert_eq!(
            (bilinear.width, bilinear.height),
            (lanczos.width, lanczos.height)
        );
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_tiny_images_do_not_panic() {
        for (w, h) in [(1, 1), (100, 1), (1, 100), (4, 4), (8, 8)] {
            let img = test_image(w, h);
            for filter in [InterpolationFilter::Bilinear, InterpolationFilter::Lanczos3] {
                let out = rotate(&img, 33.0, filter);
                assert!(out.width >= 1 && out.height >= 1);
                assert_eq!(out.pixels.len(), out.pixel_count() * 4);
            }
        }
    }

    #[test]
    fn test_empty_buffer_passthrough() {
        let img = PixelBuffer::blank(0, 0, PixelFormat::Rgb8);
        assert_eq!(rotate(&img, 45.0, InterpolationFilter::Bilinear), img);
    }

    #[test]
    fn test_bounds_never_zero() {
        for angle in [1.0, 15.0, 45.0, 89.0, 90.0, 135.0, 179.0, 180.0, 270.0, 359.0] {
            let (w, h) = compute_rotated_bounds(10, 10, angle);
            assert!(w > 0, "Width should be > 0 for angle {}", angle);
            assert!(h > 0, "Height should be > 0 for angle {}", angle);
        }
    }
}
