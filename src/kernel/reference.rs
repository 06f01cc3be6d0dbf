//! Software rendition of the blur pipeline.
//!
//! Operates on a single `f32` channel with the same weights, pass order,
//! and clamp-to-edge policy as the GPU path. The property tests run
//! against this implementation, and hosts without compute support can use
//! it as a slow fallback.

use tracing::trace;

use super::{KernelAxis, clamp_half_kernel_size, gaussian_weights};

/// Applies one 1-D weighted-sum pass along `axis`.
///
/// `src` is a row-major `width * height` buffer. Samples that would fall
/// outside the image are clamped to the nearest edge texel, matching the
/// GPU kernels.
pub fn blur_axis(src: &[f32], width: u32, height: u32, weights: &[f32], axis: KernelAxis) -> Vec<f32> {
    assert_eq!(src.len(), (width * height) as usize);
    assert_eq!(weights.len() % 2, 1, "kernel must have a center sample");
    let half = (weights.len() / 2) as i64;

    let mut out = vec![0.0; src.len()];
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut total = 0.0;
            for (tap, w) in weights.iter().enumerate() {
                let offset = tap as i64 - half;
                let (sx, sy) = match axis {
                    KernelAxis::Horizontal => ((x + offset).clamp(0, width as i64 - 1), y),
                    KernelAxis::Vertical => (x, (y + offset).clamp(0, height as i64 - 1)),
                };
                total += src[(sy * width as i64 + sx) as usize] * w;
            }
            out[(y * width as i64 + x) as usize] = total;
        }
    }
    out
}

/// Runs the full frame sequence: horizontal, vertical, horizontal,
/// vertical, with the weights derived from `half_kernel_size` (clamped to
/// the supported minimum first).
pub fn blur_image(src: &[f32], width: u32, height: u32, half_kernel_size: i32) -> Vec<f32> {
    let half = clamp_half_kernel_size(half_kernel_size);
    trace!(width, height, half, "software blur frame");
    let weights = gaussian_weights(half as i32);

    let pass1 = blur_axis(src, width, height, &weights, KernelAxis::Horizontal);
    let pass2 = blur_axis(&pass1, width, height, &weights, KernelAxis::Vertical);
    let pass3 = blur_axis(&pass2, width, height, &weights, KernelAxis::Horizontal);
    blur_axis(&pass3, width, height, &weights, KernelAxis::Vertical)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: u32 = 64;

    fn image_sum(img: &[f32]) -> f64 {
        img.iter().map(|&v| v as f64).sum()
    }

    #[test]
    fn test_constant_field_is_unchanged() {
        let color = 0.625;
        let src = vec![color; (SIZE * SIZE) as usize];
        let out = blur_image(&src, SIZE, SIZE, 1);
        for (i, &v) in out.iter().enumerate() {
            assert!((v - color).abs() < 1e-4, "pixel {i}: {v}");
        }
    }

    #[test]
    fn test_point_spread_is_centered_and_energy_conserving() {
        let mut src = vec![0.0; (SIZE * SIZE) as usize];
        src[(32 * SIZE + 32) as usize] = 1.0;
        let out = blur_image(&src, SIZE, SIZE, 2);

        // Far from the edges nothing clamps, so energy is conserved.
        let total = image_sum(&out);
        assert!((total - 1.0).abs() < 1e-4, "total={total}");

        // Peak stays at the source pixel.
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak as u32, 32 * SIZE + 32);

        // Separable footprint is symmetric about the center both ways.
        for d in 1..=8u32 {
            let center = 32 * SIZE + 32;
            assert!((out[(center - d) as usize] - out[(center + d) as usize]).abs() < 1e-6);
            assert!(
                (out[(center - d * SIZE) as usize] - out[(center + d * SIZE) as usize]).abs()
                    < 1e-6
            );
        }

        // Energy actually spread beyond the source pixel.
        assert!(out[(32 * SIZE + 32) as usize] < 1.0);
        assert!(out[(32 * SIZE + 33) as usize] > 0.0);
    }

    #[test]
    fn test_edge_clamp_never_loses_energy() {
        // A bright corner pixel: clamping folds out-of-bounds taps back
        // onto the edge texel, so that texel is counted extra and total
        // energy grows. It must never shrink, and the gain is bounded:
        // each 1-D pass can reference the corner from at most `half + 1`
        // extra outputs, so four passes amplify by at most (half + 1)^4.
        let half = 3;
        let mut src = vec![0.0; (SIZE * SIZE) as usize];
        src[0] = 1.0;
        let out = blur_image(&src, SIZE, SIZE, half);

        let total = image_sum(&out);
        assert!(total >= 1.0 - 1e-4, "total={total}");
        let bound = ((half + 1) as f64).powi(4);
        assert!(total <= bound, "total={total}, bound={bound}");

        // The footprint stays anchored at the corner and is symmetric
        // across the diagonal, since both axes clamp identically.
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 0);
        for d in 1..=8u32 {
            let along_x = out[d as usize];
            let along_y = out[(d * SIZE) as usize];
            assert!((along_x - along_y).abs() < 1e-6, "d={d}");
        }
    }

    #[test]
    fn test_single_axis_pass_leaves_other_axis_untouched() {
        let mut src = vec![0.0; (SIZE * SIZE) as usize];
        src[(10 * SIZE + 20) as usize] = 1.0;
        let weights = gaussian_weights(2);
        let out = blur_axis(&src, SIZE, SIZE, &weights, KernelAxis::Horizontal);
        // All energy stays in row 10.
        for y in 0..SIZE {
            let row: f32 = out[(y * SIZE) as usize..((y + 1) * SIZE) as usize].iter().sum();
            if y == 10 {
                assert!((row - 1.0).abs() < 1e-5);
            } else {
                assert_eq!(row, 0.0);
            }
        }
    }
}
