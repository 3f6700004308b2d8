use crate::grid::ChannelPlane;
use serde::Serialize;

const BLOCK: usize = 8;
const RATIO_HIGH: f64 = 2.0;
const RATIO_LOW: f64 = 0.5;

/// Block-wise noise of the LSB plane compared with the whole bit-1 plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitPlaneResult {
    /// Mean of the per-block LSB variances
    pub lsb_variance: f64,
    /// Standard deviation of the per-block LSB variances
    pub lsb_std: f64,
    pub higher_bit_variance: f64,
    pub variance_ratio: f64,
    /// Complete 8x8 blocks that contributed
    pub blocks: usize,
    pub suspicious: bool,
}

/// Split `plane` into disjoint 8x8 blocks, dropping incomplete trailing rows
/// and columns. A plane smaller than one block yields no blocks and is never
/// flagged.
pub fn bit_plane(plane: &ChannelPlane) -> BitPlaneResult {
    let lsb = plane.bit_plane(0);
    let bit1: Vec<f64> = plane.bit_plane(1).into_iter().map(f64::from).collect();

    let blocks_down = plane.height / BLOCK;
    let blocks_across = plane.width / BLOCK;
    let mut block_variances = Vec::with_capacity(blocks_down * blocks_across);
    let mut block = Vec::with_capacity(BLOCK * BLOCK);
    for by in 0..blocks_down {
        for bx in 0..blocks_across {
            block.clear();
            for row in by * BLOCK..(by + 1) * BLOCK {
                let start = row * plane.width + bx * BLOCK;
                block.extend(lsb[start..start + BLOCK].iter().map(|&b| f64::from(b)));
            }
            block_variances.push(variance(&block));
        }
    }

    let higher_bit_variance = variance(&bit1);
    if block_variances.is_empty() {
        return BitPlaneResult {
            lsb_variance: 0.0,
            lsb_std: 0.0,
            higher_bit_variance,
            variance_ratio: 0.0,
            blocks: 0,
            suspicious: false,
        };
    }

    let lsb_variance = mean(&block_variances);
    let lsb_std = variance(&block_variances).sqrt();
    let variance_ratio = lsb_variance / (higher_bit_variance + 1e-6);

    BitPlaneResult {
        lsb_variance,
        lsb_std,
        higher_bit_variance,
        variance_ratio,
        blocks: block_variances.len(),
        suspicious: variance_ratio > RATIO_HIGH || variance_ratio < RATIO_LOW,
    }
}

/// Bit `bit` of `plane` scaled to 0/255 for viewing
pub fn bit_plane_image(plane: &ChannelPlane, bit: u8) -> Vec<u8> {
    plane
        .samples
        .iter()
        .map(|&s| if (s >> bit) & 1 == 1 { 255 } else { 0 })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane_from_fn(height: usize, width: usize, f: impl Fn(usize, usize) -> u8) -> ChannelPlane {
        let mut samples = Vec::with_capacity(height * width);
        for r in 0..height {
            for c in 0..width {
                samples.push(f(r, c));
            }
        }
        ChannelPlane {
            height,
            width,
            samples,
        }
    }

    #[test]
    fn test_checkerboard_matches_bit1_noise() {
        // LSB and bit 1 both alternate in a checkerboard: block variance 0.25 everywhere
        let plane = plane_from_fn(16, 16, |r, c| if (r + c) % 2 == 0 { 0b11 } else { 0b00 });
        let result = bit_plane(&plane);
        assert_eq!(result.blocks, 4);
        assert!((result.lsb_variance - 0.25).abs() < 1e-12);
        assert_eq!(result.lsb_std, 0.0);
        assert!((result.higher_bit_variance - 0.25).abs() < 1e-12);
        assert!((result.variance_ratio - 1.0).abs() < 1e-4);
        assert!(!result.suspicious);
    }

    #[test]
    fn test_flat_lsb_is_suspicious() {
        // LSB constant, bit 1 noisy
        let plane = plane_from_fn(16, 16, |r, c| if (r + c) % 2 == 0 { 0b10 } else { 0b00 });
        let result = bit_plane(&plane);
        assert_eq!(result.lsb_variance, 0.0);
        assert!(result.variance_ratio < RATIO_LOW);
        assert!(result.suspicious);
    }

    #[test]
    fn test_noisy_lsb_over_flat_bit1_is_suspicious() {
        let plane = plane_from_fn(16, 16, |r, c| ((r + c) % 2) as u8);
        let result = bit_plane(&plane);
        assert_eq!(result.higher_bit_variance, 0.0);
        assert!(result.variance_ratio > RATIO_HIGH);
        assert!(result.suspicious);
    }

    #[test]
    fn test_incomplete_blocks_discarded() {
        let plane = plane_from_fn(15, 23, |r, c| (r * 31 + c * 7) as u8);
        assert_eq!(bit_plane(&plane).blocks, 2);
    }

    #[test]
    fn test_plane_smaller_than_block() {
        let plane = plane_from_fn(4, 4, |_, _| 0);
        let result = bit_plane(&plane);
        assert_eq!(result.blocks, 0);
        assert!(!result.suspicious);
    }

    #[test]
    fn test_bit_plane_image() {
        let plane = plane_from_fn(1, 3, |_, c| c as u8);
        assert_eq!(bit_plane_image(&plane, 0), vec![0, 255, 0]);
        assert_eq!(bit_plane_image(&plane, 1), vec![0, 0, 255]);
    }
}
