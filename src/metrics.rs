use crate::grid::PixelGrid;
use serde::Serialize;

const SSIM_C1: f64 = 0.0001;
const SSIM_C2: f64 = 0.0009;

/// Distortion between a carrier and its stego copy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distortion {
    pub mse: f64,
    /// Infinite when the grids are identical
    pub psnr: f64,
    pub ssim: f64,
}

/// Compare two grids of the same shape over every sample, alpha included.
///
/// SSIM is a single global approximation (whole-image means, variances and
/// covariance) and will not match windowed SSIM implementations.
pub fn distortion(original: &PixelGrid, stego: &PixelGrid) -> Distortion {
    let a = original.samples();
    let b = stego.samples();
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    if n == 0 {
        return Distortion {
            mse: 0.0,
            psnr: f64::INFINITY,
            ssim: 1.0,
        };
    }
    let count = n as f64;

    let mut sq_err = 0.0;
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let diff = x as f64 - y as f64;
        sq_err += diff * diff;
        sum_a += x as f64;
        sum_b += y as f64;
    }
    let mse = sq_err / count;
    let psnr = if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (255.0 / mse.sqrt()).log10()
    };

    let mu_a = sum_a / count;
    let mu_b = sum_b / count;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut cov = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let da = x as f64 - mu_a;
        let db = y as f64 - mu_b;
        var_a += da * da;
        var_b += db * db;
        cov += da * db;
    }
    var_a /= count;
    var_b /= count;
    cov /= count;

    let ssim = ((2.0 * mu_a * mu_b + SSIM_C1) * (2.0 * cov + SSIM_C2))
        / ((mu_a * mu_a + mu_b * mu_b + SSIM_C1) * (var_a + var_b + SSIM_C2));

    Distortion { mse, psnr, ssim }
}
