use crate::grid::ChannelPlane;
use serde::Serialize;

const P_THRESHOLD: f64 = 0.05;
const DEVIATION_THRESHOLD: f64 = 0.1;

/// Pearson chi-square of the LSB distribution against a fair 50/50 split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareResult {
    pub chi2_statistic: f64,
    pub p_value: f64,
    /// |zeros - ones| / N
    pub deviation: f64,
    pub suspicious: bool,
}

/// LSB counts as `[zeros, ones]`
pub fn lsb_histogram(plane: &ChannelPlane) -> [u64; 2] {
    let ones = plane.samples.iter().filter(|&&s| s & 1 == 1).count() as u64;
    [plane.len() as u64 - ones, ones]
}

pub fn chi_square(plane: &ChannelPlane) -> ChiSquareResult {
    let [zeros, ones] = lsb_histogram(plane);
    let total = (zeros + ones) as f64;
    if total == 0.0 {
        return ChiSquareResult {
            chi2_statistic: 0.0,
            p_value: 1.0,
            deviation: 0.0,
            suspicious: false,
        };
    }

    let expected = total / 2.0;
    let chi2 = ((zeros as f64 - expected).powi(2) + (ones as f64 - expected).powi(2)) / expected;
    let p_value = chi_square_p_value_df1(chi2);
    let deviation = (zeros as f64 - ones as f64).abs() / total;

    ChiSquareResult {
        chi2_statistic: chi2,
        p_value,
        deviation,
        suspicious: p_value < P_THRESHOLD && deviation > DEVIATION_THRESHOLD,
    }
}

/// Upper-tail p-value of chi-square with one degree of freedom:
/// P(X > x) = erfc(sqrt(x / 2))
pub fn chi_square_p_value_df1(chi2: f64) -> f64 {
    if chi2 <= 0.0 {
        return 1.0;
    }
    (1.0 - erf((chi2 / 2.0).sqrt())).clamp(0.0, 1.0)
}

/// Abramowitz-Stegun 7.1.26, max error 1.5e-7
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}
