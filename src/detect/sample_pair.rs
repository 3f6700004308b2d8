use crate::grid::ChannelPlane;
use serde::Serialize;

const SCORE_THRESHOLD: f64 = 0.1;

/// Simplified regular/singular classification of horizontal sample pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePairResult {
    /// |regular / total - 0.5|
    pub rs_score: f64,
    pub regular_pairs: u64,
    pub singular_pairs: u64,
    pub suspicious: bool,
}

/// A pair is regular when its samples differ by at most one, singular otherwise
pub fn sample_pairs(plane: &ChannelPlane) -> SamplePairResult {
    let mut regular = 0u64;
    let mut singular = 0u64;
    for row in plane.rows() {
        for pair in row.windows(2) {
            if pair[0].abs_diff(pair[1]) <= 1 {
                regular += 1;
            } else {
                singular += 1;
            }
        }
    }

    let total = regular + singular;
    let rs_score = if total > 0 {
        (regular as f64 / total as f64 - 0.5).abs()
    } else {
        0.0
    };

    SamplePairResult {
        rs_score,
        regular_pairs: regular,
        singular_pairs: singular,
        suspicious: rs_score > SCORE_THRESHOLD,
    }
}
