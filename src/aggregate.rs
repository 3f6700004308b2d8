use crate::detect::{run_suite, BitPlaneResult, ChannelReport, ChiSquareResult, SamplePairResult};
use crate::grid::PixelGrid;
use serde::Serialize;
use tracing::{info, warn};

/// Below this confidence nothing significant was found
pub const LOW_BAND: f64 = 0.3;
/// Below this confidence the evidence is inconclusive
pub const HIGH_BAND: f64 = 0.6;

/// Combined verdict over every channel and detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub confidence: f64,
    pub explanation: String,
}

/// Full analysis of one image
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub confidence: f64,
    pub explanation: String,
    pub channels: Vec<ChannelReport>,
}

pub fn analyze(grid: &PixelGrid) -> AnalysisReport {
    let channels = run_suite(grid);
    let AggregateResult {
        confidence,
        explanation,
    } = aggregate(&channels);
    if confidence >= HIGH_BAND {
        warn!(confidence, "strong evidence of embedded data");
    } else {
        info!(confidence, "analysis complete");
    }
    AnalysisReport {
        confidence,
        explanation,
        channels,
    }
}

pub fn chi_square_confidence(result: &ChiSquareResult) -> f64 {
    let deviation_score = (result.deviation * 2.0).min(1.0);
    let p_value_score = 1.0 - result.p_value;
    (deviation_score + p_value_score) / 2.0
}

pub fn sample_pair_confidence(result: &SamplePairResult) -> f64 {
    (result.rs_score * 5.0).min(1.0)
}

pub fn bit_plane_confidence(result: &BitPlaneResult) -> f64 {
    let ratio = result.variance_ratio;
    if ratio > 2.0 {
        ((ratio - 2.0) / 3.0).min(1.0)
    } else if ratio < 0.5 {
        ((0.5 - ratio) / 0.5).min(1.0)
    } else {
        0.0
    }
}

/// Most-suspicious-wins: the confidence is the largest per-channel confidence
/// among flagged results, not an average. Zero when nothing is flagged.
pub fn aggregate(reports: &[ChannelReport]) -> AggregateResult {
    let chi = reports
        .iter()
        .filter(|r| r.chi_square.suspicious)
        .map(|r| chi_square_confidence(&r.chi_square));
    let rs = reports
        .iter()
        .filter(|r| r.sample_pair.suspicious)
        .map(|r| sample_pair_confidence(&r.sample_pair));
    let bp = reports
        .iter()
        .filter(|r| r.bit_plane.suspicious)
        .map(|r| bit_plane_confidence(&r.bit_plane));

    let confidence = chi
        .chain(rs)
        .chain(bp)
        .fold(0.0f64, f64::max)
        .clamp(0.0, 1.0);

    AggregateResult {
        confidence,
        explanation: explain(reports, confidence),
    }
}

fn explain(reports: &[ChannelReport], confidence: f64) -> String {
    let mut sentences = Vec::new();
    sentences.push(if confidence < LOW_BAND {
        "No significant steganographic artifacts detected.".to_string()
    } else if confidence < HIGH_BAND {
        "Some statistical anomalies detected, but inconclusive.".to_string()
    } else {
        "Strong evidence of steganographic content detected.".to_string()
    });

    for r in reports.iter().filter(|r| r.chi_square.suspicious) {
        sentences.push(format!(
            "{} channel shows unnatural LSB distribution (p={:.3}).",
            upper(r),
            r.chi_square.p_value
        ));
    }
    for r in reports.iter().filter(|r| r.sample_pair.suspicious) {
        sentences.push(format!(
            "{} channel RS analysis indicates potential LSB manipulation (score={:.3}).",
            upper(r),
            r.sample_pair.rs_score
        ));
    }
    for r in reports.iter().filter(|r| r.bit_plane.suspicious) {
        sentences.push(format!(
            "{} channel bit-plane analysis shows unusual noise patterns (variance ratio={:.3}).",
            upper(r),
            r.bit_plane.variance_ratio
        ));
    }

    let flagged: Vec<String> = reports
        .iter()
        .filter(|r| r.any_suspicious())
        .map(upper)
        .collect();
    if !flagged.is_empty() {
        sentences.push(format!("Most suspicious channels: {}", flagged.join(", ")));
    }

    sentences.join(" ")
}

fn upper(report: &ChannelReport) -> String {
    report.channel.name().to_uppercase()
}
