use crate::aggregate::{
    analyze, bit_plane_confidence, chi_square_confidence, sample_pair_confidence, AnalysisReport,
    HIGH_BAND, LOW_BAND,
};
use crate::codec::read_image;
use crate::error::Result;
use std::path::Path;

/// Options for the analyze command
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Emit the serialized report instead of the dashboard
    pub json: bool,
}

/// Run the detector suite over an image file
pub fn analyze_image(path: &Path, options: &AnalyzeOptions) -> Result<String> {
    let grid = read_image(path)?;
    let report = analyze(&grid);
    if options.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        return Ok(json);
    }

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!(
        "Image: {}x{} ({} channels)\n\n",
        grid.width(),
        grid.height(),
        grid.channels()
    ));
    output.push_str(&render_dashboard(&report));
    output.push_str(&format!("\n{}\n", report.explanation));
    Ok(output)
}

pub fn render_dashboard(report: &AnalysisReport) -> String {
    let mut dashboard = Dashboard::new("Steganalysis");

    for channel in &report.channels {
        let chi = &channel.chi_square;
        let rs = &channel.sample_pair;
        let bp = &channel.bit_plane;
        let [zeros, ones] = channel.lsb_histogram;

        let section = dashboard
            .section(&channel.channel.name().to_uppercase())
            .metric(
                "Chi-square",
                format!("{:.2}", chi.chi2_statistic),
                format!("p={}, deviation {:.3}", format_p_value(chi.p_value), chi.deviation),
                severity(chi.suspicious, chi_square_confidence(chi)),
            )
            .metric(
                "Sample pairs",
                format!("{:.3}", rs.rs_score),
                format!("{} regular / {} singular", rs.regular_pairs, rs.singular_pairs),
                severity(rs.suspicious, sample_pair_confidence(rs)),
            )
            .metric(
                "Bit-plane ratio",
                format!("{:.3}", bp.variance_ratio),
                format!("{} blocks, LSB var {:.4}", bp.blocks, bp.lsb_variance),
                severity(bp.suspicious, bit_plane_confidence(bp)),
            )
            .metric(
                "LSB balance",
                format!("{}/{}", zeros, ones),
                "zeros/ones",
                Severity::Pass,
            );
        dashboard.add_section(section);
    }

    let verdict = dashboard.section("Verdict").metric(
        "Confidence",
        format!("{:.3}", report.confidence),
        "max over flagged detectors",
        band(report.confidence),
    );
    dashboard.add_section(verdict);

    dashboard.render()
}

/// Unflagged results pass; flagged ones are graded by their confidence
fn severity(suspicious: bool, confidence: f64) -> Severity {
    if suspicious {
        band(confidence)
    } else {
        Severity::Pass
    }
}

fn band(confidence: f64) -> Severity {
    if confidence < LOW_BAND {
        Severity::Pass
    } else if confidence < HIGH_BAND {
        Severity::Warn
    } else {
        Severity::Fail
    }
}

fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else if p > 0.999 {
        "> 0.999".to_string()
    } else {
        format!("{:.3}", p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    fn indicator(&self) -> &'static str {
        match self {
            Severity::Pass => "✔",
            Severity::Warn => "⚠",
            Severity::Fail => "✖",
        }
    }

    fn colorize(&self, text: &str) -> String {
        color(text, self.color_code())
    }

    fn max(a: Severity, b: Severity) -> Severity {
        match (a, b) {
            (Severity::Fail, _) | (_, Severity::Fail) => Severity::Fail,
            (Severity::Warn, _) | (_, Severity::Warn) => Severity::Warn,
            _ => Severity::Pass,
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Severity::Pass => FG_GREEN,
            Severity::Warn => FG_YELLOW,
            Severity::Fail => FG_RED,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Severity::Pass => "PASS",
            Severity::Warn => "WARN",
            Severity::Fail => "FAIL",
        };
        write!(f, "{}", text)
    }
}

struct MetricLine {
    label: String,
    value: String,
    detail: String,
    severity: Severity,
}

struct Section {
    name: String,
    items: Vec<MetricLine>,
}

impl Section {
    fn metric(
        mut self,
        label: &str,
        value: String,
        detail: impl Into<String>,
        severity: Severity,
    ) -> Self {
        self.items.push(MetricLine {
            label: label.to_string(),
            value,
            detail: detail.into(),
            severity,
        });
        self
    }
}

struct Dashboard {
    title: String,
    sections: Vec<Section>,
    status: Severity,
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

fn style(text: &str, codes: &[&str]) -> String {
    let prefix: String = codes.concat();
    format!("{}{}{}", prefix, text, RESET)
}

fn color(text: &str, color_code: &str) -> String {
    style(text, &[color_code])
}

impl Dashboard {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: Vec::new(),
            status: Severity::Pass,
        }
    }

    fn section(&self, name: &str) -> Section {
        Section {
            name: name.to_string(),
            items: Vec::new(),
        }
    }

    fn add_section(&mut self, section: Section) {
        let section_severity = section
            .items
            .iter()
            .fold(Severity::Pass, |acc, item| Severity::max(acc, item.severity));
        self.status = Severity::max(self.status, section_severity);
        self.sections.push(section);
    }

    fn render(&self) -> String {
        let headers = ["Channel", "Metric", "Value", "Notes", "Status"];
        let mut widths = headers.map(str::len);
        for section in &self.sections {
            widths[0] = widths[0].max(section.name.len());
            for item in &section.items {
                widths[1] = widths[1].max(item.label.len());
                widths[2] = widths[2].max(item.value.len());
                widths[3] = widths[3].max(item.detail.len());
                widths[4] = widths[4].max(status_text(item.severity).chars().count());
            }
        }

        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n\n",
            style(
                &format!("{} {}", self.status.indicator(), self.title),
                &[self.status.color_code(), BOLD]
            ),
            color(
                match self.status {
                    Severity::Pass => "(no anomalies detected)",
                    Severity::Warn => "(warning signals found)",
                    Severity::Fail => "(embedded data likely)",
                },
                self.status.color_code()
            )
        ));

        output.push_str(&horizontal_rule(&widths));
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            pad(headers[0], widths[0]),
            pad(headers[1], widths[1]),
            pad(headers[2], widths[2]),
            pad(headers[3], widths[3]),
            pad(headers[4], widths[4])
        ));
        output.push_str(&horizontal_rule(&widths));

        for section in &self.sections {
            for (idx, item) in section.items.iter().enumerate() {
                let name = if idx == 0 { section.name.as_str() } else { "" };
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    pad(name, widths[0]),
                    pad(&item.label, widths[1]),
                    pad(&item.value, widths[2]),
                    pad(&item.detail, widths[3]),
                    item.severity
                        .colorize(&pad(&status_text(item.severity), widths[4]))
                ));
            }
            output.push_str(&horizontal_rule(&widths));
        }

        output
    }
}

fn status_text(severity: Severity) -> String {
    format!("{} {}", severity.indicator(), severity)
}

fn horizontal_rule(widths: &[usize; 5]) -> String {
    let mut line = String::from("+");
    for &w in widths {
        line.push_str(&format!("{}+", "-".repeat(w + 2)));
    }
    line.push('\n');
    line
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_image;
    use crate::grid::PixelGrid;
    use tempfile::tempdir;

    #[test]
    fn test_dashboard_lists_every_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        let grid = PixelGrid::from_fn(24, 24, |r, c| [(r * 9) as u8, (c * 9) as u8, 64]);
        write_image(&path, &grid).unwrap();

        let output = analyze_image(&path, &AnalyzeOptions::default()).unwrap();
        for name in ["RED", "GREEN", "BLUE", "Verdict", "Chi-square", "Sample pairs"] {
            assert!(output.contains(name), "missing {}", name);
        }
        assert!(output.contains("Image: 24x24"));
    }

    #[test]
    fn test_json_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        write_image(&path, &PixelGrid::from_fn(16, 16, |r, c| [r as u8, c as u8, 3])).unwrap();

        let options = AnalyzeOptions { json: true };
        let output = analyze_image(&path, &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let confidence = value["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
        assert_eq!(value["channels"].as_array().unwrap().len(), 3);
        assert_eq!(value["channels"][0]["channel"], "red");
        assert!(value["explanation"].is_string());
    }

    #[test]
    fn test_severity_grading() {
        assert_eq!(severity(false, 0.9), Severity::Pass);
        assert_eq!(severity(true, 0.1), Severity::Pass);
        assert_eq!(severity(true, 0.45), Severity::Warn);
        assert_eq!(severity(true, 0.7), Severity::Fail);
    }

    #[test]
    fn test_p_value_format() {
        assert_eq!(format_p_value(0.0001), "< 0.001");
        assert_eq!(format_p_value(1.0), "> 0.999");
        assert_eq!(format_p_value(0.25), "0.250");
    }
}
