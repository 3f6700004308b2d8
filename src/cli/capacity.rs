use crate::codec::read_image;
use crate::config::{BitDepth, Channel, ChannelSet, EmbeddingConfig};
use crate::engine::{capacity_report, CapacityReport};
use crate::error::Result;
use crate::grid::GridShape;
use crate::pipeline::cipher;
use std::path::Path;

/// Capacity of every bit depth and non-empty channel subset, widest first
pub fn capacity_plan(shape: GridShape) -> Result<Vec<CapacityReport>> {
    let mut subsets: Vec<ChannelSet> = (1u8..8)
        .map(|mask| {
            ChannelSet::new(
                Channel::ALL
                    .iter()
                    .copied()
                    .filter(|c| mask & (1 << c.index()) != 0),
            )
        })
        .collect::<Result<_>>()?;
    subsets.sort_by_key(|set| std::cmp::Reverse(set.len()));

    let mut plan = Vec::new();
    for bit_depth in [BitDepth::Two, BitDepth::One] {
        for channels in &subsets {
            let config = EmbeddingConfig {
                bit_depth,
                channels: channels.clone(),
                ..Default::default()
            };
            plan.push(capacity_report(shape, &config)?);
        }
    }
    Ok(plan)
}

/// Tabulate what fits in the image at `path`
pub fn show_capacity(path: &Path) -> Result<String> {
    let grid = read_image(path)?;
    let shape = grid.shape();
    let plan = capacity_plan(shape)?;

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!(
        "Image: {}x{} ({} channels)\n\n",
        shape.width, shape.height, shape.channels
    ));
    output.push_str(&format!(
        "{:<5} {:<16} {:>12} {:>12}\n",
        "Bits", "Channels", "Plain", "Encrypted"
    ));
    for report in &plan {
        output.push_str(&format!(
            "{:<5} {:<16} {:>12} {:>12}\n",
            report.bit_depth,
            report.channels.to_string(),
            report.capacity_bytes,
            report.capacity_bytes.saturating_sub(cipher::OVERHEAD)
        ));
    }
    output.push_str(&format!(
        "\nCapacities in bytes after the {}-byte frame header; encryption adds {} more.\n",
        crate::frame::FrameHeader::SIZE,
        cipher::OVERHEAD
    ));
    Ok(output)
}
