//! Statistical steganalysis.
//!
//! Three independent detectors, each run on a full colour plane:
//!
//! - **Chi-square**: LSB zero/one balance against a fair split
//! - **Sample pairs**: share of horizontal neighbours differing by at most one
//! - **Bit-plane variance**: block-wise LSB noise compared with bit 1
//!
//! [`run_suite`] applies all of them to red, green and blue.

pub mod bit_plane;
pub mod chi_square;
pub mod sample_pair;

pub use bit_plane::{bit_plane, bit_plane_image, BitPlaneResult};
pub use chi_square::{chi_square, lsb_histogram, ChiSquareResult};
pub use sample_pair::{sample_pairs, SamplePairResult};

use crate::config::Channel;
use crate::grid::PixelGrid;
use serde::Serialize;

/// Every detector's verdict for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub chi_square: ChiSquareResult,
    pub sample_pair: SamplePairResult,
    pub bit_plane: BitPlaneResult,
    /// LSB counts as `[zeros, ones]`
    pub lsb_histogram: [u64; 2],
}

impl ChannelReport {
    pub fn any_suspicious(&self) -> bool {
        self.chi_square.suspicious || self.sample_pair.suspicious || self.bit_plane.suspicious
    }
}

pub fn analyze_channel(grid: &PixelGrid, channel: Channel) -> ChannelReport {
    let plane = grid.channel_plane(channel);
    ChannelReport {
        channel,
        chi_square: chi_square(&plane),
        sample_pair: sample_pairs(&plane),
        bit_plane: bit_plane(&plane),
        lsb_histogram: lsb_histogram(&plane),
    }
}

/// Run every detector over red, green and blue
pub fn run_suite(grid: &PixelGrid) -> Vec<ChannelReport> {
    Channel::ALL
        .iter()
        .map(|&channel| analyze_channel(grid, channel))
        .collect()
}
