use crate::config::Channel;
use crate::error::{Result, StegoError};

/// Height, width and samples per pixel of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl GridShape {
    pub fn pixels(&self) -> usize {
        self.height * self.width
    }
}

/// Row-major interleaved 8-bit raster with 3 (RGB) or 4 (RGBA) samples per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    shape: GridShape,
    samples: Vec<u8>,
}

impl PixelGrid {
    pub fn new(height: usize, width: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(StegoError::InvalidConfig(format!(
                "pixel grid needs 3 or 4 channels, got {}",
                channels
            )));
        }
        let expected = height * width * channels;
        if samples.len() != expected {
            return Err(StegoError::InvalidConfig(format!(
                "pixel grid of {}x{}x{} needs {} samples, got {}",
                height,
                width,
                channels,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            shape: GridShape {
                height,
                width,
                channels,
            },
            samples,
        })
    }

    /// Build an RGB grid from a per-pixel generator
    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> [u8; 3]) -> Self {
        let mut samples = Vec::with_capacity(height * width * 3);
        for row in 0..height {
            for col in 0..width {
                samples.extend_from_slice(&f(row, col));
            }
        }
        Self {
            shape: GridShape {
                height,
                width,
                channels: 3,
            },
            samples,
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.shape.width + col) * self.shape.channels + channel
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.samples[self.offset(row, col, channel)]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        let idx = self.offset(row, col, channel);
        self.samples[idx] = value;
    }

    /// Copy one colour channel out as its own plane
    pub fn channel_plane(&self, channel: Channel) -> ChannelPlane {
        let samples = self
            .samples
            .iter()
            .skip(channel.index())
            .step_by(self.shape.channels)
            .copied()
            .collect();
        ChannelPlane {
            height: self.shape.height,
            width: self.shape.width,
            samples,
        }
    }
}

/// A single channel of a grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPlane {
    pub height: usize,
    pub width: usize,
    pub samples: Vec<u8>,
}

impl ChannelPlane {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks() panics on zero, and a zero-width plane has no rows anyway
        self.samples.chunks(self.width.max(1))
    }

    /// Bit `bit` of every sample, as 0/1 values
    pub fn bit_plane(&self, bit: u8) -> Vec<u8> {
        self.samples.iter().map(|&s| (s >> bit) & 1).collect()
    }
}
