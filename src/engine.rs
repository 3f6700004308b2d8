use crate::config::{BitDepth, ChannelSet, EmbeddingConfig};
use crate::error::{Result, StegoError};
use crate::frame::{self, FrameHeader};
use crate::grid::{GridShape, PixelGrid};
use crate::metrics::distortion;
use crate::pipeline::{cipher, pack, slots_for, unpack, PositionSchedule, SlotAddress};
use serde::Serialize;
use tracing::{debug, info};

/// Header bits reserved out of the carrier's raw bit budget
const HEADER_BITS: usize = FrameHeader::SIZE * 8;

/// Payload bytes a grid can carry for a config:
/// `floor((H * W * depth * |channels| - 128) / 8)`, zero for tiny carriers
pub fn capacity_bytes(shape: GridShape, bit_depth: BitDepth, channels: &ChannelSet) -> usize {
    let total_bits = shape.pixels() * bit_depth.bits() as usize * channels.len();
    total_bits.saturating_sub(HEADER_BITS) / 8
}

/// How a config maps onto a carrier
#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub capacity_bytes: usize,
    pub total_slots: usize,
    pub header_slots: usize,
    pub bit_depth: u8,
    pub channels: ChannelSet,
}

pub fn capacity_report(shape: GridShape, config: &EmbeddingConfig) -> Result<CapacityReport> {
    config.validate()?;
    Ok(CapacityReport {
        capacity_bytes: capacity_bytes(shape, config.bit_depth, &config.channels),
        total_slots: shape.pixels() * config.channels.len(),
        header_slots: slots_for(FrameHeader::SIZE, config.bit_depth.bits()),
        bit_depth: config.bit_depth.bits(),
        channels: config.channels.clone(),
    })
}

/// Figures reported after a successful embed
#[derive(Debug, Clone, Serialize)]
pub struct EmbedMetrics {
    pub capacity_bytes: usize,
    pub payload_size: usize,
    pub efficiency: f64,
    pub psnr: f64,
    pub ssim: f64,
    pub bit_depth: u8,
    pub channels: ChannelSet,
}

/// A new stego grid plus its metrics; the carrier passed in is left untouched
#[derive(Debug, Clone)]
pub struct EmbedOutcome {
    pub grid: PixelGrid,
    pub metrics: EmbedMetrics,
}

pub fn embed(carrier: &PixelGrid, payload: &[u8], config: &EmbeddingConfig) -> Result<EmbedOutcome> {
    config.validate()?;
    let depth = config.bit_depth.bits();
    let capacity = capacity_bytes(carrier.shape(), config.bit_depth, &config.channels);
    if payload.len() > capacity {
        return Err(StegoError::CapacityExceeded {
            needed: payload.len(),
            capacity,
        });
    }

    let framed = match config.encryption_password() {
        Some(password) => {
            let sealed = cipher::encrypt(payload, password)?;
            frame::frame_with_crc(&sealed, crc32fast::hash(payload))?
        }
        None => frame::frame(payload)?,
    };

    let header_slots = slots_for(FrameHeader::SIZE, depth);
    let body_slots = slots_for(framed.len() - FrameHeader::SIZE, depth);
    let schedule = PositionSchedule::new(carrier.shape(), &config.channels, config.password());
    let needed = header_slots + body_slots;
    if needed > schedule.len() {
        // Encryption overhead can push a payload that passed the capacity check past the carrier
        return Err(StegoError::CapacityExceeded {
            needed: (needed * depth as usize).div_ceil(8),
            capacity: (schedule.len() * depth as usize) / 8,
        });
    }
    debug!(
        header_slots,
        body_slots,
        total_slots = schedule.len(),
        "embedding frame"
    );

    let mut stego = carrier.clone();
    let header_values = pack(&framed[..FrameHeader::SIZE], depth);
    let body_values = pack(&framed[FrameHeader::SIZE..], depth);
    write_slots(&mut stego, schedule.range(0, header_slots)?, &header_values, config.bit_depth);
    write_slots(
        &mut stego,
        schedule.range(header_slots, body_slots)?,
        &body_values,
        config.bit_depth,
    );

    let quality = distortion(carrier, &stego);
    let metrics = EmbedMetrics {
        capacity_bytes: capacity,
        payload_size: payload.len(),
        efficiency: if capacity == 0 {
            0.0
        } else {
            payload.len() as f64 / capacity as f64
        },
        psnr: quality.psnr,
        ssim: quality.ssim,
        bit_depth: depth,
        channels: config.channels.clone(),
    };
    info!(
        payload = payload.len(),
        capacity,
        psnr = metrics.psnr,
        "payload embedded"
    );

    Ok(EmbedOutcome {
        grid: stego,
        metrics,
    })
}

pub fn extract(grid: &PixelGrid, config: &EmbeddingConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let depth = config.bit_depth.bits();
    let schedule = PositionSchedule::new(grid.shape(), &config.channels, config.password());

    let header_slots = slots_for(FrameHeader::SIZE, depth);
    if header_slots > schedule.len() {
        return Err(StegoError::InvalidFrame("carrier too small for a header".into()));
    }
    let header_bytes = unpack(
        &read_slots(grid, schedule.range(0, header_slots)?, config.bit_depth),
        depth,
        HEADER_BITS,
    );
    let header = frame::unframe(&header_bytes)?;

    let body_len = header.length as usize;
    let body_slots = slots_for(body_len, depth);
    if header_slots + body_slots > schedule.len() {
        return Err(StegoError::InvalidFrame(format!(
            "declared length {} exceeds carrier",
            body_len
        )));
    }
    debug!(body_len, body_slots, "frame header located");
    let body = unpack(
        &read_slots(
            grid,
            schedule.range(header_slots, body_slots)?,
            config.bit_depth,
        ),
        depth,
        body_len * 8,
    );

    let plaintext = match config.encryption_password() {
        Some(password) => cipher::decrypt(&body, password)?,
        None => body,
    };
    frame::verify(&header, &plaintext)?;
    info!(payload = plaintext.len(), "payload extracted");
    Ok(plaintext)
}

fn write_slots(grid: &mut PixelGrid, slots: &[SlotAddress], values: &[u8], depth: BitDepth) {
    let mask = depth.mask();
    for (slot, &value) in slots.iter().zip(values) {
        let (row, col, ch) = (slot.row as usize, slot.col as usize, slot.channel as usize);
        let sample = grid.get(row, col, ch);
        grid.set(row, col, ch, (sample & !mask) | (value & mask));
    }
}

fn read_slots(grid: &PixelGrid, slots: &[SlotAddress], depth: BitDepth) -> Vec<u8> {
    let mask = depth.mask();
    slots
        .iter()
        .map(|slot| grid.get(slot.row as usize, slot.col as usize, slot.channel as usize) & mask)
        .collect()
}

/// Advisory classification of an extracted payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    Text(String),
    Binary(Vec<u8>),
}

impl PayloadKind {
    pub fn classify(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Binary(err.into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Channel;

    fn noise(height: usize, width: usize) -> PixelGrid {
        let mut state = 0x2545_F491u32;
        PixelGrid::from_fn(height, width, |_, _| {
            let mut px = [0u8; 3];
            for v in &mut px {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                *v = state as u8;
            }
            px
        })
    }

    fn config(depth: BitDepth, password: Option<&str>, encrypt: bool) -> EmbeddingConfig {
        EmbeddingConfig {
            bit_depth: depth,
            channels: ChannelSet::all(),
            password: password.map(String::from),
            encrypt,
        }
    }

    #[test]
    fn test_capacity_formula() {
        let shape = GridShape {
            height: 100,
            width: 100,
            channels: 3,
        };
        let all = ChannelSet::all();
        let red = ChannelSet::new([Channel::Red]).unwrap();
        assert_eq!(capacity_bytes(shape, BitDepth::One, &all), (30_000 - 128) / 8);
        assert_eq!(capacity_bytes(shape, BitDepth::Two, &all), (60_000 - 128) / 8);
        assert_eq!(capacity_bytes(shape, BitDepth::One, &red), (10_000 - 128) / 8);
    }

    #[test]
    fn test_capacity_of_tiny_carrier_is_zero() {
        let shape = GridShape {
            height: 4,
            width: 4,
            channels: 3,
        };
        assert_eq!(capacity_bytes(shape, BitDepth::One, &ChannelSet::all()), 0);
    }

    #[test]
    fn test_roundtrip_plain() {
        let carrier = noise(32, 32);
        for depth in [BitDepth::One, BitDepth::Two] {
            let cfg = config(depth, None, false);
            let out = embed(&carrier, b"Hello, StegoLab!", &cfg).unwrap();
            assert_eq!(extract(&out.grid, &cfg).unwrap(), b"Hello, StegoLab!");
        }
    }

    #[test]
    fn test_embed_leaves_carrier_untouched() {
        let carrier = noise(16, 16);
        let before = carrier.clone();
        let out = embed(&carrier, b"data", &config(BitDepth::Two, Some("pw"), false)).unwrap();
        assert_eq!(carrier, before);
        assert_ne!(out.grid, carrier);
    }

    #[test]
    fn test_only_low_bits_change() {
        let carrier = noise(16, 16);
        let out = embed(&carrier, b"low bits only", &config(BitDepth::Two, None, false)).unwrap();
        for (a, b) in carrier.samples().iter().zip(out.grid.samples()) {
            assert_eq!(a & !0b11, b & !0b11);
        }
    }

    #[test]
    fn test_unselected_channels_untouched() {
        let carrier = noise(16, 16);
        let cfg = EmbeddingConfig {
            channels: ChannelSet::new([Channel::Green]).unwrap(),
            ..Default::default()
        };
        let out = embed(&carrier, b"green only", &cfg).unwrap();
        let before = carrier.channel_plane(Channel::Red);
        assert_eq!(out.grid.channel_plane(Channel::Red), before);
        assert_eq!(
            out.grid.channel_plane(Channel::Blue),
            carrier.channel_plane(Channel::Blue)
        );
        assert_eq!(extract(&out.grid, &cfg).unwrap(), b"green only");
    }

    #[test]
    fn test_capacity_boundary() {
        let carrier = noise(16, 16);
        let cfg = config(BitDepth::One, None, false);
        let capacity = capacity_bytes(carrier.shape(), cfg.bit_depth, &cfg.channels);
        let exact = vec![0xA5u8; capacity];
        let out = embed(&carrier, &exact, &cfg).unwrap();
        assert_eq!(extract(&out.grid, &cfg).unwrap(), exact);

        let over = vec![0xA5u8; capacity + 1];
        assert!(matches!(
            embed(&carrier, &over, &cfg),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_encryption_overhead_can_exceed_schedule() {
        let carrier = noise(16, 16);
        let cfg = config(BitDepth::One, Some("pw"), true);
        let capacity = capacity_bytes(carrier.shape(), cfg.bit_depth, &cfg.channels);
        let result = embed(&carrier, &vec![1u8; capacity], &cfg);
        assert!(matches!(result, Err(StegoError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_metrics_reported() {
        let carrier = noise(32, 32);
        let out = embed(&carrier, b"metrics", &config(BitDepth::One, None, false)).unwrap();
        let m = &out.metrics;
        assert_eq!(m.payload_size, 7);
        assert_eq!(m.capacity_bytes, (32 * 32 * 3 - 128) / 8);
        assert!((m.efficiency - 7.0 / m.capacity_bytes as f64).abs() < 1e-12);
        assert!(m.psnr > 50.0);
        assert!(m.ssim > 0.99);
        assert_eq!(m.bit_depth, 1);
    }

    #[test]
    fn test_unembedded_carrier_has_no_frame() {
        let carrier = PixelGrid::from_fn(16, 16, |_, _| [0, 0, 0]);
        assert!(matches!(
            extract(&carrier, &config(BitDepth::One, None, false)),
            Err(StegoError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_empty_payload() {
        let carrier = noise(16, 16);
        let cfg = config(BitDepth::One, Some("pw"), false);
        let out = embed(&carrier, b"", &cfg).unwrap();
        assert!(extract(&out.grid, &cfg).unwrap().is_empty());
    }

    #[test]
    fn test_classify_payload() {
        assert_eq!(
            PayloadKind::classify(b"plain text".to_vec()),
            PayloadKind::Text("plain text".into())
        );
        assert_eq!(
            PayloadKind::classify(vec![0xFF, 0xFE, 0x00]),
            PayloadKind::Binary(vec![0xFF, 0xFE, 0x00])
        );
    }
}
