use crate::config::ChannelSet;
use crate::error::{Result, StegoError};
use crate::grid::GridShape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha3::{Digest, Sha3_256};

/// One addressable sample: pixel row, pixel column and channel index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    pub row: u32,
    pub col: u32,
    pub channel: u8,
}

/// Ordered list of every (row, col, channel) slot of a grid.
///
/// Without a password the order is raster: row-major, then channel-ascending.
/// With a password the raster order is Fisher-Yates shuffled by a ChaCha20
/// generator seeded from the password, so embed and extract walk the same
/// permutation as long as shape, channels and password agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSchedule {
    slots: Vec<SlotAddress>,
}

impl PositionSchedule {
    pub fn new(shape: GridShape, channels: &ChannelSet, password: Option<&str>) -> Self {
        let mut slots = Vec::with_capacity(shape.pixels() * channels.len());
        for row in 0..shape.height {
            for col in 0..shape.width {
                for channel in channels.iter() {
                    slots.push(SlotAddress {
                        row: row as u32,
                        col: col as u32,
                        channel: channel.index() as u8,
                    });
                }
            }
        }

        if let Some(password) = password.filter(|p| !p.is_empty()) {
            shuffle(&mut slots, password_seed(password));
        }

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[SlotAddress] {
        &self.slots
    }

    /// Contiguous sub-range `[offset, offset + count)` of the permutation
    pub fn range(&self, offset: usize, count: usize) -> Result<&[SlotAddress]> {
        let end = offset
            .checked_add(count)
            .filter(|&end| end <= self.slots.len())
            .ok_or(StegoError::InvalidSchedule {
                offset,
                count,
                len: self.slots.len(),
            })?;
        Ok(&self.slots[offset..end])
    }
}

/// 32-bit shuffle seed: the first four bytes of SHA3-256(password), big-endian
pub fn password_seed(password: &str) -> u32 {
    let digest = Sha3_256::digest(password.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Fisher-Yates shuffle. Draws are made as `u32` so the sequence does not
/// depend on the platform's pointer width.
fn shuffle(slots: &mut [SlotAddress], seed: u32) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
    for i in (1..slots.len()).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        slots.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Channel;

    fn shape(height: usize, width: usize) -> GridShape {
        GridShape {
            height,
            width,
            channels: 3,
        }
    }

    #[test]
    fn test_raster_order_without_password() {
        let channels = ChannelSet::new([Channel::Blue, Channel::Red]).unwrap();
        let schedule = PositionSchedule::new(shape(2, 2), &channels, None);
        let first: Vec<(u32, u32, u8)> = schedule.slots()[..4]
            .iter()
            .map(|s| (s.row, s.col, s.channel))
            .collect();
        assert_eq!(first, vec![(0, 0, 0), (0, 0, 2), (0, 1, 0), (0, 1, 2)]);
        assert_eq!(schedule.len(), 8);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let channels = ChannelSet::all();
        let a = PositionSchedule::new(shape(16, 16), &channels, Some("hunter2"));
        let b = PositionSchedule::new(shape(16, 16), &channels, Some("hunter2"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let channels = ChannelSet::all();
        let raster = PositionSchedule::new(shape(8, 8), &channels, None);
        let shuffled = PositionSchedule::new(shape(8, 8), &channels, Some("pw"));
        assert_ne!(raster, shuffled);

        let mut sorted = shuffled.slots().to_vec();
        sorted.sort_by_key(|s| (s.row, s.col, s.channel));
        assert_eq!(sorted, raster.slots());
    }

    #[test]
    fn test_passwords_give_different_orders() {
        let channels = ChannelSet::all();
        let a = PositionSchedule::new(shape(8, 8), &channels, Some("alpha"));
        let b = PositionSchedule::new(shape(8, 8), &channels, Some("beta"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_password_is_raster() {
        let channels = ChannelSet::all();
        let raster = PositionSchedule::new(shape(4, 4), &channels, None);
        let empty = PositionSchedule::new(shape(4, 4), &channels, Some(""));
        assert_eq!(raster, empty);
    }

    #[test]
    fn test_range_bounds() {
        let schedule = PositionSchedule::new(shape(2, 2), &ChannelSet::all(), None);
        assert_eq!(schedule.range(0, 12).unwrap().len(), 12);
        assert_eq!(schedule.range(4, 0).unwrap().len(), 0);
        assert!(matches!(
            schedule.range(10, 3),
            Err(StegoError::InvalidSchedule { len: 12, .. })
        ));
        assert!(schedule.range(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_password_seed_stable() {
        assert_eq!(password_seed("pw"), password_seed("pw"));
        assert_ne!(password_seed("pw"), password_seed("pW"));
    }
}
