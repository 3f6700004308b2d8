use crate::error::{Result, StegoError};

/// Frame magic, ASCII "STEG"
pub const MAGIC: [u8; 4] = *b"STEG";

/// Frame header - never encrypted
/// Layout (big-endian): [magic: 4][length: 4][crc32: 4][reserved: 4]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Byte length of the frame body that follows the header
    pub length: u32,
    /// CRC-32 of the plaintext payload
    pub crc: u32,
}

impl FrameHeader {
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&self.length.to_be_bytes());
        buf[8..12].copy_from_slice(&self.crc.to_be_bytes());
        // reserved stays zero
        buf
    }

    /// Parse a header; the reserved word is not checked
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != Self::SIZE {
            return Err(StegoError::InvalidFrame(format!(
                "header must be {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }
        if data[0..4] != MAGIC {
            return Err(StegoError::InvalidFrame("header not found or corrupted".into()));
        }
        Ok(Self {
            length: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            crc: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
        })
    }
}

/// Frame a plaintext payload; the CRC covers the payload itself
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    frame_with_crc(payload, crc32fast::hash(payload))
}

/// Frame `body` with a caller-supplied CRC. Used when the body is ciphertext
/// and the CRC must cover the plaintext it decrypts to.
pub fn frame_with_crc(body: &[u8], crc: u32) -> Result<Vec<u8>> {
    let length = u32::try_from(body.len()).map_err(|_| StegoError::CapacityExceeded {
        needed: body.len(),
        capacity: u32::MAX as usize,
    })?;
    let header = FrameHeader { length, crc };
    let mut out = Vec::with_capacity(FrameHeader::SIZE + body.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(body);
    Ok(out)
}

/// Parse a raw 16-byte header into (length, crc)
pub fn unframe(header: &[u8]) -> Result<FrameHeader> {
    FrameHeader::from_bytes(header)
}

/// Compare the stored CRC against the recovered plaintext
pub fn verify(header: &FrameHeader, plaintext: &[u8]) -> Result<()> {
    let actual = crc32fast::hash(plaintext);
    if actual != header.crc {
        return Err(StegoError::IntegrityError {
            expected: header.crc,
            actual,
        });
    }
    Ok(())
}
