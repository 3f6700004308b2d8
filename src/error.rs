use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image codec error: {0}")]
    Image(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Payload too large: {needed} bytes > {capacity} bytes capacity")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Invalid stego image: {0}")]
    InvalidFrame(String),

    #[error("Payload corruption detected: CRC32 mismatch (header {expected:08x}, payload {actual:08x})")]
    IntegrityError { expected: u32, actual: u32 },

    #[error("Decryption failed: wrong password or corrupted payload")]
    DecryptionFailure,

    #[error("Unsupported carrier format: {0}")]
    UnsupportedFormat(String),

    #[error("Schedule range {offset}..{} exceeds {len} slots", .offset + .count)]
    InvalidSchedule {
        offset: usize,
        count: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, StegoError>;
