//! Stegolab - LSB image steganography and steganalysis
//!
//! Hides a byte payload in the low bits of an 8-bit RGB(A) raster and
//! recovers it later; separately, estimates how likely an arbitrary image
//! is to carry such a payload.
//!
//! ## Embedding Pipeline
//!
//! ```text
//! Payload → [Encrypt] → Frame → Pack → Schedule → Write low bits → Stego grid
//! ```
//!
//! - **Encrypt**: ChaCha20-Poly1305 under a PBKDF2-SHA256 key (optional)
//! - **Frame**: 16-byte header with magic, length and CRC-32 of the plaintext
//! - **Pack**: bytes split MSB-first into 1- or 2-bit symbols
//! - **Schedule**: raster order, or a password-seeded permutation of it
//! - **Write**: each symbol replaces the low bits of one sample
//!
//! Extraction runs the same steps backwards and checks the CRC last.
//!
//! ## Steganalysis
//!
//! Chi-square, sample-pair and bit-plane detectors run on each colour
//! channel; [`aggregate::analyze`] folds them into a confidence in `[0, 1]`
//! with a short explanation.
//!
//! ## Example
//!
//! ```no_run
//! use stegolab::{embed, extract, EmbeddingConfig, PixelGrid};
//!
//! let carrier = PixelGrid::from_fn(64, 64, |r, c| [r as u8, c as u8, 128]);
//! let config = EmbeddingConfig {
//!     password: Some("hunter2".into()),
//!     encrypt: true,
//!     ..Default::default()
//! };
//! let outcome = embed(&carrier, b"meet at noon", &config).unwrap();
//! let payload = extract(&outcome.grid, &config).unwrap();
//! assert_eq!(payload, b"meet at noon");
//! ```

pub mod aggregate;
pub mod cli;
pub mod codec;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod frame;
pub mod grid;
pub mod logger;
pub mod metrics;
pub mod pipeline;

pub use aggregate::{aggregate, analyze, AggregateResult, AnalysisReport};
pub use codec::{ImageCodec, LosslessCodec};
pub use config::{BitDepth, Channel, ChannelSet, EmbeddingConfig};
pub use detect::ChannelReport;
pub use engine::{
    capacity_bytes, capacity_report, embed, extract, CapacityReport, EmbedMetrics, EmbedOutcome,
    PayloadKind,
};
pub use error::{Result, StegoError};
pub use grid::{ChannelPlane, GridShape, PixelGrid};
