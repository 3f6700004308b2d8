use crate::codec::{read_image, write_image};
use crate::config::EmbeddingConfig;
use crate::engine::{embed, EmbedMetrics};
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Hide `payload` in the carrier at `carrier_path` and write the stego PNG
/// to `output_path`
pub fn embed_into_image(
    carrier_path: &Path,
    payload: &[u8],
    output_path: &Path,
    config: &EmbeddingConfig,
) -> Result<EmbedMetrics> {
    let carrier = read_image(carrier_path)?;
    let outcome = embed(&carrier, payload, config)?;
    write_image(output_path, &outcome.grid)?;
    info!(output = %output_path.display(), "wrote stego image");
    Ok(outcome.metrics)
}

/// Human-readable summary of an embed
pub fn format_embed_metrics(output_path: &Path, metrics: &EmbedMetrics) -> String {
    let mut output = String::new();
    output.push_str(&format!("Embedded into {}\n", output_path.display()));
    output.push_str(&format!("  Payload:    {} bytes\n", metrics.payload_size));
    output.push_str(&format!("  Capacity:   {} bytes\n", metrics.capacity_bytes));
    output.push_str(&format!("  Efficiency: {:.2}%\n", metrics.efficiency * 100.0));
    output.push_str(&format!(
        "  Config:     {} bit(s) per sample, channels {}\n",
        metrics.bit_depth, metrics.channels
    ));
    if metrics.psnr.is_infinite() {
        output.push_str("  PSNR:       inf (carrier unchanged)\n");
    } else {
        output.push_str(&format!("  PSNR:       {:.2} dB\n", metrics.psnr));
    }
    output.push_str(&format!("  SSIM:       {:.6}\n", metrics.ssim));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_image;
    use crate::error::StegoError;
    use crate::grid::PixelGrid;
    use tempfile::tempdir;

    fn write_carrier(path: &Path, size: usize) {
        let grid = PixelGrid::from_fn(size, size, |r, c| {
            [(r * 7 + c) as u8, (r * 3 + c * 5) as u8, (r ^ c) as u8]
        });
        write_image(path, &grid).unwrap();
    }

    #[test]
    fn test_embed_writes_png() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.png");
        let output = dir.path().join("stego.png");
        write_carrier(&carrier, 32);

        let metrics =
            embed_into_image(&carrier, b"hello", &output, &EmbeddingConfig::default()).unwrap();
        assert_eq!(metrics.payload_size, 5);
        assert_eq!(metrics.capacity_bytes, (32 * 32 * 3 - 128) / 8);

        let original = read_image(&carrier).unwrap();
        let stego = read_image(&output).unwrap();
        assert_eq!(stego.shape(), original.shape());
        assert_ne!(stego, original);

        let summary = format_embed_metrics(&output, &metrics);
        assert!(summary.contains("Payload:    5 bytes"));
        assert!(summary.contains("red,green,blue"));
    }

    #[test]
    fn test_embed_too_large() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.png");
        let output = dir.path().join("stego.png");
        write_carrier(&carrier, 8);

        let result = embed_into_image(&carrier, &[0u8; 100], &output, &EmbeddingConfig::default());
        assert!(matches!(result, Err(StegoError::CapacityExceeded { .. })));
        assert!(!output.exists());
    }
}
