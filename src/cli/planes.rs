use crate::codec::{encode_grey_png, read_image};
use crate::config::Channel;
use crate::detect::bit_plane_image;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write all eight bit planes of each colour channel as greyscale PNGs named
/// `<stem>_<channel>_bit<b>.png`. Returns the written paths.
pub fn export_bit_planes(input_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let grid = read_image(input_path)?;
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(Channel::ALL.len() * 8);
    for channel in Channel::ALL {
        let plane = grid.channel_plane(channel);
        for bit in 0..8u8 {
            let png = encode_grey_png(plane.height, plane.width, bit_plane_image(&plane, bit))?;
            let path = output_dir.join(format!("{}_{}_bit{}.png", stem, channel.name(), bit));
            std::fs::write(&path, png)?;
            debug!(path = %path.display(), "wrote bit plane");
            written.push(path);
        }
    }
    Ok(written)
}
