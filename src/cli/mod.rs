pub mod analyze;
pub mod capacity;
pub mod embed;
pub mod extract;
pub mod planes;

pub use analyze::*;
pub use capacity::*;
pub use embed::*;
pub use extract::*;
pub use planes::*;

use crate::config::{BitDepth, ChannelSet, EmbeddingConfig};
use crate::error::Result;
use std::path::PathBuf;

/// Embedding options as given on the command line. Flags that are set
/// override the values loaded from `config_file`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bit_depth: Option<BitDepth>,
    pub channels: Option<ChannelSet>,
    pub password: Option<String>,
    pub encrypt: bool,
}

impl ConfigOverrides {
    pub fn resolve(&self) -> Result<EmbeddingConfig> {
        let mut config = match &self.config_file {
            Some(path) => EmbeddingConfig::from_json(&std::fs::read(path)?)?,
            None => EmbeddingConfig::default(),
        };
        if let Some(depth) = self.bit_depth {
            config.bit_depth = depth;
        }
        if let Some(channels) = &self.channels {
            config.channels = channels.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        config.encrypt |= self.encrypt;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Channel;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let config = ConfigOverrides::default().resolve().unwrap();
        assert_eq!(config, EmbeddingConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            br#"{"bit_depth": 2, "channels": ["red", "green"], "password": "from-file"}"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            config_file: Some(path),
            channels: Some("blue".parse().unwrap()),
            encrypt: true,
            ..Default::default()
        };
        let config = overrides.resolve().unwrap();
        assert_eq!(config.bit_depth, BitDepth::Two);
        assert_eq!(config.channels.as_slice(), &[Channel::Blue]);
        assert_eq!(config.password(), Some("from-file"));
        assert!(config.encrypt);
    }

    #[test]
    fn test_missing_config_file() {
        let overrides = ConfigOverrides {
            config_file: Some(PathBuf::from("/nonexistent/stegolab.json")),
            ..Default::default()
        };
        assert!(overrides.resolve().is_err());
    }
}
