use crate::error::{Result, StegoError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of low bits replaced in each carrier sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    #[default]
    One,
    Two,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Mask covering the replaced low bits of a sample
    pub fn mask(self) -> u8 {
        (1u8 << self.bits()) - 1
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;
    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(StegoError::InvalidConfig(format!(
                "bit depth must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> u8 {
        depth.bits()
    }
}

impl std::str::FromStr for BitDepth {
    type Err = StegoError;
    fn from_str(s: &str) -> Result<Self> {
        let bits: u8 = s
            .trim()
            .parse()
            .map_err(|_| StegoError::InvalidConfig(format!("bit depth: {}", s)))?;
        Self::try_from(bits)
    }
}

/// Colour channel of a carrier sample. Alpha is never addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Interleaved sample index of this channel
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Channel {
    type Err = StegoError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "blue" | "b" => Ok(Self::Blue),
            other => Err(StegoError::InvalidConfig(format!("channel: {}", other))),
        }
    }
}

/// Non-empty, sorted, de-duplicated set of channels.
///
/// Ordering is channel-ascending so that raster enumeration of a schedule is
/// independent of how the caller listed the channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSet(Vec<Channel>);

impl ChannelSet {
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Result<Self> {
        let mut channels: Vec<Channel> = channels.into_iter().collect();
        channels.sort();
        channels.dedup();
        if channels.is_empty() {
            return Err(StegoError::InvalidConfig("channel set is empty".into()));
        }
        Ok(Self(channels))
    }

    pub fn all() -> Self {
        Self(Channel::ALL.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Channel] {
        &self.0
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.name()).collect();
        f.write_str(&names.join(","))
    }
}

impl std::str::FromStr for ChannelSet {
    type Err = StegoError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "all" | "rgb" => Ok(Self::all()),
            list => {
                let channels = list
                    .split(',')
                    .filter(|part| !part.trim().is_empty())
                    .map(str::parse)
                    .collect::<Result<Vec<Channel>>>()?;
                Self::new(channels)
            }
        }
    }
}

impl Serialize for ChannelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChannelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let channels = Vec::<Channel>::deserialize(deserializer)?;
        Self::new(channels).map_err(serde::de::Error::custom)
    }
}

/// Options shared by embed and extract. Both sides must agree on every field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub bit_depth: BitDepth,
    pub channels: ChannelSet,
    pub password: Option<String>,
    pub encrypt: bool,
}

impl EmbeddingConfig {
    /// Load a config from JSON and validate it
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(StegoError::InvalidConfig("channel set is empty".into()));
        }
        Ok(())
    }

    /// Password used for permutation and encryption; an empty string counts as absent
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Encryption only applies when a password is also present
    pub fn encryption_password(&self) -> Option<&str> {
        if self.encrypt {
            self.password()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_parsing() {
        assert_eq!("1".parse::<BitDepth>().unwrap(), BitDepth::One);
        assert_eq!("2".parse::<BitDepth>().unwrap(), BitDepth::Two);
        assert!(matches!(
            "3".parse::<BitDepth>(),
            Err(StegoError::InvalidConfig(_))
        ));
        assert!("two".parse::<BitDepth>().is_err());
        assert_eq!(BitDepth::Two.mask(), 0b11);
    }

    #[test]
    fn test_channel_set_sorted_and_deduplicated() {
        let set: ChannelSet = "blue,red,blue".parse().unwrap();
        assert_eq!(set.as_slice(), &[Channel::Red, Channel::Blue]);
        assert_eq!(set.to_string(), "red,blue");
    }

    #[test]
    fn test_channel_set_auto() {
        let set: ChannelSet = "auto".parse().unwrap();
        assert_eq!(set, ChannelSet::all());
    }

    #[test]
    fn test_empty_channel_set_rejected() {
        assert!(matches!(
            ChannelSet::new(Vec::new()),
            Err(StegoError::InvalidConfig(_))
        ));
        assert!("".parse::<ChannelSet>().is_err());
        assert!("red,purple".parse::<ChannelSet>().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = br#"{"bit_depth": 2, "channels": ["green", "red"], "password": "pw", "encrypt": true}"#;
        let config = EmbeddingConfig::from_json(json).unwrap();
        assert_eq!(config.bit_depth, BitDepth::Two);
        assert_eq!(config.channels.as_slice(), &[Channel::Red, Channel::Green]);
        assert_eq!(config.encryption_password(), Some("pw"));
    }

    #[test]
    fn test_config_json_rejects_bad_values() {
        assert!(EmbeddingConfig::from_json(br#"{"bit_depth": 3}"#).is_err());
        assert!(EmbeddingConfig::from_json(br#"{"channels": []}"#).is_err());
    }

    #[test]
    fn test_encrypt_without_password_is_plain() {
        let config = EmbeddingConfig {
            encrypt: true,
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.password(), None);
        assert_eq!(config.encryption_password(), None);
    }
}
