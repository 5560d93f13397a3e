use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default number of draws before generation gives up.
pub const DEFAULT_RETRIES: u32 = 1000;

/// Default byte length of container ids.
pub const DEFAULT_ID_SIZE: u8 = 4;

/// Configuration for [`IdGenerator`](crate::IdGenerator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// How many random draws to try before reporting a timeout.
    pub retries: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
        }
    }
}

/// Configuration for [`IdContainer`](crate::IdContainer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Byte length of generated ids. Must be non-zero.
    pub id_size: u8,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            id_size: DEFAULT_ID_SIZE,
        }
    }
}

/// Top-level configuration, usually read from a TOML file:
///
/// ```toml
/// [generator]
/// retries = 1000
///
/// [container]
/// id_size = 4
/// ```
///
/// Missing sections and fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpathConfig {
    pub generator: GeneratorConfig,
    pub container: ContainerConfig,
}

impl IdpathConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
