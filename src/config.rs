use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::{self, KeyPair, DEFAULT_KEY_BITS};

fn default_bits() -> usize {
    DEFAULT_KEY_BITS
}

/// Location and size of a PEM key pair on disk.
///
/// The configuration only names files; loaded keys are passed explicitly to
/// the cipher functions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyFileConfig {
    /// Path of the `RSA PRIVATE KEY` PEM file
    pub private_key_path: PathBuf,
    /// Path of the `RSA PUBLIC KEY` PEM file
    pub public_key_path: PathBuf,
    /// Modulus size used by [`KeyFileConfig::generate`]
    #[serde(default = "default_bits")]
    pub bits: usize,
}

impl KeyFileConfig {
    pub fn new(private_key_path: impl Into<PathBuf>, public_key_path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: public_key_path.into(),
            bits: DEFAULT_KEY_BITS,
        }
    }

    pub fn with_bits(mut self, bits: usize) -> Self {
        self.bits = bits;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a key pair of `bits` bits and write it to the configured paths.
    pub fn generate(&self) -> Result<KeyPair> {
        keys::generate_key_pair(self.bits, &self.private_key_path, &self.public_key_path)
    }

    /// Load both halves from the configured paths.
    pub fn load(&self) -> Result<KeyPair> {
        let private_key = keys::load_private_key(&self.private_key_path)?;
        let public_key = keys::load_public_key(&self.public_key_path)?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }
}
