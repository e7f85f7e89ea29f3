//! Validated search target.

use std::fmt;
use std::str::FromStr;

use gridkey_error::{GridKeyError, Result};

use crate::derive::{P2PKH_VERSION, base58check_decode};

/// A well-formed Base58Check P2PKH address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetAddress {
    text: String,
    hash: [u8; 20],
}

impl TargetAddress {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = |detail: String| GridKeyError::InvalidAddress {
            address: text.to_owned(),
            detail,
        };
        let (version, payload) = base58check_decode(text)?;
        if version != P2PKH_VERSION {
            return Err(invalid(format!(
                "version byte {version:#04x} is not pay-to-pubkey-hash"
            )));
        }
        let hash: [u8; 20] = payload
            .try_into()
            .map_err(|payload: Vec<u8>| invalid(format!("payload is {} bytes, expected 20", payload.len())))?;
        Ok(Self {
            text: text.to_owned(),
            hash,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn hash160(&self) -> &[u8; 20] {
        &self.hash
    }

    pub fn matches(&self, address: &str) -> bool {
        self.text == address
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for TargetAddress {
    type Err = GridKeyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
