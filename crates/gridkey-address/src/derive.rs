//! Private scalar → secp256k1 public key → hash160 → Base58Check address.

use gridkey_error::{GridKeyError, Result};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::base58;

/// Version byte of a mainnet pay-to-pubkey-hash address.
pub const P2PKH_VERSION: u8 = 0x00;

const CHECKSUM_LEN: usize = 4;

/// Public key serialization used for the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFormat {
    Compressed,
    Uncompressed,
}

impl AddressFormat {
    pub const ALL: [Self; 2] = [Self::Compressed, Self::Uncompressed];

    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compressed => "compressed",
            Self::Uncompressed => "uncompressed",
        }
    }
}

/// RIPEMD-160 of SHA-256.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(data));
    [digest[0], digest[1], digest[2], digest[3]]
}

pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    base58::encode(&data)
}

/// Returns `(version, payload)` after verifying the checksum.
pub fn base58check_decode(text: &str) -> Result<(u8, Vec<u8>)> {
    let invalid = |detail: String| GridKeyError::InvalidAddress {
        address: text.to_owned(),
        detail,
    };
    let data = base58::decode(text).map_err(|err| invalid(err.to_string()))?;
    if data.len() <= CHECKSUM_LEN {
        return Err(invalid(format!(
            "decodes to {} bytes, too short to carry a checksum",
            data.len()
        )));
    }
    let (body, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(body).as_slice() != check {
        return Err(invalid("checksum mismatch".to_owned()));
    }
    Ok((body[0], body[1..].to_vec()))
}

/// Uncompressed affine coordinates of `scalar · G`.
fn public_point(scalar: &[u8; 32]) -> Result<([u8; 32], [u8; 32])> {
    let secret =
        SecretKey::from_bytes(&FieldBytes::from(*scalar)).map_err(|_| GridKeyError::InvalidScalar)?;
    let point = secret.public_key().to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(GridKeyError::InvalidScalar);
    };
    Ok(((*x).into(), (*y).into()))
}

/// SEC1 encoding: `02|03 ‖ X` or `04 ‖ X ‖ Y`.
pub fn serialize_public_key(x: &[u8; 32], y: &[u8; 32], format: AddressFormat) -> Vec<u8> {
    match format {
        AddressFormat::Compressed => {
            let prefix = if y[31] & 1 == 0 { 0x02 } else { 0x03 };
            let mut out = Vec::with_capacity(33);
            out.push(prefix);
            out.extend_from_slice(x);
            out
        }
        AddressFormat::Uncompressed => {
            let mut out = Vec::with_capacity(65);
            out.push(0x04);
            out.extend_from_slice(x);
            out.extend_from_slice(y);
            out
        }
    }
}

fn encode_address(x: &[u8; 32], y: &[u8; 32], format: AddressFormat) -> String {
    let pubkey = serialize_public_key(x, y, format);
    base58check_encode(P2PKH_VERSION, &hash160(&pubkey))
}

/// The P2PKH address controlled by `scalar`.
///
/// Fails with [`GridKeyError::InvalidScalar`] when the value is zero or not
/// below the curve order.
pub fn derive_address(scalar: &[u8; 32], compressed: bool) -> Result<String> {
    let (x, y) = public_point(scalar)?;
    let format = if compressed {
        AddressFormat::Compressed
    } else {
        AddressFormat::Uncompressed
    };
    Ok(encode_address(&x, &y, format))
}

/// Key-to-address seam used by the search orchestrator.
pub trait KeyDeriver: Sync {
    fn derive(&self, scalar: &[u8; 32], compressed: bool) -> Result<String>;

    /// Addresses in [`AddressFormat::ALL`] order.
    fn derive_all(&self, scalar: &[u8; 32]) -> Result<[String; 2]> {
        Ok([self.derive(scalar, true)?, self.derive(scalar, false)?])
    }
}

/// Production deriver; multiplies the curve point once per scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct P2pkhDeriver;

impl KeyDeriver for P2pkhDeriver {
    fn derive(&self, scalar: &[u8; 32], compressed: bool) -> Result<String> {
        derive_address(scalar, compressed)
    }

    fn derive_all(&self, scalar: &[u8; 32]) -> Result<[String; 2]> {
        let (x, y) = public_point(scalar)?;
        Ok(AddressFormat::ALL.map(|format| encode_address(&x, &y, format)))
    }
}
