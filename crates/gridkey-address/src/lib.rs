//! Address derivation for candidate keys.
//!
//! A 32-byte candidate is interpreted as a big-endian secp256k1 private
//! scalar; its public key is hashed (SHA-256 then RIPEMD-160) and encoded as
//! a version-0 Base58Check address, in both compressed and uncompressed form.

pub mod base58;
pub mod derive;
pub mod target;

pub use derive::{
    AddressFormat, KeyDeriver, P2PKH_VERSION, P2pkhDeriver, base58check_decode,
    base58check_encode, derive_address, hash160, serialize_public_key,
};
pub use target::TargetAddress;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Lowercase hex, two digits per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0F)]));
    }
    out
}

/// Inverse of [`encode_hex`]; accepts either case. `None` on odd length or a
/// non-hex digit.
pub fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let high = char::from(pair[0]).to_digit(16)?;
            let low = char::from(pair[1]).to_digit(16)?;
            Some((high * 16 + low) as u8)
        })
        .collect()
}
