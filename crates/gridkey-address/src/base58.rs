//! Base58 with the Bitcoin alphabet.
//!
//! Numbers are big-endian. Every leading zero byte maps to one leading `'1'`
//! and back, so the encoding is length-preserving for zero prefixes.

use std::fmt;

pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Rejected Base58 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    pub character: char,
    pub position: usize,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid base58 character {:?} at position {}",
            self.character, self.position
        )
    }
}

impl std::error::Error for DecodeError {}

pub fn encode(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();

    // Little-endian base-58 digits.
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 138 / 100 + 1);
    for &byte in &bytes[zeros..] {
        let mut carry = u32::from(byte);
        for digit in &mut digits {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat_n('1', zeros));
    out.extend(
        digits
            .iter()
            .rev()
            .map(|&digit| char::from(ALPHABET[usize::from(digit)])),
    );
    out
}

pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    let zeros = text.bytes().take_while(|&c| c == b'1').count();

    // Little-endian base-256 bytes.
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len() * 733 / 1000 + 1);
    for (position, character) in text.char_indices().skip(zeros) {
        let value = digit_value(character).ok_or(DecodeError {
            character,
            position,
        })?;
        let mut carry = u32::from(value);
        for byte in &mut bytes {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0_u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

fn digit_value(character: char) -> Option<u8> {
    let byte = u8::try_from(character).ok()?;
    ALPHABET
        .iter()
        .position(|&c| c == byte)
        .and_then(|index| u8::try_from(index).ok())
}
