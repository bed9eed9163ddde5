//! Reversible obfuscation for the locally stored API key.
//!
//! This is not encryption. The key is fixed and ships with every build, so
//! anyone with the stored text can recover the credential. The codec only
//! keeps the key from sitting on disk as plain text.
//!
//! Each character is XORed with the key byte at the same cyclic position and
//! written as two lowercase hex digits.

use hex::{FromHex, FromHexError};

const OBFUSCATION_KEY: &[u8] = b"PhaseNavigatorKey";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Character {ch:?} at position {index} does not fit in one byte")]
    Unencodable { ch: char, index: usize },

    #[error("Encoded text has odd length {len}")]
    OddLength { len: usize },

    #[error("Invalid hex pair at offset {offset}")]
    InvalidHex { offset: usize },
}

#[inline]
fn key_byte(index: usize) -> u8 {
    OBFUSCATION_KEY[index % OBFUSCATION_KEY.len()]
}

pub fn encode(plaintext: &str) -> Result<String, CodecError> {
    let bytes = plaintext
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            u8::try_from(u32::from(ch))
                .map(|code| code ^ key_byte(index))
                .map_err(|_| CodecError::Unencodable { ch, index })
        })
        .collect::<Result<Vec<u8>, _>>()?;
    Ok(hex::encode(bytes))
}

pub fn decode(ciphertext: &str) -> Result<String, CodecError> {
    let cipher = Vec::<u8>::from_hex(ciphertext).map_err(|err| match err {
        FromHexError::InvalidHexCharacter { index, .. } => CodecError::InvalidHex {
            offset: index - index % 2,
        },
        _ => CodecError::OddLength {
            len: ciphertext.len(),
        },
    })?;

    Ok(cipher
        .iter()
        .enumerate()
        .map(|(index, byte)| char::from(byte ^ key_byte(index)))
        .collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn printable_ascii_round_trips(s in "[ -~]{0,96}") {
            let encoded = encode(&s).unwrap();
            prop_assert_eq!(encoded.len(), s.len() * 2);
            prop_assert_eq!(decode(&encoded).unwrap(), s);
        }
    }
}
