// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte ⇄ hex-token conversion.
//!
//! Each byte becomes one lowercase two-character token (`0x08` → `"08"`).
//! Decoding also accepts the `0x`-prefixed, unpadded form (`"0x8"`) found
//! in descriptors produced by earlier tooling.

use crate::SessionConfigError;

/// Encodes each byte as a two-character lowercase hex token.
pub fn encode_tokens(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes hex tokens back into bytes.
pub fn decode_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>, SessionConfigError> {
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let raw = token.as_ref();
            let digits = raw
                .strip_prefix("0x")
                .or_else(|| raw.strip_prefix("0X"))
                .unwrap_or(raw);
            let well_formed =
                (1..=2).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_hexdigit());
            if !well_formed {
                return Err(SessionConfigError::InvalidToken {
                    index,
                    token: raw.to_string(),
                });
            }
            u8::from_str_radix(digits, 16).map_err(|_| SessionConfigError::InvalidToken {
                index,
                token: raw.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_to_two_chars() {
        assert_eq!(encode_tokens(&[0x08, 0xd3, 0x00, 0xff]), vec!["08", "d3", "00", "ff"]);
    }

    #[test]
    fn test_decode_accepts_prefixed_tokens() {
        let tokens = ["0x10", "0x8", "2a", "0XFF"];
        assert_eq!(decode_tokens(&tokens).unwrap(), vec![0x10, 0x08, 0x2a, 0xff]);
    }

    #[test]
    fn test_decode_rejects_bad_tokens() {
        for bad in ["", "0x", "123", "zz", "+1", "0x1g"] {
            let err = decode_tokens(&["00", bad]).unwrap_err();
            assert!(
                matches!(err, SessionConfigError::InvalidToken { index: 1, .. }),
                "token {bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_empty() {
        assert!(encode_tokens(&[]).is_empty());
        assert!(decode_tokens::<&str>(&[]).unwrap().is_empty());
    }
}
