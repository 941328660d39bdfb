/// Encoding utilities for XRP Ledger identifiers
///
/// Account addresses and validator public keys are base58 strings under
/// the XRPL alphabet, carrying a one-byte type prefix and a four-byte
/// double-SHA-256 checksum. The domain attribute on an account root is
/// hex-encoded ASCII.
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::{Result, VouchError};

/// XRPL base58 dictionary. Note the zero digit is 'r', not '1'.
const ALPHABET: &[u8; 58] = b"rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

/// Type prefix of an account ID (the "r..." addresses).
const ACCOUNT_ID_PREFIX: u8 = 0x00;
/// Type prefix of a node/validator public key (the "n..." keys).
const NODE_PUBLIC_PREFIX: u8 = 0x1c;

const ACCOUNT_ID_LEN: usize = 20;
const NODE_PUBLIC_LEN: usize = 33;
const CHECKSUM_LEN: usize = 4;

fn digit(c: u8) -> Option<u32> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u32)
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let once = Sha256::digest(data);
    let twice = Sha256::digest(once);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&twice[..CHECKSUM_LEN]);
    out
}

/// Decode a raw base58 string under the XRPL alphabet.
fn base58_decode(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() {
        return None;
    }
    // Little-endian big-number accumulation.
    let mut num: Vec<u8> = Vec::new();
    for &c in s.as_bytes() {
        let mut carry = digit(c)?;
        for b in num.iter_mut() {
            carry += (*b as u32) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            num.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    // Each leading zero digit encodes one leading zero byte.
    let leading = s.bytes().take_while(|&c| c == ALPHABET[0]).count();
    let mut bytes = vec![0u8; leading];
    bytes.extend(num.iter().rev());
    Some(bytes)
}

/// Encode bytes as raw base58 under the XRPL alphabet.
fn base58_encode(bytes: &[u8]) -> String {
    let mut num = bytes.to_vec();
    let mut out: Vec<u8> = Vec::new();
    while num.iter().any(|&b| b != 0) {
        let mut rem = 0u32;
        for b in num.iter_mut() {
            let acc = (rem << 8) | *b as u32;
            *b = (acc / 58) as u8;
            rem = acc % 58;
        }
        out.push(ALPHABET[rem as usize]);
    }
    let leading = bytes.iter().take_while(|&&b| b == 0).count();
    out.extend(std::iter::repeat(ALPHABET[0]).take(leading));
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Decode a base58-check identifier, verifying checksum, type prefix and
/// payload length. Returns the payload without prefix or checksum.
pub fn decode_base58_check(s: &str, prefix: u8, payload_len: usize) -> Option<Vec<u8>> {
    let raw = base58_decode(s)?;
    if raw.len() != 1 + payload_len + CHECKSUM_LEN {
        return None;
    }
    let (body, check) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if checksum(body) != check {
        return None;
    }
    if body[0] != prefix {
        return None;
    }
    Some(body[1..].to_vec())
}

/// Encode a payload as a base58-check identifier with the given type prefix.
pub fn encode_base58_check(prefix: u8, payload: &[u8]) -> String {
    let mut body = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    body.push(prefix);
    body.extend_from_slice(payload);
    let check = checksum(&body);
    body.extend_from_slice(&check);
    base58_encode(&body)
}

/// Whether the string is a canonical account address.
pub fn is_account_address(address: &str) -> bool {
    decode_base58_check(address, ACCOUNT_ID_PREFIX, ACCOUNT_ID_LEN).is_some()
}

/// Derive the account address anchored by a validator public key.
///
/// The account ID is RIPEMD-160 over SHA-256 of the raw public key bytes,
/// re-encoded with the account type prefix. Fails when the key is not a
/// well-formed node public key, since no account can be resolved from it.
pub fn account_id_from_validation_key(key: &str) -> Result<String> {
    let pubkey = decode_base58_check(key, NODE_PUBLIC_PREFIX, NODE_PUBLIC_LEN)
        .ok_or_else(|| VouchError::InvalidAccountAddress(key.to_string()))?;
    let account_id = Ripemd160::digest(Sha256::digest(&pubkey));
    Ok(encode_base58_check(ACCOUNT_ID_PREFIX, &account_id))
}

/// Decode a hex-encoded domain attribute into text.
///
/// Malformed hex or non-UTF-8 bytes fail as an invalid domain: a corrupted
/// attribute cannot name a real domain, and the caller layers a syntax
/// check on the decoded text anyway.
pub fn hex_to_text(hex: &str) -> Result<String> {
    let bytes = hex::decode(hex).map_err(|_| VouchError::InvalidDomain(hex.to_string()))?;
    String::from_utf8(bytes).map_err(|_| VouchError::InvalidDomain(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_to_text_decodes_ascii() {
        assert_eq!(hex_to_text("726970706C652E636F6D").unwrap(), "ripple.com");
    }

    #[test]
    fn test_hex_to_text_round_trip() {
        let encoded = hex::encode("ripple.com");
        assert_eq!(hex_to_text(&encoded).unwrap(), "ripple.com");
    }

    #[test]
    fn test_hex_to_text_rejects_malformed_hex() {
        for bad in ["72697", "zz6970", "0xff"] {
            match hex_to_text(bad) {
                Err(VouchError::InvalidDomain(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidDomain, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_account_address_decodes() {
        assert!(is_account_address("ramcE1KE3gxHc8Yhs6hJtE55CrjkHUQyo"));
    }

    #[test]
    fn test_validation_key_is_not_an_account_address() {
        assert!(!is_account_address(
            "n949f75evCHwgyP4fPVgaHqNHxUVN15PsJEZ3B3HnXPcPjcZAoy7"
        ));
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        // Flip the last character of a valid address
        assert!(!is_account_address("ramcE1KE3gxHc8Yhs6hJtE55CrjkHUQyp"));
        assert!(!is_account_address(""));
        assert!(!is_account_address("not base58 at all!"));
    }

    #[test]
    fn test_base58_check_round_trip() {
        let payload =
            decode_base58_check("ramcE1KE3gxHc8Yhs6hJtE55CrjkHUQyo", 0x00, 20).unwrap();
        assert_eq!(payload.len(), 20);
        assert_eq!(
            encode_base58_check(0x00, &payload),
            "ramcE1KE3gxHc8Yhs6hJtE55CrjkHUQyo"
        );
    }

    #[test]
    fn test_account_derivation_from_validation_key() {
        let derived = account_id_from_validation_key(
            "n949f75evCHwgyP4fPVgaHqNHxUVN15PsJEZ3B3HnXPcPjcZAoy7",
        )
        .unwrap();
        assert_eq!(derived, "r4i8sEh7CdMF1qS1fUDHWFX5Z3kAVQ6cVy");
        assert!(is_account_address(&derived));
    }

    #[test]
    fn test_account_derivation_rejects_garbage() {
        for bad in ["", "ramcE1KE3gxHc8Yhs6hJtE55CrjkHUQyo", "nnnnn"] {
            match account_id_from_validation_key(bad) {
                Err(VouchError::InvalidAccountAddress(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidAccountAddress, got {:?}", other),
            }
        }
    }
}
