//! Byte and hex encodings of BN254 scalars
//!
//! Scalars travel as 32-byte little-endian canonical encodings, hex-encoded
//! when they appear in JSON.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::CanonicalDeserialize;

use crate::error::CryptoError;

/// Size of an encoded scalar
pub const FIELD_BYTES: usize = 32;

/// Encode a scalar as 32 little-endian bytes
pub fn fr_to_bytes(value: &Fr) -> [u8; FIELD_BYTES] {
    let bytes = value.into_bigint().to_bytes_le();
    let mut result = [0u8; FIELD_BYTES];
    result.copy_from_slice(&bytes[..FIELD_BYTES]);
    result
}

/// Interpret up to 32 little-endian bytes as a scalar, reducing mod r
pub fn fr_from_le_bytes(bytes: &[u8]) -> Option<Fr> {
    if bytes.len() > FIELD_BYTES {
        return None;
    }
    Some(Fr::from_le_bytes_mod_order(bytes))
}

/// Decode a canonical 32-byte encoding; values >= r are rejected
pub fn fr_from_canonical_bytes(bytes: &[u8; FIELD_BYTES]) -> Result<Fr, CryptoError> {
    Fr::deserialize_compressed(&bytes[..])
        .map_err(|e| CryptoError::InvalidFieldEncoding(e.to_string()))
}

/// Hex encoding of the canonical little-endian bytes
pub fn fr_to_hex(value: &Fr) -> String {
    hex::encode(fr_to_bytes(value))
}

/// Decode a hex scalar (optional `0x` prefix, exactly 32 bytes)
pub fn fr_from_hex(s: &str) -> Result<Fr, CryptoError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidFieldEncoding(e.to_string()))?;
    let bytes: [u8; FIELD_BYTES] = bytes.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidFieldEncoding(format!(
            "expected {} bytes, got {}",
            FIELD_BYTES,
            bytes.len()
        ))
    })?;
    fr_from_canonical_bytes(&bytes)
}

/// Interpret a scalar as an unsigned integer of at most `bits` bits
pub fn fr_to_bounded_u64(value: &Fr, bits: usize) -> Option<u64> {
    let repr = value.into_bigint();
    if repr.num_bits() as usize > bits || bits > 64 {
        return None;
    }
    Some(repr.as_ref()[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use rand::rngs::OsRng;

    #[test]
    fn test_hex_encoding() {
        let value = Fr::rand(&mut OsRng);

        let encoded = fr_to_hex(&value);
        assert_eq!(encoded.len(), 64);
        assert_eq!(fr_from_hex(&encoded).unwrap(), value);
        assert_eq!(fr_from_hex(&format!("0x{}", encoded)).unwrap(), value);
    }

    #[test]
    fn test_small_value_layout() {
        let bytes = fr_to_bytes(&Fr::from(0x0102u64));

        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(fr_from_hex("zz").is_err());
        assert!(fr_from_hex(&"00".repeat(31)).is_err());
        // 2^256 - 1 is above the modulus
        assert!(fr_from_hex(&"ff".repeat(32)).is_err());
    }

    #[test]
    fn test_from_le_bytes_length() {
        assert_eq!(fr_from_le_bytes(&[3u8]), Some(Fr::from(3u64)));
        assert!(fr_from_le_bytes(&[0u8; 33]).is_none());
    }

    #[test]
    fn test_bounded_u64() {
        assert_eq!(fr_to_bounded_u64(&Fr::from(5u64), 32), Some(5));
        assert_eq!(fr_to_bounded_u64(&Fr::from(u32::MAX as u64), 32), Some(u32::MAX as u64));
        assert_eq!(fr_to_bounded_u64(&Fr::from(1u64 << 32), 32), None);
        assert_eq!(fr_to_bounded_u64(&-Fr::from(1u64), 32), None);
    }
}
