//! FNV-1a checksum of stack payloads.
//!
//! Not cryptographic; it catches truncation and bit rot.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Hash every value's `f32::to_bits()` as little-endian bytes.
///
/// Returns `FNV_OFFSET` for an empty payload.
pub fn payload_hash(data: &[f32]) -> u64 {
    let mut hash = FNV_OFFSET;
    for v in data {
        for &b in &v.to_bits().to_le_bytes() {
            hash = fnv1a_byte(hash, b);
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_offset_basis() {
        assert_eq!(payload_hash(&[]), FNV_OFFSET);
    }

    #[test]
    fn order_and_bits_matter() {
        assert_ne!(payload_hash(&[1.0, 2.0]), payload_hash(&[2.0, 1.0]));
        assert_ne!(payload_hash(&[0.0]), payload_hash(&[-0.0]));
        assert_eq!(payload_hash(&[3.5, 4.0]), payload_hash(&[3.5, 4.0]));
    }
}
