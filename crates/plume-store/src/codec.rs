//! Binary encode/decode of channel stacks.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` length. The payload is followed by an FNV-1a checksum.

use std::io::{Read, Write};

use plume_core::Tensor;

use crate::error::StoreError;
use crate::hash::payload_hash;
use crate::store::ChannelStack;
use crate::{FORMAT_VERSION, MAGIC};

/// Largest accepted rank; guards against allocating from garbage.
const MAX_RANK: u32 = 8;
/// Largest accepted channel-name length in bytes.
const MAX_NAME_LEN: u32 = 4096;

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), StoreError> {
    write_u32_le(w, len_u32(s.len())?)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_u8(r: &mut dyn Read) -> Result<u8, StoreError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, StoreError> {
    let len = read_u32_le(r)?;
    if len > MAX_NAME_LEN {
        return Err(StoreError::Malformed {
            detail: format!("channel name length {len} exceeds {MAX_NAME_LEN}"),
        });
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| StoreError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

fn len_u32(len: usize) -> Result<u32, StoreError> {
    u32::try_from(len).map_err(|_| StoreError::Malformed {
        detail: format!("length {len} does not fit in u32"),
    })
}

/// Write `stack` to `w`.
pub fn encode_stack(w: &mut dyn Write, stack: &ChannelStack) -> Result<(), StoreError> {
    w.write_all(&MAGIC)?;
    w.write_all(&[FORMAT_VERSION])?;

    write_u32_le(w, len_u32(stack.channels().len())?)?;
    for name in stack.channels() {
        write_length_prefixed_str(w, name)?;
    }

    let shape = stack.tensor().shape();
    write_u32_le(w, len_u32(shape.len())?)?;
    for &d in shape {
        write_u32_le(w, len_u32(d)?)?;
    }

    let data = stack.tensor().data();
    let mut payload = Vec::with_capacity(data.len() * 4);
    for v in data {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    w.write_all(&payload)?;
    w.write_all(&payload_hash(data).to_le_bytes())?;
    Ok(())
}

/// Read one stack from `r`, verifying magic, version and checksum.
pub fn decode_stack(r: &mut dyn Read) -> Result<ChannelStack, StoreError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(StoreError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion { found: version });
    }

    let channel_count = read_u32_le(r)?;
    let mut channels = Vec::new();
    for _ in 0..channel_count {
        channels.push(read_length_prefixed_str(r)?);
    }

    let rank = read_u32_le(r)?;
    if rank > MAX_RANK {
        return Err(StoreError::Malformed {
            detail: format!("rank {rank} exceeds {MAX_RANK}"),
        });
    }
    let mut shape = Vec::with_capacity(rank as usize);
    for _ in 0..rank {
        shape.push(read_u32_le(r)? as usize);
    }
    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| StoreError::Malformed {
            detail: format!("shape {shape:?} overflows"),
        })?;

    let byte_len = count.checked_mul(4).ok_or_else(|| StoreError::Malformed {
        detail: format!("payload of {count} values overflows"),
    })?;
    let mut payload = Vec::new();
    (&mut *r).take(byte_len as u64).read_to_end(&mut payload)?;
    if payload.len() != byte_len {
        return Err(StoreError::Malformed {
            detail: format!("payload truncated: {} of {byte_len} bytes", payload.len()),
        });
    }
    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let stored = read_u64_le(r)?;
    let computed = payload_hash(&data);
    if stored != computed {
        return Err(StoreError::ChecksumMismatch { stored, computed });
    }

    let tensor = Tensor::new(&shape, data)?;
    Ok(ChannelStack::new(channels, tensor)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChannelStack {
        ChannelStack::from_channels(
            &[
                ("Primary Temperature [C]", &[0.5, -1.0, 2.0, 0.0]),
                ("Other Temperature [C]", &[0.0, 0.0, 1.5, 3.0]),
            ],
            &[2, 2],
        )
        .unwrap()
    }

    fn encoded() -> Vec<u8> {
        let mut buf = Vec::new();
        encode_stack(&mut buf, &sample()).unwrap();
        buf
    }

    #[test]
    fn roundtrip() {
        let buf = encoded();
        assert_eq!(&buf[..4], b"PLUM");
        assert_eq!(decode_stack(&mut buf.as_slice()).unwrap(), sample());
    }

    #[test]
    fn bad_magic() {
        let mut buf = encoded();
        buf[0] = b'X';
        assert!(matches!(
            decode_stack(&mut buf.as_slice()),
            Err(StoreError::InvalidMagic)
        ));
    }

    #[test]
    fn future_version() {
        let mut buf = encoded();
        buf[4] = 9;
        assert!(matches!(
            decode_stack(&mut buf.as_slice()),
            Err(StoreError::UnsupportedVersion { found: 9 })
        ));
    }

    #[test]
    fn flipped_payload_bit_fails_checksum() {
        let mut buf = encoded();
        let payload_byte = buf.len() - 8 - 3;
        buf[payload_byte] ^= 0x01;
        assert!(matches!(
            decode_stack(&mut buf.as_slice()),
            Err(StoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn truncated_payload() {
        let buf = encoded();
        let cut = &buf[..buf.len() - 12];
        assert!(decode_stack(&mut &cut[..]).is_err());
    }

    #[test]
    fn absurd_rank_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(
            decode_stack(&mut buf.as_slice()),
            Err(StoreError::Malformed { .. })
        ));
    }
}
