//! Fixed, versioned, little-endian wire types for collective payloads.
//!
//! Variable-length payloads travel as a [`WireHdr`] followed by a bincode
//! body. The header pins the layout version and the payload kind so a rank
//! never decodes bytes meant for a different exchange.

use crate::mesh_error::MeshError;
use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::mem::{align_of, size_of};

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// Payload kinds carried behind a [`WireHdr`].
pub mod kind {
    /// One rank's local metadata contribution.
    pub const METADATA: u16 = 1;
}

/// All multi-byte integers in these structs are **little-endian** on the wire.
/// We store them pre-LE with `.to_le()` and decode with `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireHdr {
    pub version_le: u16,  // = WIRE_VERSION.to_le()
    pub kind_le: u16,     // see `kind`
    pub reserved_le: u32, // future use; keep zero
}

impl WireHdr {
    pub fn new(kind: u16) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            kind_le: kind.to_le(),
            reserved_le: 0,
        }
    }
    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireCount {
    pub n_le: u32, // byte count of the following payload
}

impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            n_le: (n as u32).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u32::from_le(self.n_le) as usize
    }
}

// Layout checks
static_assertions::const_assert_eq!(size_of::<WireHdr>(), 8);
static_assertions::const_assert_eq!(align_of::<WireHdr>(), 4);
static_assertions::const_assert_eq!(size_of::<WireCount>(), 4);

/// Header followed by the bincode encoding of `value`.
pub fn encode_payload<T: Serialize>(kind: u16, value: &T) -> Result<Vec<u8>, MeshError> {
    let hdr = WireHdr::new(kind);
    let mut out = cast_slice(std::slice::from_ref(&hdr)).to_vec();
    bincode::serialize_into(&mut out, value)?;
    Ok(out)
}

/// Inverse of [`encode_payload`]; rejects a foreign version or kind.
pub fn decode_payload<T: DeserializeOwned>(kind: u16, bytes: &[u8]) -> Result<T, MeshError> {
    let hdr_len = size_of::<WireHdr>();
    if bytes.len() < hdr_len {
        return Err(MeshError::Wire(format!(
            "payload of {} bytes is shorter than its header",
            bytes.len()
        )));
    }
    let (head, body) = bytes.split_at(hdr_len);
    let hdr: WireHdr = bytemuck::try_pod_read_unaligned(head)
        .map_err(|e| MeshError::Wire(format!("bad header: {e:?}")))?;
    if hdr.version() != WIRE_VERSION {
        return Err(MeshError::Wire(format!(
            "wire version {} (expected {WIRE_VERSION})",
            hdr.version()
        )));
    }
    if hdr.kind() != kind {
        return Err(MeshError::Wire(format!(
            "payload kind {} (expected {kind})",
            hdr.kind()
        )));
    }
    Ok(bincode::deserialize(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_little_endian() {
        let hdr = WireHdr::new(kind::METADATA);
        assert_eq!(cast_slice(std::slice::from_ref(&hdr)), &[1, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn decode_rejects_wrong_kind_and_short_input() {
        let bytes = encode_payload(kind::METADATA, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = decode_payload(kind::METADATA, &bytes).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert!(matches!(
            decode_payload::<Vec<u32>>(7, &bytes),
            Err(MeshError::Wire(_))
        ));
        assert!(matches!(
            decode_payload::<Vec<u32>>(kind::METADATA, &bytes[..3]),
            Err(MeshError::Wire(_))
        ));
    }
}
