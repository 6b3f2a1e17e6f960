//! GBA Virtual Console trailer detection
//!
//! Virtual Console titles for the GBA ship an ARM9 payload the loader
//! cannot run. They are recognised by the last 16 bytes of `.code`:
//! the tag ".CAA" followed by a u32 equal to 1.

use crate::reader::ByteReader;

/// Size of the trailer at the end of the code section
pub const TRAILER_SIZE: usize = 0x10;

/// Tag opening a GBA Virtual Console trailer
pub const GBA_VC_MAGIC: [u8; 4] = *b".CAA";

/// Decoded trailer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// First four bytes of the trailer
    pub magic: [u8; 4],
    /// Following 32-bit value
    pub version: u32,
}

impl Trailer {
    /// Decode the trailer of a code section, if the section is long enough
    pub fn decode(code: &[u8]) -> Option<Self> {
        let start = code.len().checked_sub(TRAILER_SIZE)?;
        let mut reader = ByteReader::new(&code[start..]);
        Some(Self {
            magic: reader.read_array().ok()?,
            version: reader.read_u32().ok()?,
        })
    }
}

/// Whether a code section carries the GBA Virtual Console trailer
pub fn is_gba_virtual_console(code: &[u8]) -> bool {
    matches!(
        Trailer::decode(code),
        Some(Trailer { magic, version: 1 }) if magic == GBA_VC_MAGIC
    )
}
