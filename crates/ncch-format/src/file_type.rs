//! Container file-type identification

use std::io::{Read, Seek, SeekFrom};

/// Offset of the NCSD/NCCH magic, right after the RSA signature
const MAGIC_OFFSET: u64 = 0x100;

/// Kind of container found in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Unreadable or unrecognised file
    Error,
    /// Card image (NCSD)
    Cci,
    /// Executable NCCH
    Cxi,
}

/// Identify a container by the magic at offset 0x100
pub fn identify_type<R: Read + Seek>(file: &mut R) -> FileType {
    let mut magic = [0u8; 4];
    if file.seek(SeekFrom::Start(MAGIC_OFFSET)).is_err() || file.read_exact(&mut magic).is_err() {
        return FileType::Error;
    }

    match &magic {
        b"NCSD" => FileType::Cci,
        b"NCCH" => FileType::Cxi,
        _ => FileType::Error,
    }
}
