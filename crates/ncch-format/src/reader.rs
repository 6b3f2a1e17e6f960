//! Little-endian byte reader used by every layout decoder

use thiserror::Error;

/// Reader errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Read past the end of the buffer
    #[error("Unexpected end of data at offset {0:#x}")]
    UnexpectedEnd(usize),

    /// Seek target outside the buffer
    #[error("Offset {offset:#x} out of bounds for {len:#x}-byte buffer")]
    OutOfBounds {
        /// Requested offset
        offset: usize,
        /// Buffer length
        len: usize,
    },
}

/// Cursor over a borrowed byte slice.
///
/// Every read validates the remaining length first, so decoders never
/// reinterpret a byte range they have not checked.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Move to an absolute offset
    pub fn seek(&mut self, offset: usize) -> Result<(), DecodeError> {
        if offset > self.buffer.len() {
            return Err(DecodeError::OutOfBounds {
                offset,
                len: self.buffer.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(DecodeError::UnexpectedEnd(self.position))?;
        let bytes = &self.buffer[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a 16-bit unsigned integer (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a 32-bit unsigned integer (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a 64-bit unsigned integer (little-endian)
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read `count` UTF-16 code units (little-endian)
    pub fn read_utf16(&mut self, count: usize) -> Result<Vec<u16>, DecodeError> {
        let byte_len = count
            .checked_mul(2)
            .ok_or(DecodeError::UnexpectedEnd(self.position))?;
        let bytes = self.read_bytes(byte_len)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integers() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0u8; 3];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u32(), Err(DecodeError::UnexpectedEnd(0)));
        // A failed read leaves the cursor untouched
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 8];
        let mut reader = ByteReader::new(&data);

        assert!(reader.seek(8).is_ok());
        assert_eq!(reader.remaining(), 0);
        assert_eq!(
            reader.seek(9),
            Err(DecodeError::OutOfBounds { offset: 9, len: 8 })
        );
    }

    #[test]
    fn test_read_utf16() {
        let data = [b'H', 0, b'i', 0, 0, 0];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_utf16(3).unwrap(), vec![0x48, 0x69, 0]);
        assert!(reader.read_utf16(1).is_err());
    }
}
