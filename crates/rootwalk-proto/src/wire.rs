//! Bounds-checked cursor over a received datagram.

use crate::error::{Error, Result};
use crate::name::{Name, NameParser};

/// A cursor for reading DNS wire data.
///
/// Every read is bounds-checked and advances the position; names are
/// decoded against the whole buffer so compression pointers resolve.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned at `pos`.
    #[inline]
    pub const fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Returns the whole underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the current position.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Reads a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Reads a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(Error::unexpected_eof(end))?;
        self.pos = end;
        Ok(slice)
    }

    /// Reads a possibly compressed domain name.
    pub fn read_name(&mut self) -> Result<Name> {
        let (name, consumed) = NameParser::new(self.data).parse_name(self.pos)?;
        self.pos += consumed;
        Ok(name)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integers() {
        let data = [0x12, 0x34, 0x00, 0x00, 0x0E, 0x10, 0xFF];
        let mut reader = WireReader::new(&data);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 3600);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0x01];
        let mut reader = WireReader::new(&data);
        assert!(matches!(
            reader.read_u16(),
            Err(Error::UnexpectedEof { offset: 2 })
        ));
        // A failed read does not move the cursor
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_name_advances_past_pointer() {
        let data = [3, b'c', b'o', b'm', 0, 0xC0, 0x00, 0xAB];
        let mut reader = WireReader::at(&data, 5);
        let name = reader.read_name().unwrap();
        assert_eq!(name.to_string(), "com.");
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
    }
}
