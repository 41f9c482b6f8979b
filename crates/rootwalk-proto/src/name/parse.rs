//! Decoding names from a message buffer, following compression pointers
//! (RFC 1035 Section 4.1.4).

use super::Name;
use crate::MAX_NAME_LENGTH;
use crate::error::{Error, Result};
use smallvec::SmallVec;

/// Upper bound on pointer jumps within a single name.
const MAX_COMPRESSION_JUMPS: usize = 64;

/// Reads domain names out of a complete DNS message.
///
/// The parser holds the whole message so that compression pointers can be
/// resolved against earlier offsets.
#[derive(Debug, Clone, Copy)]
pub struct NameParser<'a> {
    message: &'a [u8],
}

impl<'a> NameParser<'a> {
    /// Creates a parser over the given message buffer.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Parses a name at `offset`.
    ///
    /// Returns the name and the number of bytes it occupies at `offset`; a
    /// compression pointer counts as two bytes no matter how long the name
    /// it points to is.
    pub fn parse_name(&self, offset: usize) -> Result<(Name, usize)> {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut labels = 0u8;
        let mut pos = offset;
        let mut consumed = None;
        let mut jumps = 0;

        loop {
            let len_byte = *self
                .message
                .get(pos)
                .ok_or(Error::unexpected_eof(pos))?;

            match len_byte & 0xC0 {
                0xC0 => {
                    let low = *self
                        .message
                        .get(pos + 1)
                        .ok_or(Error::unexpected_eof(pos + 1))?;
                    let target = usize::from(u16::from_be_bytes([len_byte & 0x3F, low]));

                    // Only backwards pointers are legal, which also rules out
                    // a pointer referencing itself.
                    if target >= pos {
                        return Err(Error::InvalidCompressionPointer {
                            offset: pos,
                            target,
                        });
                    }

                    jumps += 1;
                    if jumps > MAX_COMPRESSION_JUMPS {
                        return Err(Error::TooManyCompressionJumps {
                            max_jumps: MAX_COMPRESSION_JUMPS,
                        });
                    }

                    consumed.get_or_insert_with(|| pos + 2 - offset);
                    pos = target;
                }
                0x00 => {
                    let len = usize::from(len_byte);
                    if len == 0 {
                        wire.push(0);
                        labels += 1;
                        consumed.get_or_insert_with(|| pos + 1 - offset);
                        break;
                    }

                    let end = pos + 1 + len;
                    if end > self.message.len() {
                        return Err(Error::unexpected_eof(end));
                    }
                    // +1 leaves room for the terminating root label
                    if wire.len() + 1 + len + 1 > MAX_NAME_LENGTH {
                        return Err(Error::NameTooLong {
                            length: wire.len() + 1 + len + 1,
                        });
                    }

                    wire.push(len_byte);
                    wire.extend_from_slice(&self.message[pos + 1..end]);
                    labels += 1;
                    pos = end;
                }
                _ => {
                    return Err(Error::invalid_data(
                        pos,
                        format!("unsupported label type 0x{len_byte:02X}"),
                    ));
                }
            }
        }

        Ok((Name::from_parts(wire, labels), consumed.unwrap_or(0)))
    }

    /// Parses a name and discards the consumed length.
    #[inline]
    pub fn parse(&self, offset: usize) -> Result<Name> {
        self.parse_name(offset).map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uncompressed() {
        let wire = [
            3, b'n', b's', b'1', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0,
        ];

        let (name, consumed) = NameParser::new(&wire).parse_name(0).unwrap();
        assert_eq!(name.to_string(), "ns1.example.com.");
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn test_parse_compressed() {
        // offset 0: example.com. ; offset 13: ns1.<ptr 0>
        let wire = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, 3, b'n', b's',
            b'1', 0xC0, 0x00,
        ];

        let parser = NameParser::new(&wire);
        let (name, consumed) = parser.parse_name(13).unwrap();
        assert_eq!(name.to_string(), "ns1.example.com.");
        assert_eq!(consumed, 6);
        assert_eq!(name.label_count(), 4);
    }

    #[test]
    fn test_self_pointer_rejected() {
        let wire = [0xC0, 0x00];
        let result = NameParser::new(&wire).parse_name(0);
        assert!(matches!(
            result,
            Err(Error::InvalidCompressionPointer { .. })
        ));
    }

    #[test]
    fn test_truncated_label() {
        let wire = [5, b'a', b'b'];
        let result = NameParser::new(&wire).parse_name(0);
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_extended_label_type_rejected() {
        let wire = [0x41, 0x00];
        let result = NameParser::new(&wire).parse_name(0);
        assert!(matches!(result, Err(Error::InvalidData { .. })));
    }
}
