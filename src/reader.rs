use std::collections::VecDeque;

use crate::chars::utf8_sequence_start;
use crate::{Encoding, ReaderError, INPUT_RAW_BUFFER_SIZE};

const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
const BOM_UTF16LE: &[u8] = b"\xFF\xFE";
const BOM_UTF16BE: &[u8] = b"\xFE\xFF";

/// Pulls bytes from the source and decodes them into a buffer of characters
/// for the scanner to consume.
///
/// Whatever the source encoding, `chars` holds decoded characters that have
/// already passed the YAML accepted-character check. The scanner pops from the
/// front; [`Reader::want`] guarantees lookahead.
pub(crate) struct Reader<'r> {
    source: Option<&'r mut dyn std::io::BufRead>,
    eof: bool,
    /// Undecoded bytes, in the source encoding.
    raw: VecDeque<u8>,
    /// Decoded characters not yet consumed by the scanner.
    pub(crate) chars: VecDeque<char>,
    /// The number of characters in `chars`.
    pub(crate) unread: usize,
    pub(crate) encoding: Encoding,
    /// The byte offset of the end of `chars`, counted in UTF-8.
    pub(crate) offset: usize,
}

impl<'r> Reader<'r> {
    pub(crate) fn new() -> Self {
        Self {
            source: None,
            eof: false,
            raw: VecDeque::with_capacity(INPUT_RAW_BUFFER_SIZE),
            chars: VecDeque::with_capacity(INPUT_RAW_BUFFER_SIZE),
            unread: 0,
            encoding: Encoding::Any,
            offset: 0,
        }
    }

    pub(crate) fn set_source(&mut self, source: &'r mut dyn std::io::BufRead) {
        assert!(self.source.is_none(), "input source already set");
        self.source = Some(source);
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        assert!(
            self.encoding == Encoding::Any,
            "encoding already determined"
        );
        self.encoding = encoding;
    }

    fn fail<T>(&self, problem: &'static str, offset: usize, value: i32) -> Result<T, ReaderError> {
        Err(ReaderError::Problem {
            problem,
            offset,
            value,
        })
    }

    /// Ensure at least `length` characters are decoded, or end of input has
    /// been reached.
    ///
    /// After a successful call with fewer than `length` characters available,
    /// the buffer simply ends; the scanner treats the missing character as the
    /// end-of-stream sentinel.
    pub(crate) fn want(&mut self, length: usize) -> Result<(), ReaderError> {
        assert!(self.source.is_some(), "input source not set");
        if self.unread >= length || (self.eof && self.raw.is_empty()) {
            return Ok(());
        }
        if self.encoding == Encoding::Any {
            self.detect_encoding()?;
        }

        let mut first = true;
        while self.unread < length {
            if self.eof && self.raw.is_empty() {
                return Ok(());
            }
            if !first || self.raw.is_empty() {
                self.fill_raw()?;
            }
            first = false;
            match self.encoding {
                Encoding::Utf8 => self.decode_utf8()?,
                Encoding::Utf16Le => self.decode_utf16(false)?,
                Encoding::Utf16Be => self.decode_utf16(true)?,
                Encoding::Any => unreachable!("encoding was determined above"),
            }
        }

        if self.offset >= usize::MAX / 2 {
            return self.fail("input is too long", self.offset, -1);
        }
        Ok(())
    }

    /// Decide the encoding from the first bytes of the stream and drop the
    /// byte order mark if one is present.
    fn detect_encoding(&mut self) -> Result<(), ReaderError> {
        while !self.eof && self.raw.len() < 3 {
            self.fill_raw()?;
        }
        if self.raw_starts_with(BOM_UTF16LE) {
            self.encoding = Encoding::Utf16Le;
            self.raw.drain(..2);
            self.offset += 2;
        } else if self.raw_starts_with(BOM_UTF16BE) {
            self.encoding = Encoding::Utf16Be;
            self.raw.drain(..2);
            self.offset += 2;
        } else if self.raw_starts_with(BOM_UTF8) {
            self.encoding = Encoding::Utf8;
            self.raw.drain(..3);
            self.offset += 3;
        } else {
            self.encoding = Encoding::Utf8;
        }
        Ok(())
    }

    fn raw_starts_with(&self, needle: &[u8]) -> bool {
        needle
            .iter()
            .enumerate()
            .all(|(i, octet)| self.raw.get(i) == Some(octet))
    }

    /// Top up the raw byte buffer from the source. Partial reads are fine and
    /// are coalesced by calling again.
    fn fill_raw(&mut self) -> Result<(), ReaderError> {
        if self.eof || self.raw.len() >= INPUT_RAW_BUFFER_SIZE {
            return Ok(());
        }
        let len_before = self.raw.len();
        self.raw.resize(INPUT_RAW_BUFFER_SIZE, 0);
        let free = &mut self.raw.make_contiguous()[len_before..];
        let size_read = self
            .source
            .as_mut()
            .expect("input source not set")
            .read(free)?;
        self.raw.truncate(len_before + size_read);
        if size_read == 0 {
            self.eof = true;
        }
        Ok(())
    }

    /// Decode one character of strict RFC 3629 UTF-8, or nothing if the raw
    /// buffer holds an incomplete sequence and more input may arrive.
    fn decode_utf8(&mut self) -> Result<(), ReaderError> {
        let Some(first) = self.raw.front().copied() else {
            return Ok(());
        };
        let Some((width, mut value)) = utf8_sequence_start(first) else {
            return self.fail("invalid leading UTF-8 octet", self.offset, i32::from(first));
        };
        if self.raw.len() < width {
            if self.eof {
                return self.fail("incomplete UTF-8 octet sequence", self.offset, -1);
            }
            return Ok(());
        }
        for i in 1..width {
            let octet = self.raw[i];
            if octet & 0xc0 != 0x80 {
                return self.fail(
                    "invalid trailing UTF-8 octet",
                    self.offset + i,
                    i32::from(octet),
                );
            }
            value = (value << 6) | u32::from(octet & 0x3f);
        }
        let overlong = match width {
            2 => value < 0x80,
            3 => value < 0x800,
            4 => value < 0x10000,
            _ => false,
        };
        if overlong {
            return self.fail("invalid length of a UTF-8 sequence", self.offset, -1);
        }
        // `char::from_u32` rejects surrogates and values above U+10FFFF.
        let Some(ch) = char::from_u32(value) else {
            return self.fail("invalid Unicode character", self.offset, value as i32);
        };
        self.raw.drain(..width);
        self.accept(ch)
    }

    /// Decode one UTF-16 unit or surrogate pair.
    fn decode_utf16(&mut self, big_endian: bool) -> Result<(), ReaderError> {
        fn unit(big_endian: bool, b0: u8, b1: u8) -> u32 {
            let bytes = [b0, b1];
            u32::from(if big_endian {
                u16::from_be_bytes(bytes)
            } else {
                u16::from_le_bytes(bytes)
            })
        }

        if self.raw.is_empty() {
            return Ok(());
        }
        if self.raw.len() < 2 {
            if self.eof {
                return self.fail("incomplete UTF-16 character", self.offset, -1);
            }
            return Ok(());
        }
        let lead = unit(big_endian, self.raw[0], self.raw[1]);
        if lead & 0xfc00 == 0xdc00 {
            return self.fail("unexpected low surrogate area", self.offset, lead as i32);
        }
        let (width, value) = if lead & 0xfc00 == 0xd800 {
            if self.raw.len() < 4 {
                if self.eof {
                    return self.fail("incomplete UTF-16 surrogate pair", self.offset, -1);
                }
                return Ok(());
            }
            let trail = unit(big_endian, self.raw[2], self.raw[3]);
            if trail & 0xfc00 != 0xdc00 {
                return self.fail("expected low surrogate area", self.offset + 2, trail as i32);
            }
            (4, 0x10000 + ((lead & 0x3ff) << 10) + (trail & 0x3ff))
        } else {
            (2, lead)
        };
        let Some(ch) = char::from_u32(value) else {
            return self.fail("invalid Unicode character", self.offset, value as i32);
        };
        self.raw.drain(..width);
        self.accept(ch)
    }

    /// Check the decoded character against the YAML accepted set and append it
    /// to the character buffer.
    fn accept(&mut self, ch: char) -> Result<(), ReaderError> {
        let allowed = ch == '\x09'
            || ch == '\x0a'
            || ch == '\x0d'
            || (ch >= '\x20' && ch <= '\x7e')
            || ch == '\u{0085}'
            || (ch >= '\u{00a0}' && ch <= '\u{d7ff}')
            || (ch >= '\u{e000}' && ch <= '\u{fffd}')
            || ch >= '\u{10000}';
        if !allowed {
            return self.fail("control characters are not allowed", self.offset, ch as i32);
        }
        self.chars.push_back(ch);
        self.offset += ch.len_utf8();
        self.unread += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn decode_all(mut input: &[u8], encoding: Encoding) -> Result<String, ReaderError> {
        let mut reader = Reader::new();
        reader.set_source(&mut input);
        if encoding != Encoding::Any {
            reader.set_encoding(encoding);
        }
        reader.want(usize::MAX / 4)?;
        Ok(reader.chars.iter().collect())
    }

    #[test]
    fn utf8_bom_is_consumed() {
        assert_eq!(decode_all(b"\xEF\xBB\xBFkey", Encoding::Any).unwrap(), "key");
    }

    #[test]
    fn utf16le_detected_by_bom() {
        let input = b"\xFF\xFEa\x00b\x00";
        assert_eq!(decode_all(input, Encoding::Any).unwrap(), "ab");
    }

    #[test]
    fn utf16_surrogate_pair_matches_utf8() {
        // U+1F600 in both encodings.
        let utf16 = b"\xFF\xFE\x3D\xD8\x00\xDE";
        let utf8 = "\u{1f600}".as_bytes();
        assert_eq!(
            decode_all(utf16, Encoding::Any).unwrap(),
            decode_all(utf8, Encoding::Utf8).unwrap()
        );
    }

    #[test]
    fn unpaired_low_surrogate_is_rejected() {
        let input = b"\xFF\xFE\x00\xDC";
        assert!(decode_all(input, Encoding::Any).is_err());
    }

    #[test]
    fn overlong_utf8_is_rejected() {
        // 0xC0 0xAF is an overlong encoding of '/'.
        assert!(decode_all(b"\xC0\xAF", Encoding::Utf8).is_err());
    }

    #[test]
    fn utf8_surrogate_range_is_rejected() {
        // 0xED 0xA0 0x80 encodes U+D800.
        assert!(decode_all(b"\xED\xA0\x80", Encoding::Utf8).is_err());
    }

    #[test]
    fn truncated_utf8_at_eof_is_rejected() {
        assert!(decode_all(b"a\xE2\x82", Encoding::Utf8).is_err());
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(decode_all(b"a\x01b", Encoding::Utf8).is_err());
    }
}
