use crate::{Emitter, Encoding, WriterError};

impl<'w> Emitter<'w> {
    /// Hand the accumulated characters to the output sink, re-encoding them
    /// when the target encoding is UTF-16.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        assert!(self.output.is_some(), "output sink not set");
        assert!(
            self.encoding != Encoding::Any,
            "output encoding not decided"
        );

        if self.buffer.is_empty() {
            return Ok(());
        }

        if self.encoding == Encoding::Utf8 {
            self.output
                .as_mut()
                .expect("output sink not set")
                .write_all(self.buffer.as_bytes())?;
            self.buffer.clear();
            return Ok(());
        }

        let big_endian = match self.encoding {
            Encoding::Utf16Le => false,
            Encoding::Utf16Be => true,
            Encoding::Any | Encoding::Utf8 => unreachable!("handled above"),
        };
        for unit in self.buffer.encode_utf16() {
            let bytes = if big_endian {
                unit.to_be_bytes()
            } else {
                unit.to_le_bytes()
            };
            self.raw_buffer.extend(bytes);
        }
        self.output
            .as_mut()
            .expect("output sink not set")
            .write_all(&self.raw_buffer)?;
        self.buffer.clear();
        self.raw_buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Event, ScalarStyle};

    #[test]
    fn utf16le_output_starts_with_bom() {
        let mut sink: Vec<u8> = Vec::new();
        {
            let mut emitter = Emitter::new();
            emitter.set_encoding(Encoding::Utf16Le);
            emitter.set_output(&mut sink);
            emitter.emit(Event::stream_start(Encoding::Utf16Le)).unwrap();
            emitter.emit(Event::document_start(None, &[], true)).unwrap();
            emitter
                .emit(Event::scalar(None, None, "a", true, true, ScalarStyle::Plain))
                .unwrap();
            emitter.emit(Event::document_end(true)).unwrap();
            emitter.emit(Event::stream_end()).unwrap();
        }
        assert_eq!(sink, b"\xFF\xFEa\x00\x0A\x00");
    }

    #[test]
    fn short_write_surfaces_as_writer_error() {
        struct Refusing;
        impl std::io::Write for Refusing {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = Refusing;
        let mut emitter = Emitter::new();
        emitter.set_encoding(Encoding::Utf8);
        emitter.set_output(&mut sink);
        emitter.emit(Event::stream_start(Encoding::Utf8)).unwrap();
        emitter.emit(Event::document_start(None, &[], true)).unwrap();
        emitter
            .emit(Event::scalar(None, None, "a", true, true, ScalarStyle::Plain))
            .unwrap();
        let result = emitter.emit(Event::document_end(true));
        assert!(result.is_err());
    }
}
