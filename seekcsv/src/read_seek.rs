use std::io::{BufRead, BufReader, Read, Seek};

/// `Read` + `Seek`
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Buffered text reader that the tokenizer consumes from.
///
/// Seeking is only possible through [`TextSource::base_stream`], which bypasses
/// the read-ahead buffer. Every reposition of the base stream must be followed by
/// [`TextSource::discard_buffered_data`], otherwise the next read returns bytes
/// from the old position.
pub trait TextSource: BufRead {
    /// Seekable stream beneath the buffer, `None` if this reader type cannot expose one
    fn base_stream(&mut self) -> Option<&mut dyn ReadSeek>;

    /// Drop buffered bytes that were read ahead but not consumed
    fn discard_buffered_data(&mut self);
}

/// Seeking the stream through [`BufReader::get_mut`] leaves the buffer as is,
/// hence the explicit discard.
impl<R: Read + Seek> TextSource for BufReader<R> {
    fn base_stream(&mut self) -> Option<&mut dyn ReadSeek> {
        Some(self.get_mut() as &mut dyn ReadSeek)
    }

    fn discard_buffered_data(&mut self) {
        let len = self.buffer().len();
        log::trace!("discarding {len} buffered bytes");
        self.consume(len);
    }
}
