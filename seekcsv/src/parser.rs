use std::fmt;
use std::io::{BufReader, Read, Seek};

use csv_core::ReadFieldResult;

use crate::error::{CsvError, Result};
use crate::read_seek::TextSource;
use crate::Config;

/// Size of the scratch buffer a field is copied through
const FIELD_CHUNK: usize = 1024;

/// Fields of one record, in order
pub type Record = Vec<String>;

/// Record tokenizer that [`SeekingParser`](crate::SeekingParser) wraps.
///
/// Any tokenizer can be substituted as long as it keeps its own live byte counter
/// and a [`RecordParser::reset`] that leaves the stream alone.
pub trait RecordParser {
    /// Read the next record, `Ok(None)` once the stream is exhausted
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Bytes consumed from the text source since construction or the last reset
    fn byte_position(&self) -> u64;

    /// Newlines consumed since construction or the last reset
    fn row(&self) -> u64;

    /// Records returned since construction or the last reset
    fn record_number(&self) -> u64;

    /// Clear row, record and byte counters along with any tokenizer state.
    ///
    /// Must not read from or reposition the stream.
    fn reset(&mut self);

    fn is_disposed(&self) -> bool;

    /// Release the text source, calling this more than once is a no-op
    fn dispose(&mut self);

    fn config(&self) -> &Config;

    /// Text source the records are read from, `None` after [`RecordParser::dispose`]
    fn source_mut(&mut self) -> Option<&mut dyn TextSource>;

    fn check_disposed(&self) -> Result<()> {
        if self.is_disposed() { Err(CsvError::Disposed) } else { Ok(()) }
    }
}

/// Delimited-text tokenizer over any [`TextSource`], driven by [`csv_core::Reader`]
pub struct CsvParser<S> {
    source: Option<S>,
    core: csv_core::Reader,
    config: Config,
    byte_position: u64,
    record_number: u64,
}

impl<R: Read + Seek> CsvParser<BufReader<R>> {
    /// Parse from a seekable stream, buffered with `config.buffer_capacity`
    pub fn from_reader(reader: R, config: Config) -> Self {
        let source = BufReader::with_capacity(config.buffer_capacity, reader);
        Self::new(source, config)
    }
}

impl<S: TextSource> CsvParser<S> {
    pub fn new(source: S, config: Config) -> Self {
        let core = config.core_reader();
        Self { source: Some(source), core, config, byte_position: 0, record_number: 0 }
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn into_source(self) -> Option<S> {
        self.source
    }
}

impl<S: TextSource> RecordParser for CsvParser<S> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        let source = self.source.as_mut().ok_or(CsvError::Disposed)?;

        let mut record = Record::new();
        let mut field = Vec::new();
        let mut chunk = [0u8; FIELD_CHUNK];
        loop {
            // empty input tells csv-core the stream has ended
            let (result, nin, nout) = {
                let input = source.fill_buf()?;
                self.core.read_field(input, &mut chunk)
            };
            source.consume(nin);
            if self.config.count_bytes {
                self.byte_position += nin as u64;
            }
            field.extend_from_slice(&chunk[..nout]);

            match result {
                ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
                ReadFieldResult::Field { record_end } => {
                    let text = String::from_utf8(std::mem::take(&mut field)).map_err(|e| {
                        CsvError::Utf8 {
                            line: self.core.line(),
                            position: self.byte_position,
                            source: e,
                        }
                    })?;
                    record.push(text);
                    if record_end {
                        break;
                    }
                }
                ReadFieldResult::End => return Ok(None),
            }
        }

        self.record_number += 1;
        log::trace!(
            "record {} ({} fields) ends at byte {}",
            self.record_number,
            record.len(),
            self.byte_position
        );
        Ok(Some(record))
    }

    fn byte_position(&self) -> u64 {
        self.byte_position
    }

    fn row(&self) -> u64 {
        // csv-core numbers lines from 1
        self.core.line().saturating_sub(1)
    }

    fn record_number(&self) -> u64 {
        self.record_number
    }

    fn reset(&mut self) {
        self.core.reset();
        self.byte_position = 0;
        self.record_number = 0;
    }

    fn is_disposed(&self) -> bool {
        self.source.is_none()
    }

    fn dispose(&mut self) {
        if self.source.take().is_some() {
            log::debug!("released text source after {} records", self.record_number);
        }
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn source_mut(&mut self) -> Option<&mut dyn TextSource> {
        self.source.as_mut().map(|source| source as &mut dyn TextSource)
    }
}

impl<S> fmt::Debug for CsvParser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvParser")
            .field("disposed", &self.source.is_none())
            .field("config", &self.config)
            .field("byte_position", &self.byte_position)
            .field("line", &self.core.line())
            .field("record_number", &self.record_number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Cursor};

    use super::*;

    /// Text source over a byte slice with no stream beneath it
    #[derive(Debug)]
    struct Sequential(&'static [u8]);

    impl Read for Sequential {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl BufRead for Sequential {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Ok(self.0)
        }

        fn consume(&mut self, amt: usize) {
            self.0 = &self.0[amt..];
        }
    }

    impl TextSource for Sequential {
        fn base_stream(&mut self) -> Option<&mut dyn crate::ReadSeek> {
            None
        }

        fn discard_buffered_data(&mut self) {}
    }

    fn parser(data: &str) -> CsvParser<BufReader<Cursor<Vec<u8>>>> {
        CsvParser::from_reader(Cursor::new(data.as_bytes().to_vec()), Config::seeking())
    }

    fn read_all<P: RecordParser>(parser: &mut P) -> Vec<Record> {
        let mut records = vec![];
        while let Some(record) = parser.read_record().unwrap() {
            records.push(record);
        }
        records
    }

    #[test]
    fn simple_records() {
        let mut parser = parser("a,b\nc,d\ne,f\n");
        assert_eq!(read_all(&mut parser), [["a", "b"], ["c", "d"], ["e", "f"]]);
        assert_eq!(parser.byte_position(), 12);
        assert_eq!(parser.row(), 3);
        assert_eq!(parser.record_number(), 3);
    }

    #[test]
    fn byte_position_after_each_record() {
        let mut parser = parser("a,b\ncc,dd\ne\n");
        let mut ends = vec![];
        while parser.read_record().unwrap().is_some() {
            ends.push(parser.byte_position());
        }
        assert_eq!(ends, [4, 10, 12]);
    }

    #[test]
    fn last_record_without_terminator() {
        let mut parser = parser("a,b\nc,");
        assert_eq!(read_all(&mut parser), [vec!["a", "b"], vec!["c", ""]]);
        assert_eq!(parser.byte_position(), 6);
    }

    #[test]
    fn line_endings() {
        let mut parser = parser("a\r\nb\rc\n");
        assert_eq!(read_all(&mut parser), [["a"], ["b"], ["c"]]);
        assert_eq!(parser.byte_position(), 7);
    }

    #[test]
    fn quoted_fields() {
        let mut parser = parser("\"a,b\",\"say \"\"hi\"\"\"\n\"multi\nline\",x\nun\"quoted,y\n");
        assert_eq!(
            read_all(&mut parser),
            [vec!["a,b", "say \"hi\""], vec!["multi\nline", "x"], vec!["un\"quoted", "y"]]
        );
        assert_eq!(parser.record_number(), 3);
    }

    #[test]
    fn text_after_closing_quote_is_kept() {
        let mut parser = parser("\"a\"b,c\n");
        assert_eq!(read_all(&mut parser), [["ab", "c"]]);
    }

    #[test]
    fn long_field_spans_chunks() {
        let long = "x".repeat(3 * FIELD_CHUNK + 17);
        let mut parser = parser(&format!("{long},y\n"));
        assert_eq!(read_all(&mut parser), [[long.as_str(), "y"]]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut parser = parser("\n\na\n\nb\n");
        assert_eq!(read_all(&mut parser), [["a"], ["b"]]);
        assert_eq!(parser.byte_position(), 7);
        assert_eq!(parser.row(), 5);
    }

    #[test]
    fn custom_dialect() {
        let config = Config::seeking().delimiter(b'\t').quote(b'\'').comment(Some(b'#'));
        let data = b"# header comment\n'a\tb'\tc\n".to_vec();
        let mut parser = CsvParser::from_reader(Cursor::new(data), config);
        assert_eq!(read_all(&mut parser), [["a\tb", "c"]]);
        assert_eq!(parser.byte_position(), 25);
    }

    #[test]
    fn utf8_byte_counting() {
        let mut parser = parser("é,ü\nx\n");
        assert_eq!(parser.read_record().unwrap().unwrap(), ["é", "ü"]);
        assert_eq!(parser.byte_position(), 6);
    }

    #[test]
    fn byte_counting_disabled() {
        let mut parser =
            CsvParser::from_reader(Cursor::new(b"a,b\n".to_vec()), Config::default());
        read_all(&mut parser);
        assert_eq!(parser.byte_position(), 0);
        assert_eq!(parser.record_number(), 1);
    }

    #[test]
    fn invalid_utf8() {
        let data = vec![b'a', b',', 0xff, b'\n'];
        let mut parser = CsvParser::from_reader(Cursor::new(data), Config::seeking());
        let err = parser.read_record().unwrap_err();
        assert!(matches!(err, CsvError::Utf8 { position: 4, .. }));
    }

    #[test]
    fn reset_keeps_stream_position() {
        let mut parser = parser("a\nb\nc\n");
        parser.read_record().unwrap();
        parser.reset();
        assert_eq!(parser.byte_position(), 0);
        assert_eq!(parser.row(), 0);
        assert_eq!(parser.record_number(), 0);
        assert_eq!(parser.read_record().unwrap().unwrap(), ["b"]);
        assert_eq!(parser.byte_position(), 2);
        assert_eq!(parser.record_number(), 1);
    }

    #[test]
    fn reset_after_end_of_stream() {
        let mut parser = parser("a\n");
        read_all(&mut parser);
        parser.reset();
        parser.source_mut().unwrap().base_stream().unwrap().rewind().unwrap();
        assert_eq!(read_all(&mut parser), [["a"]]);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut parser = parser("a\n");
        parser.dispose();
        parser.dispose();
        assert!(parser.is_disposed());
        assert!(parser.source_mut().is_none());
        assert!(matches!(parser.read_record(), Err(CsvError::Disposed)));
        assert!(matches!(parser.check_disposed(), Err(CsvError::Disposed)));
    }

    #[test]
    fn source_without_stream() {
        let mut parser = CsvParser::new(Sequential(b"a,b\nc\n"), Config::seeking());
        assert_eq!(read_all(&mut parser), [vec!["a", "b"], vec!["c"]]);
        assert!(parser.source_mut().unwrap().base_stream().is_none());
    }
}
