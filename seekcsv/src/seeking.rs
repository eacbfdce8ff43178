use std::io::{Seek, SeekFrom};

use crate::error::{CsvError, Result};
use crate::parser::{CsvParser, Record, RecordParser};
use crate::read_seek::TextSource;
use crate::Config;

/// Record parser that can jump to a byte offset and resume parsing from there.
///
/// Positions come in two flavors:
/// - stream-relative: counted from where the stream was at construction, or from
///   the target of the last [`SeekingParser::seek`]
/// - raw: stream-relative plus [`SeekingParser::initial_offset`], which is the
///   position in the whole logical file
///
/// # Example
/// Build an index of raw record offsets, then jump straight to the last record.
/// ```rust
/// # use std::io::Cursor;
/// # use std::io::BufReader;
/// # use seekcsv::SeekingParser;
/// let reader = BufReader::new(Cursor::new(b"a,b\nc,d\ne,f\n".to_vec()));
/// let mut parser = SeekingParser::new(reader).unwrap();
///
/// let index: Vec<u64> = parser.records().map(|r| r.unwrap().0).collect();
/// assert_eq!(index, [0, 4, 8]);
///
/// parser.seek(index[2]).unwrap();
/// assert_eq!(parser.read_record().unwrap().unwrap(), ["e", "f"]);
/// assert_eq!(parser.record_start_position_raw(), 8);
/// ```
#[derive(Debug)]
pub struct SeekingParser<P> {
    parser: P,
    /// Bytes of the logical file before stream-relative position 0
    initial_offset: u64,
    /// Stream-relative byte position where the last read started
    record_start: u64,
}

impl<S: TextSource> SeekingParser<CsvParser<S>> {
    /// Parse `reader` with [`Config::seeking`], starting at raw position 0
    pub fn new(reader: S) -> Result<Self> {
        Self::with_config(reader, Config::seeking(), 0)
    }

    /// Parse `reader` whose current position corresponds to raw position
    /// `initial_offset` of the logical file
    pub fn with_config(reader: S, config: Config, initial_offset: u64) -> Result<Self> {
        Self::from_parser(CsvParser::new(reader, config), initial_offset)
    }
}

impl<P: RecordParser> SeekingParser<P> {
    /// Wrap an existing tokenizer.
    ///
    /// # Errors
    /// Checked in this order:
    /// - [`CsvError::Configuration`] if the tokenizer does not count bytes
    /// - [`CsvError::UnsupportedStream`] if there is no seekable stream beneath
    ///   the text source, or the stream cannot report its position
    /// - [`CsvError::InvalidStreamState`] if the reported position is not a valid
    ///   signed offset
    /// - [`CsvError::OffsetOutOfRange`] if `initial_offset` is not a valid signed
    ///   offset either
    pub fn from_parser(mut parser: P, initial_offset: u64) -> Result<Self> {
        if !parser.config().count_bytes {
            return Err(CsvError::Configuration("byte counting must be enabled for seeking"));
        }

        let stream = parser
            .source_mut()
            .and_then(|source| source.base_stream())
            .ok_or(CsvError::UnsupportedStream(None))?;
        let position =
            stream.stream_position().map_err(|e| CsvError::UnsupportedStream(Some(e)))?;
        if i64::try_from(position).is_err() {
            return Err(CsvError::InvalidStreamState(position));
        }
        check_offset(initial_offset)?;

        log::debug!("stream position {position}, initial offset {initial_offset}");
        Ok(Self { parser, initial_offset, record_start: 0 })
    }

    /// Read the next record.
    ///
    /// The record start position is taken before delegating, so it also moves for
    /// reads that fail or hit the end of the stream.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        self.parser.check_disposed()?;
        self.record_start = self.parser.byte_position();

        let record = self.parser.read_record();
        if let Err(e) = &record {
            let start = self.record_start_position_raw();
            log::warn!("read starting at raw byte {start} failed: {e}");
        }
        record
    }

    /// Stream-relative byte position of the start of the current record
    pub fn record_start_position(&self) -> u64 {
        self.record_start
    }

    /// Byte position of the start of the current record in the logical file
    pub fn record_start_position_raw(&self) -> u64 {
        self.record_start.saturating_add(self.initial_offset)
    }

    /// Stream-relative byte position the tokenizer is currently at
    pub fn position(&self) -> u64 {
        self.parser.byte_position()
    }

    /// Byte position the tokenizer is currently at in the logical file
    pub fn position_raw(&self) -> u64 {
        self.parser.byte_position().saturating_add(self.initial_offset)
    }

    pub fn initial_offset(&self) -> u64 {
        self.initial_offset
    }

    /// Records returned since construction or the last seek
    pub fn record_number(&self) -> u64 {
        self.parser.record_number()
    }

    /// Lines consumed since construction or the last seek
    pub fn row(&self) -> u64 {
        self.parser.row()
    }

    /// Move to absolute byte `position` of the underlying stream.
    ///
    /// `position` must be the start of a record, this is not checked. Afterwards
    /// [`SeekingParser::initial_offset`] is `position`, stream-relative positions
    /// restart from 0 and so does record numbering.
    ///
    /// # Errors
    /// [`CsvError::Disposed`] after [`SeekingParser::dispose`],
    /// [`CsvError::OffsetOutOfRange`] for targets past `i64::MAX`. A failed seek of
    /// the stream is returned as is. In all cases offsets and counters are untouched.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.parser.check_disposed()?;
        check_offset(position)?;
        let source = self.parser.source_mut().ok_or(CsvError::Disposed)?;
        let stream = source.base_stream().ok_or(CsvError::UnsupportedStream(None))?;

        stream.seek(SeekFrom::Start(position))?;
        source.discard_buffered_data();

        self.initial_offset = position;
        self.record_start = 0;
        self.parser.reset();
        log::debug!("seeked to byte {position}");
        Ok(())
    }

    /// Iterate over the remaining records paired with their raw start position.
    ///
    /// Iteration ends after the first error.
    pub fn records(&mut self) -> Records<'_, P> {
        Records { parser: self, done: false }
    }

    pub fn is_disposed(&self) -> bool {
        self.parser.is_disposed()
    }

    /// Release the reader and its stream. Position accessors keep returning the
    /// last values, everything touching the stream fails with
    /// [`CsvError::Disposed`].
    pub fn dispose(&mut self) {
        self.parser.dispose();
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn into_parser(self) -> P {
        self.parser
    }
}

/// Positions are handed out as `u64` but must also fit a signed offset
fn check_offset(offset: u64) -> Result<()> {
    match i64::try_from(offset) {
        Ok(_) => Ok(()),
        Err(_) => Err(CsvError::OffsetOutOfRange(offset)),
    }
}

/// Iterator returned by [`SeekingParser::records`]
pub struct Records<'a, P> {
    parser: &'a mut SeekingParser<P>,
    done: bool,
}

impl<P: RecordParser> Iterator for Records<'_, P> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.read_record() {
            Ok(Some(record)) => Some(Ok((self.parser.record_start_position_raw(), record))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
