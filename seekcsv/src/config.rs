/// Tokenizer settings shared by [`CsvParser`](crate::CsvParser) and
/// [`SeekingParser`](crate::SeekingParser)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Field separator
    pub delimiter: u8,
    /// Byte that opens and closes a quoted field
    pub quote: u8,
    /// Byte that escapes a quote inside a quoted field, instead of doubling it
    pub escape: Option<u8>,
    /// Lines starting with this byte are skipped
    pub comment: Option<u8>,
    /// Maintain the running count of consumed bytes.
    ///
    /// Required by [`SeekingParser`](crate::SeekingParser), off by default since
    /// plain sequential parsing has no use for it.
    pub count_bytes: bool,
    /// Capacity of the [`BufReader`](std::io::BufReader) built by
    /// [`CsvParser::from_reader`](crate::CsvParser::from_reader)
    pub buffer_capacity: usize,
}

impl Config {
    /// Default read-ahead buffer size
    pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

    /// Default configuration with byte counting enabled
    pub fn seeking() -> Self {
        Self { count_bytes: true, ..Self::default() }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn escape(mut self, escape: Option<u8>) -> Self {
        self.escape = escape;
        self
    }

    pub fn comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    pub fn count_bytes(mut self, count_bytes: bool) -> Self {
        self.count_bytes = count_bytes;
        self
    }

    pub fn buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    pub(crate) fn core_reader(&self) -> csv_core::Reader {
        csv_core::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .comment(self.comment)
            .build()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            count_bytes: false,
            buffer_capacity: Self::DEFAULT_BUFFER_CAPACITY,
        }
    }
}
