/*!
Delimited-text record parser that can seek to a byte offset and resume parsing

### Index
```rust, no_run
# use std::fs::File;
# use std::io::BufReader;
# use seekcsv::SeekingParser;
let file = File::open("large.csv").unwrap();
let mut parser = SeekingParser::new(BufReader::new(file)).unwrap();

// raw byte offset of every record
let mut index = vec![];
for record in parser.records() {
    let (offset, _fields) = record.unwrap();
    index.push(offset);
}
```

### Seek
```rust, no_run
# use std::fs::File;
# use std::io::BufReader;
# use seekcsv::SeekingParser;
# let index = vec![0, 12, 27];
let file = File::open("large.csv").unwrap();
let mut parser = SeekingParser::new(BufReader::new(file)).unwrap();

// jump to the third record without reading the first two
parser.seek(index[2]).unwrap();
let fields = parser.read_record().unwrap().unwrap();
assert_eq!(parser.record_start_position_raw(), 27);
```
*/

#[cfg(doctest)]
#[doc = include_str!("../../README.md")]
type _ReadmeTest = ();

pub mod config;
pub use config::Config;
pub mod error;
pub use error::{CsvError, Result};
pub mod parser;
pub use parser::{CsvParser, Record, RecordParser};
pub mod read_seek;
pub use read_seek::{ReadSeek, TextSource};
pub mod seeking;
pub use seeking::{Records, SeekingParser};
