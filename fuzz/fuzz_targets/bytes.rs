#![no_main]

use std::io::{BufReader, Cursor};

use libfuzzer_sys::fuzz_target;
use seekcsv::SeekingParser;

fuzz_target!(|data: Vec<u8>| {
    let reader = BufReader::with_capacity(7, Cursor::new(data));
    let Ok(mut parser) = SeekingParser::new(reader) else {
        return;
    };

    // doesn't crash, and records found by a full pass read the same after a seek
    let index: Vec<_> = parser.records().map_while(Result::ok).collect();
    for (offset, record) in index.iter().rev() {
        parser.seek(*offset).unwrap();
        assert_eq!(parser.read_record().unwrap().as_ref(), Some(record));
    }
});
