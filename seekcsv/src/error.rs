use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors generated from library
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("std io error: {0}")]
    StdIo(#[from] io::Error),

    /// Parser configuration cannot be used for the requested operation
    #[error("configuration error: {0}")]
    Configuration(&'static str),

    /// Reader is not backed by a stream that can seek
    #[error("unsupported stream: {}", unsupported_reason(.0))]
    UnsupportedStream(Option<io::Error>),

    /// Stream reported a position that cannot be a valid byte offset
    #[error("invalid stream state: stream reports offset {0:#x}")]
    InvalidStreamState(u64),

    /// Initial offset or seek target outside the signed 64-bit range
    #[error("byte offset {0:#x} out of range")]
    OffsetOutOfRange(u64),

    /// Parser was already disposed
    #[error("parser has been disposed")]
    Disposed,

    #[error("field at line {line}, byte {position} is not valid utf-8")]
    Utf8 {
        line: u64,
        position: u64,
        #[source]
        source: FromUtf8Error,
    },
}

fn unsupported_reason(e: &Option<io::Error>) -> String {
    match e {
        Some(e) => format!("stream cannot seek: {e}"),
        None => "reader does not expose a seekable stream".to_string(),
    }
}

pub type Result<T, E = CsvError> = core::result::Result<T, E>;
