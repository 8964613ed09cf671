use thiserror::Error;

/// One variant per failure mode the decoder and query core can raise.
/// Propagation policy: a decode error aborts the current row/command; no
/// partial output is emitted and there is no retry (the source file is
/// read-only and a failure indicates either corruption or an out-of-scope
/// construct such as an overflow page).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated varint at offset {offset}")]
    TruncatedVarint { offset: u64 },

    #[error("record header overrun: header claims {header_size} bytes but a serial type varint crosses the boundary")]
    RecordHeaderOverrun { header_size: u64 },

    #[error("unexpected end of record payload")]
    UnexpectedEof,

    #[error("invalid serial type code {0}")]
    BadSerialType(i64),

    #[error("invalid page type byte {0}")]
    BadPageType(u8),

    #[error("malformed page header: {0}")]
    BadPageHeader(String),

    #[error("root page {page} is out of range for a file with {page_count} pages")]
    BadRootPage { page: u32, page_count: u32 },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("could not parse query: {0}")]
    MalformedQuery(String),

    #[error("payload on page {page} spills to an overflow page, which is out of scope")]
    UnsupportedOverflow { page: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
