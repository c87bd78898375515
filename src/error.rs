use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error(transparent)]
    DistanceUndefined(#[from] DistanceUndefined),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single input line that could not be decoded into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct RecordParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl RecordParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected 4 tab-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("empty topic name")]
    EmptyTopic,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid count '{0}'")]
    InvalidCount(String),

    #[error("invalid trending flag '{0}'")]
    InvalidTrending(String),

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// Two trend lines had no timestamps in common, so no distance exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("distance between '{left}' and '{right}' is undefined: no comparable timestamps")]
pub struct DistanceUndefined {
    pub left: String,
    pub right: String,
}

/// Non-fatal conditions surfaced alongside a successful aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No records were aggregated at all.
    EmptyInput,
    /// A delta or delta-delta did not fit in i64 and was saturated.
    DeltaOverflow { topic: String, timestamp: i64 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::EmptyInput => write!(f, "no records were read from the input"),
            Warning::DeltaOverflow { topic, timestamp } => write!(
                f,
                "delta for '{}' at {} overflowed and was saturated",
                topic, timestamp
            ),
        }
    }
}
