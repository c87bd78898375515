use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use super::aggregator::{Aggregation, SeriesAggregator};
use super::record::parse_tsv_line;
use crate::error::{Error, ParseErrorKind, RecordParseError, Result};
use crate::logger::Reporter;

/// Encodings a record file can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Tsv,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Tsv => write!(f, "tsv"),
        }
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(FileType::Tsv),
            other => Err(Error::Parse(format!("unsupported file type '{}'", other))),
        }
    }
}

/// Opens `path` and aggregates every record in it.
pub fn load_file<R: Reporter>(path: impl AsRef<Path>, file_type: FileType, reporter: R) -> Result<Aggregation> {
    let path = path.as_ref();
    reporter.info(format_args!("Opening {} file {}", file_type, path.display()));
    let file = File::open(path)?;
    let aggregation = load_reader(file, file_type, reporter)?;
    Ok(aggregation)
}

/// Aggregates records read from any byte stream. Only I/O failures abort;
/// undecodable lines are collected in the result.
pub fn load_reader<In: Read, R: Reporter>(input: In, file_type: FileType, reporter: R) -> Result<Aggregation> {
    let mut reader = BufReader::new(input);
    let mut aggregator = SeriesAggregator::new(reporter);

    match file_type {
        FileType::Tsv => {
            let mut buf = Vec::new();
            let mut line = 0;
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                line += 1;

                let text = match std::str::from_utf8(&buf) {
                    Ok(text) => text,
                    Err(_) => {
                        aggregator.reject(RecordParseError::new(line, ParseErrorKind::InvalidEncoding));
                        continue;
                    }
                };

                match parse_tsv_line(line, text) {
                    Ok(Some(record)) => aggregator.push(record),
                    Ok(None) => {}
                    Err(error) => aggregator.reject(error),
                }
            }
        }
    }

    Ok(aggregator.finish())
}
