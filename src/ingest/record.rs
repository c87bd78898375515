use crate::error::{ParseErrorKind, RecordParseError};

/// A raw measurement as it arrives from a record source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub topic: String,
    pub timestamp: i64,
    pub count: u64,
    pub trending: bool,
}

impl Record {
    pub fn new(topic: impl Into<String>, timestamp: i64, count: u64, trending: bool) -> Self {
        Self {
            topic: topic.into(),
            timestamp,
            count,
            trending,
        }
    }
}

/// Decodes one `topic<TAB>timestamp<TAB>count<TAB>trending` line.
///
/// Returns `Ok(None)` for blank lines. `line` is the 1-based line number used
/// in error reports.
pub fn parse_tsv_line(line: usize, text: &str) -> Result<Option<Record>, RecordParseError> {
    let text = text.trim_end_matches(['\r', '\n']);
    if text.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = text.split('\t').collect();
    if fields.len() != 4 {
        return Err(RecordParseError::new(
            line,
            ParseErrorKind::FieldCount { found: fields.len() },
        ));
    }

    let topic = fields[0].trim();
    if topic.is_empty() {
        return Err(RecordParseError::new(line, ParseErrorKind::EmptyTopic));
    }

    let timestamp = fields[1]
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordParseError::new(line, ParseErrorKind::InvalidTimestamp(fields[1].to_string())))?;

    // Counts must fit in i64 so deltas between them are representable.
    let count = fields[2]
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&count| count <= i64::MAX as u64)
        .ok_or_else(|| RecordParseError::new(line, ParseErrorKind::InvalidCount(fields[2].to_string())))?;

    let trending = parse_flag(fields[3].trim())
        .ok_or_else(|| RecordParseError::new(line, ParseErrorKind::InvalidTrending(fields[3].to_string())))?;

    Ok(Some(Record::new(topic, timestamp, count, trending)))
}

fn parse_flag(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}
