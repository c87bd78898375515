use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use super::trend_line::TrendLine;
use crate::error::{Error, Result};
use crate::trends::DistanceReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::Parse(format!("unknown output format '{}'", other))),
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_csv(lines: &[TrendLine]) -> String {
    let mut out = String::from("topic,timestamp,count,delta_count,delta_delta_count,trending\n");

    for line in lines {
        let topic = csv_field(line.topic());
        for point in line {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{}",
                topic,
                point.timestamp(),
                point.count(),
                point.delta_count(),
                point.delta_delta_count(),
                u8::from(point.trending())
            );
        }
    }

    out
}

pub fn render_json(lines: &[TrendLine]) -> Result<String> {
    let topics: Vec<_> = lines
        .iter()
        .map(|line| {
            let points: Vec<_> = line.iter().collect();
            json!({
                "topic": line.topic(),
                "points": points,
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({ "trend_lines": topics }))
        .map_err(|e| Error::Export(format!("Failed to serialize JSON: {}", e)))
}

pub fn render_reports_json(reports: &[DistanceReport]) -> Result<String> {
    serde_json::to_string_pretty(reports)
        .map_err(|e| Error::Export(format!("Failed to serialize JSON: {}", e)))
}

pub fn export_to_csv(lines: &[TrendLine], path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_csv(lines).as_bytes())?;
    Ok(())
}

pub fn export_to_json(lines: &[TrendLine], path: impl AsRef<Path>) -> Result<()> {
    let json_str = render_json(lines)?;
    let mut file = File::create(path)?;
    file.write_all(json_str.as_bytes())?;
    Ok(())
}
