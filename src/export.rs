use crate::error::ExportError;
use crate::models::ResultSet;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_EXPORT_FILE: &str = "document_evaluation_results.csv";

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Document")]
    document: &'a str,
    #[serde(rename = "Verdict")]
    verdict: &'a str,
    #[serde(rename = "Confidence")]
    confidence: f64,
    #[serde(rename = "Explanation")]
    explanation: &'a str,
}

/// Writes `Document,Verdict,Confidence,Explanation` rows with a header.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    if results.is_empty() {
        csv.write_record(["Document", "Verdict", "Confidence", "Explanation"])?;
    }

    for result in results {
        csv.serialize(ExportRow {
            document: &result.document,
            verdict: &result.verdict,
            confidence: result.confidence,
            explanation: &result.explanation,
        })?;
    }

    csv.flush()?;
    Ok(())
}

pub fn to_csv_bytes(results: &ResultSet) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_csv(results, &mut buffer)?;
    Ok(buffer)
}

/// Pretty-printed JSON array of the results, all fields included.
pub fn write_json<W: Write>(results: &ResultSet, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    Ok(())
}

pub fn export_to_path(results: &ResultSet, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(results, file)?;
    tracing::info!(path = %path.display(), rows = results.len(), "results exported");
    Ok(())
}
