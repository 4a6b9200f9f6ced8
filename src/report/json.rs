use crate::core::predictor::Prediction;
use crate::report::ReportOptions;
use crate::BgcError;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonRecord {
    #[serde(rename = "Prediction")]
    prediction: Option<String>,
    #[serde(rename = "Confidence")]
    confidence: Option<f64>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Pretty JSON array, four-space indent. Unassigned predictions carry a
/// `null` label; failures carry `null` for both fields plus an `Error`.
pub fn generate_json_report(results: &[Result<Prediction, BgcError>], _options: &ReportOptions) -> Result<String> {
    let records: Vec<JsonRecord> = results
        .iter()
        .map(|result| match result {
            Ok(p) => JsonRecord {
                prediction: p.label.clone(),
                confidence: Some(p.confidence),
                error: None,
            },
            Err(e) => JsonRecord {
                prediction: None,
                confidence: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    buffer.push(b'\n');

    Ok(String::from_utf8(buffer)?)
}
