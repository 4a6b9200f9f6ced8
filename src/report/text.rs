use crate::core::predictor::Prediction;
use crate::report::{format_confidence, ReportOptions};
use crate::BgcError;
use anyhow::Result;
use std::fmt::Write;

/// `Prediction: <label>, Confidence: <value>` for one result
pub fn format_line(result: &Result<Prediction, BgcError>, options: &ReportOptions) -> String {
    match result {
        Ok(prediction) => format!(
            "Prediction: {}, Confidence: {}",
            prediction.label.as_deref().unwrap_or(&options.unassigned_label),
            format_confidence(prediction.confidence)
        ),
        Err(e) => format!("Prediction: Error ({}), Confidence: NA", e),
    }
}

pub fn generate_text_report(results: &[Result<Prediction, BgcError>], options: &ReportOptions) -> Result<String> {
    let mut output = String::new();

    for result in results {
        writeln!(&mut output, "{}", format_line(result, options))?;
    }

    Ok(output)
}
