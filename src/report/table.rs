/// CSV rendering with a `Prediction,Confidence` header
use crate::core::predictor::Prediction;
use crate::report::{format_confidence, ReportOptions};
use crate::BgcError;
use anyhow::Result;

pub fn generate_csv_report(results: &[Result<Prediction, BgcError>], options: &ReportOptions) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Prediction", "Confidence"])?;

    for result in results {
        match result {
            Ok(prediction) => {
                let label = prediction.label.as_deref().unwrap_or(&options.unassigned_label);
                let confidence = format_confidence(prediction.confidence);
                writer.write_record([label, confidence.as_str()])?;
            }
            Err(_) => writer.write_record(["Error", ""])?,
        }
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
