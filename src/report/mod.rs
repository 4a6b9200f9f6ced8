use crate::core::predictor::Prediction;
use crate::BgcError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod json;
pub mod table;
pub mod text;

/// How prediction results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// One line per sequence on stdout
    #[default]
    Console,
    /// CSV file with a Prediction,Confidence header
    Csv,
    /// Text file, one line per sequence
    Txt,
    /// JSON array of {"Prediction", "Confidence"} objects
    Json,
}

impl OutputType {
    pub fn needs_file(&self) -> bool {
        !matches!(self, OutputType::Console)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Console => "console",
            OutputType::Csv => "csv",
            OutputType::Txt => "txt",
            OutputType::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_type: OutputType,
    /// Printed in place of a label for sub-threshold predictions
    pub unassigned_label: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_type: OutputType::Console,
            unassigned_label: "Unassigned".to_string(),
        }
    }
}

/// Confidence as printed in text and CSV output: always with a fractional
/// part, so `1.0` stays `1.0` like in the JSON rendering
pub fn format_confidence(confidence: f64) -> String {
    format!("{:?}", confidence)
}

/// Counts shown after a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub assigned: usize,
    pub unassigned: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_results(results: &[Result<Prediction, BgcError>]) -> Self {
        results.iter().fold(Self::default(), |mut tally, result| {
            match result {
                Ok(p) if p.is_assigned() => tally.assigned += 1,
                Ok(_) => tally.unassigned += 1,
                Err(_) => tally.failed += 1,
            }
            tally
        })
    }
}

pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, results: &[Result<Prediction, BgcError>]) -> Result<String> {
        match self.options.output_type {
            OutputType::Console | OutputType::Txt => text::generate_text_report(results, &self.options),
            OutputType::Csv => table::generate_csv_report(results, &self.options),
            OutputType::Json => json::generate_json_report(results, &self.options),
        }
    }

    /// Render and write to `path`
    pub fn write<P: AsRef<Path>>(&self, path: P, results: &[Result<Prediction, BgcError>]) -> Result<()> {
        let rendered = self.generate(results)?;
        std::fs::write(path.as_ref(), rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let results = vec![
            Ok(Prediction { label: Some("PKS".into()), confidence: 0.9 }),
            Ok(Prediction { label: None, confidence: 0.3 }),
            Err(BgcError::EmptyEmbedding),
            Ok(Prediction { label: Some("NRPS".into()), confidence: 0.5 }),
        ];
        assert_eq!(
            Tally::from_results(&results),
            Tally { assigned: 2, unassigned: 1, failed: 1 }
        );
    }

    #[test]
    fn test_confidence_keeps_fraction() {
        assert_eq!(format_confidence(1.0), "1.0");
        assert_eq!(format_confidence(0.0), "0.0");
        assert_eq!(format_confidence(0.7), "0.7");
    }

    #[test]
    fn test_unanimous_prediction_renders_alike_everywhere() {
        let results: Vec<Result<Prediction, BgcError>> =
            vec![Ok(Prediction { label: Some("PKS".into()), confidence: 1.0 })];
        let render = |output_type| {
            ReportGenerator::new(ReportOptions {
                output_type,
                ..ReportOptions::default()
            })
            .generate(&results)
            .unwrap()
        };

        assert_eq!(render(OutputType::Console), "Prediction: PKS, Confidence: 1.0\n");
        assert_eq!(render(OutputType::Csv), "Prediction,Confidence\nPKS,1.0\n");
        assert!(render(OutputType::Json).contains("\"Confidence\": 1.0"));
    }

    #[test]
    fn test_only_console_is_fileless() {
        assert!(!OutputType::Console.needs_file());
        assert!(OutputType::Csv.needs_file());
        assert!(OutputType::Txt.needs_file());
        assert!(OutputType::Json.needs_file());
    }
}
