use crate::bio::{delimited, fasta, genbank, sequence::Sequence};
use crate::BgcError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the protein sequences come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// The input value is itself one protein sequence
    Single,
    /// Multi-FASTA file
    Fasta,
    /// GenBank file; CDS translations are used
    #[value(alias = "genbank")]
    Gbk,
    /// CSV file with the sequence in the first column
    Csv,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Single => "single",
            InputFormat::Fasta => "fasta",
            InputFormat::Gbk => "gbk",
            InputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InputFormat {
    type Err = BgcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(InputFormat::Single),
            "fasta" => Ok(InputFormat::Fasta),
            "gbk" | "genbank" => Ok(InputFormat::Gbk),
            "csv" => Ok(InputFormat::Csv),
            _ => Err(BgcError::InvalidFormat(s.to_string())),
        }
    }
}

/// Turn an input value into an ordered list of sequences. For `Single` the
/// value is the sequence; for every other format it is a file path.
pub fn extract_sequences(input: &str, format: InputFormat) -> Result<Vec<Sequence>, BgcError> {
    let sequences = match format {
        InputFormat::Single => vec![Sequence::from_residues("query", input)],
        InputFormat::Fasta => fasta::parse_fasta(Path::new(input))?,
        InputFormat::Gbk => {
            let records = genbank::parse_genbank(Path::new(input))?;
            genbank::cds_translations(&records)
        }
        InputFormat::Csv => delimited::parse_csv_sequences(Path::new(input))?,
    };

    tracing::debug!("Extracted {} sequences ({} input)", sequences.len(), format);
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("single", InputFormat::Single)]
    #[case("FASTA", InputFormat::Fasta)]
    #[case("gbk", InputFormat::Gbk)]
    #[case("genbank", InputFormat::Gbk)]
    #[case("csv", InputFormat::Csv)]
    fn test_format_tokens(#[case] token: &str, #[case] expected: InputFormat) {
        assert_eq!(token.parse::<InputFormat>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_format_token() {
        let err = "embl".parse::<InputFormat>().unwrap_err();
        assert!(matches!(err, BgcError::InvalidFormat(ref t) if t == "embl"));
    }

    #[test]
    fn test_single_is_one_element() {
        let seqs = extract_sequences("MKVLA", InputFormat::Single).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].sequence, b"MKVLA");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = extract_sequences("/definitely/not/here.fasta", InputFormat::Fasta).unwrap_err();
        assert!(matches!(err, BgcError::Input { .. }));
        assert!(err.to_string().contains("/definitely/not/here.fasta"));
    }
}
