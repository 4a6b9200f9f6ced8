/// CSV input: one sequence per row, taken from the first column.
use crate::bio::sequence::Sequence;
use crate::BgcError;
use std::io::Read;
use std::path::Path;

pub fn parse_csv_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>, BgcError> {
    let path = path.as_ref();
    let file = super::open_input(path)?;
    read_csv_sequences(file, &path.display().to_string())
}

/// Read sequences from any CSV source. No header row is assumed and rows
/// may have differing widths.
pub fn read_csv_sequences<R: Read>(reader: R, origin: &str) -> Result<Vec<Sequence>, BgcError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sequences = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| BgcError::parse(origin, format!("row {}: {}", row + 1, e)))?;
        let first = record.get(0).unwrap_or("");
        sequences.push(Sequence::from_residues(format!("row{}", row + 1), first));
    }

    tracing::debug!("Read {} CSV rows from {}", sequences.len(), origin);
    Ok(sequences)
}
