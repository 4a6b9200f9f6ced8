pub mod delimited;
pub mod extract;
pub mod fasta;
pub mod genbank;
pub mod sequence;

pub use extract::{extract_sequences, InputFormat};
pub use sequence::Sequence;

use crate::BgcError;
use std::fs::File;
use std::path::Path;

/// Open an input file, keeping the path in the error
pub(crate) fn open_input(path: &Path) -> Result<File, BgcError> {
    File::open(path).map_err(|source| BgcError::Input {
        path: path.to_path_buf(),
        source,
    })
}
