pub mod bio;
pub mod cli;
pub mod core;
pub mod model;
pub mod report;
pub mod utils;

pub use crate::bio::extract::{extract_sequences, InputFormat};
pub use crate::core::{
    batch::{predict_all, BatchRunner},
    predictor::{predict, Prediction, Predictor, Threshold},
};
pub use crate::model::{loader::ModelLoader, ModelBundle};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BgcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid input format '{0}' (expected one of: single, fasta, gbk, csv)")]
    InvalidFormat(String),

    #[error("Failed to load model artifact '{artifact}': {message}")]
    ModelLoad { artifact: String, message: String },

    #[error("No residue of the sequence is known to the embedding model")]
    EmptyEmbedding,

    #[error("Invalid threshold {0}: must lie within [0, 1]")]
    InvalidThreshold(f64),

    #[error("{0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),
}

impl BgcError {
    pub(crate) fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        BgcError::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub(crate) fn model_load(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        BgcError::ModelLoad {
            artifact: artifact.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BgcError>;
