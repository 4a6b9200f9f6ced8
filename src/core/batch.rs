/// Batch prediction over many sequences.
///
/// Every input gets exactly one entry in the output, at the same position,
/// whether it succeeded or not. One bad sequence never discards the batch.
use crate::bio::sequence::Sequence;
use crate::core::predictor::{predict, Prediction, Predictor, Threshold};
use crate::model::ModelBundle;
use crate::utils::parallel;
use crate::{BgcError, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Predict every sequence on the calling thread, in order
pub fn predict_all(sequences: &[Sequence], bundle: &ModelBundle, threshold: Threshold) -> Vec<Result<Prediction>> {
    sequences
        .iter()
        .map(|seq| predict(seq.residues(), bundle, threshold))
        .collect()
}

pub struct BatchRunner {
    threads: usize,
    progress: ProgressBar,
}

impl BatchRunner {
    /// `threads == 1` runs inline; `0` uses one worker per core
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn threads(&self) -> usize {
        parallel::resolve_threads(self.threads)
    }

    /// Run the predictor over all sequences. The bundle must already be
    /// loaded: workers only ever see the shared, immutable handle.
    pub fn run(&self, predictor: &Predictor, sequences: &[Sequence]) -> Result<Vec<Result<Prediction>>> {
        let threads = self.threads();
        self.progress.set_length(sequences.len() as u64);

        let classify = |seq: &Sequence| {
            let result = predictor.predict(seq.residues());
            self.progress.inc(1);
            result
        };

        let results: Vec<Result<Prediction>> = if threads <= 1 || sequences.len() <= 1 {
            sequences.iter().map(classify).collect()
        } else {
            let pool = parallel::build_pool(threads)
                .map_err(|e| BgcError::Config(format!("Failed to initialize thread pool: {}", e)))?;
            debug!("Predicting {} sequences on {} threads", sequences.len(), threads);
            // Indexed collect keeps input order regardless of completion order
            pool.install(|| sequences.par_iter().map(classify).collect())
        };

        self.progress.finish_and_clear();

        for (seq, result) in sequences.iter().zip(&results) {
            if let Err(e) = result {
                warn!("Sequence '{}' could not be classified: {}", seq.id, e);
            }
        }

        Ok(results)
    }
}
