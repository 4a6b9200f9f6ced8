/// Pretrained model artifacts and the bundle that ties them together.
///
/// Each stage of inference is reached through a trait so the pipeline does
/// not care whether it talks to a loaded artifact or a test double:
/// - [`ResidueVocabulary`]: residue symbol to embedding vector
/// - [`DimensionReducer`]: sequence vector to reduced vector
/// - [`ProbabilityModel`]: reduced vector to class probabilities
pub mod classifier;
pub mod embedding;
pub mod label_encoder;
pub mod loader;
pub mod reducer;

pub use classifier::{DecisionTree, RandomForest, TreeNode};
pub use embedding::ResidueEmbedding;
pub use label_encoder::LabelEncoder;
pub use loader::{ArtifactNames, ArtifactStore, DirectoryStore, ModelLoader};
pub use reducer::{LinearProjection, NeighborEmbedding, Reducer};

use crate::{BgcError, Result};
use serde::Serialize;

pub trait ResidueVocabulary: Send + Sync {
    /// Length of every vector in the vocabulary
    fn dimension(&self) -> usize;

    /// Vector for a residue symbol, `None` when the symbol is out of vocabulary
    fn vector(&self, residue: u8) -> Option<&[f32]>;

    fn vocabulary_size(&self) -> usize;
}

pub trait DimensionReducer: Send + Sync {
    /// Expected input length, when the reducer knows it
    fn input_dimension(&self) -> Option<usize>;

    fn output_dimension(&self) -> Option<usize>;

    /// Map one sample; the fitted state is never modified
    fn transform(&self, sample: &[f64]) -> Result<Vec<f64>>;

    fn describe(&self) -> String;

    /// Internal consistency of the fitted state
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

pub trait ProbabilityModel: Send + Sync {
    fn n_features(&self) -> Option<usize>;

    fn n_classes(&self) -> usize;

    /// Class probabilities for one sample, indexed like the label encoder
    fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>>;

    fn describe(&self) -> String;

    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// The four artifacts needed for inference. Immutable once built and shared
/// read-only (behind an `Arc`) by every prediction.
pub struct ModelBundle {
    embedding: Box<dyn ResidueVocabulary>,
    reducer: Box<dyn DimensionReducer>,
    classifier: Box<dyn ProbabilityModel>,
    labels: LabelEncoder,
}

impl ModelBundle {
    /// Assemble a bundle, checking that the stages fit together
    pub fn new(
        classifier: impl ProbabilityModel + 'static,
        labels: LabelEncoder,
        reducer: impl DimensionReducer + 'static,
        embedding: impl ResidueVocabulary + 'static,
    ) -> Result<Self> {
        let bundle = Self {
            embedding: Box::new(embedding),
            reducer: Box::new(reducer),
            classifier: Box::new(classifier),
            labels,
        };
        bundle.check_shapes()?;
        Ok(bundle)
    }

    fn check_shapes(&self) -> Result<()> {
        let mismatch = |message: String| -> Result<()> { Err(BgcError::model_load("bundle", message)) };

        self.reducer
            .validate()
            .map_err(|e| BgcError::model_load("reducer", e))?;
        self.classifier
            .validate()
            .map_err(|e| BgcError::model_load("classifier", e))?;

        if let Some(input) = self.reducer.input_dimension() {
            if input != self.embedding.dimension() {
                return mismatch(format!(
                    "embedding dimension {} does not match reducer input dimension {}",
                    self.embedding.dimension(),
                    input
                ));
            }
        }

        if let (Some(output), Some(features)) = (self.reducer.output_dimension(), self.classifier.n_features()) {
            if output != features {
                return mismatch(format!(
                    "reducer output dimension {} does not match classifier feature count {}",
                    output, features
                ));
            }
        }

        if self.classifier.n_classes() != self.labels.len() {
            return mismatch(format!(
                "classifier predicts {} classes but the label encoder has {}",
                self.classifier.n_classes(),
                self.labels.len()
            ));
        }

        Ok(())
    }

    pub fn embedding(&self) -> &dyn ResidueVocabulary {
        self.embedding.as_ref()
    }

    pub fn reducer(&self) -> &dyn DimensionReducer {
        self.reducer.as_ref()
    }

    pub fn classifier(&self) -> &dyn ProbabilityModel {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            vocabulary_size: self.embedding.vocabulary_size(),
            embedding_dimension: self.embedding.dimension(),
            reducer: self.reducer.describe(),
            reduced_dimension: self.reducer.output_dimension(),
            classifier: self.classifier.describe(),
            classes: self.labels.classes().to_vec(),
        }
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("embedding_dimension", &self.embedding.dimension())
            .field("reducer", &self.reducer.describe())
            .field("classifier", &self.classifier.describe())
            .field("labels", &self.labels)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleSummary {
    pub vocabulary_size: usize,
    pub embedding_dimension: usize,
    pub reducer: String,
    pub reduced_dimension: Option<usize>,
    pub classifier: String,
    pub classes: Vec<String>,
}
