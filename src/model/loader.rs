/// Load-once access to the pretrained model artifacts.
///
/// The classifier, label encoder and reducer are serde values stored with
/// `bincode` (or JSON when the file name ends in `.json`); the embedding is a
/// word2vec text file. A loader reads them once and hands out the same
/// `Arc<ModelBundle>` afterwards.
use super::{LabelEncoder, ModelBundle, RandomForest, Reducer, ResidueEmbedding};
use crate::{BgcError, Result};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// File names of the four artifacts inside the models directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactNames {
    pub classifier: String,
    pub label_encoder: String,
    pub reducer: String,
    pub embedding: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            classifier: "rf_model.bin".to_string(),
            label_encoder: "label_encoder.bin".to_string(),
            reducer: "umap_model.bin".to_string(),
            embedding: "w2v_model.txt".to_string(),
        }
    }
}

impl ArtifactNames {
    pub fn all(&self) -> [(&'static str, &str); 4] {
        [
            ("classifier", &self.classifier),
            ("label encoder", &self.label_encoder),
            ("reducer", &self.reducer),
            ("embedding", &self.embedding),
        ]
    }
}

/// Somewhere model artifacts can be read from
pub trait ArtifactStore: Send + Sync {
    fn read(&self, name: &str) -> std::io::Result<Vec<u8>>;

    /// Human-readable location of one artifact, used in errors
    fn locate(&self, name: &str) -> String;
}

/// Artifacts stored as plain files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for DirectoryStore {
    fn read(&self, name: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }

    fn locate(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

/// Decode a serde artifact, choosing the codec from the file name
pub fn decode_artifact<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> std::result::Result<T, String> {
    if name.ends_with(".json") {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    } else {
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }
}

/// Encode a serde artifact, choosing the codec from the file name
pub fn encode_artifact<T: Serialize>(name: &str, value: &T) -> Result<Vec<u8>> {
    if name.ends_with(".json") {
        serde_json::to_vec_pretty(value).map_err(|e| BgcError::Model(e.to_string()))
    } else {
        bincode::serialize(value).map_err(|e| BgcError::Model(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub role: &'static str,
    pub location: String,
    pub size: usize,
    pub sha256: String,
}

pub struct ModelLoader<S: ArtifactStore = DirectoryStore> {
    store: S,
    names: ArtifactNames,
    bundle: Mutex<Option<Arc<ModelBundle>>>,
}

impl ModelLoader<DirectoryStore> {
    pub fn from_dir(dir: impl Into<PathBuf>, names: ArtifactNames) -> Self {
        Self::new(DirectoryStore::new(dir), names)
    }
}

impl<S: ArtifactStore> ModelLoader<S> {
    pub fn new(store: S, names: ArtifactNames) -> Self {
        Self {
            store,
            names,
            bundle: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The shared bundle, reading the artifacts only on the first successful
    /// call. Concurrent first callers wait on the lock rather than loading twice.
    /// A failed load caches nothing.
    pub fn load(&self) -> Result<Arc<ModelBundle>> {
        let mut slot = self.bundle.lock();
        if let Some(bundle) = slot.as_ref() {
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(self.read_bundle()?);
        *slot = Some(Arc::clone(&bundle));
        info!("Models loaded successfully.");
        Ok(bundle)
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.lock().is_some()
    }

    fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        let bytes = self
            .store
            .read(name)
            .map_err(|e| BgcError::model_load(self.store.locate(name), e.to_string()))?;
        debug!("Read {} bytes from {}", bytes.len(), self.store.locate(name));
        Ok(bytes)
    }

    fn read_serde<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let bytes = self.read_artifact(name)?;
        decode_artifact(name, &bytes).map_err(|e| BgcError::model_load(self.store.locate(name), e))
    }

    fn read_bundle(&self) -> Result<ModelBundle> {
        let names = &self.names;

        let classifier: RandomForest = self.read_serde(&names.classifier)?;
        classifier
            .validate()
            .map_err(|e| BgcError::model_load(self.store.locate(&names.classifier), e))?;

        let labels: LabelEncoder = self.read_serde(&names.label_encoder)?;
        labels
            .validate()
            .map_err(|e| BgcError::model_load(self.store.locate(&names.label_encoder), e))?;

        let reducer: Reducer = self.read_serde(&names.reducer)?;
        reducer
            .validate()
            .map_err(|e| BgcError::model_load(self.store.locate(&names.reducer), e))?;

        let raw = self.read_artifact(&names.embedding)?;
        let text = std::str::from_utf8(&raw)
            .map_err(|e| BgcError::model_load(self.store.locate(&names.embedding), e.to_string()))?;
        let embedding = ResidueEmbedding::from_word2vec_text(text, &self.store.locate(&names.embedding))?;

        ModelBundle::new(classifier, labels, reducer, embedding)
    }

    /// Size and SHA-256 of every artifact, read fresh from the store
    pub fn artifact_checksums(&self) -> Result<Vec<ArtifactInfo>> {
        self.names
            .all()
            .into_iter()
            .map(|(role, name)| {
                let bytes = self.read_artifact(name)?;
                Ok(ArtifactInfo {
                    role,
                    location: self.store.locate(name),
                    size: bytes.len(),
                    sha256: hex::encode(Sha256::digest(&bytes)),
                })
            })
            .collect()
    }
}
