use crate::core::predictor::DEFAULT_THRESHOLD;
use crate::model::ArtifactNames;
use crate::report::OutputType;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelsConfig,
    pub prediction: PredictionConfig,
    pub performance: PerformanceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding the artifacts (defaults to ./models)
    pub dir: Option<String>,
    pub classifier: String,
    pub label_encoder: String,
    pub reducer: String,
    pub embedding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub threshold: f64,
    /// Text printed in place of a label when confidence is below threshold
    pub unassigned_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Worker threads for batch prediction (0 = all cores, 1 = inline)
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            prediction: PredictionConfig::default(),
            performance: PerformanceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let names = ArtifactNames::default();
        Self {
            dir: None, // Falls back to BGCPRED_MODELS_DIR, then ./models
            classifier: names.classifier,
            label_encoder: names.label_encoder,
            reducer: names.reducer,
            embedding: names.embedding,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            unassigned_label: "Unassigned".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputType::Console,
        }
    }
}

impl ModelsConfig {
    pub fn artifact_names(&self) -> ArtifactNames {
        ArtifactNames {
            classifier: self.classifier.clone(),
            label_encoder: self.label_encoder.clone(),
            reducer: self.reducer.clone(),
            embedding: self.embedding.clone(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::BgcError> {
        if !(0.0..=1.0).contains(&self.prediction.threshold) {
            return Err(crate::BgcError::Config(format!(
                "prediction.threshold must lie within [0, 1], got {}",
                self.prediction.threshold
            )));
        }

        for (role, name) in self.models.artifact_names().all() {
            if name.trim().is_empty() {
                return Err(crate::BgcError::Config(format!("models: empty file name for the {}", role)));
            }
        }

        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::BgcError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| crate::BgcError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::BgcError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::BgcError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::BgcError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgcpred.toml");
        let mut config = default_config();
        config.models.dir = Some("/opt/bgc/models".to_string());
        config.prediction.threshold = 0.65;
        config.output.format = OutputType::Json;

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[prediction]\nthreshold = 0.8\n").unwrap();
        assert_eq!(config.prediction.threshold, 0.8);
        assert_eq!(config.prediction.unassigned_label, "Unassigned");
        assert_eq!(config.models.embedding, "w2v_model.txt");
        assert_eq!(config.performance.threads, 1);
    }

    #[test]
    fn test_out_of_range_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[prediction]\nthreshold = 1.2\n").unwrap();
        assert!(matches!(load_config(&path), Err(crate::BgcError::Config(_))));
    }
}
