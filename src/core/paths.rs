use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the paths to avoid repeated environment lookups
static MODELS_DIR: OnceLock<PathBuf> = OnceLock::new();

pub const MODELS_DIR_ENV: &str = "BGCPRED_MODELS_DIR";
pub const CONFIG_ENV: &str = "BGCPRED_CONFIG";
pub const LOG_ENV: &str = "BGCPRED_LOG";

/// Default directory of the pretrained artifacts.
/// Checks BGCPRED_MODELS_DIR, falls back to `models` in the working directory
pub fn default_models_dir() -> PathBuf {
    MODELS_DIR
        .get_or_init(|| {
            std::env::var_os(MODELS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("models"))
        })
        .clone()
}

/// Resolve the models directory: explicit flag, then config, then default
pub fn resolve_models_dir(flag: Option<&PathBuf>, configured: Option<&str>) -> PathBuf {
    flag.cloned()
        .or_else(|| configured.map(PathBuf::from))
        .unwrap_or_else(default_models_dir)
}
