pub mod batch;
pub mod config;
pub mod paths;
pub mod predictor;

pub use batch::{predict_all, BatchRunner};
pub use config::Config;
pub use predictor::{predict, Prediction, Predictor, Threshold};
