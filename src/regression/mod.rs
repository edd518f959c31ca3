//! Regression models trained from the rolling history
//!
//! - `tree`: CART regression trees
//! - `forest`: bootstrap-aggregated forests of those trees
//! - `trainer`: fits the temperature, humidity and pressure models from a window of readings

pub mod forest;
pub mod tree;
pub mod trainer;

/// Feature vector: `[temperature, humidity, pressure]`
pub type Features = [f64; 3];

pub use forest::{ForestParams, RandomForest};
pub use trainer::{FieldSpread, TrainedModels, TrainerSettings, train};
pub use tree::{RegressionTree, TreeParams};
