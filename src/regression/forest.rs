//! Random forest regressor
//!
//! Each tree is fit on a bootstrap sample of the training rows drawn from a
//! seeded generator, so identical input always yields an identical forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::Features;
use super::tree::{RegressionTree, TreeParams};
use crate::{Result, SkycastError};

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Seed for bootstrap sampling
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fit a forest mapping rows of `x` to `y`.
    pub fn fit(x: &[Features], y: &[f64], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            return Err(SkycastError::validation("cannot fit a forest on zero samples"));
        }
        if x.len() != y.len() {
            return Err(SkycastError::validation(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(SkycastError::validation("n_estimators must be positive"));
        }

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees: Vec<RegressionTree> = (0..params.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, &params.tree)
            })
            .collect();

        debug!(
            "Fitted forest of {} trees on {} samples ({} nodes total)",
            trees.len(),
            n,
            trees.iter().map(RegressionTree::n_nodes).sum::<usize>()
        );

        Ok(Self { trees })
    }

    /// Mean of the individual tree predictions
    #[must_use]
    pub fn predict(&self, features: &Features) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        total / self.trees.len() as f64
    }
}
