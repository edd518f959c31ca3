//! CART regression tree
//!
//! Splits greedily on the threshold that minimises the summed squared error
//! of the two children, considering every feature at every node.

use super::Features;

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Nodes with fewer samples than this become leaves
    pub min_samples_split: usize,
    /// `None` grows until leaves are pure
    pub max_depth: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree on the rows of `x` selected by `indices`.
    ///
    /// `indices` may contain repeats (bootstrap samples) and must not be empty.
    #[must_use]
    pub fn fit(x: &[Features], y: &[f64], indices: &[usize], params: &TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(x, y, indices.to_vec(), 0, params);
        tree
    }

    #[must_use]
    pub fn predict(&self, features: &Features) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        match &self.nodes[index] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.depth_from(*left).max(self.depth_from(*right))
            }
        }
    }

    fn build(
        &mut self,
        x: &[Features],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let node_index = self.nodes.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
        if indices.len() < params.min_samples_split || depth_reached || is_pure(y, &indices) {
            return node_index;
        }

        let Some(split) = best_split(x, y, &indices) else {
            return node_index;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][split.feature] <= split.threshold);

        let left = self.build(x, y, left_indices, depth + 1, params);
        let right = self.build(x, y, right_indices, depth + 1, params);
        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }
}

fn is_pure(y: &[f64], indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| y[i] == first)
}

fn best_split(x: &[Features], y: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let n = indices.len();
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();

    let mut best: Option<BestSplit> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..x[indices[0]].len() {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..n - 1 {
            let value = y[sorted[k]];
            left_sum += value;
            left_sq += value * value;

            let current = x[sorted[k]][feature];
            let next = x[sorted[k + 1]][feature];
            if current == next {
                continue;
            }

            let left_n = (k + 1) as f64;
            let right_n = (n - k - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().is_none_or(|b| sse < b.sse) {
                let mut threshold = current + (next - current) / 2.0;
                // adjacent floats can round the midpoint up onto `next`
                if threshold >= next {
                    threshold = current;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }

    best
}
