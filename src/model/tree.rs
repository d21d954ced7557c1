//! CART regression tree
//!
//! Trees are stored as a flat node vector; node 0 is the root. Traversal
//! goes left when `features[feature] <= threshold`.
//!
//! Splits minimise the summed squared error of the two children. Every
//! feature is considered at every node and ties keep the first split found
//! (lowest feature index, then lowest threshold), so fitting is
//! deterministic for a given sample.

use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// A node with fewer samples than this becomes a leaf
    pub min_samples_split: usize,
    /// Maximum depth, root at depth 0. `None` grows until leaves are pure.
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

/// One node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// Internal node
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding the mean target of its samples
    Leaf { value: f64 },
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

/// Best split found for one node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// A node waiting to be grown
struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

impl RegressionTree {
    /// Fits a tree on the rows listed in `samples`.
    ///
    /// `samples` may repeat indices (bootstrap draws). The impurity decrease
    /// of every split is added to `importances[feature]`.
    pub(crate) fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        samples: Vec<usize>,
        params: &TreeParams,
        importances: &mut [f64],
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let (mean, sse) = mean_and_sse(targets, &samples);

            let depth_reached = params.max_depth.map_or(false, |max| depth >= max);
            let split = if samples.len() < params.min_samples_split || depth_reached || sse <= 0.0
            {
                None
            } else {
                best_split(rows, targets, &samples, sse)
            };

            let Some(split) = split else {
                nodes[node] = Node::Leaf { value: mean };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&i| rows[i][split.feature] <= split.threshold);

            importances[split.feature] += sse - split.sse;

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(Pending {
                node: right,
                samples: right_samples,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }

        Self { nodes }
    }

    /// Evaluates the tree. `features` must have at least as many entries as
    /// the highest feature index used by a split.
    pub fn predict(&self, features: &[f64]) -> f64 {
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

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Checks that the node graph is a well-formed tree over `n_features`.
    ///
    /// Children must point strictly forward, which rules out cycles and
    /// guarantees `predict` terminates.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {} has a non-finite leaf value", i));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            i, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Mean and summed squared error of the targets in `samples`
fn mean_and_sse(targets: &[f64], samples: &[usize]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&i| targets[i]).sum::<f64>() / n;
    let sse: f64 = samples
        .iter()
        .map(|&i| {
            let d = targets[i] - mean;
            d * d
        })
        .sum();
    (mean, sse)
}

/// Finds the split with the lowest combined child SSE, if any improves on
/// the parent.
fn best_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    samples: &[usize],
    parent_sse: f64,
) -> Option<SplitCandidate> {
    let n_features = rows.first().map_or(0, Vec::len);
    let total_sum: f64 = samples.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = samples.iter().map(|&i| targets[i] * targets[i]).sum();
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let mut best: Option<SplitCandidate> = None;
    let mut order = samples.to_vec();

    for feature in 0..n_features {
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for pos in 0..n - 1 {
            let y = targets[order[pos]];
            left_sum += y;
            left_sq += y * y;

            let here = rows[order[pos]][feature];
            let next = rows[order[pos + 1]][feature];
            if here >= next {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = (n - pos - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left).max(0.0)
                + (right_sq - right_sum * right_sum / n_right).max(0.0);

            if best.as_ref().map_or(true, |b| sse < b.sse) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }

    best.filter(|b| b.sse < parent_sse)
}
