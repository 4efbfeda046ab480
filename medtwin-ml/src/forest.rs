//! Isolation forest: an ensemble of randomized partition trees.
//!
//! Scoring follows the standard convention: s = 2^(−E[h]/c(ψ)) where h is
//! the path length to isolation and c(ψ) the expected path length of an
//! unsuccessful BST search over the subsample. Scores near 0.5 are
//! ordinary; scores approaching 1 are isolated quickly and anomalous.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::Rng;

const EULER_MASCHERONI: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful search in a BST of n nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        n => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
        }
    }
}

// ── Trees ───────────────────────────────────────────────────────────────────

/// Arena-allocated tree node; child links are indices into the tree's
/// node vector.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
enum Node {
    Internal { feature: usize, split: f64, left: usize, right: usize },
    Leaf { size: usize },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct IsoTree {
    nodes: Vec<Node>,
    root: usize,
}

impl IsoTree {
    fn build(samples: &[Vec<f64>], indices: &[usize], height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = IsoTree { nodes: Vec::new(), root: 0 };
        tree.root = tree.grow(samples, indices, 0, height_limit, rng);
        tree
    }

    fn grow(
        &mut self,
        samples: &[Vec<f64>],
        indices: &[usize],
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        if depth >= height_limit || indices.len() <= 1 {
            return self.push(Node::Leaf { size: indices.len() });
        }

        // Only features that actually vary across this partition can split it.
        let dim = samples[indices[0]].len();
        let splittable: Vec<usize> = (0..dim)
            .filter(|&f| {
                let (min, max) = feature_range(samples, indices, f);
                max > min
            })
            .collect();
        if splittable.is_empty() {
            return self.push(Node::Leaf { size: indices.len() });
        }

        let feature = splittable[rng.gen_range(0..splittable.len())];
        let (min, max) = feature_range(samples, indices, feature);
        let split = rng.gen_range(min..max);

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| samples[i][feature] < split);

        let left = self.grow(samples, &left_idx, depth + 1, height_limit, rng);
        let right = self.grow(samples, &right_idx, depth + 1, height_limit, rng);
        self.push(Node::Internal { feature, split, left, right })
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut idx = self.root;
        let mut depth = 0.0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Internal { feature, split, left, right } => {
                    idx = if sample[*feature] < *split { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

fn feature_range(samples: &[Vec<f64>], indices: &[usize], feature: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &i in indices {
        let v = samples[i][feature];
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

// ── Forest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsoTree>,
    subsample_size: usize,
    /// Calibrated at fit time as the (1 − contamination) quantile of the
    /// training score distribution. Anomalous means strictly above it.
    threshold: f64,
}

impl IsolationForest {
    /// Fit an ensemble on standardized samples and calibrate the decision
    /// threshold from the training distribution.
    pub fn fit(
        samples: &[Vec<f64>],
        n_estimators: usize,
        max_samples: usize,
        contamination: f64,
        rng: &mut StdRng,
    ) -> Self {
        let n = samples.len();
        let subsample_size = max_samples.min(n).max(1);
        let height_limit = (subsample_size as f64).log2().ceil().max(1.0) as usize;

        let all: Vec<usize> = (0..n).collect();
        let trees = (0..n_estimators)
            .map(|_| {
                let indices: Vec<usize> = if subsample_size < n {
                    sample(rng, n, subsample_size).into_vec()
                } else {
                    all.clone()
                };
                IsoTree::build(samples, &indices, height_limit, rng)
            })
            .collect();

        let mut forest = Self { trees, subsample_size, threshold: 0.5 };
        forest.threshold = forest.calibrate(samples, contamination);
        forest
    }

    fn calibrate(&self, samples: &[Vec<f64>], contamination: f64) -> f64 {
        let mut scores: Vec<f64> = samples.iter().map(|s| self.score(s)).collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = scores.len();
        if n == 0 {
            return 0.5;
        }
        let rank = ((1.0 - contamination.clamp(0.0, 1.0)) * n as f64).ceil() as usize;
        scores[rank.clamp(1, n) - 1]
    }

    /// Anomaly measure in (0, 1]; ~0.5 for ordinary points.
    pub fn score(&self, sample: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let mean_path: f64 = self.trees.iter().map(|t| t.path_length(sample)).sum::<f64>()
            / self.trees.len() as f64;
        let norm = average_path_length(self.subsample_size);
        if norm == 0.0 {
            return 0.5;
        }
        2f64.powf(-mean_path / norm)
    }

    pub fn is_anomalous(&self, sample: &[f64]) -> bool {
        self.score(sample) > self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}
