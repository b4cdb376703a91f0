//! Random forest classifier.
//!
//! Bagged CART trees grown on bootstrap samples with Gini impurity and a
//! random subset of candidate features per node. Leaves keep the class
//! distribution of their samples; the forest averages those distributions.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::debug;

use crate::error::ModelError;

use super::classifier::{validate_row, validate_training_set, Classifier, FittedClassifier, Prediction};

#[derive(Clone, Debug, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// None grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RandomForestClassifier {
    params: ForestParams,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn fit(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<Arc<dyn FittedClassifier>, ModelError> {
        let width = validate_training_set(features, labels)?;

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let targets: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let builder = TreeBuilder {
            features,
            targets: &targets,
            n_classes: classes.len(),
            max_features: ((width as f64).sqrt() as usize).clamp(1, width),
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split.max(2),
        };

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let n = features.len();
        let trees: Vec<DecisionTree> = (0..self.params.n_estimators.max(1))
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                builder.build(sample, &mut rng)
            })
            .collect();

        debug!(
            "🌲 [FOREST] Fitted {} trees on {} samples x {} features ({} classes)",
            trees.len(),
            n,
            width,
            classes.len()
        );

        Ok(Arc::new(FittedForest {
            classes,
            width,
            trees,
        }))
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution, indexed like `FittedForest::classes`.
    Leaf(Vec<f64>),
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn predict(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(dist) => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [usize],
    n_classes: usize,
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
}

impl TreeBuilder<'_> {
    /// Grows a tree over `samples` (row indices, duplicates allowed).
    fn build(&self, mut samples: Vec<usize>, rng: &mut StdRng) -> DecisionTree {
        let mut nodes = vec![Node::Leaf(Vec::new())];
        // (node index, start, end, depth) over `samples`
        let mut pending = vec![(0usize, 0usize, samples.len(), 0usize)];

        while let Some((node, start, end, depth)) = pending.pop() {
            let slice = &mut samples[start..end];
            let counts = self.class_counts(slice);

            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let too_deep = self.max_depth.is_some_and(|max| depth >= max);
            if pure || too_deep || slice.len() < self.min_samples_split {
                nodes[node] = leaf(&counts, slice.len());
                continue;
            }

            let Some(split) = self.best_split(slice, &counts, rng) else {
                nodes[node] = leaf(&counts, slice.len());
                continue;
            };

            let mid = partition(slice, |s| self.features[s][split.feature] <= split.threshold);
            if mid == 0 || mid == slice.len() {
                nodes[node] = leaf(&counts, slice.len());
                continue;
            }

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf(Vec::new()));
            nodes.push(Node::Leaf(Vec::new()));
            nodes[node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            pending.push((left, start, start + mid, depth + 1));
            pending.push((right, start + mid, end, depth + 1));
        }

        DecisionTree { nodes }
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &s in samples {
            counts[self.targets[s]] += 1;
        }
        counts
    }

    /// Lowest weighted child impurity over up to `max_features` non-constant
    /// features, drawn in random order.
    fn best_split(&self, samples: &[usize], counts: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let width = self.features[samples[0]].len();
        let mut order: Vec<usize> = (0..width).collect();
        order.shuffle(rng);

        let n = samples.len();
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for feature in order {
            if visited == self.max_features {
                break;
            }

            let mut values: Vec<(f64, usize)> = samples
                .iter()
                .map(|&s| (self.features[s][feature], self.targets[s]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Constant features do not count towards max_features.
            if values[0].0 == values[n - 1].0 {
                continue;
            }
            visited += 1;

            let mut left = vec![0usize; self.n_classes];
            let mut right = counts.to_vec();

            for i in 0..n - 1 {
                let (value, class) = values[i];
                left[class] += 1;
                right[class] -= 1;

                let next = values[i + 1].0;
                if next <= value {
                    continue;
                }

                let n_left = i + 1;
                let n_right = n - n_left;
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[usize], total: usize) -> Node {
    let total = total.max(1) as f64;
    Node::Leaf(counts.iter().map(|&c| c as f64 / total).collect())
}

/// Moves every element matching `go_left` to the front; returns how many matched.
fn partition(samples: &mut [usize], go_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..samples.len() {
        if go_left(samples[i]) {
            samples.swap(i, mid);
            mid += 1;
        }
    }
    mid
}

struct FittedForest {
    /// Sorted distinct training labels.
    classes: Vec<i64>,
    width: usize,
    trees: Vec<DecisionTree>,
}

impl FittedClassifier for FittedForest {
    fn n_features(&self) -> usize {
        self.width
    }

    fn predict(&self, row: &[f64]) -> Result<Prediction, ModelError> {
        validate_row(row, self.width)?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in proba.iter_mut() {
            *p /= n_trees;
        }

        // Ties resolve to the lowest label.
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }

        Ok(Prediction {
            label: self.classes[best],
            probabilities: self.classes.iter().copied().zip(proba).collect(),
        })
    }
}
