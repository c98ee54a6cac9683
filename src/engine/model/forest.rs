// ==========================================
// 城市走廊通行决策系统 - 随机森林回归
// ==========================================
// CART 回归树（方差缩减）+ bootstrap 采样
// 红线: 训练使用固定种子（第 i 棵树种子 = seed + i），预测无随机性
// ==========================================

use crate::config::ModelConfig;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub max_features_ratio: f64,
    pub seed: u64,
}

impl From<&ModelConfig> for ForestParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            n_estimators: config.n_estimators.max(1),
            max_depth: config.max_depth.max(1),
            min_samples_leaf: config.min_samples_leaf.max(1),
            max_features_ratio: config.max_features_ratio,
            seed: config.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
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

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    left_len: usize,
    gain: f64,
}

// ==========================================
// RegressionTree
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &mut [usize],
        params: &ForestParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, indices, 0, params, rng);
        tree
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &mut [usize],
        depth: usize,
        params: &ForestParams,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= params.max_depth || indices.len() < 2 * params.min_samples_leaf {
            return node_id;
        }

        let split = match best_split(x, y, indices, params, rng) {
            Some(s) => s,
            None => return node_id,
        };

        let f = split.feature;
        indices.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));
        let (left, right) = indices.split_at_mut(split.left_len);
        let left_id = self.grow(x, y, left, depth + 1, params, rng);
        let right_id = self.grow(x, y, right, depth + 1, params, rng);

        self.nodes[node_id] = Node::Split {
            feature: f,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

/// 在随机抽取的候选特征上寻找 SSE 缩减最大的分裂点
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    params: &ForestParams,
    rng: &mut ChaCha8Rng,
) -> Option<SplitCandidate> {
    let n_features = x[indices[0]].len();
    if n_features == 0 {
        return None;
    }
    let n_try = ((params.max_features_ratio * n_features as f64).ceil() as usize).clamp(1, n_features);
    let candidates = sample(rng, n_features, n_try).into_vec();

    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;
    let min_gain = MIN_GAIN * parent_score.abs().max(1.0);

    let mut best: Option<SplitCandidate> = None;
    let mut sorted = indices.to_vec();

    for feature in candidates {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += y[sorted[pos]];
            let left_n = pos + 1;
            let right_n = n - left_n;
            if left_n < params.min_samples_leaf || right_n < params.min_samples_leaf {
                continue;
            }

            let here = x[sorted[pos]][feature];
            let next = x[sorted[pos + 1]][feature];
            if here == next {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64
                - parent_score;

            if gain > min_gain && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    left_len: left_n,
                    gain,
                });
            }
        }
    }

    best
}

// ==========================================
// RandomForestRegressor
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// 训练；x 为空时返回 None
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        let n = x.len();

        let trees = (0..params.n_estimators)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let mut bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &mut bootstrap, params, &mut rng)
            })
            .collect();

        Some(Self {
            trees,
            n_features: x[0].len(),
        })
    }

    /// 各树预测均值
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}
