// ==========================================
// 城市走廊通行决策系统 - 训练 / 验证切分
// ==========================================

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 固定种子的随机切分，返回 (训练下标, 验证下标)，各自升序
///
/// n ≥ 2 时两侧均至少 1 行
pub fn train_validation_split(n: usize, validation_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    if n < 2 {
        return (indices, Vec::new());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_val = ((n as f64) * validation_ratio).round() as usize;
    let n_val = n_val.clamp(1, n - 1);

    let mut validation = indices.split_off(n - n_val);
    indices.sort_unstable();
    validation.sort_unstable();
    (indices, validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, val) = train_validation_split(100, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(), 20);
        let mut all: Vec<usize> = train.iter().chain(val.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_seeded() {
        assert_eq!(train_validation_split(50, 0.2, 7), train_validation_split(50, 0.2, 7));
        assert_ne!(
            train_validation_split(50, 0.2, 7).1,
            train_validation_split(50, 0.2, 8).1
        );
    }

    #[test]
    fn test_tiny_split_keeps_both_sides() {
        let (train, val) = train_validation_split(2, 0.01, 1);
        assert_eq!((train.len(), val.len()), (1, 1));
        let (train, val) = train_validation_split(1, 0.2, 1);
        assert_eq!((train.len(), val.len()), (1, 0));
    }
}
