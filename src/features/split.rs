// src/features/split.rs

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffles row indices with a seeded RNG and splits off the test
/// fraction. The same seed always produces the same split.
pub fn train_test_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64) * test_fraction).ceil() as usize;
    let test = indices[..test_len.min(n)].to_vec();
    let train = indices[test_len.min(n)..].to_vec();
    (train, test)
}

/// K consecutive folds over `0..n`, returned as per-fold test index sets.
/// The first `n % k` folds carry one extra row.
pub fn kfold_indices(n: usize, k: usize) -> Vec<Vec<usize>> {
    let k = k.min(n).max(1);
    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let len = base + usize::from(fold < extra);
        folds.push((start..start + len).collect());
        start += len;
    }
    folds
}

/// K folds over shuffled indices, for evaluation splits that must not
/// follow row order.
pub fn shuffled_kfold_indices(n: usize, k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    kfold_indices(n, k)
        .into_iter()
        .map(|fold| fold.into_iter().map(|i| indices[i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let (train_a, test_a) = train_test_indices(100, 0.10, 999);
        let (train_b, test_b) = train_test_indices(100, 0.10, 999);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        assert_eq!(test_a.len(), 10);
        assert_eq!(train_a.len(), 90);
        let all: HashSet<usize> = train_a.iter().chain(test_a.iter()).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_test_fraction_rounds_up() {
        let (train, test) = train_test_indices(15, 0.10, 1);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 13);
    }

    #[test]
    fn test_kfold_covers_every_index_once() {
        let folds = kfold_indices(11, 3);
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].len(), 4);
        assert_eq!(folds[1].len(), 4);
        assert_eq!(folds[2].len(), 3);

        let all: Vec<usize> = folds.into_iter().flatten().collect();
        let unique: HashSet<usize> = all.iter().copied().collect();
        assert_eq!(all.len(), 11);
        assert_eq!(unique.len(), 11);
    }

    #[test]
    fn test_shuffled_kfold_is_seed_stable() {
        assert_eq!(
            shuffled_kfold_indices(20, 3, 10),
            shuffled_kfold_indices(20, 3, 10)
        );
    }
}
