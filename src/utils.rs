use rand::{
    seq::{index, SliceRandom},
    Rng,
};

pub fn select_indices<T: Copy>(indices: &[usize], data: &[T]) -> Vec<T> {
    indices.iter().map(|i| data[*i]).collect()
}

/// Draws `amount` distinct indices from `0..len`, returned in ascending order
pub fn draw_subsample<R: Rng + ?Sized>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    let mut indices = index::sample(rng, len, amount.min(len)).into_vec();
    indices.sort_unstable();
    indices
}

/// Returns a shuffled copy of `data`
pub fn shuffled<T: Copy, R: Rng + ?Sized>(rng: &mut R, data: &[T]) -> Vec<T> {
    let mut copy = data.to_vec();
    copy.shuffle(rng);
    copy
}

/// Number of samples drawn per subsampling (63.2% of the samples, at least two)
pub fn subsample_size(n_samples: usize) -> usize {
    ((n_samples as f64 * 0.632).ceil() as usize).clamp(2.min(n_samples), n_samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_select_indices() {
        assert_eq!(select_indices(&[2, 0], &[10, 20, 30]), vec![30, 10]);
    }

    #[test]
    fn test_draw_subsample_distinct_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let drawn = draw_subsample(&mut rng, 10, 6);
        assert_eq!(drawn.len(), 6);
        assert!(drawn.windows(2).all(|w| w[0] < w[1]));
        assert!(drawn.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut copy = shuffled(&mut rng, &[3, 1, 2, 5, 4]);
        copy.sort_unstable();
        assert_eq!(copy, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_subsample_size() {
        assert_eq!(subsample_size(10), 7);
        assert_eq!(subsample_size(3), 2);
        assert_eq!(subsample_size(2), 2);
        assert_eq!(subsample_size(1), 1);
    }
}
