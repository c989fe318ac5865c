//! Random helpers shared by the sequencer and the round engine.

use rand::Rng;

/// In-place Fisher–Yates shuffle.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen index in `[0, i]`, so every permutation is equally likely.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Uniformly pick one element, or `None` for an empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut items: Vec<u32> = (0..20).collect();
        fisher_yates(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_gives_same_order() {
        let mut a: Vec<u32> = (0..10).collect();
        let mut b = a.clone();
        fisher_yates(&mut a, &mut StdRng::seed_from_u64(7));
        fisher_yates(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn short_slices_are_untouched() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: [u8; 0] = [];
        fisher_yates(&mut empty, &mut rng);
        let mut one = [5];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, [5]);
        assert!(pick(&empty, &mut rng).is_none());
        assert_eq!(pick(&one, &mut rng), Some(&5));
    }

    #[test]
    fn every_position_is_reachable() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut first_seen = [false; 4];
        for _ in 0..200 {
            let mut items = [0usize, 1, 2, 3];
            fisher_yates(&mut items, &mut rng);
            first_seen[items[0]] = true;
        }
        assert_eq!(first_seen, [true; 4]);
    }
}
