use std::collections::VecDeque;

use rand::Rng;

use crate::catalog::ShapeCatalog;
use crate::shuffle::fisher_yates;

/// Exhaustive, shuffled queue of shape names: one per round, no repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleSequencer {
    queue: VecDeque<String>,
}

impl PuzzleSequencer {
    /// Enqueue every shape in the catalog once, in a uniformly random order.
    pub fn initialize<R: Rng + ?Sized>(catalog: &ShapeCatalog, rng: &mut R) -> Self {
        Self::from_names(catalog.names(), rng)
    }

    pub fn from_names<R: Rng + ?Sized>(mut names: Vec<String>, rng: &mut R) -> Self {
        fisher_yates(&mut names, rng);
        Self {
            queue: names.into(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Iterator for PuzzleSequencer {
    type Item = String;

    /// Next shape, or `None` once every shape has been presented.
    fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    #[test]
    fn drains_catalog_then_reports_exhaustion() {
        let catalog = ShapeCatalog::from_names(["A_1", "A_2", "B_1", "C_1"]);
        let mut rng = StdRng::seed_from_u64(11);
        let mut sequencer = PuzzleSequencer::initialize(&catalog, &mut rng);
        assert_eq!(sequencer.remaining(), 3);

        let mut seen = BTreeSet::new();
        while let Some(name) = sequencer.next() {
            assert!(seen.insert(name));
        }
        assert_eq!(seen.len(), 3);
        assert!(sequencer.is_exhausted());
        assert_eq!(sequencer.next(), None);
    }

    proptest! {
        #[test]
        fn yields_each_name_once(
            names in prop::collection::btree_set("[a-z]{1,4}", 0..16),
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sequencer =
                PuzzleSequencer::from_names(names.iter().cloned().collect(), &mut rng);

            let mut yielded = Vec::new();
            while let Some(name) = sequencer.next() {
                yielded.push(name);
            }
            prop_assert_eq!(yielded.len(), names.len());
            let unique: BTreeSet<_> = yielded.into_iter().collect();
            prop_assert_eq!(unique, names);
            prop_assert!(sequencer.next().is_none());
        }
    }
}
