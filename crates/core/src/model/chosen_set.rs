use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which of the two asset pools a session draws its shapes from.
///
/// Sessions alternate pools so the same participant never sees one pool twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChosenSet {
    Set0,
    Set1,
}

impl ChosenSet {
    /// Pick the pool for a new session from the previously recorded one.
    ///
    /// A prior value of `1` selects `Set0`; any other recorded value selects
    /// `Set1`. With no record the pool is chosen uniformly at random.
    pub fn from_prior<R: Rng + ?Sized>(prior: Option<i64>, rng: &mut R) -> Self {
        match prior {
            Some(1) => Self::Set0,
            Some(_) => Self::Set1,
            None => {
                if rng.random_bool(0.5) {
                    Self::Set1
                } else {
                    Self::Set0
                }
            }
        }
    }

    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Self::Set0 => 0,
            Self::Set1 => 1,
        }
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Set0),
            1 => Some(Self::Set1),
            _ => None,
        }
    }
}

impl fmt::Display for ChosenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn prior_set_is_inverted() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ChosenSet::from_prior(Some(1), &mut rng), ChosenSet::Set0);
        assert_eq!(ChosenSet::from_prior(Some(0), &mut rng), ChosenSet::Set1);
        assert_eq!(ChosenSet::from_prior(Some(7), &mut rng), ChosenSet::Set1);
    }

    #[test]
    fn missing_prior_picks_either_set() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let set = ChosenSet::from_prior(None, &mut rng);
            seen[usize::from(set.index())] = true;
        }
        assert_eq!(seen, [true, true]);
    }
}
