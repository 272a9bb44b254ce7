use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{FirmId, HouseholdId, Pairing};

/// Every household paired with every firm, household-major.
pub fn cross_product(households: &[HouseholdId], firms: &[FirmId]) -> Vec<Pairing> {
    households
        .iter()
        .flat_map(|&h| firms.iter().map(move |&f| (h, f)))
        .collect()
}

/// Reorder the candidate pairings uniformly at random.
pub fn shuffle_pairings<R: Rng + ?Sized>(pairings: &mut [Pairing], rng: &mut R) {
    pairings.shuffle(rng);
}
