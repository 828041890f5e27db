//! Randomness used to build a round's tile pool.
//!
//! Rounds take a `RandomSource` rather than a concrete RNG so a caller can
//! replay an exact pool. Any `rand::Rng` is a `RandomSource`.

pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` is always at least 1.
    fn below(&mut self, upper: usize) -> usize;
}

impl<R: rand::Rng> RandomSource for R {
    fn below(&mut self, upper: usize) -> usize {
        self.random_range(0..upper)
    }
}

/// Fisher-Yates shuffle, walking down from the last element.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Sample `count` distinct glyphs from `inventory` that are not in `exclude`.
///
/// Rejection sampling: a draw that is excluded or already taken is thrown
/// away. Stops early once the usable part of the inventory is exhausted.
pub fn draw_distractors(
    inventory: &[&str],
    exclude: &[String],
    count: usize,
    rng: &mut dyn RandomSource,
) -> Vec<String> {
    let available = inventory
        .iter()
        .filter(|glyph| !exclude.iter().any(|e| e == *glyph))
        .count();
    let wanted = count.min(available);

    let mut drawn: Vec<String> = Vec::with_capacity(wanted);
    while drawn.len() < wanted {
        let candidate = inventory[rng.below(inventory.len())];
        if exclude.iter().any(|e| e == candidate) || drawn.iter().any(|d| d == candidate) {
            continue;
        }
        drawn.push(candidate.to_string());
    }
    drawn
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRandom;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_shuffle_with_zero_draws_rotates() {
        // j = 0 at every step moves the head element to the back each time.
        let mut items = vec![1, 2, 3, 4];
        shuffle(&mut items, &mut ScriptedRandom::new(&[0, 0, 0]));
        assert_eq!(items, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_shuffle_identity_draws() {
        let mut items = vec!['a', 'b', 'c'];
        // i = 2 -> j = 2, i = 1 -> j = 1
        shuffle(&mut items, &mut ScriptedRandom::new(&[2, 1]));
        assert_eq!(items, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_shuffle_reaches_every_permutation_evenly() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..6000 {
            let mut items = vec![0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            assert!((800..1200).contains(count), "skewed count {count}");
        }
    }

    #[test]
    fn test_draw_distractors_rejects_excluded_and_repeats() {
        let inventory = ["क", "ख", "ग", "घ"];
        let exclude = vec!["ख".to_string()];
        // 1 -> ख excluded, 0 -> क, 0 -> क repeat, 3 -> घ
        let mut rng = ScriptedRandom::new(&[1, 0, 0, 3]);
        let drawn = draw_distractors(&inventory, &exclude, 2, &mut rng);
        assert_eq!(drawn, vec!["क", "घ"]);
    }

    #[test]
    fn test_draw_distractors_stops_when_inventory_exhausted() {
        let inventory = ["क", "ख", "ग"];
        let exclude = vec!["क".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        let mut drawn = draw_distractors(&inventory, &exclude, 6, &mut rng);
        drawn.sort();
        assert_eq!(drawn, vec!["ख", "ग"]);
    }

    #[test]
    fn test_draw_zero_distractors() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_distractors(&["क"], &[], 0, &mut rng).is_empty());
    }
}
