//! Cosmetic loot drops.
//!
//! The RNG is always injected so a seeded generator reproduces the same
//! drops. Loot never feeds back into XP.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOOT_CHANCE: f64 = 0.2;

pub fn default_loot_items() -> Vec<String> {
    [
        "✨ Cosmic Sticker",
        "🧠 Focus Badge",
        "🔥 Momentum Flame",
        "🌿 Forest Totem",
        "🛰️ Orbital Token",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Drop chance plus the items a drop is drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    /// Probability of a drop per finished session (0.0-1.0)
    #[serde(default = "default_chance")]
    pub chance: f64,
    #[serde(default = "default_loot_items")]
    pub items: Vec<String>,
}

fn default_chance() -> f64 {
    DEFAULT_LOOT_CHANCE
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            chance: DEFAULT_LOOT_CHANCE,
            items: default_loot_items(),
        }
    }
}

impl LootTable {
    pub fn new(chance: f64, items: Vec<String>) -> Self {
        Self { chance, items }
    }

    /// Roll once. Returns the dropped item, drawn uniformly.
    pub fn roll<R: RngCore + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.items.is_empty() || !(self.chance > 0.0) {
            return None;
        }
        if rng.gen::<f64>() >= self.chance {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        self.items.get(index).map(String::as_str)
    }
}

/// Generator used when the caller does not inject one.
pub fn loot_rng(seed: Option<u64>) -> Mcg128Xsl64 {
    match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chance_never_drops() {
        let table = LootTable::new(0.0, default_loot_items());
        let mut rng = loot_rng(Some(7));
        assert!((0..500).all(|_| table.roll(&mut rng).is_none()));
    }

    #[test]
    fn certain_chance_always_drops_known_items() {
        let table = LootTable::new(1.0, default_loot_items());
        let mut rng = loot_rng(Some(7));
        for _ in 0..200 {
            let item = table.roll(&mut rng).expect("chance 1.0 always drops");
            assert!(table.items.iter().any(|i| i == item));
        }
    }

    #[test]
    fn empty_table_never_drops() {
        let table = LootTable::new(1.0, Vec::new());
        assert!(table.roll(&mut loot_rng(Some(1))).is_none());
    }

    #[test]
    fn same_seed_same_drops() {
        let table = LootTable::default();
        let mut a = loot_rng(Some(42));
        let mut b = loot_rng(Some(42));
        let left: Vec<_> = (0..100).map(|_| table.roll(&mut a).map(str::to_owned)).collect();
        let right: Vec<_> = (0..100).map(|_| table.roll(&mut b).map(str::to_owned)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn default_rate_is_roughly_one_in_five() {
        let table = LootTable::default();
        let mut rng = loot_rng(Some(2024));
        let drops = (0..10_000).filter(|_| table.roll(&mut rng).is_some()).count();
        assert!((1_700..2_300).contains(&drops), "got {drops} drops");
    }
}
