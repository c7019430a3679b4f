//! Energy kinds, attached-energy multisets, and cost predicates.
//!
//! Energy is a per-turn resource token, not a card: it never enters the
//! deck or hand, so it is excluded from the card-conservation invariant.

/// The eight energy kinds a deck can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum EnergyKind {
    Grass,
    Fire,
    Water,
    Lightning,
    Psychic,
    Fighting,
    Darkness,
    Metal,
}

impl EnergyKind {
    pub const ALL: [EnergyKind; 8] = [
        EnergyKind::Grass,
        EnergyKind::Fire,
        EnergyKind::Water,
        EnergyKind::Lightning,
        EnergyKind::Psychic,
        EnergyKind::Fighting,
        EnergyKind::Darkness,
        EnergyKind::Metal,
    ];

    pub fn index(self) -> usize {
        match self {
            EnergyKind::Grass => 0,
            EnergyKind::Fire => 1,
            EnergyKind::Water => 2,
            EnergyKind::Lightning => 3,
            EnergyKind::Psychic => 4,
            EnergyKind::Fighting => 5,
            EnergyKind::Darkness => 6,
            EnergyKind::Metal => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnergyKind::Grass => "Grass",
            EnergyKind::Fire => "Fire",
            EnergyKind::Water => "Water",
            EnergyKind::Lightning => "Lightning",
            EnergyKind::Psychic => "Psychic",
            EnergyKind::Fighting => "Fighting",
            EnergyKind::Darkness => "Darkness",
            EnergyKind::Metal => "Metal",
        }
    }
}

/// Multiset of energy attached to one creature, counted per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyPool {
    counts: [u8; 8],
}

impl EnergyPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, kind: EnergyKind) {
        self.counts[kind.index()] += 1;
    }

    /// Removes one energy of the given kind. Returns true if one was present.
    pub fn detach(&mut self, kind: EnergyKind) -> bool {
        let slot = &mut self.counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn count(&self, kind: EnergyKind) -> u8 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// The attached energies as a flat list, one entry per token.
    pub fn flatten(&self) -> Vec<EnergyKind> {
        let mut out = Vec::with_capacity(self.total() as usize);
        for kind in EnergyKind::ALL {
            for _ in 0..self.count(kind) {
                out.push(kind);
            }
        }
        out
    }

    /// Removes every energy in `payment` from this pool.
    ///
    /// Returns false (leaving the pool unchanged) if the payment is not a
    /// sub-multiset of what is attached.
    pub fn pay(&mut self, payment: &EnergyPool) -> bool {
        if !payment.subset_of(self) {
            return false;
        }
        for kind in EnergyKind::ALL {
            self.counts[kind.index()] -= payment.count(kind);
        }
        true
    }

    pub fn subset_of(&self, other: &EnergyPool) -> bool {
        EnergyKind::ALL
            .iter()
            .all(|&k| self.count(k) <= other.count(k))
    }

    /// All distinct sub-multisets of exactly `size` tokens.
    ///
    /// Subsets are compared by composition (combinations, not permutations):
    /// two Grass tokens are interchangeable, so {Grass, Fire} appears once
    /// no matter how many Grass tokens are attached.
    pub fn subsets_of_size(&self, size: u32) -> Vec<EnergyPool> {
        let mut out = Vec::new();
        let mut current = EnergyPool::new();
        self.collect_subsets(0, size, &mut current, &mut out);
        out
    }

    fn collect_subsets(
        &self,
        kind_index: usize,
        remaining: u32,
        current: &mut EnergyPool,
        out: &mut Vec<EnergyPool>,
    ) {
        if remaining == 0 {
            out.push(*current);
            return;
        }
        if kind_index >= EnergyKind::ALL.len() {
            return;
        }
        let kind = EnergyKind::ALL[kind_index];
        let available = self.count(kind).min(remaining as u8);
        for take in 0..=available {
            current.counts[kind_index] = take;
            self.collect_subsets(kind_index + 1, remaining - take as u32, current, out);
        }
        current.counts[kind_index] = 0;
    }

    /// Short human-readable summary, e.g. `"2 Grass, 1 Fire"`.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = EnergyKind::ALL
            .iter()
            .filter(|&&k| self.count(k) > 0)
            .map(|&k| format!("{} {}", self.count(k), k.name()))
            .collect();
        if parts.is_empty() {
            "no energy".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// An attack's energy requirement: fixed pips per kind plus a number of
/// "any kind" pips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyCost {
    required: [u8; 8],
    any: u8,
}

impl EnergyCost {
    pub fn new(fixed: &[EnergyKind], any: u8) -> Self {
        let mut required = [0u8; 8];
        for &kind in fixed {
            required[kind.index()] += 1;
        }
        Self { required, any }
    }

    pub fn free() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.required.iter().map(|&c| c as u32).sum::<u32>() + self.any as u32
    }

    /// Whether the attached pool satisfies this cost: every fixed pip is
    /// covered by its kind, and the pool's total covers fixed + any pips.
    pub fn payable_by(&self, pool: &EnergyPool) -> bool {
        for kind in EnergyKind::ALL {
            if self.required[kind.index()] > pool.count(kind) {
                return false;
            }
        }
        pool.total() >= self.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_detach() {
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Grass);
        assert_eq!(pool.count(EnergyKind::Grass), 2);
        assert!(pool.detach(EnergyKind::Grass));
        assert_eq!(pool.count(EnergyKind::Grass), 1);
        assert!(!pool.detach(EnergyKind::Fire));
    }

    #[test]
    fn test_cost_fixed_pips() {
        let cost = EnergyCost::new(&[EnergyKind::Grass], 0);
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Fire);
        assert!(!cost.payable_by(&pool));
        pool.attach(EnergyKind::Grass);
        assert!(cost.payable_by(&pool));
    }

    #[test]
    fn test_cost_any_pips_count_total() {
        // 1 Grass + 2 any needs three tokens, one of which is Grass.
        let cost = EnergyCost::new(&[EnergyKind::Grass], 2);
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Fire);
        assert!(!cost.payable_by(&pool));
        pool.attach(EnergyKind::Water);
        assert!(cost.payable_by(&pool));
    }

    #[test]
    fn test_pay_removes_submultiset_only() {
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Fire);

        let mut payment = EnergyPool::new();
        payment.attach(EnergyKind::Water);
        assert!(!pool.pay(&payment));
        assert_eq!(pool.total(), 2);

        let mut payment = EnergyPool::new();
        payment.attach(EnergyKind::Fire);
        assert!(pool.pay(&payment));
        assert_eq!(pool.total(), 1);
        assert_eq!(pool.count(EnergyKind::Fire), 0);
    }

    #[test]
    fn test_subsets_are_combinations_not_permutations() {
        // Three distinct kinds, choose 2: C(3,2) = 3 compositions.
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Fire);
        pool.attach(EnergyKind::Water);
        let subsets = pool.subsets_of_size(2);
        assert_eq!(subsets.len(), 3);

        // Duplicate tokens collapse: {G, G, F} choose 2 -> {G,G} and {G,F}.
        let mut pool = EnergyPool::new();
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Grass);
        pool.attach(EnergyKind::Fire);
        let subsets = pool.subsets_of_size(2);
        assert_eq!(subsets.len(), 2);
    }

    #[test]
    fn test_subsets_of_size_zero() {
        let pool = EnergyPool::new();
        let subsets = pool.subsets_of_size(0);
        assert_eq!(subsets.len(), 1);
        assert!(subsets[0].is_empty());
    }
}
