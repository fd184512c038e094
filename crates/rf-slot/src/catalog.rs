//! Symbol catalog — static symbol definitions and weighted sampling

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Symbol identifier (stable across a catalog's lifetime)
pub type SymbolId = u32;

/// Symbol classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolKind {
    /// Plain paying symbol
    #[default]
    Regular,
    /// Matches any symbol when counting a payline run
    Wild,
    /// Paying symbol linked to a bonus character animation
    Character {
        /// Character the bonus presenter plays for a full column
        character_id: String,
    },
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique symbol ID
    pub id: SymbolId,
    /// Symbol name (e.g., "WILD", "MAN", "CHERRY")
    pub name: String,
    /// Opaque asset key used to resolve the symbol's texture
    pub display_ref: String,
    /// Sampling weight (relative, > 0)
    pub weight: f64,
    /// Payout value per matched symbol on a winning line
    pub value: f64,
    /// Symbol classification
    #[serde(default)]
    pub kind: SymbolKind,
}

impl CatalogEntry {
    /// Create a regular symbol
    pub fn regular(
        id: SymbolId,
        name: impl Into<String>,
        display_ref: impl Into<String>,
        weight: f64,
        value: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            display_ref: display_ref.into(),
            weight,
            value,
            kind: SymbolKind::Regular,
        }
    }

    /// Create a wild symbol
    pub fn wild(
        id: SymbolId,
        name: impl Into<String>,
        display_ref: impl Into<String>,
        weight: f64,
        value: f64,
    ) -> Self {
        Self {
            kind: SymbolKind::Wild,
            ..Self::regular(id, name, display_ref, weight, value)
        }
    }

    /// Create a character-linked symbol
    pub fn character(
        id: SymbolId,
        name: impl Into<String>,
        display_ref: impl Into<String>,
        weight: f64,
        value: f64,
        character_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: SymbolKind::Character {
                character_id: character_id.into(),
            },
            ..Self::regular(id, name, display_ref, weight, value)
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    /// Character linked to this symbol, if any
    pub fn character_id(&self) -> Option<&str> {
        match &self.kind {
            SymbolKind::Character { character_id } => Some(character_id),
            _ => None,
        }
    }
}

/// Reference symbol set for the 5×3 mini-game
///
/// Two character-linked symbols (MAN, WOMAN) drive the bonus sequence.
pub fn reference_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::wild(1, "WILD", "wild.png", 2.0, 10.0),
        CatalogEntry::character(2, "MAN", "man.png", 4.0, 8.0, "man"),
        CatalogEntry::character(3, "WOMAN", "woman.png", 4.0, 8.0, "woman"),
        CatalogEntry::regular(4, "SEVEN", "seven.png", 5.0, 6.0),
        CatalogEntry::regular(5, "BELL", "bell.png", 8.0, 4.0),
        CatalogEntry::regular(6, "BAR", "bar.png", 10.0, 3.0),
        CatalogEntry::regular(7, "CHERRY", "cherry.png", 14.0, 2.0),
        CatalogEntry::regular(8, "LEMON", "lemon.png", 16.0, 1.0),
    ]
}

/// Validated, immutable symbol catalog
///
/// Iteration order is the order the entries were supplied in; weighted
/// sampling depends on it.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<SymbolId, usize>,
    total_weight: f64,
    wild_id: Option<SymbolId>,
}

impl SymbolCatalog {
    /// Build a catalog, validating every entry
    pub fn new(entries: Vec<CatalogEntry>) -> SlotResult<Self> {
        validate_entries(&entries)?;
        Ok(Self::from_validated(entries))
    }

    /// Reference catalog (see [`reference_entries`])
    pub fn reference() -> Self {
        Self::from_validated(reference_entries())
    }

    fn from_validated(entries: Vec<CatalogEntry>) -> Self {
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.id, idx))
            .collect();
        let total_weight = entries.iter().map(|e| e.weight).sum();
        let wild_id = entries.iter().find(|e| e.is_wild()).map(|e| e.id);

        Self {
            entries,
            by_id,
            total_weight,
            wild_id,
        }
    }

    /// Look up an entry by id
    pub fn lookup(&self, id: SymbolId) -> SlotResult<&CatalogEntry> {
        self.by_id
            .get(&id)
            .map(|&idx| &self.entries[idx])
            .ok_or(SlotError::SymbolNotFound(id))
    }

    /// Look up an entry by display name
    pub fn by_name(&self, name: &str) -> SlotResult<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SlotError::UnknownSymbolName(name.to_string()))
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Wild symbol ID (if the catalog has one)
    pub fn wild_id(&self) -> Option<SymbolId> {
        self.wild_id
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.wild_id == Some(id)
    }

    /// Character linked to a symbol, if any
    pub fn character_of(&self, id: SymbolId) -> Option<&str> {
        self.lookup(id).ok().and_then(|e| e.character_id())
    }

    /// Expected draw probability of a symbol
    pub fn probability(&self, id: SymbolId) -> f64 {
        match self.lookup(id) {
            Ok(entry) if self.total_weight > 0.0 => entry.weight / self.total_weight,
            _ => 0.0,
        }
    }

    /// Resolve a threshold in `[0, total_weight)` to a symbol
    ///
    /// Subtracts weights in catalog order; the first entry that takes the
    /// threshold to zero or below wins. Thresholds at or past the total fall
    /// through to the last entry.
    pub fn sample_at(&self, threshold: f64) -> SymbolId {
        let mut remaining = threshold;
        for entry in &self.entries {
            remaining -= entry.weight;
            if remaining <= 0.0 {
                return entry.id;
            }
        }
        // Float accumulation can leave a sliver above zero
        self.entries.last().map(|e| e.id).unwrap_or_default()
    }

    /// Draw one symbol with probability weight / total_weight
    pub fn weighted_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        let threshold = rng.random_range(0.0..self.total_weight);
        self.sample_at(threshold)
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

fn validate_entries(entries: &[CatalogEntry]) -> SlotResult<()> {
    check_entries(entries).inspect_err(|e| log::error!("Symbol catalog rejected: {}", e))
}

fn check_entries(entries: &[CatalogEntry]) -> SlotResult<()> {
    if entries.is_empty() {
        return Err(SlotError::InvalidConfig("catalog has no symbols".into()));
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut wilds = 0usize;

    for entry in entries {
        if !ids.insert(entry.id) {
            return Err(SlotError::InvalidConfig(format!(
                "duplicate symbol id {}",
                entry.id
            )));
        }
        if !names.insert(entry.name.as_str()) {
            return Err(SlotError::InvalidConfig(format!(
                "duplicate symbol name {}",
                entry.name
            )));
        }
        if !(entry.weight.is_finite() && entry.weight > 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "symbol {} has non-positive weight {}",
                entry.name, entry.weight
            )));
        }
        if !(entry.value.is_finite() && entry.value > 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "symbol {} has non-positive value {}",
                entry.name, entry.value
            )));
        }
        if entry.display_ref.is_empty() {
            return Err(SlotError::InvalidConfig(format!(
                "symbol {} has no display reference",
                entry.name
            )));
        }
        match &entry.kind {
            SymbolKind::Wild => wilds += 1,
            SymbolKind::Character { character_id } if character_id.is_empty() => {
                return Err(SlotError::InvalidConfig(format!(
                    "symbol {} links an empty character id",
                    entry.name
                )));
            }
            _ => {}
        }
    }

    if wilds > 1 {
        return Err(SlotError::InvalidConfig(format!(
            "catalog defines {wilds} wild symbols, at most one is allowed"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn abc() -> SymbolCatalog {
        SymbolCatalog::new(vec![
            CatalogEntry::regular(1, "A", "a.png", 1.0, 1.0),
            CatalogEntry::regular(2, "B", "b.png", 2.0, 1.0),
            CatalogEntry::regular(3, "C", "c.png", 3.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_unknown_id() {
        let catalog = SymbolCatalog::reference();
        assert!(matches!(
            catalog.lookup(999),
            Err(SlotError::SymbolNotFound(999))
        ));
        assert_eq!(catalog.lookup(2).unwrap().name, "MAN");
    }

    #[test]
    fn test_sample_at_boundaries() {
        let catalog = abc();
        assert_eq!(catalog.sample_at(0.0), 1);
        // Exactly on a boundary: the entry that reaches zero wins
        assert_eq!(catalog.sample_at(1.0), 1);
        assert_eq!(catalog.sample_at(1.5), 2);
        assert_eq!(catalog.sample_at(3.0), 2);
        assert_eq!(catalog.sample_at(5.99), 3);
        assert_eq!(catalog.sample_at(6.5), 3);
    }

    #[test]
    fn test_weighted_sample_deterministic_with_seed() {
        let catalog = abc();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let draws_a: Vec<_> = (0..64).map(|_| catalog.weighted_sample(&mut a)).collect();
        let draws_b: Vec<_> = (0..64).map(|_| catalog.weighted_sample(&mut b)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_reference_catalog_shape() {
        let catalog = SymbolCatalog::reference();
        assert_eq!(catalog.wild_id(), Some(1));
        assert_eq!(catalog.character_of(2), Some("man"));
        assert_eq!(catalog.character_of(3), Some("woman"));
        assert_eq!(catalog.character_of(1), None);
        assert!(catalog.total_weight() > 0.0);
        assert!(SymbolCatalog::new(reference_entries()).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_entries() {
        let dup = vec![
            CatalogEntry::regular(1, "A", "a.png", 1.0, 1.0),
            CatalogEntry::regular(1, "B", "b.png", 1.0, 1.0),
        ];
        assert!(SymbolCatalog::new(dup).is_err());

        let zero_weight = vec![CatalogEntry::regular(1, "A", "a.png", 0.0, 1.0)];
        assert!(SymbolCatalog::new(zero_weight).is_err());

        let two_wilds = vec![
            CatalogEntry::wild(1, "W1", "w1.png", 1.0, 1.0),
            CatalogEntry::wild(2, "W2", "w2.png", 1.0, 1.0),
        ];
        assert!(SymbolCatalog::new(two_wilds).is_err());

        assert!(SymbolCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn test_by_name() {
        let catalog = SymbolCatalog::reference();
        let entry = catalog.by_name("WOMAN").unwrap();
        assert_eq!(entry.character_id(), Some("woman"));
        assert_eq!(catalog.by_name("WILD").unwrap().id, catalog.wild_id().unwrap());
        assert!(matches!(
            catalog.by_name("woman"),
            Err(SlotError::UnknownSymbolName(name)) if name == "woman"
        ));
    }
}
