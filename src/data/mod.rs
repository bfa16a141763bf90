//! Core data models for the Pokedex API
//!
//! This module contains the normalized entry and dataset types, together with
//! the remote catalog client and the normalizer that produce them.

pub mod normalize;
pub mod pokeapi;
pub mod regions;

#[cfg(test)]
pub(crate) mod fake;

pub use normalize::{display_name, normalize, RawPokemon};
pub use pokeapi::{fetch_in_batches, CatalogSource, FetchError, PokeApiClient};
pub use regions::{region_for_number, RegionInfo, UNKNOWN_REGION};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance label attached to datasets built from PokeAPI
pub const DEFAULT_SOURCE: &str = "https://pokeapi.co/";

/// Base stats of a Pokemon plus their derived total
///
/// `total` is always recomputed from the six named stats, both when an entry
/// is normalized and when it is read back from a cache snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredStats")]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
    pub total: u32,
}

impl Stats {
    /// Creates a stat block, computing `total` from the six named stats
    pub fn new(
        hp: u32,
        attack: u32,
        defense: u32,
        special_attack: u32,
        special_defense: u32,
        speed: u32,
    ) -> Self {
        Self {
            hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
            total: [hp, attack, defense, special_attack, special_defense, speed]
                .into_iter()
                .fold(0u32, u32::saturating_add),
        }
    }
}

/// On-disk form of [`Stats`]; a stored `total` is ignored
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStats {
    #[serde(default)]
    hp: u32,
    #[serde(default)]
    attack: u32,
    #[serde(default)]
    defense: u32,
    #[serde(default)]
    special_attack: u32,
    #[serde(default)]
    special_defense: u32,
    #[serde(default)]
    speed: u32,
}

impl From<StoredStats> for Stats {
    fn from(stored: StoredStats) -> Self {
        Stats::new(
            stored.hp,
            stored.attack,
            stored.defense,
            stored.special_attack,
            stored.special_defense,
            stored.speed,
        )
    }
}

/// A normalized catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    /// Upstream identity, same value as `number`
    pub id: u32,
    /// National dex number, unique within a dataset
    pub number: u32,
    /// Lowercase canonical name (e.g. "mr-mime")
    pub name: String,
    /// Human-readable name (e.g. "Mr Mime")
    pub display_name: String,
    /// Type names in upstream slot order
    pub types: Vec<String>,
    /// Base stats with derived total
    pub stats: Stats,
    /// Region derived from `number`, or "unknown"
    pub region: String,
    /// Generation ordinal of the region, `None` for unknown regions
    pub generation: Option<u8>,
    /// Artwork URL, if any sprite was present
    pub image: Option<String>,
    /// Height in metres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Base experience yield, if known upstream
    pub base_experience: Option<u32>,
}

/// An immutable snapshot of the normalized catalog
///
/// Entries are sorted ascending by `number` with duplicates removed, and the
/// type and region counts are derived from them once at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    fetched_at: DateTime<Utc>,
    source: String,
    pokemon: Vec<Pokemon>,
    type_counts: BTreeMap<String, usize>,
    region_counts: BTreeMap<String, usize>,
}

impl Dataset {
    /// Assembles a dataset from normalized entries
    ///
    /// Entries are sorted by `number`; when several share a number the first
    /// one in sorted order is kept.
    pub fn new(fetched_at: DateTime<Utc>, source: impl Into<String>, mut pokemon: Vec<Pokemon>) -> Self {
        pokemon.sort_by_key(|entry| entry.number);
        pokemon.dedup_by_key(|entry| entry.number);

        let mut type_counts = BTreeMap::new();
        let mut region_counts = BTreeMap::new();
        for entry in &pokemon {
            *region_counts.entry(entry.region.clone()).or_insert(0) += 1;
            for kind in &entry.types {
                *type_counts.entry(kind.clone()).or_insert(0) += 1;
            }
        }

        Self {
            fetched_at,
            source: source.into(),
            pokemon,
            type_counts,
            region_counts,
        }
    }

    /// When the dataset was built
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Provenance label
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All entries, ascending by number
    pub fn pokemon(&self) -> &[Pokemon] {
        &self.pokemon
    }

    pub fn len(&self) -> usize {
        self.pokemon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pokemon.is_empty()
    }

    /// Type names in sorted order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.type_counts.keys().map(String::as_str)
    }

    /// Occurrences of each type across all entries
    pub fn type_counts(&self) -> &BTreeMap<String, usize> {
        &self.type_counts
    }

    /// Number of entries in each region
    pub fn region_counts(&self) -> &BTreeMap<String, usize> {
        &self.region_counts
    }
}
