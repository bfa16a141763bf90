//! Normalization of raw PokeAPI records
//!
//! Maps the `/pokemon/{id}` payload into a [`Pokemon`] entry. Records that are
//! not the default form of a species, or that lack a positive id, are skipped.

use serde::Deserialize;

use super::{region_for_number, Pokemon, Stats};

/// A `/pokemon/{id}` payload, reduced to the fields we read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPokemon {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub types: Option<Vec<RawTypeSlot>>,
    #[serde(default)]
    pub stats: Option<Vec<RawStat>>,
    #[serde(default)]
    pub sprites: Option<RawSprites>,
    /// Height in decimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Weight in hectograms
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub base_experience: Option<u32>,
}

/// A `{ name, url }` reference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedResource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTypeSlot {
    #[serde(default)]
    pub slot: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<NamedResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStat {
    #[serde(default)]
    pub base_stat: Option<u32>,
    #[serde(default)]
    pub stat: Option<NamedResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<RawOtherSprites>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOtherSprites {
    #[serde(default, rename = "official-artwork")]
    pub official_artwork: Option<RawSpriteSet>,
    #[serde(default)]
    pub home: Option<RawSpriteSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpriteSet {
    #[serde(default)]
    pub front_default: Option<String>,
}

/// Normalizes a raw record into a catalog entry
///
/// # Returns
/// * `Some(Pokemon)` for a default form with a positive id and a name
/// * `None` if the record should be left out of the dataset
pub fn normalize(raw: RawPokemon) -> Option<Pokemon> {
    if raw.is_default != Some(true) {
        return None;
    }

    let number = raw.id.filter(|id| *id > 0).and_then(|id| u32::try_from(id).ok())?;
    let name = raw.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?.to_lowercase();
    let region = region_for_number(number);

    Some(Pokemon {
        id: number,
        number,
        display_name: display_name(&name),
        name,
        types: ordered_types(raw.types.unwrap_or_default()),
        stats: stat_block(raw.stats.as_deref().unwrap_or_default()),
        region: region.region.to_string(),
        generation: region.generation,
        image: pick_image(raw.sprites.as_ref()),
        height: raw.height.unwrap_or(0.0) / 10.0,
        weight: raw.weight.unwrap_or(0.0) / 10.0,
        base_experience: raw.base_experience,
    })
}

/// Renders a canonical name for display ("mr-mime" becomes "Mr Mime")
pub fn display_name(name: &str) -> String {
    name.split('-').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type names ordered by their upstream slot
fn ordered_types(mut slots: Vec<RawTypeSlot>) -> Vec<String> {
    slots.sort_by_key(|slot| slot.slot.unwrap_or(0));
    slots
        .into_iter()
        .filter_map(|slot| slot.kind.and_then(|kind| kind.name))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Maps named stats into fixed slots; unknown names are ignored, missing ones stay zero
fn stat_block(stats: &[RawStat]) -> Stats {
    let (mut hp, mut attack, mut defense) = (0, 0, 0);
    let (mut special_attack, mut special_defense, mut speed) = (0, 0, 0);

    for stat in stats {
        let Some(name) = stat.stat.as_ref().and_then(|s| s.name.as_deref()) else {
            continue;
        };
        let value = stat.base_stat.unwrap_or(0);
        match name {
            "hp" => hp = value,
            "attack" => attack = value,
            "defense" => defense = value,
            "special-attack" => special_attack = value,
            "special-defense" => special_defense = value,
            "speed" => speed = value,
            _ => {}
        }
    }

    Stats::new(hp, attack, defense, special_attack, special_defense, speed)
}

/// First non-empty sprite: official artwork, then home, then the default sprite
fn pick_image(sprites: Option<&RawSprites>) -> Option<String> {
    let sprites = sprites?;
    let other = sprites.other.as_ref();

    [
        other.and_then(|o| o.official_artwork.as_ref()).and_then(|s| s.front_default.as_ref()),
        other.and_then(|o| o.home.as_ref()).and_then(|s| s.front_default.as_ref()),
        sprites.front_default.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find(|url| !url.is_empty())
    .cloned()
}
