//! Filtering, sorting and pagination over a dataset
//!
//! The engine is pure: it reads an already-built [`Dataset`] and returns
//! borrowed entries, never touching shared state.

use std::cmp::Ordering;

use serde::Serialize;

use super::params::{parse_integer, QueryParams, SortField, SortOrder};
use crate::data::{Dataset, Pokemon};

/// Pagination metadata for a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Resolved page, after clamping to the last page
    pub page: usize,
    pub limit: usize,
    /// Entries matching the filters, across all pages
    pub total_items: usize,
    /// At least 1, even for an empty result
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Filters that were applied, as parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoedFilters {
    pub query: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub region: Vec<String>,
    pub generation: Vec<i64>,
}

/// Sort that was applied, as resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoedSort {
    pub sort_by: SortField,
    pub order: SortOrder,
}

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult<'a> {
    pub items: Vec<&'a Pokemon>,
    pub meta: PageMeta,
    pub filters: EchoedFilters,
    pub sort: EchoedSort,
}

/// Runs a query against a dataset
///
/// Entries are filtered, stably sorted (ties keep ascending number order) and
/// paginated. A page past the end is clamped to the last page.
pub fn query<'a>(dataset: &'a Dataset, params: &QueryParams) -> QueryResult<'a> {
    let mut matched: Vec<&Pokemon> = dataset
        .pokemon()
        .iter()
        .filter(|pokemon| matches(pokemon, params))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = compare(a, b, params.sort_by);
        match params.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let limit = params.limit.max(1);
    let total_items = matched.len();
    let total_pages = total_items.div_ceil(limit).max(1);
    let page = params.page.clamp(1, total_pages);
    let items = matched.into_iter().skip((page - 1) * limit).take(limit).collect();

    QueryResult {
        items,
        meta: PageMeta {
            page,
            limit,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        },
        filters: EchoedFilters {
            query: params.search.clone(),
            types: params.types.clone(),
            region: params.regions.clone(),
            generation: params.generations.clone(),
        },
        sort: EchoedSort {
            sort_by: params.sort_by,
            order: params.order,
        },
    }
}

/// Finds one entry by exact name, falling back to exact number
///
/// The identifier is trimmed and lowercased first. A name match wins over a
/// number match.
pub fn lookup<'a>(dataset: &'a Dataset, identifier: &str) -> Option<&'a Pokemon> {
    let identifier = identifier.trim().to_lowercase();
    let pokemon = dataset.pokemon();

    pokemon.iter().find(|p| p.name == identifier).or_else(|| {
        let number = parse_integer(&identifier)?;
        pokemon.iter().find(|p| i64::from(p.number) == number)
    })
}

fn matches(pokemon: &Pokemon, params: &QueryParams) -> bool {
    if !params.types.iter().all(|kind| pokemon.types.contains(kind)) {
        return false;
    }
    if !params.regions.is_empty() && !params.regions.contains(&pokemon.region) {
        return false;
    }
    if !params.generations.is_empty()
        && !pokemon
            .generation
            .is_some_and(|generation| params.generations.contains(&i64::from(generation)))
    {
        return false;
    }
    if !params.search.is_empty() && !matches_search(pokemon, &params.search) {
        return false;
    }

    let stats = &pokemon.stats;
    params.total.admits(stats.total)
        && params.hp.admits(stats.hp)
        && params.attack.admits(stats.attack)
        && params.defense.admits(stats.defense)
        && params.speed.admits(stats.speed)
}

/// Substring match on either name, or exact `N` / `#N` match on the number
fn matches_search(pokemon: &Pokemon, search: &str) -> bool {
    if pokemon.name.contains(search) || pokemon.display_name.to_lowercase().contains(search) {
        return true;
    }
    let number = pokemon.number.to_string();
    search == number || search.strip_prefix('#') == Some(number.as_str())
}

fn compare(a: &Pokemon, b: &Pokemon, field: SortField) -> Ordering {
    match field {
        SortField::Number => a.number.cmp(&b.number),
        SortField::Name => compare_names(&a.display_name, &b.display_name),
        SortField::Height => a.height.total_cmp(&b.height),
        SortField::Weight => a.weight.total_cmp(&b.weight),
        // Unknown experience sorts before any known value
        SortField::BaseExperience => a.base_experience.cmp(&b.base_experience),
        SortField::Total => a.stats.total.cmp(&b.stats.total),
        SortField::Hp => a.stats.hp.cmp(&b.stats.hp),
        SortField::Attack => a.stats.attack.cmp(&b.stats.attack),
        SortField::Defense => a.stats.defense.cmp(&b.stats.defense),
        SortField::SpecialAttack => a.stats.special_attack.cmp(&b.stats.special_attack),
        SortField::SpecialDefense => a.stats.special_defense.cmp(&b.stats.special_defense),
        SortField::Speed => a.stats.speed.cmp(&b.stats.speed),
    }
}

/// Case-insensitive name ordering on the lowercased display names
///
/// Spaces sort before digits and digits before letters, so "Porygon Z"
/// precedes "Porygon2".
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
