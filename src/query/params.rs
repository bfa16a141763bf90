//! Typed query parameters
//!
//! Raw query-string values are parsed here, once, into [`QueryParams`]. Every
//! field has a fallback, so parsing never fails: unparsable numbers become
//! "unset", unknown sort fields become `number`, and page/limit are clamped.

use std::collections::HashMap;

use serde::Serialize;

/// Page size used when `limit` is absent or unparsable
pub const DEFAULT_LIMIT: usize = 24;

/// Largest accepted page size
pub const MAX_LIMIT: usize = 120;

/// Fields results can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Number,
    Name,
    Height,
    Weight,
    BaseExperience,
    Total,
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl SortField {
    /// Parses an exact field name as used on the wire
    ///
    /// # Returns
    /// * `Some(SortField)` if the name is in the allow-list
    /// * `None` otherwise
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "number" => Some(SortField::Number),
            "name" => Some(SortField::Name),
            "height" => Some(SortField::Height),
            "weight" => Some(SortField::Weight),
            "baseExperience" => Some(SortField::BaseExperience),
            "total" => Some(SortField::Total),
            "hp" => Some(SortField::Hp),
            "attack" => Some(SortField::Attack),
            "defense" => Some(SortField::Defense),
            "specialAttack" => Some(SortField::SpecialAttack),
            "specialDefense" => Some(SortField::SpecialDefense),
            "speed" => Some(SortField::Speed),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc`/`descending` (any case) sort descending; anything else ascending
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "desc" | "descending" => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Inclusive min/max constraint; an unset side imposes nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bound {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Bound {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within every set side of the bound
    pub fn admits(&self, value: u32) -> bool {
        let value = i64::from(value);
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Filter, sort and pagination parameters for a catalog query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Lowercased free-text search, empty for none
    pub search: String,
    /// Types an entry must all have
    pub types: Vec<String>,
    /// Regions an entry may be in
    pub regions: Vec<String>,
    /// Generations an entry may belong to
    pub generations: Vec<i64>,
    pub total: Bound,
    pub hp: Bound,
    pub attack: Bound,
    pub defense: Bound,
    pub speed: Bound,
    pub sort_by: SortField,
    pub order: SortOrder,
    /// 1-based page, at least 1
    pub page: usize,
    /// Page size within `1..=MAX_LIMIT`
    pub limit: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            types: Vec::new(),
            regions: Vec::new(),
            generations: Vec::new(),
            total: Bound::default(),
            hp: Bound::default(),
            attack: Bound::default(),
            defense: Bound::default(),
            speed: Bound::default(),
            sort_by: SortField::default(),
            order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryParams {
    /// Parses decoded query-string pairs
    ///
    /// Recognized keys: `q, type (or types), region, generation, minTotal,
    /// maxTotal, minHp, maxHp, minAttack, maxAttack, minDefense, maxDefense,
    /// minSpeed, maxSpeed, sortBy, order, page, limit`. Unknown keys are ignored.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let get = |key: &str| query.get(key).map(String::as_str).filter(|v| !v.is_empty());
        let int = |key: &str| get(key).and_then(parse_integer);
        let bound = |min: &str, max: &str| Bound::new(int(min), int(max));

        let page = int("page").unwrap_or(1).max(1);
        let limit = int("limit")
            .unwrap_or(DEFAULT_LIMIT as i64)
            .clamp(1, MAX_LIMIT as i64);

        Self {
            search: get("q").unwrap_or_default().trim().to_lowercase(),
            types: split_list(get("type").or_else(|| get("types"))),
            regions: split_list(get("region")),
            generations: split_list(get("generation"))
                .iter()
                .filter_map(|item| parse_integer(item))
                .filter(|generation| *generation != 0)
                .collect(),
            total: bound("minTotal", "maxTotal"),
            hp: bound("minHp", "maxHp"),
            attack: bound("minAttack", "maxAttack"),
            defense: bound("minDefense", "maxDefense"),
            speed: bound("minSpeed", "maxSpeed"),
            sort_by: get("sortBy").and_then(SortField::from_str).unwrap_or_default(),
            order: get("order").map(SortOrder::parse).unwrap_or_default(),
            page: usize::try_from(page).unwrap_or(usize::MAX),
            limit: limit as usize,
        }
    }
}

/// Splits a comma-separated list into trimmed, lowercased, non-empty items
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parses the leading integer of a string
///
/// Leading whitespace and one sign are accepted, then digits up to the first
/// non-digit ("12abc" is 12). Returns `None` when there are no digits or the
/// value does not fit in an `i64`.
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        let query: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryParams::from_query(&query)
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        assert_eq!(params(&[]), QueryParams::default());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("  7"), Some(7));
        assert_eq!(parse_integer("-3"), Some(-3));
        assert_eq!(parse_integer("+5"), Some(5));
        assert_eq!(parse_integer("12abc"), Some(12));
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("99999999999999999999"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some(" Fire, FLYING ,,")), vec!["fire", "flying"]);
        assert!(split_list(None).is_empty());
        assert!(split_list(Some(",")).is_empty());
    }

    #[test]
    fn test_page_floors_to_one() {
        assert_eq!(params(&[("page", "0")]).page, 1);
        assert_eq!(params(&[("page", "-4")]).page, 1);
        assert_eq!(params(&[("page", "nope")]).page, 1);
        assert_eq!(params(&[("page", "3")]).page, 3);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(params(&[("limit", "500")]).limit, 120);
        assert_eq!(params(&[("limit", "0")]).limit, 1);
        assert_eq!(params(&[("limit", "-10")]).limit, 1);
        assert_eq!(params(&[("limit", "x")]).limit, DEFAULT_LIMIT);
        assert_eq!(params(&[("limit", "50")]).limit, 50);
    }

    #[test]
    fn test_unknown_sort_field_falls_back_to_number() {
        assert_eq!(params(&[("sortBy", "bogus")]).sort_by, SortField::Number);
        assert_eq!(params(&[("sortBy", "Name")]).sort_by, SortField::Number);
        assert_eq!(params(&[("sortBy", "specialAttack")]).sort_by, SortField::SpecialAttack);
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!(params(&[("order", "desc")]).order, SortOrder::Desc);
        assert_eq!(params(&[("order", "DESC")]).order, SortOrder::Desc);
        assert_eq!(params(&[("order", "descending")]).order, SortOrder::Desc);
        assert_eq!(params(&[("order", "asc")]).order, SortOrder::Asc);
        assert_eq!(params(&[("order", "sideways")]).order, SortOrder::Asc);
    }

    #[test]
    fn test_list_filters() {
        let parsed = params(&[
            ("type", "Fire,flying"),
            ("region", "kanto, JOHTO"),
            ("generation", "1,x,0,3"),
            ("q", "  Char "),
        ]);
        assert_eq!(parsed.types, vec!["fire", "flying"]);
        assert_eq!(parsed.regions, vec!["kanto", "johto"]);
        assert_eq!(parsed.generations, vec![1, 3]);
        assert_eq!(parsed.search, "char");
    }

    #[test]
    fn test_types_alias() {
        assert_eq!(params(&[("types", "water")]).types, vec!["water"]);
        assert_eq!(params(&[("type", "fire"), ("types", "water")]).types, vec!["fire"]);
    }

    #[test]
    fn test_bounds() {
        let parsed = params(&[("minTotal", "300"), ("maxHp", "80"), ("minSpeed", "fast")]);
        assert_eq!(parsed.total, Bound::new(Some(300), None));
        assert_eq!(parsed.hp, Bound::new(None, Some(80)));
        assert_eq!(parsed.speed, Bound::default());
    }

    #[test]
    fn test_bound_admits() {
        let bound = Bound::new(Some(10), Some(20));
        assert!(bound.admits(10));
        assert!(bound.admits(20));
        assert!(!bound.admits(9));
        assert!(!bound.admits(21));
        assert!(Bound::default().admits(0));
        assert!(Bound::new(Some(-5), None).admits(0));
    }
}
