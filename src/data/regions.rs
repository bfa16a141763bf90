//! Static region table for national dex numbers
//!
//! Each region covers a contiguous, non-overlapping range of dex numbers and
//! carries the generation ordinal in which it was introduced.

/// Region name used for numbers outside every known range
pub const UNKNOWN_REGION: &str = "unknown";

/// An inclusive range of dex numbers belonging to one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRange {
    /// First dex number in the region
    pub start: u32,
    /// Last dex number in the region
    pub end: u32,
    /// Lowercase region name
    pub region: &'static str,
    /// Generation ordinal
    pub generation: u8,
}

/// Region and generation resolved for a single dex number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    pub region: &'static str,
    pub generation: Option<u8>,
}

/// Static array of all known regions, ascending by dex number
pub static REGION_RANGES: [RegionRange; 9] = [
    RegionRange {
        start: 1,
        end: 151,
        region: "kanto",
        generation: 1,
    },
    RegionRange {
        start: 152,
        end: 251,
        region: "johto",
        generation: 2,
    },
    RegionRange {
        start: 252,
        end: 386,
        region: "hoenn",
        generation: 3,
    },
    RegionRange {
        start: 387,
        end: 493,
        region: "sinnoh",
        generation: 4,
    },
    RegionRange {
        start: 494,
        end: 649,
        region: "unova",
        generation: 5,
    },
    RegionRange {
        start: 650,
        end: 721,
        region: "kalos",
        generation: 6,
    },
    RegionRange {
        start: 722,
        end: 809,
        region: "alola",
        generation: 7,
    },
    RegionRange {
        start: 810,
        end: 905,
        region: "galar",
        generation: 8,
    },
    RegionRange {
        start: 906,
        end: 1025,
        region: "paldea",
        generation: 9,
    },
];

/// Resolves the region and generation for a dex number
///
/// # Arguments
///
/// * `number` - National dex number
///
/// # Returns
///
/// The matching region, or `"unknown"` with no generation when the number
/// falls outside every range.
///
/// # Example
///
/// ```
/// use pokedex_api::data::regions::region_for_number;
///
/// let info = region_for_number(25);
/// assert_eq!(info.region, "kanto");
/// assert_eq!(info.generation, Some(1));
/// ```
pub fn region_for_number(number: u32) -> RegionInfo {
    REGION_RANGES
        .iter()
        .find(|range| number >= range.start && number <= range.end)
        .map(|range| RegionInfo {
            region: range.region,
            generation: Some(range.generation),
        })
        .unwrap_or(RegionInfo {
            region: UNKNOWN_REGION,
            generation: None,
        })
}

/// Get all known regions
pub fn all_regions() -> &'static [RegionRange] {
    &REGION_RANGES
}
