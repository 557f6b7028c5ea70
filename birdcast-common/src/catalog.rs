//! Locality and species catalog
//!
//! Allow-lists of the sites and species the trained models know about,
//! plus the alias tables that map informal phrasing onto them. All lookups
//! walk the tables in declaration order and stop at the first hit.

use serde::{Serialize, Serializer};
use std::fmt;

pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const UNKNOWN_BIRD: &str = "Unknown Bird";

/// Similarity floor for [`correct_bird_name`]
pub const FUZZY_CUTOFF: f64 = 0.3;

/// Birdwatching sites in Hambanthota District
pub static VALID_LOCALITIES: [&str; 7] = [
    "Buckingham Place Hotel Tangalle",
    "Bundala NP General",
    "Bundala National Park",
    "Kalametiya",
    "Tissa Lake",
    "Yala National Park General",
    "Debarawewa Lake",
];

pub static VALID_BIRD_NAMES: [&str; 3] = [
    "Blue-tailed Bee-eater",
    "Red-vented Bulbul",
    "White-throated Kingfisher",
];

/// Short site names; "Kalametiya Bird Sanctuary" is outside the trained vocabulary
pub static LOCALITY_ALIASES: [(&str, &str); 5] = [
    ("bundala", "Bundala NP General"),
    ("yala", "Yala National Park General"),
    ("tissa", "Tissa Lake"),
    ("debara", "Debarawewa Lake"),
    ("kalametiya", "Kalametiya Bird Sanctuary"),
];

pub static BIRD_ALIASES: [(&str, &str); 7] = [
    ("blue tailed bird", "Blue-tailed Bee-eater"),
    ("blue bird", "Blue-tailed Bee-eater"),
    ("bee eater", "Blue-tailed Bee-eater"),
    ("red bird", "Red-vented Bulbul"),
    ("bulbul", "Red-vented Bulbul"),
    ("white bird", "White-throated Kingfisher"),
    ("kingfisher", "White-throated Kingfisher"),
];

/// Alias hints shown in guidance payloads
pub static LOCATION_HINTS: [&str; 3] = [
    "You can use 'Bundala' instead of 'Bundala NP General'.",
    "You can use 'Yala' instead of 'Yala National Park General'.",
    "You can use 'Tissa' instead of 'Tissa Lake'.",
];

/// Survey coordinate fed to the location model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Candidate points probed by the location model, one per survey site
pub static SURVEY_POINTS: [Coordinate; 7] = [
    Coordinate { latitude: 6.0463438, longitude: 80.8541554 },
    Coordinate { latitude: 6.188598, longitude: 81.2200356 },
    Coordinate { latitude: 6.1963995, longitude: 81.2109113 },
    Coordinate { latitude: 6.1930548, longitude: 81.2218203 },
    Coordinate { latitude: 6.0906125, longitude: 80.9354124 },
    Coordinate { latitude: 6.188598, longitude: 81.2200356 },
    Coordinate { latitude: 6.1930548, longitude: 81.2218203 },
];

/// Resolved locality, or the "Unknown Location" sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Known(&'static str),
    Unknown,
}

/// Resolved species, or the "Unknown Bird" sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Known(&'static str),
    Unknown,
}

impl Locality {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Locality::Known(name) => name,
            Locality::Unknown => UNKNOWN_LOCATION,
        }
    }

    pub fn known(&self) -> Option<&'static str> {
        match *self {
            Locality::Known(name) => Some(name),
            Locality::Unknown => None,
        }
    }
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Species::Known(name) => name,
            Species::Unknown => UNKNOWN_BIRD,
        }
    }

    pub fn known(&self) -> Option<&'static str> {
        match *self {
            Species::Known(name) => Some(name),
            Species::Unknown => None,
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Locality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Find a locality mentioned in lower-cased query text
///
/// Canonical names are tried before aliases.
pub fn find_locality(query: &str) -> Locality {
    VALID_LOCALITIES
        .iter()
        .copied()
        .find(|loc| query.contains(&loc.to_lowercase()))
        .or_else(|| {
            LOCALITY_ALIASES
                .iter()
                .find(|(alias, _)| query.contains(alias))
                .map(|&(_, canonical)| canonical)
        })
        .map(Locality::Known)
        .unwrap_or(Locality::Unknown)
}

/// Find a species mentioned in lower-cased query text
pub fn find_species(query: &str) -> Species {
    VALID_BIRD_NAMES
        .iter()
        .copied()
        .find(|bird| query.contains(&bird.to_lowercase()))
        .or_else(|| {
            BIRD_ALIASES
                .iter()
                .find(|(alias, _)| query.contains(alias))
                .map(|&(_, canonical)| canonical)
        })
        .map(Species::Known)
        .unwrap_or(Species::Unknown)
}

pub fn is_valid_locality(name: &str) -> bool {
    VALID_LOCALITIES.contains(&name)
}

pub fn is_valid_bird_name(name: &str) -> bool {
    VALID_BIRD_NAMES.contains(&name)
}

/// Correct a user-typed species name
///
/// Exact alias lookup first, then the closest allow-listed name whose
/// normalized Levenshtein similarity reaches [`FUZZY_CUTOFF`].
pub fn correct_bird_name(name: &str) -> Species {
    let name = name.trim().to_lowercase();

    if let Some(&(_, canonical)) = BIRD_ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Species::Known(canonical);
    }

    let mut best: Option<(&'static str, f64)> = None;
    for bird in VALID_BIRD_NAMES {
        let score = strsim::normalized_levenshtein(&name, &bird.to_lowercase());
        if score >= FUZZY_CUTOFF && best.map_or(true, |(_, s)| score > s) {
            best = Some((bird, score));
        }
    }

    best.map(|(bird, _)| Species::Known(bird))
        .unwrap_or(Species::Unknown)
}

/// Correct a user-typed locality name
///
/// Matches a canonical name exactly or as a fragment of it, then falls back
/// to the exact alias table.
pub fn correct_locality(input: &str) -> Locality {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Locality::Unknown;
    }

    if let Some(loc) = VALID_LOCALITIES
        .iter()
        .copied()
        .find(|loc| loc.to_lowercase().contains(&input))
    {
        return Locality::Known(loc);
    }

    LOCALITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == input)
        .map(|&(_, canonical)| Locality::Known(canonical))
        .unwrap_or(Locality::Unknown)
}
