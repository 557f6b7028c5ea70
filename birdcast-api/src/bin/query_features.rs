//! query-features - print the features extracted from a query
//!
//! Runs one extractor variant without loading any model, and suggests
//! corrections for fields that did not resolve.
//!
//! ```text
//! query-features presence "Will the kingfisher be at Yala tomorrow morning?"
//! query-features best-time bulbul at bundala
//! ```

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};

use birdcast_common::catalog::{correct_bird_name, correct_locality, Locality, Species};
use birdcast_common::extract::{
    extract_best_time_features, extract_location_features, extract_presence_features,
};
use birdcast_common::SystemClock;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Presence,
    Location,
    BestTime,
}

#[derive(Parser, Debug)]
#[command(name = "query-features", version, about = "Show extracted query features")]
struct Args {
    /// Extractor to run
    #[arg(value_enum)]
    variant: Variant,

    /// Query text
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let query = args.query.join(" ");
    let clock = SystemClock;

    let (features, locality, bird) = match args.variant {
        Variant::Presence => {
            let f = extract_presence_features(&query, &clock)?;
            (serde_json::to_value(&f)?, Some(f.locality), f.bird_name)
        }
        Variant::Location => {
            let f = extract_location_features(&query, &clock)?;
            (serde_json::to_value(&f)?, None, f.bird_name)
        }
        Variant::BestTime => {
            let f = extract_best_time_features(&query, &clock);
            (serde_json::to_value(&f)?, Some(f.locality), f.bird_name)
        }
    };

    let mut output = json!({ "features": features });
    let suggestions = suggest(&query, locality, bird);
    if !suggestions.is_empty() {
        output["suggestions"] = Value::Object(suggestions);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Fuzzy corrections for the words of an unresolved query
fn suggest(
    query: &str,
    locality: Option<Locality>,
    bird: Species,
) -> serde_json::Map<String, Value> {
    let mut out = serde_json::Map::new();
    // Short words are fragments of too many site names to be useful
    let words: Vec<&str> = query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() >= 4)
        .collect();

    if locality == Some(Locality::Unknown) {
        if let Some(loc) = words.iter().find_map(|w| correct_locality(w).known()) {
            out.insert("locality".to_string(), json!(loc));
        }
    }
    if bird == Species::Unknown {
        if let Some(name) = correct_bird_name(query).known() {
            out.insert("bird_name".to_string(), json!(name));
        }
    }
    out
}
