//! Model bundles
//!
//! A bundle is the serialized output of one training run: the fitted
//! estimator(s), the label encoders used for the categorical columns and
//! the ordered list of feature columns the estimator was trained on. Bundles
//! are JSON documents, validated once at load and read-only afterwards.
//!
//! # Bundle files
//!
//! Bundles are exported from the fitted scikit-learn objects. The top-level
//! keys are:
//!
//! | Bundle | Estimator keys |
//! |---|---|
//! | presence | `rf_final` |
//! | location | `location_model` |
//! | best time | `month_model`, `hour_model` |
//!
//! and each bundle also carries:
//!
//! - `label_encoders`: field name (`LOCALITY`, `COMMON NAME`) to
//!   `{"classes": [...]}`, copied from the encoder's `classes_`.
//! - `selected_features`: the model's column names in training order.
//!
//! An estimator is either
//! `{"kind": "classifier", "classes": [...], "trees": [...]}` with
//! `classes` from the forest's `classes_`, or
//! `{"kind": "regressor", "trees": [...]}`. Each tree copies the
//! `children_left`, `children_right`, `feature`, `threshold` and `value`
//! arrays of `estimator.tree_`, with `value` squeezed to one list per node:
//! class counts or fractions for a classifier, `[mean]` for a regressor.
//!
//! ```json
//! {
//!   "rf_final": {"kind": "classifier", "classes": [0, 1], "trees": [
//!     {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
//!      "feature": [3, -2, -2], "threshold": [12.5, -2.0, -2.0],
//!      "value": [[4.0, 4.0], [1.0, 3.0], [3.0, 1.0]]}
//!   ]},
//!   "label_encoders": {"LOCALITY": {"classes": ["Tissa Lake"]},
//!                      "COMMON NAME": {"classes": ["Red-vented Bulbul"]}},
//!   "selected_features": ["YEAR", "MONTH", "DAY_OF_WEEK", "HOUR", "LOCALITY", "COMMON NAME"]
//! }
//! ```

pub mod encoder;
pub mod forest;

pub use encoder::{LabelEncoder, LabelEncoders, LOCALITY_FIELD, SPECIES_FIELD};
pub use forest::{Estimator, Tree};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::{Error, Result};

/// Columns of the presence model input
pub const PRESENCE_COLUMNS: usize = 6;
/// Columns of the location model input
pub const LOCATION_COLUMNS: usize = 7;
/// Columns of the best-time model input
pub const BEST_TIME_COLUMNS: usize = 13;

/// A deserializable, self-checking model bundle
pub trait Bundle: DeserializeOwned {
    /// Short name used in logs and errors
    const NAME: &'static str;

    fn validate(&self) -> Result<()>;
}

/// Presence classifier: P(species seen | date, hour, locality)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceBundle {
    #[serde(rename = "rf_final")]
    pub model: Estimator,
    pub label_encoders: LabelEncoders,
    pub selected_features: Vec<String>,
}

/// Location classifier: locality code for (date, hour, coordinate, species)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBundle {
    pub location_model: Estimator,
    pub label_encoders: LabelEncoders,
    pub selected_features: Vec<String>,
}

/// Best-time regressors: month and hour of the likeliest sighting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestTimeBundle {
    pub month_model: Estimator,
    pub hour_model: Estimator,
    pub label_encoders: LabelEncoders,
    pub selected_features: Vec<String>,
}

fn check_columns(name: &str, selected_features: &[String], expected: usize) -> Result<()> {
    if selected_features.len() != expected {
        return Err(Error::Model(format!(
            "{} bundle lists {} selected features, expected {}",
            name,
            selected_features.len(),
            expected
        )));
    }
    Ok(())
}

impl Bundle for PresenceBundle {
    const NAME: &'static str = "presence";

    fn validate(&self) -> Result<()> {
        check_columns(Self::NAME, &self.selected_features, PRESENCE_COLUMNS)?;
        self.label_encoders.require(&[LOCALITY_FIELD, SPECIES_FIELD])?;
        match &self.model {
            Estimator::Classifier { classes, .. } if classes.contains(&1.0) => {}
            _ => {
                return Err(Error::Model(
                    "presence model must be a classifier with a class 1".to_string(),
                ))
            }
        }
        self.model.validate(self.selected_features.len())
    }
}

impl PresenceBundle {
    /// Probability of the positive (present) class
    pub fn presence_probability(&self, row: &FeatureRow) -> Result<f64> {
        let proba = self.model.predict_proba(row.values())?;
        match &self.model {
            Estimator::Classifier { classes, .. } => classes
                .iter()
                .position(|c| *c == 1.0)
                .and_then(|i| proba.get(i).copied())
                .ok_or_else(|| Error::Model("presence model has no class 1".to_string())),
            Estimator::Regressor { .. } => {
                Err(Error::Model("presence model is not a classifier".to_string()))
            }
        }
    }
}

impl Bundle for LocationBundle {
    const NAME: &'static str = "location";

    fn validate(&self) -> Result<()> {
        check_columns(Self::NAME, &self.selected_features, LOCATION_COLUMNS)?;
        self.label_encoders.require(&[LOCALITY_FIELD, SPECIES_FIELD])?;
        if !self.location_model.is_classifier() {
            return Err(Error::Model("location model must be a classifier".to_string()));
        }
        self.location_model.validate(self.selected_features.len())
    }
}

impl Bundle for BestTimeBundle {
    const NAME: &'static str = "best_time";

    fn validate(&self) -> Result<()> {
        check_columns(Self::NAME, &self.selected_features, BEST_TIME_COLUMNS)?;
        self.label_encoders.require(&[LOCALITY_FIELD, SPECIES_FIELD])?;
        let n = self.selected_features.len();
        self.month_model
            .validate(n)
            .map_err(|e| Error::Model(format!("month model: {}", e)))?;
        self.hour_model
            .validate(n)
            .map_err(|e| Error::Model(format!("hour model: {}", e)))
    }
}

/// One model input row, checked against the bundle's column list
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow(Vec<f64>);

impl FeatureRow {
    /// Build a row whose values line up with `selected_features`
    pub fn new(selected_features: &[String], values: &[f64]) -> Result<Self> {
        if values.len() != selected_features.len() {
            return Err(Error::Model(format!(
                "row has {} values for {} columns",
                values.len(),
                selected_features.len()
            )));
        }
        Ok(Self(values.to_vec()))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Parse and validate a bundle from JSON text
pub fn parse_bundle<B: Bundle>(json: &str) -> Result<B> {
    let bundle: B = serde_json::from_str(json)?;
    bundle.validate()?;
    Ok(bundle)
}

/// Read, parse and validate a bundle file
pub fn load_bundle<B: Bundle>(path: &Path) -> Result<B> {
    let text = fs::read_to_string(path)?;
    let bundle = parse_bundle(&text)
        .map_err(|e| Error::Model(format!("{} bundle at {}: {}", B::NAME, path.display(), e)))?;
    info!("Loaded {} model bundle from {}", B::NAME, path.display());
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoders() -> LabelEncoders {
        let mut encoders = LabelEncoders::default();
        encoders.insert(LOCALITY_FIELD, LabelEncoder::new(["Tissa Lake", "Kalametiya"]));
        encoders.insert(SPECIES_FIELD, LabelEncoder::new(["Red-vented Bulbul"]));
        encoders
    }

    fn columns(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    fn presence() -> PresenceBundle {
        PresenceBundle {
            model: Estimator::Classifier {
                classes: vec![0.0, 1.0],
                trees: vec![Tree::stump(3, 12.0, vec![1.0, 3.0], vec![3.0, 1.0])],
            },
            label_encoders: encoders(),
            selected_features: columns(PRESENCE_COLUMNS),
        }
    }

    #[test]
    fn test_presence_probability_reads_class_one() {
        let bundle = presence();
        bundle.validate().unwrap();
        let values = [2025.0, 3.0, 1.0, 9.0, 0.0, 0.0];
        let row = FeatureRow::new(&bundle.selected_features, &values).unwrap();
        assert!((bundle.presence_probability(&row).unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_presence_requires_class_one() {
        let mut bundle = presence();
        bundle.model = Estimator::Classifier {
            classes: vec![0.0, 2.0],
            trees: vec![Tree::leaf(vec![1.0, 1.0])],
        };
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn test_missing_encoder_fails_validation() {
        let mut bundle = presence();
        bundle.label_encoders = LabelEncoders::default();
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn test_column_count_checked() {
        let mut bundle = presence();
        bundle.selected_features.pop();
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn test_feature_row_length_checked() {
        assert!(FeatureRow::new(&columns(3), &[1.0, 2.0]).is_err());
        assert_eq!(FeatureRow::new(&columns(2), &[1.0, 2.0]).unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_location_rejects_regressor() {
        let bundle = LocationBundle {
            location_model: Estimator::Regressor { trees: vec![Tree::leaf(vec![0.0])] },
            label_encoders: encoders(),
            selected_features: columns(LOCATION_COLUMNS),
        };
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn test_parse_best_time_bundle() {
        let json = serde_json::json!({
            "month_model": {"kind": "regressor", "trees": [
                {"children_left": [-1], "children_right": [-1], "feature": [-2],
                 "threshold": [-2.0], "value": [[5.6]]}
            ]},
            "hour_model": {"kind": "regressor", "trees": [
                {"children_left": [-1], "children_right": [-1], "feature": [-2],
                 "threshold": [-2.0], "value": [[7.2]]}
            ]},
            "label_encoders": {
                "LOCALITY": {"classes": ["Tissa Lake"]},
                "COMMON NAME": {"classes": ["Red-vented Bulbul"]}
            },
            "selected_features": columns(BEST_TIME_COLUMNS),
        });
        let bundle: BestTimeBundle = parse_bundle(&json.to_string()).unwrap();
        assert_eq!(bundle.month_model.predict(&[0.0; 13]).unwrap(), 5.6);
    }

    #[test]
    fn test_parse_presence_bundle_file_layout() {
        let json = r#"{
            "rf_final": {"kind": "classifier", "classes": [0, 1], "trees": [
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [3, -2, -2], "threshold": [12.5, -2.0, -2.0],
                 "value": [[4.0, 4.0], [1.0, 3.0], [3.0, 1.0]]}
            ]},
            "label_encoders": {"LOCALITY": {"classes": ["Tissa Lake"]},
                               "COMMON NAME": {"classes": ["Red-vented Bulbul"]}},
            "selected_features": ["YEAR", "MONTH", "DAY_OF_WEEK", "HOUR", "LOCALITY", "COMMON NAME"]
        }"#;
        let bundle: PresenceBundle = parse_bundle(json).unwrap();
        let row = FeatureRow::new(&bundle.selected_features, &[2025.0, 3.0, 1.0, 9.0, 0.0, 0.0])
            .unwrap();
        assert!((bundle.presence_probability(&row).unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_load_bundle_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presence_model.json");
        fs::write(&path, "{\"rf_final\": 1}").unwrap();
        let err = load_bundle::<PresenceBundle>(&path).unwrap_err().to_string();
        assert!(err.contains("presence_model.json"));
    }
}
