//! Fitted categorical label encoders

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, Result};

/// Field name of the locality encoder
pub const LOCALITY_FIELD: &str = "LOCALITY";
/// Field name of the species encoder
pub const SPECIES_FIELD: &str = "COMMON NAME";

/// Label encoder fitted on a fixed vocabulary
///
/// The code of a label is its index in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.classes.iter().any(|c| c == label)
    }

    /// Code for `label`; `field` only labels the error
    pub fn transform(&self, field: &str, label: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| Error::UnseenLabel {
                field: field.to_string(),
                value: label.to_string(),
            })
    }

    /// Label for a predicted code
    pub fn inverse_transform(&self, code: f64) -> Result<&str> {
        if code < 0.0 || code.fract() != 0.0 {
            return Err(Error::Model(format!("invalid label code {}", code)));
        }
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| Error::Model(format!("label code {} out of range", code)))
    }
}

/// Field name → fitted encoder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders(HashMap<String, LabelEncoder>);

impl LabelEncoders {
    pub fn get(&self, field: &str) -> Result<&LabelEncoder> {
        self.0
            .get(field)
            .ok_or_else(|| Error::Model(format!("no label encoder for field '{}'", field)))
    }

    pub fn insert(&mut self, field: impl Into<String>, encoder: LabelEncoder) {
        self.0.insert(field.into(), encoder);
    }

    /// Encode `label` as a model input value
    pub fn encode(&self, field: &str, label: &str) -> Result<f64> {
        self.get(field)?.transform(field, label).map(|code| code as f64)
    }

    /// Decode a model output value
    pub fn decode(&self, field: &str, code: f64) -> Result<&str> {
        self.get(field)?.inverse_transform(code)
    }

    pub(crate) fn require(&self, fields: &[&str]) -> Result<()> {
        fields.iter().try_for_each(|f| self.get(f).map(|_| ()))
    }
}

impl FromIterator<(String, LabelEncoder)> for LabelEncoders {
    fn from_iter<I: IntoIterator<Item = (String, LabelEncoder)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoders() -> LabelEncoders {
        let mut encoders = LabelEncoders::default();
        encoders.insert(LOCALITY_FIELD, LabelEncoder::new(["Kalametiya", "Tissa Lake"]));
        encoders
    }

    #[test]
    fn test_transform_known_label() {
        assert_eq!(encoders().encode(LOCALITY_FIELD, "Tissa Lake").unwrap(), 1.0);
    }

    #[test]
    fn test_transform_unseen_label() {
        let err = encoders()
            .encode(LOCALITY_FIELD, "Kalametiya Bird Sanctuary")
            .unwrap_err();
        match err {
            Error::UnseenLabel { field, value } => {
                assert_eq!(field, LOCALITY_FIELD);
                assert_eq!(value, "Kalametiya Bird Sanctuary");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_encoder() {
        assert!(matches!(encoders().encode(SPECIES_FIELD, "x"), Err(Error::Model(_))));
    }

    #[test]
    fn test_inverse_transform_bounds() {
        let encoders = encoders();
        assert_eq!(encoders.decode(LOCALITY_FIELD, 0.0).unwrap(), "Kalametiya");
        assert!(encoders.decode(LOCALITY_FIELD, 2.0).is_err());
        assert!(encoders.decode(LOCALITY_FIELD, -1.0).is_err());
        assert!(encoders.decode(LOCALITY_FIELD, 0.5).is_err());
    }

    #[test]
    fn test_deserialize_from_bundle_json() {
        let json = r#"{"COMMON NAME": {"classes": ["Red-vented Bulbul"]}}"#;
        let encoders: LabelEncoders = serde_json::from_str(json).unwrap();
        assert!(encoders.get(SPECIES_FIELD).unwrap().contains("Red-vented Bulbul"));
    }
}
