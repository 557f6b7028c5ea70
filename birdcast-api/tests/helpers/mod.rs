//! Test Helper Utilities
//!
//! Small hand-built bundles whose predictions are easy to reason about.

#![allow(dead_code)]

use birdcast_api::Models;
use birdcast_common::model::{
    BestTimeBundle, Estimator, LabelEncoder, LabelEncoders, LocationBundle, PresenceBundle, Tree,
    LOCALITY_FIELD, SPECIES_FIELD,
};

pub const BIRDS: [&str; 3] = [
    "Blue-tailed Bee-eater",
    "Red-vented Bulbul",
    "White-throated Kingfisher",
];

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn encoders(localities: &[&str]) -> LabelEncoders {
    let mut encoders = LabelEncoders::default();
    encoders.insert(LOCALITY_FIELD, LabelEncoder::new(localities.iter().copied()));
    encoders.insert(SPECIES_FIELD, LabelEncoder::new(BIRDS));
    encoders
}

/// Likely before noon, unlikely after; knows every site but Debarawewa Lake
pub fn presence_bundle() -> PresenceBundle {
    PresenceBundle {
        model: Estimator::Classifier {
            classes: vec![0.0, 1.0],
            trees: vec![Tree::stump(3, 12.0, vec![1.0, 3.0], vec![3.0, 1.0])],
        },
        label_encoders: encoders(&[
            "Bundala NP General",
            "Kalametiya",
            "Tissa Lake",
            "Yala National Park General",
        ]),
        selected_features: columns(&[
            "YEAR",
            "MONTH",
            "DAY_OF_WEEK",
            "HOUR",
            "LOCALITY",
            "COMMON NAME",
        ]),
    }
}

/// Tissa Lake west of longitude 81, Yala east of it
pub fn location_bundle() -> LocationBundle {
    LocationBundle {
        location_model: Estimator::Classifier {
            classes: vec![0.0, 1.0, 2.0],
            trees: vec![Tree::stump(5, 81.0, vec![5.0, 0.0, 0.0], vec![0.0, 5.0, 0.0])],
        },
        label_encoders: encoders(&[
            "Tissa Lake",
            "Yala National Park General",
            "Bundala NP General",
        ]),
        selected_features: columns(&[
            "YEAR", "MONTH", "DAY_OF_WEEK", "HOUR", "LATITUDE", "LONGITUDE", "COMMON NAME",
        ]),
    }
}

/// Always June; 7 a.m. for morning queries, otherwise 5 p.m.; knows no Tissa Lake
pub fn best_time_bundle() -> BestTimeBundle {
    BestTimeBundle {
        month_model: Estimator::Regressor {
            trees: vec![Tree::leaf(vec![5.6])],
        },
        hour_model: Estimator::Regressor {
            trees: vec![Tree::stump(9, 0.5, vec![16.6], vec![6.8])],
        },
        label_encoders: encoders(&["Bundala NP General", "Yala National Park General"]),
        selected_features: columns(&[
            "OBSERVATION COUNT", "YEAR", "DAY_OF_WEEK", "LOCALITY", "COMMON NAME", "Is_Summer",
            "Is_Winter", "Is_Spring", "Is_Autumn", "Is_Morning", "Is_Afternoon", "Is_Evening",
            "Is_Night",
        ]),
    }
}

pub fn models() -> Models {
    Models {
        presence: presence_bundle(),
        location: location_bundle(),
        best_time: best_time_bundle(),
    }
}
