//! On-disk shape of the model artifact.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Artifact {
    pub name: String,
    pub features: Vec<FeatureSpec>,
    pub classes: Vec<i64>,
    pub estimators: Vec<StumpSpec>,
}

/// A model input with the value used when it is missing at inference time.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureSpec {
    pub name: String,
    pub default: f64,
}

/// One decision stump: `value <= threshold` votes `below`, otherwise `above`.
#[derive(Debug, Deserialize)]
pub(crate) struct StumpSpec {
    pub feature: String,
    pub threshold: f64,
    pub weight: f64,
    pub below: i64,
    pub above: i64,
}
