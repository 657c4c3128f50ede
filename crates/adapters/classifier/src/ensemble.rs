//! Weighted-vote ensemble of decision stumps.

use std::collections::HashMap;
use std::path::Path;

use biothermal_app::ports::ComfortClassifier;
use biothermal_domain::comfort::ComfortZone;
use biothermal_domain::error::{BioThermalError, ModelError};
use biothermal_domain::features::{Feature, FeatureVector};

use crate::artifact::Artifact;

#[derive(Debug, Clone)]
struct Stump {
    feature: Feature,
    threshold: f64,
    weight: f64,
    /// Index into [`StumpEnsemble::classes`].
    below: usize,
    above: usize,
}

/// A validated, ready-to-run comfort model.
#[derive(Debug, Clone)]
pub struct StumpEnsemble {
    name: String,
    defaults: HashMap<Feature, f64>,
    classes: Vec<ComfortZone>,
    stumps: Vec<Stump>,
}

impl StumpEnsemble {
    /// Read and validate an artifact file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Load`] when the file cannot be read or is not
    /// valid JSON, and the errors of [`from_json`](Self::from_json) when it
    /// is not a usable model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ModelError::Load(Box::new(err)))?;
        let model = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            name = %model.name,
            estimators = model.stumps.len(),
            "comfort model loaded"
        );
        Ok(model)
    }

    /// Parse and validate an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Load`] for malformed JSON,
    /// [`ModelError::UnknownFeature`] for features this build does not know
    /// or estimators using undeclared features, [`ModelError::OutOfRange`]
    /// for classes outside `-2..=2`, and [`ModelError::Invalid`] for any
    /// other inconsistency.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: Artifact =
            serde_json::from_str(raw).map_err(|err| ModelError::Load(Box::new(err)))?;
        Self::try_from(artifact)
    }

    /// Class scores in artifact order. Exposed for diagnostics and tests.
    #[must_use]
    pub fn scores(&self, features: &FeatureVector) -> Vec<(ComfortZone, f64)> {
        let mut scores = vec![0.0; self.classes.len()];
        for stump in &self.stumps {
            let value = features
                .get(stump.feature)
                .or_else(|| self.defaults.get(&stump.feature).copied())
                .unwrap_or_default();
            let vote = if value <= stump.threshold {
                stump.below
            } else {
                stump.above
            };
            scores[vote] += stump.weight;
        }
        self.classes.iter().copied().zip(scores).collect()
    }
}

impl TryFrom<Artifact> for StumpEnsemble {
    type Error = ModelError;

    fn try_from(artifact: Artifact) -> Result<Self, Self::Error> {
        if artifact.classes.is_empty() {
            return Err(ModelError::Invalid("no classes"));
        }
        if artifact.estimators.is_empty() {
            return Err(ModelError::Invalid("no estimators"));
        }

        let classes = artifact
            .classes
            .iter()
            .map(|class| ComfortZone::try_from(*class).map_err(|_| ModelError::OutOfRange(*class)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut defaults = HashMap::with_capacity(artifact.features.len());
        for spec in artifact.features {
            let feature = Feature::from_name(&spec.name)
                .ok_or_else(|| ModelError::UnknownFeature(spec.name.clone()))?;
            if !spec.default.is_finite() {
                return Err(ModelError::Invalid("feature default must be finite"));
            }
            defaults.insert(feature, spec.default);
        }

        let class_index = |class: i64| {
            artifact
                .classes
                .iter()
                .position(|c| *c == class)
                .ok_or(ModelError::Invalid("vote references an undeclared class"))
        };
        let mut stumps = Vec::with_capacity(artifact.estimators.len());
        for spec in &artifact.estimators {
            let feature = Feature::from_name(&spec.feature)
                .filter(|feature| defaults.contains_key(feature))
                .ok_or_else(|| ModelError::UnknownFeature(spec.feature.clone()))?;
            if !spec.threshold.is_finite() {
                return Err(ModelError::Invalid("threshold must be finite"));
            }
            if !spec.weight.is_finite() || spec.weight <= 0.0 {
                return Err(ModelError::Invalid("weight must be finite and positive"));
            }
            stumps.push(Stump {
                feature,
                threshold: spec.threshold,
                weight: spec.weight,
                below: class_index(spec.below)?,
                above: class_index(spec.above)?,
            });
        }

        Ok(Self {
            name: artifact.name,
            defaults,
            classes,
            stumps,
        })
    }
}

impl ComfortClassifier for StumpEnsemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError> {
        let mut best: Option<(ComfortZone, f64)> = None;
        for (zone, score) in self.scores(features) {
            // strictly greater: ties go to the class listed first
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((zone, score));
            }
        }
        best.map(|(zone, _)| zone)
            .ok_or_else(|| ModelError::Invalid("no classes").into())
    }
}
