//! Classifier port: comfort-zone inference.

use std::sync::Arc;

use biothermal_domain::comfort::{ClassifierDecision, ComfortZone};
use biothermal_domain::error::BioThermalError;
use biothermal_domain::features::FeatureVector;
use biothermal_domain::reading::Reading;

/// A pre-trained thermal comfort model.
///
/// Inference is CPU-only and fast, so the port is synchronous.
pub trait ComfortClassifier: Send + Sync {
    /// Human-readable model name, shown on the dashboard.
    fn name(&self) -> &str;

    /// Predict the comfort zone for one row of features.
    ///
    /// # Errors
    ///
    /// Returns [`BioThermalError::Model`] when the model cannot produce a
    /// valid zone.
    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError>;

    /// Decide from a wrist reading alone, imputing every other feature.
    ///
    /// # Errors
    ///
    /// Same as [`predict`](Self::predict).
    fn decide(&self, reading: &Reading) -> Result<ClassifierDecision, BioThermalError> {
        self.predict(&FeatureVector::from_wrist(reading))
            .map(ClassifierDecision::from)
    }
}

impl<T: ComfortClassifier + ?Sized> ComfortClassifier for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError> {
        (**self).predict(features)
    }
}
