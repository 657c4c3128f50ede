//! The comfort model the daemon runs with, loaded or not.

use std::path::{Path, PathBuf};

use biothermal_app::ports::ComfortClassifier;
use biothermal_domain::comfort::ComfortZone;
use biothermal_domain::error::{BioThermalError, ModelError};
use biothermal_domain::features::FeatureVector;

use crate::StumpEnsemble;

/// A loaded [`StumpEnsemble`], or the reason it could not be loaded.
///
/// An unavailable model answers every prediction with [`ModelError::Load`],
/// so the dashboard shows "decision unavailable" and the control API
/// answers 503 while readings keep flowing.
#[derive(Debug, Clone)]
pub enum ComfortModel {
    Loaded(StumpEnsemble),
    Unavailable { path: PathBuf, reason: String },
}

impl ComfortModel {
    /// Load the artifact at `path`. Failures are logged and kept, not returned.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match StumpEnsemble::load(path) {
            Ok(model) => Self::Loaded(model),
            Err(err) => {
                let reason = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);
                tracing::error!(
                    path = %path.display(),
                    error = %BioThermalError::from(err).report(),
                    "comfort model unavailable, decisions disabled"
                );
                Self::Unavailable {
                    path: path.to_path_buf(),
                    reason,
                }
            }
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl ComfortClassifier for ComfortModel {
    fn name(&self) -> &str {
        match self {
            Self::Loaded(model) => model.name(),
            Self::Unavailable { .. } => "unavailable",
        }
    }

    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError> {
        match self {
            Self::Loaded(model) => model.predict(features),
            Self::Unavailable { path, reason } => Err(ModelError::Load(
                format!("{}: {reason}", path.display()).into(),
            )
            .into()),
        }
    }
}
