//! # biothermal-adapter-classifier
//!
//! Comfort classifier adapter.
//!
//! ## Responsibilities
//! - Load a pre-trained model artifact (boosted decision stumps, JSON)
//! - Validate the artifact against the features this build knows about
//! - Implement the `ComfortClassifier` port (inference only, no training)
//! - Keep running without a model: an unusable artifact yields a
//!   [`ComfortModel::Unavailable`] whose predictions fail
//!
//! ## Dependency rule
//! Depends on `biothermal-domain` and `biothermal-app` (for the port trait).

mod artifact;
mod ensemble;
mod model;

pub use ensemble::StumpEnsemble;
pub use model::ComfortModel;
