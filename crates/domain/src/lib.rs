//! # biothermal-domain
//!
//! Pure domain model for the biothermal dashboard.
//!
//! ## Responsibilities
//! - Foundational types: HomeAssistant entity ids, error conventions, timestamps
//! - Define **Readings** (timestamped sensor values) and **Room climate** snapshots
//! - Define **Thermostats** and the dashboard's thermostat selection
//! - Define **Comfort zones** and the **Decisions** derived from them
//! - Preprocess smartwatch samples into classifier **Features**
//! - Contain the thermal **Control** rules and the optimal-temperature model
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod entity_id;
pub mod error;
pub mod time;

pub mod climate;
pub mod comfort;
pub mod control;
pub mod features;
pub mod reading;
pub mod thermostat;
pub mod wearable;
