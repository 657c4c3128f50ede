//! # biothermal-adapter-homeassistant
//!
//! HomeAssistant REST API adapter.
//!
//! ## Responsibilities
//! - Implement the `HomeAssistant` port over HomeAssistant's REST API
//! - Authenticate every request with a long-lived access token
//! - Translate entity states (`/api/states/...`) into readings, room climate
//!   snapshots and thermostat options
//! - Call the `climate.set_hvac_mode` and `climate.set_temperature` services
//!
//! ## Dependency rule
//! Depends on `biothermal-domain` and `biothermal-app` (for the port trait).

mod client;
mod error;
mod state;

pub use client::{HomeAssistantClient, HomeAssistantConfig};
pub use error::HomeAssistantError;
