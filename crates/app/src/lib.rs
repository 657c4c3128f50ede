//! # biothermal-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `HomeAssistant`: readings, room climate, thermostat discovery and control
//!   - `ComfortClassifier`: comfort-zone inference on a feature vector
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DashboardService`: refresh and read the dashboard snapshot, select a thermostat
//!   - `ThermalControlService`: ingest wearable data, decide, apply and roll back
//! - Provide the background [`poller::Poller`] that keeps the snapshot fresh
//!
//! ## Dependency rule
//! Depends on `biothermal-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod poller;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod stubs;
