//! HomeAssistant port: the only source of sensor data and the only actuator.

use std::future::Future;

use biothermal_domain::climate::{HvacMode, RoomClimate};
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::BioThermalError;
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::Thermostat;

/// Access to a HomeAssistant instance.
///
/// Implementations map transport and status failures into
/// [`BioThermalError::Fetch`] and unknown entities into
/// [`BioThermalError::NotFound`].
pub trait HomeAssistant: Send + Sync {
    /// Probe the API root. Used once at startup to surface a bad host or token early.
    fn check_api(&self) -> impl Future<Output = Result<(), BioThermalError>> + Send;

    /// Latest numeric state of a sensor entity.
    fn fetch_reading(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Reading, BioThermalError>> + Send;

    /// Current room climate as seen by a `climate.*` entity.
    fn fetch_climate(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<RoomClimate, BioThermalError>> + Send;

    /// All `climate.*` entities, sorted by friendly name.
    fn list_thermostats(
        &self,
    ) -> impl Future<Output = Result<Vec<Thermostat>, BioThermalError>> + Send;

    fn set_hvac_mode(
        &self,
        entity_id: &EntityId,
        mode: HvacMode,
    ) -> impl Future<Output = Result<(), BioThermalError>> + Send;

    fn set_temperature(
        &self,
        entity_id: &EntityId,
        temperature: f64,
    ) -> impl Future<Output = Result<(), BioThermalError>> + Send;
}
