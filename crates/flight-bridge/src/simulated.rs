//! In-memory vehicle host

use crate::vehicle::{AttitudeMode, FlightError, Orbit, ReferenceFrame, Telemetry, VehicleHost};
use std::sync::{PoisonError, RwLock};

/// State of the simulated vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedVehicle {
    pub throttle: f32,
    pub engine_on: bool,
    pub reference_frame: ReferenceFrame,
    pub attitude_mode: AttitudeMode,
    pub stabilization: bool,
    /// Last frame the flight computer was asked to rate-hold
    pub rate_hold: Option<ReferenceFrame>,
    pub telemetry: Telemetry,
}

impl Default for SimulatedVehicle {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            engine_on: false,
            reference_frame: ReferenceFrame::Orbital,
            attitude_mode: AttitudeMode::Manual,
            stabilization: false,
            rate_hold: None,
            telemetry: Telemetry {
                orbit: Some(Orbit {
                    apoapsis: 6_671_000.0,
                    periapsis: 6_571_000.0,
                    parent_mean_radius: 6_371_000.0,
                }),
                orbital_speed: 7_730.5,
                propellant_mass: 1_200.0,
                total_mass: 5_400.0,
            },
        }
    }
}

/// Thread-safe host holding at most one controlled vehicle
#[derive(Debug, Default)]
pub struct SimulatedHost {
    vehicle: RwLock<Option<SimulatedVehicle>>,
}

impl SimulatedHost {
    /// Host controlling `vehicle`
    pub fn new(vehicle: SimulatedVehicle) -> Self {
        Self {
            vehicle: RwLock::new(Some(vehicle)),
        }
    }

    /// Host with nothing under control
    pub fn without_vehicle() -> Self {
        Self::default()
    }

    /// Take control of a vehicle, replacing any current one
    pub fn take_control(&self, vehicle: SimulatedVehicle) {
        *self.vehicle.write().unwrap_or_else(PoisonError::into_inner) = Some(vehicle);
    }

    /// Release the current vehicle
    pub fn release_control(&self) -> Option<SimulatedVehicle> {
        self.vehicle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Copy of the current vehicle state
    pub fn snapshot(&self) -> Option<SimulatedVehicle> {
        self.read(|v| v.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&SimulatedVehicle) -> T) -> Option<T> {
        self.vehicle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }

    fn update(&self, f: impl FnOnce(&mut SimulatedVehicle)) -> Result<(), FlightError> {
        let mut guard = self.vehicle.write().unwrap_or_else(PoisonError::into_inner);
        let vehicle = guard.as_mut().ok_or(FlightError::NoVehicle)?;
        f(vehicle);
        Ok(())
    }
}

impl VehicleHost for SimulatedHost {
    fn throttle(&self) -> Option<f32> {
        self.read(|v| v.throttle)
    }

    fn set_throttle(&self, throttle: f32) -> Result<(), FlightError> {
        self.update(|v| v.throttle = throttle)
    }

    fn engine_on(&self) -> Option<bool> {
        self.read(|v| v.engine_on)
    }

    fn set_engine_on(&self, on: bool) -> Result<(), FlightError> {
        self.update(|v| v.engine_on = on)
    }

    fn reference_frame(&self) -> Option<ReferenceFrame> {
        self.read(|v| v.reference_frame)
    }

    fn set_reference_frame(&self, frame: ReferenceFrame) -> Result<(), FlightError> {
        self.update(|v| v.reference_frame = frame)
    }

    fn attitude_mode(&self) -> Option<AttitudeMode> {
        self.read(|v| v.attitude_mode)
    }

    fn set_attitude_mode(&self, mode: AttitudeMode) -> Result<(), FlightError> {
        self.update(|v| v.attitude_mode = mode)
    }

    fn rate_hold(&self, frame: ReferenceFrame) -> Result<(), FlightError> {
        self.update(|v| v.rate_hold = Some(frame))
    }

    fn set_stabilization(&self, enabled: bool) -> Result<(), FlightError> {
        self.update(|v| v.stabilization = enabled)
    }

    fn telemetry(&self) -> Option<Telemetry> {
        self.read(|v| v.telemetry)
    }
}
