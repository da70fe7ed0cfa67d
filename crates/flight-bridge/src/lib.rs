//! Bridge between a flight simulation host and the remote-control server
//!
//! This crate provides:
//! - `VehicleHost`, the typed capability interface a host implements
//! - The control and telemetry properties registered for that host
//! - `SimulatedHost`, an in-memory host for tooling and tests
//! - `FlightRemote`, the load/unload lifecycle around the command server

pub mod properties;
pub mod remote;
pub mod simulated;
pub mod vehicle;

pub use properties::{paths, register_vehicle_properties};
pub use remote::FlightRemote;
pub use simulated::{SimulatedHost, SimulatedVehicle};
pub use vehicle::{AttitudeMode, FlightError, NamedVariant, Orbit, ReferenceFrame, Telemetry, VehicleHost};
