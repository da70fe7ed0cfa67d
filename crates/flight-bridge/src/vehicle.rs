//! Capability interface onto the host's controlled vehicle
//!
//! The host implements `VehicleHost` with whatever typed accessors it has.
//! Every method may be called concurrently from several connections.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flight host errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlightError {
    /// No vehicle is currently under control
    #[error("No vehicle controlled")]
    NoVehicle,

    /// Value rejected by validation
    #[error("{0}")]
    InvalidValue(String),
}

/// Enum whose variants are addressed by name or by index on the wire
pub trait NamedVariant: Copy + Sized + 'static {
    /// All variants in index order
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    /// Parse a case-insensitive name or a defined numeric index
    fn parse_variant(s: &str) -> Option<Self> {
        if let Some(v) = Self::ALL.iter().find(|v| v.name().eq_ignore_ascii_case(s)) {
            return Some(*v);
        }
        s.parse::<usize>()
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Comma-joined variant names
    fn names() -> String {
        Self::ALL
            .iter()
            .map(|v| v.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Navball reference frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    Orbital,
    Surface,
    Target,
    Inertial,
}

impl NamedVariant for ReferenceFrame {
    const ALL: &'static [Self] = &[
        ReferenceFrame::Orbital,
        ReferenceFrame::Surface,
        ReferenceFrame::Target,
        ReferenceFrame::Inertial,
    ];

    fn name(self) -> &'static str {
        match self {
            ReferenceFrame::Orbital => "Orbital",
            ReferenceFrame::Surface => "Surface",
            ReferenceFrame::Target => "Target",
            ReferenceFrame::Inertial => "Inertial",
        }
    }
}

/// Flight computer attitude mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttitudeMode {
    Manual,
    Auto,
}

impl NamedVariant for AttitudeMode {
    const ALL: &'static [Self] = &[AttitudeMode::Manual, AttitudeMode::Auto];

    fn name(self) -> &'static str {
        match self {
            AttitudeMode::Manual => "Manual",
            AttitudeMode::Auto => "Auto",
        }
    }
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceFrame {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_variant(s)
            .ok_or_else(|| FlightError::InvalidValue(format!("Invalid reference frame: '{}'", s)))
    }
}

impl fmt::Display for AttitudeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttitudeMode {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_variant(s).ok_or_else(|| {
            FlightError::InvalidValue(format!("Invalid FlightComputer AttitudeMode: '{}'", s))
        })
    }
}

/// Orbit of the controlled vehicle around its parent body (metres)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub apoapsis: f64,
    pub periapsis: f64,
    pub parent_mean_radius: f64,
}

impl Orbit {
    /// Apoapsis above the parent's mean surface
    pub fn apoapsis_elevation(&self) -> f64 {
        self.apoapsis - self.parent_mean_radius
    }

    /// Periapsis above the parent's mean surface
    pub fn periapsis_elevation(&self) -> f64 {
        self.periapsis - self.parent_mean_radius
    }
}

/// Telemetry snapshot of the controlled vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    /// `None` while the vehicle has no orbit (e.g. landed)
    pub orbit: Option<Orbit>,
    pub orbital_speed: f64,
    pub propellant_mass: f64,
    pub total_mass: f64,
}

/// Typed access to the vehicle the host is currently controlling.
///
/// Getters return `None` and setters `FlightError::NoVehicle` while nothing
/// is under control.
pub trait VehicleHost: Send + Sync + 'static {
    fn throttle(&self) -> Option<f32>;
    fn set_throttle(&self, throttle: f32) -> Result<(), FlightError>;

    fn engine_on(&self) -> Option<bool>;
    fn set_engine_on(&self, on: bool) -> Result<(), FlightError>;

    fn reference_frame(&self) -> Option<ReferenceFrame>;
    fn set_reference_frame(&self, frame: ReferenceFrame) -> Result<(), FlightError>;

    fn attitude_mode(&self) -> Option<AttitudeMode>;
    fn set_attitude_mode(&self, mode: AttitudeMode) -> Result<(), FlightError>;

    /// Ask the flight computer to hold attitude rates in `frame`
    fn rate_hold(&self, frame: ReferenceFrame) -> Result<(), FlightError>;

    fn set_stabilization(&self, enabled: bool) -> Result<(), FlightError>;

    fn telemetry(&self) -> Option<Telemetry>;
}
