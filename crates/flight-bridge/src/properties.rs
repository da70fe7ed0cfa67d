//! Vehicle properties exposed to remote clients
//!
//! Control paths validate their input and report the reason on rejection.
//! Telemetry paths never fail: anything unavailable reads as `0`.

use crate::vehicle::{AttitudeMode, FlightError, NamedVariant, Orbit, ReferenceFrame, VehicleHost};
use remote_control_server::HandlerRegistry;
use std::convert::Infallible;
use std::sync::Arc;

/// Registered property paths
pub mod paths {
    pub const THROTTLE: &str = "/control/throttle";
    pub const ENGINE_ON: &str = "/control/engineOn";
    pub const REFERENCE_FRAME: &str = "/control/referenceFrame";
    pub const REFERENCE_FRAMES: &str = "/control/referenceFrames";
    pub const ATTITUDE_MODE: &str = "/control/FlightComputer/AttitudeMode";
    pub const ATTITUDE_MODES: &str = "/control/FlightComputer/AttitudeModes";
    pub const STABILIZATION: &str = "/control/FlightComputer/stabilization";

    pub const APOAPSIS: &str = "/telemetry/apoapsis";
    pub const PERIAPSIS: &str = "/telemetry/periapsis";
    pub const PARENT_MEAN_RADIUS: &str = "/telemetry/orbitingBody/meanRadius";
    pub const APOAPSIS_ELEVATION: &str = "/telemetry/apoapsis_elevation";
    pub const PERIAPSIS_ELEVATION: &str = "/telemetry/periapsis_elevation";
    pub const ORBITAL_SPEED: &str = "/telemetry/orbitalSpeed";
    pub const PROPELLANT_MASS: &str = "/telemetry/propellantMass";
    pub const TOTAL_MASS: &str = "/telemetry/totalMass";
}

/// Register every vehicle property against `host`
pub fn register_vehicle_properties<H: VehicleHost>(registry: &mut HandlerRegistry, host: Arc<H>) {
    register_controls(registry, &host);
    register_telemetry(registry, &host);
}

fn register_controls<H: VehicleHost>(registry: &mut HandlerRegistry, host: &Arc<H>) {
    let h = Arc::clone(host);
    registry.register_read(paths::THROTTLE, move || {
        Ok::<_, Infallible>(h.throttle().unwrap_or(0.0).to_string())
    });

    let h = Arc::clone(host);
    registry.register_write(paths::THROTTLE, move |value: &str| {
        h.set_throttle(parse_throttle(value)?)
    });

    let h = Arc::clone(host);
    registry.register_read(paths::ENGINE_ON, move || {
        Ok::<_, Infallible>(if h.engine_on().unwrap_or(false) { "1" } else { "0" }.to_string())
    });

    let h = Arc::clone(host);
    registry.register_write(paths::ENGINE_ON, move |value: &str| {
        h.set_engine_on(parse_engine_on(value)?)
    });

    let h = Arc::clone(host);
    registry.register_read(paths::REFERENCE_FRAME, move || {
        Ok::<_, Infallible>(
            h.reference_frame()
                .map_or_else(|| "0".to_string(), |frame| frame.to_string()),
        )
    });

    let h = Arc::clone(host);
    registry.register_write(paths::REFERENCE_FRAME, move |value: &str| {
        if h.reference_frame().is_none() {
            return Err(FlightError::NoVehicle);
        }
        let frame: ReferenceFrame = value.parse()?;
        h.set_reference_frame(frame)?;
        if h.attitude_mode() == Some(AttitudeMode::Auto) {
            h.rate_hold(frame)?;
        }
        Ok(())
    });

    registry.register_read(paths::REFERENCE_FRAMES, || {
        Ok::<_, Infallible>(ReferenceFrame::names())
    });

    // Without a vehicle the mode reads as an empty value
    let h = Arc::clone(host);
    registry.register_read(paths::ATTITUDE_MODE, move || {
        Ok::<_, Infallible>(h.attitude_mode().map(|m| m.to_string()).unwrap_or_default())
    });

    let h = Arc::clone(host);
    registry.register_write(paths::ATTITUDE_MODE, move |value: &str| {
        let mode: AttitudeMode = value.parse()?;
        ignore_without_vehicle(h.set_attitude_mode(mode))
    });

    registry.register_read(paths::ATTITUDE_MODES, || {
        Ok::<_, Infallible>(AttitudeMode::names())
    });

    let h = Arc::clone(host);
    registry.register_write(paths::STABILIZATION, move |value: &str| {
        ignore_without_vehicle(h.set_stabilization(value == "1"))
    });
}

fn register_telemetry<H: VehicleHost>(registry: &mut HandlerRegistry, host: &Arc<H>) {
    register_orbit_value(registry, host, paths::APOAPSIS, |o| o.apoapsis);
    register_orbit_value(registry, host, paths::PERIAPSIS, |o| o.periapsis);
    register_orbit_value(registry, host, paths::PARENT_MEAN_RADIUS, |o| {
        o.parent_mean_radius
    });
    register_orbit_value(registry, host, paths::APOAPSIS_ELEVATION, Orbit::apoapsis_elevation);
    register_orbit_value(registry, host, paths::PERIAPSIS_ELEVATION, Orbit::periapsis_elevation);

    let h = Arc::clone(host);
    registry.register_read(paths::ORBITAL_SPEED, move || {
        Ok::<_, Infallible>(format_number(h.telemetry().map(|t| t.orbital_speed)))
    });

    let h = Arc::clone(host);
    registry.register_read(paths::PROPELLANT_MASS, move || {
        Ok::<_, Infallible>(format_number(h.telemetry().map(|t| t.propellant_mass)))
    });

    let h = Arc::clone(host);
    registry.register_read(paths::TOTAL_MASS, move || {
        Ok::<_, Infallible>(format_number(h.telemetry().map(|t| t.total_mass)))
    });
}

fn register_orbit_value<H: VehicleHost>(
    registry: &mut HandlerRegistry,
    host: &Arc<H>,
    path: &'static str,
    field: fn(&Orbit) -> f64,
) {
    let h = Arc::clone(host);
    registry.register_read(path, move || {
        let value = h.telemetry().and_then(|t| t.orbit).map(|o| field(&o));
        Ok::<_, Infallible>(format_number(value))
    });
}

fn parse_throttle(value: &str) -> Result<f32, FlightError> {
    let throttle: f32 = value.parse().map_err(|_| {
        FlightError::InvalidValue(format!(
            "Invalid throttle value: '{}'. Must be a number between 0.0 and 1.0",
            value
        ))
    })?;
    if !(0.0..=1.0).contains(&throttle) {
        return Err(FlightError::InvalidValue(format!(
            "Throttle must be between 0.0 and 1.0, got {}",
            throttle
        )));
    }
    Ok(throttle)
}

fn parse_engine_on(value: &str) -> Result<bool, FlightError> {
    let on: i32 = value.parse().map_err(|_| {
        FlightError::InvalidValue(format!(
            "Invalid engineOn value: '{}'. Must be 0 or 1",
            value
        ))
    })?;
    match on {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FlightError::InvalidValue(format!(
            "EngineOn must be 0 or 1, got {}",
            other
        ))),
    }
}

fn ignore_without_vehicle(result: Result<(), FlightError>) -> Result<(), FlightError> {
    match result {
        Err(FlightError::NoVehicle) => Ok(()),
        other => other,
    }
}

/// Shortest round-trip form, `0` when unavailable or not finite
fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => "0".to_string(),
    }
}
