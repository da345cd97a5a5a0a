//! Closed-form meteorological formulas.
//!
//! Everything here is a short numeric transformation with no state; the
//! constants follow the international standard atmosphere and the usual
//! thermodynamic references.

/// Gravitational acceleration (m/s²)
pub const G0: f64 = 9.80665;
/// Sea-level standard pressure (Pa)
pub const P0: f64 = 100_000.0;
/// Sea-level standard temperature (K)
pub const T0: f64 = 288.15;
/// Temperature lapse rate (K/m)
pub const LAPSE_RATE: f64 = 0.0065;
/// Molar mass of dry air (kg/mol)
pub const MOLAR_MASS: f64 = 0.028_964_4;
/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.314_459_8;
/// Ratio of gas constants dry air / water vapor
pub const EPSILON: f64 = 0.622;

/// Convert terrain height (m) to approximate surface pressure (hPa) using
/// the standard atmosphere. Heights below zero are clamped to zero, so the
/// result never exceeds 1000 hPa.
pub fn height_to_pressure_hpa(height_m: f64) -> f64 {
    let z = height_m.max(0.0);
    let exponent = (G0 * MOLAR_MASS) / (GAS_CONSTANT * LAPSE_RATE);
    let p_pa = P0 * (1.0 - LAPSE_RATE * z / T0).powf(exponent);
    p_pa / 100.0
}

/// Wind speed from horizontal components (m/s).
pub fn wind_speed(u: f64, v: f64) -> f64 {
    u.hypot(v)
}

/// Meteorological wind direction: degrees the wind is coming FROM
/// (0° = north, 90° = east).
pub fn wind_direction(u: f64, v: f64) -> f64 {
    ((-u).atan2(-v).to_degrees() + 360.0) % 360.0
}

/// Water vapor partial pressure (hPa) from specific humidity (kg/kg) and
/// pressure (hPa).
pub fn vapor_pressure_hpa(specific_humidity: f64, pressure_hpa: f64) -> f64 {
    let q = specific_humidity;
    q * pressure_hpa / (EPSILON + (1.0 - EPSILON) * q)
}

/// Dew point temperature (°C) from vapor pressure (hPa), inverting the
/// Magnus saturation formula over water.
pub fn dewpoint_from_vapor_pressure(e_hpa: f64) -> f64 {
    // e_s(T) = 6.112 * exp(17.67 T / (T + 243.5)), T in °C
    let ln_ratio = (e_hpa / 6.112).ln();
    243.5 * ln_ratio / (17.67 - ln_ratio)
}

/// Dew point (°C) from specific humidity (kg/kg) and pressure (hPa).
pub fn dewpoint_from_specific_humidity(specific_humidity: f64, pressure_hpa: f64) -> f64 {
    dewpoint_from_vapor_pressure(vapor_pressure_hpa(specific_humidity, pressure_hpa))
}

/// Saturation vapor pressure (hPa) over water at temperature (°C).
pub fn saturation_vapor_pressure_hpa(t_c: f64) -> f64 {
    6.112 * (17.67 * t_c / (t_c + 243.5)).exp()
}

/// Saturation mixing ratio (kg/kg) at temperature (°C) and pressure (hPa).
pub fn saturation_mixing_ratio(t_c: f64, pressure_hpa: f64) -> f64 {
    let es = saturation_vapor_pressure_hpa(t_c);
    EPSILON * es / (pressure_hpa - es)
}

/// Temperature (°C) along the dry adiabat through potential temperature
/// theta (K, referenced to 1000 hPa) at the given pressure (hPa).
pub fn dry_adiabat_temperature(theta_k: f64, pressure_hpa: f64) -> f64 {
    let kappa = 0.2854;
    theta_k * (pressure_hpa / 1000.0).powf(kappa) - 273.15
}
