use super::interpolate::{bilinear, interp_weights, linear, nearest_index};
use super::physics::*;
use ndarray::array;

#[test]
fn test_height_to_pressure_sea_level() {
    // z = 0 gives exactly p0 in hPa
    assert!((height_to_pressure_hpa(0.0) - 1000.0).abs() < 1e-9);
}

#[test]
fn test_height_to_pressure_monotonic() {
    let mut last = f64::INFINITY;
    for z in (0..9000).step_by(100) {
        let p = height_to_pressure_hpa(z as f64);
        assert!(p <= last, "pressure must not increase with height");
        last = p;
    }
}

#[test]
fn test_height_to_pressure_clamps_negative() {
    assert_eq!(height_to_pressure_hpa(-500.0), height_to_pressure_hpa(0.0));
}

#[test]
fn test_height_to_pressure_reference_values() {
    // ~1500 m is roughly the 850 hPa surface in a standard atmosphere
    let p = height_to_pressure_hpa(1457.0);
    assert!((p - 850.0).abs() < 2.0, "got {} hPa", p);
    // ~5500 m is roughly 500 hPa
    let p = height_to_pressure_hpa(5574.0);
    assert!((p - 500.0).abs() < 5.0, "got {} hPa", p);
}

#[test]
fn test_wind_speed_and_direction() {
    assert!((wind_speed(3.0, 4.0) - 5.0).abs() < 1e-12);
    // Pure southerly (from the south): v > 0, wind from 180°
    assert!((wind_direction(0.0, 10.0) - 180.0).abs() < 1e-9);
    // Pure westerly: u > 0, wind from 270°
    assert!((wind_direction(10.0, 0.0) - 270.0).abs() < 1e-9);
}

#[test]
fn test_dewpoint_saturated_equals_temperature() {
    // When the vapor pressure equals saturation, Td == T
    let t_c = 15.0;
    let es = saturation_vapor_pressure_hpa(t_c);
    let td = dewpoint_from_vapor_pressure(es);
    assert!((td - t_c).abs() < 1e-6);
}

#[test]
fn test_dewpoint_below_temperature_when_subsaturated() {
    let p = 850.0;
    let q = 0.004; // fairly dry air
    let td = dewpoint_from_specific_humidity(q, p);
    assert!(td < 15.0);
    assert!(td > -60.0);
}

#[test]
fn test_dry_adiabat_reference_level() {
    // At 1000 hPa the dry adiabat equals its potential temperature
    let t = dry_adiabat_temperature(300.0, 1000.0);
    assert!((t - (300.0 - 273.15)).abs() < 1e-9);
}

#[test]
fn test_nearest_index_descending_axis() {
    let lats = [60.0, 55.0, 50.0, 45.0];
    assert_eq!(nearest_index(&lats, 54.0), 1);
    assert_eq!(nearest_index(&lats, 100.0), 0);
}

#[test]
fn test_interp_weights_clamping() {
    let axis = [0.0, 1.0, 2.0];
    assert_eq!(interp_weights(&axis, -5.0), (0, 0.0));
    let (i, w) = interp_weights(&axis, 5.0);
    assert_eq!(i, 1);
    assert!((w - 1.0).abs() < 1e-12);
}

#[test]
fn test_bilinear_recovers_plane() {
    let data = array![[0.0, 1.0], [2.0, 3.0]];
    let rows = [0.0, 1.0];
    let cols = [0.0, 1.0];
    let v = bilinear(&data, &rows, &cols, 0.5, 0.5);
    assert!((v - 1.5).abs() < 1e-12);
}

#[test]
fn test_linear_midpoint() {
    let v = linear(&[10.0, 20.0], &[0.0, 1.0], 0.25);
    assert!((v - 12.5).abs() < 1e-12);
}

#[test]
fn test_linear_single_point_is_constant() {
    assert_eq!(linear(&[1000.0], &[47.0], 47.0), 1000.0);
    assert_eq!(linear(&[1000.0], &[47.0], -20.0), 1000.0);
}

#[test]
fn test_bilinear_degenerate_axes() {
    // One row: interpolation collapses to the column axis
    let data = array![[1.0, 2.0]];
    let v = bilinear(&data, &[47.0], &[0.0, 1.0], 47.0, 0.5);
    assert!((v - 1.5).abs() < 1e-12);

    // One column
    let data = array![[1.0], [3.0]];
    let v = bilinear(&data, &[0.0, 1.0], &[11.0], 0.5, 11.0);
    assert!((v - 2.0).abs() < 1e-12);

    // Single cell
    let data = array![[5.0]];
    assert_eq!(bilinear(&data, &[47.0], &[11.0], 40.0, 12.0), 5.0);
}
