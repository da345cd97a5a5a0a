mod common;

use chrono::{Datelike, Timelike};
use era5vis::anomaly::anomaly_field;
use era5vis::data_io::{Era5Dataset, TimeSelector};
use tempfile::tempdir;

#[test]
fn test_field3d_squeezes_time_and_reads_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    let t = ds.field3d("t").unwrap();
    assert_eq!(t.data.dim(), (3, 5, 6));
    assert_eq!(t.levels, common::LEVELS.to_vec());
    for k in 0..3 {
        assert_eq!(t.data[[k, 0, 0]], common::case_t(k));
    }
    assert_eq!(t.pretty_name(), "t \u{2013} Temperature");
}

#[test]
fn test_derived_wspd_from_components() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    // u = 3, v = 4 everywhere, so wspd = 5
    let wspd = ds.field3d("wspd").unwrap();
    assert!(wspd.data.iter().all(|&v| (v - 5.0).abs() < 1e-12));
}

#[test]
fn test_derived_wdir_from_components() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    // u = 3, v = 4 everywhere: wind from the south-west,
    // (atan2(-3, -4) in degrees + 360) % 360 ≈ 216.87°
    let wdir = ds.field3d("wdir").unwrap();
    assert!(wdir.data.iter().all(|&v| (v - 216.869_897_645_844_02).abs() < 1e-9));
    assert_eq!(wdir.units, "degrees");
    assert_eq!(wdir.pretty_name(), "wdir \u{2013} Wind direction (from)");
}

#[test]
fn test_case_month_year() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();
    assert_eq!(ds.case_month_year().unwrap(), (10, 2025));
}

#[test]
fn test_clim_field_month_selection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clim.nc");
    common::write_clim_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    let t = ds.clim_field3d("t", 10).unwrap();
    assert_eq!(t.data.dim(), (3, 5, 6));
    assert!(t.data.iter().all(|&v| v == common::CLIM_T));

    let err = ds.clim_field3d("t", 13).unwrap_err();
    assert!(err.to_string().contains("Month 13 not found"));
}

#[test]
fn test_anomaly_between_case_and_clim() {
    let dir = tempdir().unwrap();
    let case_path = dir.path().join("case.nc");
    let clim_path = dir.path().join("clim.nc");
    common::write_case_file(&case_path);
    common::write_clim_file(&clim_path);

    let case = Era5Dataset::open(&case_path).unwrap();
    let clim = Era5Dataset::open(&clim_path).unwrap();
    let case_t = case.field3d("t").unwrap();
    let clim_t = clim.clim_field3d("t", 10).unwrap();

    let anom = anomaly_field(&case_t, &clim_t).unwrap();
    for k in 0..3 {
        let expected = common::case_t(k) - common::CLIM_T;
        assert!((anom.data[[k, 2, 3]] - expected).abs() < 1e-9);
    }
}

#[test]
fn test_horizontal_cross_section_slice() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    let field = ds
        .horiz_cross_section("t", 850.0, &TimeSelector::ByIndex(0))
        .unwrap();
    assert_eq!(field.data.dim(), (5, 6));
    assert_eq!(field.level, 850.0);
    assert!(field.data.iter().all(|&v| v == common::case_t(2)));
    assert_eq!(
        (field.time.year(), field.time.month(), field.time.hour()),
        (2025, 10, 0)
    );
}

#[test]
fn test_sections_pick_nearest_coordinate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();
    let t = ds.field3d("t").unwrap();

    let we = t.section_at_latitude(47.9);
    assert_eq!(we.fixed_coord, 48.0);
    assert_eq!(we.x, common::LONGITUDES.to_vec());
    assert_eq!(we.data.dim(), (3, 6));

    let sn = t.section_at_longitude(11.4);
    assert_eq!(sn.fixed_coord, 11.0);
    assert_eq!(sn.x, common::LATITUDES.to_vec());
    assert_eq!(sn.data.dim(), (3, 5));
}

#[test]
fn test_profile_at_nearest_grid_point() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.nc");
    common::write_case_file(&path);
    let ds = Era5Dataset::open(&path).unwrap();

    let profile = ds.profile_at(47.2, 11.6).unwrap();
    assert_eq!(profile.latitude, 47.0);
    assert_eq!(profile.longitude, 12.0);
    assert_eq!(profile.levels.len(), 3);
    assert_eq!(profile.temperature[0], common::case_t(0));
    assert!(profile.u.iter().all(|&v| v == 3.0));
    assert!(profile.specific_humidity.iter().all(|&v| v == 0.004));
}
