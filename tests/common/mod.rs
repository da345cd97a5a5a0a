//! Shared NetCDF fixtures for the integration tests.
//!
//! Builds small but structurally faithful ERA5 files: a one-timestep case
//! file, a 12-month climatology, and a terrain DEM.

use std::path::Path;

pub const LEVELS: [f64; 3] = [500.0, 700.0, 850.0];
pub const LATITUDES: [f64; 5] = [50.0, 49.0, 48.0, 47.0, 46.0];
pub const LONGITUDES: [f64; 6] = [9.0, 10.0, 11.0, 12.0, 13.0, 14.0];

/// Epoch seconds for 2025-10-01 00:00 UTC, the case snapshot time
pub const CASE_TIME: f64 = 1_759_276_800.0;

/// Case temperature at level index k (K)
pub fn case_t(k: usize) -> f64 {
    280.0 - 10.0 * k as f64
}

/// Climatology temperature for any month (K)
pub const CLIM_T: f64 = 275.0;

fn put_coord(file: &mut netcdf::FileMut, name: &str, values: &[f64]) {
    file.add_dimension(name, values.len()).unwrap();
    let mut var = file.add_variable::<f64>(name, &[name]).unwrap();
    var.put_values(values, 0..values.len()).unwrap();
}

/// Write a one-timestep case file with t, z, u, v, w, q on
/// [valid_time, pressure_level, latitude, longitude].
pub fn write_case_file(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    let (nk, nj, ni) = (LEVELS.len(), LATITUDES.len(), LONGITUDES.len());

    file.add_dimension("valid_time", 1).unwrap();
    let mut tvar = file.add_variable::<f64>("valid_time", &["valid_time"]).unwrap();
    tvar.put_values(&[CASE_TIME], 0..1).unwrap();
    tvar.put_attribute("units", "seconds since 1970-01-01")
        .unwrap();

    put_coord(&mut file, "pressure_level", &LEVELS);
    put_coord(&mut file, "latitude", &LATITUDES);
    put_coord(&mut file, "longitude", &LONGITUDES);

    let dims = ["valid_time", "pressure_level", "latitude", "longitude"];
    let n = nk * nj * ni;

    let mut t = vec![0.0; n];
    let mut z = vec![0.0; n];
    for k in 0..nk {
        for idx in 0..nj * ni {
            t[k * nj * ni + idx] = case_t(k);
            // geopotential (m²/s²), higher aloft
            z[k * nj * ni + idx] = 9.80665 * (8000.0 - 1000.0 * k as f64);
        }
    }

    let fields: [(&str, &str, Vec<f64>); 6] = [
        ("t", "Temperature", t),
        ("z", "Geopotential", z),
        ("u", "U component of wind", vec![3.0; n]),
        ("v", "V component of wind", vec![4.0; n]),
        ("w", "Vertical velocity", vec![0.01; n]),
        ("q", "Specific humidity", vec![0.004; n]),
    ];
    for (name, long_name, values) in fields {
        let mut var = file.add_variable::<f64>(name, &dims).unwrap();
        var.put_values(&values, (0..1, 0..nk, 0..nj, 0..ni)).unwrap();
        var.put_attribute("long_name", long_name).unwrap();
        var.put_attribute("units", "1").unwrap();
    }
}

/// Write a 12-month climatology with t and z on
/// [month, pressure_level, latitude, longitude].
pub fn write_clim_file(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    let (nk, nj, ni) = (LEVELS.len(), LATITUDES.len(), LONGITUDES.len());
    let months: Vec<f64> = (1..=12).map(|m| m as f64).collect();

    put_coord(&mut file, "month", &months);
    put_coord(&mut file, "pressure_level", &LEVELS);
    put_coord(&mut file, "latitude", &LATITUDES);
    put_coord(&mut file, "longitude", &LONGITUDES);

    let dims = ["month", "pressure_level", "latitude", "longitude"];
    let n = 12 * nk * nj * ni;

    let mut var = file.add_variable::<f64>("t", &dims).unwrap();
    var.put_values(&vec![CLIM_T; n], (0..12, 0..nk, 0..nj, 0..ni))
        .unwrap();
    var.put_attribute("long_name", "Temperature").unwrap();
    var.put_attribute("units", "K").unwrap();

    let mut z = vec![0.0; n];
    for m in 0..12 {
        for k in 0..nk {
            for idx in 0..nj * ni {
                z[(m * nk + k) * nj * ni + idx] = 9.80665 * (8000.0 - 1000.0 * k as f64);
            }
        }
    }
    let mut var = file.add_variable::<f64>("z", &dims).unwrap();
    var.put_values(&z, (0..12, 0..nk, 0..nj, 0..ni)).unwrap();
    var.put_attribute("long_name", "Geopotential").unwrap();
    var.put_attribute("units", "m**2 s**-2").unwrap();
}

/// Write a DEM with elevation z(latitude, longitude) in meters.
pub fn write_terrain_file(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    let (nj, ni) = (LATITUDES.len(), LONGITUDES.len());

    put_coord(&mut file, "latitude", &LATITUDES);
    put_coord(&mut file, "longitude", &LONGITUDES);

    let mut elevation = vec![0.0; nj * ni];
    for j in 0..nj {
        for i in 0..ni {
            // a ridge rising eastward
            elevation[j * ni + i] = 200.0 * i as f64;
        }
    }
    let mut var = file
        .add_variable::<f64>("z", &["latitude", "longitude"])
        .unwrap();
    var.put_values(&elevation, (0..nj, 0..ni)).unwrap();
    var.put_attribute("units", "m").unwrap();
}
