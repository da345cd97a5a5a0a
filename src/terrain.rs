//! Terrain silhouettes for vertical cross-sections.
//!
//! The DEM stores surface elevation in meters; sections plot against
//! pressure, so elevations are converted with the barometric formula and
//! drawn as an outline along the section axis.

use std::path::Path;

use crate::data_io::{SectionAxis, LAT_DIM, LON_DIM};
use crate::error::VisError;
use crate::math::interpolate::nearest_index;
use crate::math::physics::height_to_pressure_hpa;

const TERRAIN_VAR: &str = "z";

/// Surface pressure outline along one section axis.
#[derive(Debug, Clone)]
pub struct TerrainProfile {
    /// Coordinate along the section (longitude for W–E, latitude for S–N)
    pub x: Vec<f64>,
    /// Surface pressure (hPa) at each point
    pub pressure_hpa: Vec<f64>,
    pub axis: SectionAxis,
}

/// Load the W–E and S–N terrain outlines through the section crossing
/// point, from a DEM file with elevation variable `z` in meters.
///
/// `lat_used` and `lon_used` are the coordinates the sections were actually
/// taken at; the DEM grid need not match the data grid, so the nearest DEM
/// row/column is used.
pub fn load_terrain_lines(
    path: &Path,
    lat_used: f64,
    lon_used: f64,
) -> Result<(TerrainProfile, TerrainProfile), VisError> {
    if !path.exists() {
        return Err(VisError::FileNotFound(path.to_path_buf()));
    }
    let file = netcdf::open(path)?;

    let latitudes = coord(&file, LAT_DIM)?;
    let longitudes = coord(&file, LON_DIM)?;

    let var = file.variable(TERRAIN_VAR).ok_or_else(|| VisError::MissingVariable {
        name: TERRAIN_VAR.to_string(),
        dataset: "terrain file".to_string(),
        available: file
            .variables()
            .filter(|v| v.dimensions().len() >= 2)
            .map(|v| v.name().to_string())
            .collect(),
    })?;

    let nj = latitudes.len();
    let ni = longitudes.len();
    let ndims = var.dimensions().len();
    // DEMs sometimes carry a singleton time dimension up front
    let elevation: Vec<f64> = match ndims {
        2 => var.get_values::<f64, _>((0..nj, 0..ni))?,
        3 => var.get_values::<f64, _>((0..1, 0..nj, 0..ni))?,
        _ => {
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            return Err(VisError::UnexpectedShape(TERRAIN_VAR.to_string(), shape));
        }
    };

    let j = nearest_index(&latitudes, lat_used);
    let i = nearest_index(&longitudes, lon_used);

    let west_east = TerrainProfile {
        pressure_hpa: (0..ni)
            .map(|ii| height_to_pressure_hpa(elevation[j * ni + ii]))
            .collect(),
        x: longitudes,
        axis: SectionAxis::Longitude,
    };
    let south_north = TerrainProfile {
        pressure_hpa: (0..nj)
            .map(|jj| height_to_pressure_hpa(elevation[jj * ni + i]))
            .collect(),
        x: latitudes,
        axis: SectionAxis::Latitude,
    };
    Ok((west_east, south_north))
}

fn coord(file: &netcdf::File, name: &str) -> Result<Vec<f64>, VisError> {
    let var = file
        .variable(name)
        .ok_or_else(|| VisError::MissingDimension(name.to_string()))?;
    Ok(var.get_values::<f64, _>(..)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_terrain_file() {
        let err = load_terrain_lines(&PathBuf::from("/no/such/DEM.nc"), 47.0, 11.0).unwrap_err();
        assert!(matches!(err, VisError::FileNotFound(_)));
    }
}
