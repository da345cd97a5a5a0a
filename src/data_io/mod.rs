pub mod availability;
pub mod dataset;

pub use availability::{check_data_availability, TimeSelector};
pub use dataset::Era5Dataset;

use chrono::{DateTime, Utc};
use ndarray::{Array2, Array3};

use crate::math::interpolate::nearest_index;

/// ERA5 dimension and variable naming convention. Axes are addressed by
/// coordinate value throughout, never by positional index.
pub const LEVEL_DIM: &str = "pressure_level";
pub const LAT_DIM: &str = "latitude";
pub const LON_DIM: &str = "longitude";
pub const MONTH_DIM: &str = "month";
/// Case files carry either of these as the time dimension
pub const TIME_DIMS: &[&str] = &["valid_time", "time"];

pub const GEO_VAR: &str = "z";
pub const U_VAR: &str = "u";
pub const V_VAR: &str = "v";
pub const W_VAR: &str = "w";
/// Derived wind-speed variable, sqrt(u² + v²)
pub const WSPD_VAR: &str = "wspd";
/// Derived wind-direction variable, degrees the wind comes from
pub const WDIR_VAR: &str = "wdir";

/// Which horizontal axis a cross-section varies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAxis {
    /// W–E section: x = longitude, fixed latitude
    Longitude,
    /// S–N section: x = latitude, fixed longitude
    Latitude,
}

impl SectionAxis {
    pub fn dim_name(&self) -> &'static str {
        match self {
            SectionAxis::Longitude => LON_DIM,
            SectionAxis::Latitude => LAT_DIM,
        }
    }
}

/// A 3D snapshot field over [pressure_level, latitude, longitude].
#[derive(Debug, Clone)]
pub struct GriddedField {
    pub name: String,
    pub long_name: Option<String>,
    pub units: String,
    /// Data layout [level, lat, lon]
    pub data: Array3<f64>,
    pub levels: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
}

impl GriddedField {
    /// Human-readable label: "code – long_name", or just the code.
    pub fn pretty_name(&self) -> String {
        match &self.long_name {
            Some(long) if !long.is_empty() => format!("{} \u{2013} {}", self.name, long),
            _ => self.name.clone(),
        }
    }

    /// W–E cross-section at the grid latitude nearest to `lat`.
    pub fn section_at_latitude(&self, lat: f64) -> CrossSection {
        let j = nearest_index(&self.latitudes, lat);
        let data: Array2<f64> = self.data.index_axis(ndarray::Axis(1), j).to_owned();
        CrossSection {
            data,
            levels: self.levels.clone(),
            x: self.longitudes.clone(),
            axis: SectionAxis::Longitude,
            fixed_coord: self.latitudes[j],
        }
    }

    /// S–N cross-section at the grid longitude nearest to `lon`.
    pub fn section_at_longitude(&self, lon: f64) -> CrossSection {
        let i = nearest_index(&self.longitudes, lon);
        let data: Array2<f64> = self.data.index_axis(ndarray::Axis(2), i).to_owned();
        CrossSection {
            data,
            levels: self.levels.clone(),
            x: self.latitudes.clone(),
            axis: SectionAxis::Latitude,
            fixed_coord: self.longitudes[i],
        }
    }

    /// Minimum and maximum over the whole field.
    pub fn min_max(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.data.iter() {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        (min, max)
    }
}

/// A 2D (pressure level × position) slice of a gridded field.
#[derive(Debug, Clone)]
pub struct CrossSection {
    /// Data layout [level, x]
    pub data: Array2<f64>,
    pub levels: Vec<f64>,
    pub x: Vec<f64>,
    pub axis: SectionAxis,
    /// The coordinate value actually used for the fixed axis (nearest match)
    pub fixed_coord: f64,
}

/// A 2D (latitude × longitude) field at one level and one time.
#[derive(Debug, Clone)]
pub struct HorizontalField {
    pub name: String,
    pub long_name: Option<String>,
    pub units: String,
    /// Data layout [lat, lon]
    pub data: Array2<f64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// Scalar pressure level (hPa) this slice was taken at
    pub level: f64,
    /// Scalar time this slice was taken at
    pub time: DateTime<Utc>,
}

impl HorizontalField {
    pub fn pretty_name(&self) -> String {
        match &self.long_name {
            Some(long) if !long.is_empty() => long.clone(),
            _ => self.name.clone(),
        }
    }

    pub fn min_max(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.data.iter() {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        (min, max)
    }
}

/// A vertical column at one grid point, for soundings.
#[derive(Debug, Clone)]
pub struct SoundingProfile {
    /// Pressure levels (hPa), as stored in the file
    pub levels: Vec<f64>,
    /// Temperature (K)
    pub temperature: Vec<f64>,
    /// Specific humidity (kg/kg)
    pub specific_humidity: Vec<f64>,
    /// Wind components (m/s)
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    /// Grid point actually used
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
}
