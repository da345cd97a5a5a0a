use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ndarray::{Array2, Array3};

use super::{
    GriddedField, HorizontalField, SoundingProfile, TimeSelector, LAT_DIM, LEVEL_DIM, LON_DIM,
    MONTH_DIM, TIME_DIMS, U_VAR, V_VAR, WDIR_VAR, WSPD_VAR,
};
use crate::error::VisError;
use crate::math::interpolate::nearest_index;
use crate::math::physics::{wind_direction, wind_speed};

/// Read-only handle on an ERA5 NetCDF file.
///
/// Opened, read, and dropped within a single operation's scope; the label
/// ("case file", "climatology file", ...) only feeds error messages.
pub struct Era5Dataset {
    file: netcdf::File,
    path: PathBuf,
    label: String,
}

impl Era5Dataset {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VisError> {
        Self::open_labeled(path, "dataset")
    }

    pub fn open_labeled(path: impl AsRef<Path>, label: &str) -> Result<Self, VisError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VisError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            file: netcdf::open(path)?,
            path: path.to_path_buf(),
            label: label.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Names of the data variables (everything with at least two dimensions;
    /// 1D coordinate variables are excluded).
    pub fn data_vars(&self) -> Vec<String> {
        self.file
            .variables()
            .filter(|v| v.dimensions().len() >= 2)
            .map(|v| v.name().to_string())
            .collect()
    }

    /// True when the variable can be plotted: either present in the file, or
    /// derived wind speed/direction with both components available.
    pub fn has_variable(&self, name: &str) -> bool {
        if self.file.variable(name).is_some() {
            return true;
        }
        (name == WSPD_VAR || name == WDIR_VAR)
            && self.file.variable(U_VAR).is_some()
            && self.file.variable(V_VAR).is_some()
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.file.dimensions().any(|d| d.name() == name)
    }

    fn coord_values(&self, dim: &str) -> Result<Vec<f64>, VisError> {
        let var = self
            .file
            .variable(dim)
            .ok_or_else(|| VisError::MissingDimension(dim.to_string()))?;
        Ok(var.get_values::<f64, _>(..)?)
    }

    pub fn pressure_levels(&self) -> Result<Vec<f64>, VisError> {
        self.coord_values(LEVEL_DIM)
    }

    pub fn latitudes(&self) -> Result<Vec<f64>, VisError> {
        self.coord_values(LAT_DIM)
    }

    pub fn longitudes(&self) -> Result<Vec<f64>, VisError> {
        self.coord_values(LON_DIM)
    }

    pub fn months(&self) -> Result<Vec<u32>, VisError> {
        Ok(self
            .coord_values(MONTH_DIM)?
            .into_iter()
            .map(|m| m as u32)
            .collect())
    }

    /// Time coordinate values, decoded through the CF "units since epoch"
    /// attribute. Falls back to seconds since 1970-01-01 when the attribute
    /// is missing.
    pub fn valid_times(&self) -> Result<Vec<DateTime<Utc>>, VisError> {
        let name = TIME_DIMS
            .iter()
            .find(|d| self.file.variable(d).is_some())
            .ok_or(VisError::MissingTimeCoordinate)?;
        let var = self.file.variable(name).ok_or(VisError::MissingTimeCoordinate)?;
        let raw: Vec<f64> = var.get_values::<f64, _>(..)?;

        let units = attr_string(&var, "units")
            .unwrap_or_else(|| "seconds since 1970-01-01".to_string());
        let (seconds_per_unit, base) = parse_time_units(&units)?;

        Ok(raw
            .into_iter()
            .map(|v| base + chrono::Duration::seconds((v * seconds_per_unit) as i64))
            .collect())
    }

    /// (month, year) of the case snapshot, from its first time value.
    pub fn case_month_year(&self) -> Result<(u32, i32), VisError> {
        let times = self.valid_times()?;
        let t0 = times.first().ok_or(VisError::MissingTimeCoordinate)?;
        Ok((t0.month(), t0.year()))
    }

    fn missing_variable(&self, name: &str) -> VisError {
        VisError::MissingVariable {
            name: name.to_string(),
            dataset: self.label.clone(),
            available: self.data_vars(),
        }
    }

    /// Read a case variable as a 3D [level, lat, lon] snapshot, squeezing a
    /// leading time dimension (first index) when present.
    ///
    /// `wspd` and `wdir` are derived from `u` and `v` when not stored in
    /// the file.
    pub fn field3d(&self, name: &str) -> Result<GriddedField, VisError> {
        if self.file.variable(name).is_none() && (name == WSPD_VAR || name == WDIR_VAR) {
            let u = self.field3d(U_VAR)?;
            let v = self.field3d(V_VAR)?;
            let mut data = u.data.clone();
            let (long_name, units) = if name == WSPD_VAR {
                ndarray::Zip::from(&mut data)
                    .and(&v.data)
                    .for_each(|a, &b| *a = wind_speed(*a, b));
                ("Wind speed".to_string(), u.units.clone())
            } else {
                ndarray::Zip::from(&mut data)
                    .and(&v.data)
                    .for_each(|a, &b| *a = wind_direction(*a, b));
                ("Wind direction (from)".to_string(), "degrees".to_string())
            };
            return Ok(GriddedField {
                name: name.to_string(),
                long_name: Some(long_name),
                units,
                data,
                levels: u.levels,
                latitudes: u.latitudes,
                longitudes: u.longitudes,
            });
        }

        let var = self
            .file
            .variable(name)
            .ok_or_else(|| self.missing_variable(name))?;
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let levels = self.pressure_levels()?;
        let lats = self.latitudes()?;
        let lons = self.longitudes()?;
        let (nk, nj, ni) = (levels.len(), lats.len(), lons.len());

        // Expected layouts: [level, lat, lon] or [time, level, lat, lon],
        // plus an optional extra singleton (e.g. expver) squeezed at index 0.
        let values: Vec<f64> = match shape.len() {
            3 => var.get_values::<f64, _>((0..nk, 0..nj, 0..ni))?,
            4 => var.get_values::<f64, _>((0..1, 0..nk, 0..nj, 0..ni))?,
            5 => var.get_values::<f64, _>((0..1, 0..1, 0..nk, 0..nj, 0..ni))?,
            _ => return Err(VisError::UnexpectedShape(name.to_string(), shape)),
        };
        let data = Array3::from_shape_vec((nk, nj, ni), values)
            .map_err(|_| VisError::UnexpectedShape(name.to_string(), shape))?;

        Ok(GriddedField {
            name: name.to_string(),
            long_name: var_long_name(&var),
            units: attr_string(&var, "units").unwrap_or_default(),
            data,
            levels,
            latitudes: lats,
            longitudes: lons,
        })
    }

    /// Read a climatology variable at the given month (exact match on the
    /// month coordinate) as a 3D [level, lat, lon] snapshot.
    pub fn clim_field3d(&self, name: &str, month: u32) -> Result<GriddedField, VisError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| self.missing_variable(name))?;
        let months = self.months()?;
        let mi = months
            .iter()
            .position(|&m| m == month)
            .ok_or(VisError::MonthNotFound {
                month,
                available: months.clone(),
            })?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let levels = self.pressure_levels()?;
        let lats = self.latitudes()?;
        let lons = self.longitudes()?;
        let (nk, nj, ni) = (levels.len(), lats.len(), lons.len());

        let values: Vec<f64> = match shape.len() {
            4 => var.get_values::<f64, _>((mi..mi + 1, 0..nk, 0..nj, 0..ni))?,
            _ => return Err(VisError::UnexpectedShape(name.to_string(), shape)),
        };
        let data = Array3::from_shape_vec((nk, nj, ni), values)
            .map_err(|_| VisError::UnexpectedShape(name.to_string(), shape))?;

        Ok(GriddedField {
            name: name.to_string(),
            long_name: var_long_name(&var),
            units: attr_string(&var, "units").unwrap_or_default(),
            data,
            levels,
            latitudes: lats,
            longitudes: lons,
        })
    }

    /// Resolve a time selector to an index into the time axis.
    pub fn time_index(&self, time: &TimeSelector) -> Result<usize, VisError> {
        let times = self.valid_times()?;
        match time {
            TimeSelector::ByIndex(i) => {
                if *i >= times.len() {
                    Err(VisError::TimeIndexOutOfRange {
                        index: *i,
                        max: times.len().saturating_sub(1),
                    })
                } else {
                    Ok(*i)
                }
            }
            TimeSelector::ByLabel(label) => {
                let wanted = parse_time_label(label)?;
                times
                    .iter()
                    .position(|t| *t == wanted)
                    .ok_or_else(|| VisError::TimeNotFound {
                        time: label.clone(),
                        first: times.first().map(|t| t.to_string()).unwrap_or_default(),
                        last: times.last().map(|t| t.to_string()).unwrap_or_default(),
                    })
            }
        }
    }

    /// Extract a horizontal cross-section: one variable at one pressure
    /// level and one time, indexed by [latitude, longitude].
    pub fn horiz_cross_section(
        &self,
        param: &str,
        level: f64,
        time: &TimeSelector,
    ) -> Result<HorizontalField, VisError> {
        let var = self
            .file
            .variable(param)
            .ok_or_else(|| self.missing_variable(param))?;
        let levels = self.pressure_levels()?;
        let li = levels
            .iter()
            .position(|&l| l == level)
            .ok_or(VisError::LevelNotFound {
                level,
                available: levels.clone(),
            })?;
        let times = self.valid_times()?;
        let ti = self.time_index(time)?;

        let lats = self.latitudes()?;
        let lons = self.longitudes()?;
        let (nj, ni) = (lats.len(), lons.len());

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = match shape.len() {
            4 => var.get_values::<f64, _>((ti..ti + 1, li..li + 1, 0..nj, 0..ni))?,
            _ => return Err(VisError::UnexpectedShape(param.to_string(), shape)),
        };
        let data = Array2::from_shape_vec((nj, ni), values)
            .map_err(|_| VisError::UnexpectedShape(param.to_string(), shape))?;

        Ok(HorizontalField {
            name: param.to_string(),
            long_name: var_long_name(&var),
            units: attr_string(&var, "units").unwrap_or_default(),
            data,
            latitudes: lats,
            longitudes: lons,
            level: levels[li],
            time: times[ti],
        })
    }

    /// Vertical column of t, q, u, v at the grid point nearest to
    /// (lat, lon), for the sounding plot.
    pub fn profile_at(&self, lat: f64, lon: f64) -> Result<SoundingProfile, VisError> {
        let levels = self.pressure_levels()?;
        let lats = self.latitudes()?;
        let lons = self.longitudes()?;
        let j = nearest_index(&lats, lat);
        let i = nearest_index(&lons, lon);

        let mut columns = Vec::with_capacity(4);
        for name in ["t", "q", U_VAR, V_VAR] {
            let var = self
                .file
                .variable(name)
                .ok_or_else(|| self.missing_variable(name))?;
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            let nk = levels.len();
            let column: Vec<f64> = match shape.len() {
                4 => var.get_values::<f64, _>((0..1, 0..nk, j..j + 1, i..i + 1))?,
                3 => var.get_values::<f64, _>((0..nk, j..j + 1, i..i + 1))?,
                _ => return Err(VisError::UnexpectedShape(name.to_string(), shape)),
            };
            columns.push(column);
        }
        let v = columns.pop().unwrap_or_default();
        let u = columns.pop().unwrap_or_default();
        let q = columns.pop().unwrap_or_default();
        let t = columns.pop().unwrap_or_default();

        let times = self.valid_times()?;
        Ok(SoundingProfile {
            levels,
            temperature: t,
            specific_humidity: q,
            u,
            v,
            latitude: lats[j],
            longitude: lons[i],
            time: *times.first().ok_or(VisError::MissingTimeCoordinate)?,
        })
    }
}

/// Read a string attribute from a variable, if present.
fn attr_string(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// long_name, falling back to standard_name.
fn var_long_name(var: &netcdf::Variable) -> Option<String> {
    attr_string(var, "long_name").or_else(|| attr_string(var, "standard_name"))
}

/// Parse a CF time units string like "hours since 1900-01-01 00:00:00".
fn parse_time_units(units: &str) -> Result<(f64, DateTime<Utc>), VisError> {
    let mut parts = units.splitn(2, " since ");
    let unit = parts.next().unwrap_or("").trim();
    let base_str = parts.next().unwrap_or("1970-01-01").trim();

    let seconds_per_unit = match unit {
        "seconds" | "second" => 1.0,
        "minutes" | "minute" => 60.0,
        "hours" | "hour" => 3600.0,
        "days" | "day" => 86400.0,
        _ => 1.0,
    };

    let naive = NaiveDateTime::parse_from_str(base_str, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(base_str, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(base_str, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| VisError::DateTimeFormat(base_str.to_string()))?;

    Ok((seconds_per_unit, Utc.from_utc_datetime(&naive)))
}

/// Parse a CLI time label in the fixed YYYYmmddHHMM format.
pub fn parse_time_label(label: &str) -> Result<DateTime<Utc>, VisError> {
    let naive = NaiveDateTime::parse_from_str(label, "%Y%m%d%H%M")
        .map_err(|_| VisError::DateTimeFormat(label.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_units_hours() {
        let (scale, base) = parse_time_units("hours since 1900-01-01 00:00:00.0").unwrap();
        assert_eq!(scale, 3600.0);
        assert_eq!(base.year(), 1900);
    }

    #[test]
    fn test_parse_time_units_epoch_seconds() {
        let (scale, base) = parse_time_units("seconds since 1970-01-01").unwrap();
        assert_eq!(scale, 1.0);
        assert_eq!(base.timestamp(), 0);
    }

    #[test]
    fn test_parse_time_label() {
        let t = parse_time_label("202510011200").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2025, 10, 1));
        assert!(parse_time_label("2025-10-01").is_err());
    }
}
