//! Horizontal (map-view) plots: a single-level field snapshot and the
//! monthly anomaly map with a marked point of interest.

use std::path::Path;

use ndarray::Array2;

use crate::anomaly::{ColorScale, Palette};
use crate::config::Config;
use crate::data_io::availability::check_dataset_availability;
use crate::data_io::{Era5Dataset, HorizontalField, TimeSelector, GEO_VAR};
use crate::error::VisError;
use crate::math::interpolate::bilinear;
use crate::math::physics::G0;

use super::{Canvas, Figure, BLACK, GREY, MONTH_NAMES, NLEVELS_FILL, NLEVELS_GEO, RED};

const FIG_WIDTH: u32 = 960;
const FIG_HEIGHT: u32 = 640;
const MARGIN: i64 = 40;

/// Anomaly map extent, matching the download region:
/// longitude from 55°W to 35°E, latitude from 35°N to 90°N.
pub const MAP_LON_MIN: f64 = -55.0;
pub const MAP_LON_MAX: f64 = 35.0;
pub const MAP_LAT_MIN: f64 = 35.0;
pub const MAP_LAT_MAX: f64 = 90.0;

/// Map-view pixel geometry, north at the top.
struct MapGeom {
    px0: i64,
    py0: i64,
    px1: i64,
    py1: i64,
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

impl MapGeom {
    fn lon_to_px(&self, lon: f64) -> i64 {
        let t = (lon - self.lon_min) / (self.lon_max - self.lon_min);
        self.px0 + (t * (self.px1 - self.px0) as f64).round() as i64
    }

    fn lat_to_py(&self, lat: f64) -> i64 {
        let t = (self.lat_max - lat) / (self.lat_max - self.lat_min);
        self.py0 + (t * (self.py1 - self.py0) as f64).round() as i64
    }
}

/// Render a single-level horizontal field as a filled map.
///
/// Saved to `filepath` if given; the figure is returned either way.
pub fn plot_horiz_cross_section(
    field: &HorizontalField,
    filepath: Option<&Path>,
) -> Result<Figure, VisError> {
    let (min, max) = field.min_max();
    let scale = ColorScale {
        vmin: min,
        vmax: max,
        palette: Palette::Sequential,
    };

    let geom = full_extent_geom(field);
    let mut canvas = Canvas::new(FIG_WIDTH, FIG_HEIGHT);
    shade_map(&mut canvas, &geom, field, &scale, None);
    canvas.rect_outline(geom.px0, geom.py0, geom.px1, geom.py1, BLACK);

    let title = format!(
        "{} at {} hPa ({})",
        field.pretty_name(),
        format_level(field.level),
        field.time.format("%d %b %Y %H:%M")
    );
    let figure = Figure { canvas, title };
    if let Some(path) = filepath {
        figure.save(path)?;
    }
    Ok(figure)
}

/// Monthly anomaly map for one parameter and level, with geopotential
/// height contours and a marker at the point of interest.
///
/// Writes the PNG into the configured PNG directory and returns the bare
/// file name for embedding into HTML.
pub fn plot_map_anomaly(
    config: &Config,
    param: &str,
    level: f64,
    lat_pt: f64,
    lon_pt: f64,
) -> Result<String, VisError> {
    config.validate()?;
    let case = Era5Dataset::open_labeled(&config.datafile, "case file")?;
    let clim = Era5Dataset::open_labeled(&config.climfile, "climatology file")?;
    let (month, year) = case.case_month_year()?;

    check_dataset_availability(&case, param, Some(level), None)?;

    let case_field = case.horiz_cross_section(param, level, &TimeSelector::ByIndex(0))?;
    let clim_slice = clim_level_slice(&clim, param, month, level, &case_field)?;

    let mut anomaly = case_field.clone();
    anomaly.data = &case_field.data - &clim_slice;

    let (min, max) = anomaly.min_max();
    let vmax = min.abs().max(max.abs());
    let scale = ColorScale {
        vmin: -vmax,
        vmax,
        palette: Palette::Diverging,
    };

    // Case geopotential height in decameters for the contour overlay
    let mut geo = case.horiz_cross_section(GEO_VAR, level, &TimeSelector::ByIndex(0))?;
    geo.data.mapv_inplace(|v| v / (G0 * 10.0));
    let (gmin, gmax) = geo.min_max();
    let geo_scale = ColorScale {
        vmin: gmin,
        vmax: gmax,
        palette: Palette::Greys,
    };

    let geom = MapGeom {
        px0: MARGIN,
        py0: MARGIN,
        px1: FIG_WIDTH as i64 - MARGIN,
        py1: FIG_HEIGHT as i64 - MARGIN,
        lon_min: MAP_LON_MIN,
        lon_max: MAP_LON_MAX,
        lat_min: MAP_LAT_MIN,
        lat_max: MAP_LAT_MAX,
    };
    let mut canvas = Canvas::new(FIG_WIDTH, FIG_HEIGHT);
    shade_map(&mut canvas, &geom, &anomaly, &scale, Some((&geo, &geo_scale)));

    // Crosshair through the point of interest, then the point itself
    let px = geom.lon_to_px(lon_pt);
    let py = geom.lat_to_py(lat_pt);
    canvas.dotted_line(geom.px0, py, geom.px1, py, BLACK);
    canvas.dotted_line(px, geom.py0, px, geom.py1, BLACK);
    canvas.disc(px, py, 4, RED);
    canvas.rect_outline(geom.px0, geom.py0, geom.px1, geom.py1, BLACK);

    let month_name = MONTH_NAMES[(month as usize - 1).min(11)];
    let title = format!(
        "ANOMALY \u{2022} {} {} \u{2022} Model climate {} \u{2022} {} at {} hPa",
        month_name,
        year,
        config.clim_ref_period,
        anomaly.pretty_name(),
        format_level(level)
    );

    let fname = format!(
        "ERA5_{}_{}hPa_{} {}.png",
        param,
        format_level(level),
        month_name,
        year
    );
    let path = config.png_dir.join(&fname);
    let figure = Figure { canvas, title };
    figure.save(&path)?;
    println!("Plot saved to: {}", path.display());
    Ok(fname)
}

/// Slice the climatology at the case month and requested level, checking
/// that the horizontal grids match exactly.
fn clim_level_slice(
    clim: &Era5Dataset,
    param: &str,
    month: u32,
    level: f64,
    case_field: &HorizontalField,
) -> Result<Array2<f64>, VisError> {
    let clim_field = clim.clim_field3d(param, month)?;
    let li = clim_field
        .levels
        .iter()
        .position(|&l| l == level)
        .ok_or(VisError::LevelNotFound {
            level,
            available: clim_field.levels.clone(),
        })?;
    if clim_field.latitudes != case_field.latitudes {
        return Err(VisError::AlignmentMismatch {
            axis: "latitude".to_string(),
        });
    }
    if clim_field.longitudes != case_field.longitudes {
        return Err(VisError::AlignmentMismatch {
            axis: "longitude".to_string(),
        });
    }
    Ok(clim_field.data.index_axis(ndarray::Axis(0), li).to_owned())
}

fn full_extent_geom(field: &HorizontalField) -> MapGeom {
    let lon_min = field.longitudes.iter().cloned().fold(f64::INFINITY, f64::min);
    let lon_max = field.longitudes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lat_min = field.latitudes.iter().cloned().fold(f64::INFINITY, f64::min);
    let lat_max = field.latitudes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    MapGeom {
        px0: MARGIN,
        py0: MARGIN,
        px1: FIG_WIDTH as i64 - MARGIN,
        py1: FIG_HEIGHT as i64 - MARGIN,
        lon_min,
        lon_max,
        lat_min,
        lat_max,
    }
}

/// Filled field bands, with optional contour lines drawn at the band
/// boundaries of a second field.
fn shade_map(
    canvas: &mut Canvas,
    geom: &MapGeom,
    field: &HorizontalField,
    scale: &ColorScale,
    contours: Option<(&HorizontalField, &ColorScale)>,
) {
    let nx = (geom.px1 - geom.px0) as usize;
    let ny = (geom.py1 - geom.py0) as usize;
    let mut bands = Array2::<usize>::zeros((ny + 1, nx + 1));

    for py in 0..=ny {
        let lat = geom.lat_max - (geom.lat_max - geom.lat_min) * py as f64 / ny as f64;
        for px in 0..=nx {
            let lon = geom.lon_min + (geom.lon_max - geom.lon_min) * px as f64 / nx as f64;
            let value = bilinear(&field.data, &field.latitudes, &field.longitudes, lat, lon);
            let color = scale.color(value, NLEVELS_FILL);
            canvas.set(geom.px0 + px as i64, geom.py0 + py as i64, color);
            if let Some((geo, geo_scale)) = contours {
                let gv = bilinear(&geo.data, &geo.latitudes, &geo.longitudes, lat, lon);
                bands[[py, px]] = geo_scale.band(gv, NLEVELS_GEO);
            }
        }
    }

    if contours.is_some() {
        for py in 1..=ny {
            for px in 1..=nx {
                let b = bands[[py, px]];
                if b != bands[[py - 1, px]] || b != bands[[py, px - 1]] {
                    canvas.set(geom.px0 + px as i64, geom.py0 + py as i64, GREY);
                }
            }
        }
    }
}

/// Pressure levels are whole hPa in practice; print them without a
/// trailing ".0".
pub(crate) fn format_level(level: f64) -> String {
    if level.fract() == 0.0 {
        format!("{}", level as i64)
    } else {
        format!("{}", level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> HorizontalField {
        HorizontalField {
            name: "t".to_string(),
            long_name: Some("Temperature".to_string()),
            units: "K".to_string(),
            data: Array2::from_elem((3, 4), 275.0),
            latitudes: vec![50.0, 49.0, 48.0],
            longitudes: vec![10.0, 11.0, 12.0, 13.0],
            level: 850.0,
            time: Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_horizontal_plot_title() {
        let figure = plot_horiz_cross_section(&sample(), None).unwrap();
        assert_eq!(figure.title, "Temperature at 850 hPa (01 Oct 2025 00:00)");
    }

    #[test]
    fn test_format_level_drops_fraction() {
        assert_eq!(format_level(850.0), "850");
        assert_eq!(format_level(912.5), "912.5");
    }

    #[test]
    fn test_map_geom_north_up() {
        let geom = MapGeom {
            px0: 0,
            py0: 0,
            px1: 100,
            py1: 100,
            lon_min: MAP_LON_MIN,
            lon_max: MAP_LON_MAX,
            lat_min: MAP_LAT_MIN,
            lat_max: MAP_LAT_MAX,
        };
        assert_eq!(geom.lat_to_py(MAP_LAT_MAX), 0);
        assert_eq!(geom.lat_to_py(MAP_LAT_MIN), 100);
        assert_eq!(geom.lon_to_px(MAP_LON_MIN), 0);
    }
}
