//! Display-mode resolution, case/climatology alignment, and color scaling.

use std::str::FromStr;

use crate::data_io::{GriddedField, WSPD_VAR};
use crate::error::VisError;

/// What gets shaded in a plot: the case field, the climatological mean for
/// the case month, or their difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Case,
    Climatology,
    Anomaly,
}

impl DisplayMode {
    /// Uppercase label used in figure titles.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Case => "CASE",
            DisplayMode::Climatology => "CLIM",
            DisplayMode::Anomaly => "ANOMALY",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "case" => Ok(DisplayMode::Case),
            "clim" => Ok(DisplayMode::Climatology),
            "anomaly" => Ok(DisplayMode::Anomaly),
            other => Err(VisError::InvalidDisplayMode(other.to_string())),
        }
    }
}

/// Behavioral rule, not a fallback: a wind-speed anomaly is not meaningful
/// for this tool's purpose, so requesting `Anomaly` for `wspd` plots the
/// case wind speed instead. Every other combination passes through.
pub fn resolve_display_mode(var: &str, requested: DisplayMode) -> DisplayMode {
    if requested == DisplayMode::Anomaly && var == WSPD_VAR {
        DisplayMode::Case
    } else {
        requested
    }
}

/// Case minus climatology, aligned on identical coordinates.
///
/// Alignment is exact: any coordinate mismatch between the two grids is a
/// fatal error, never silently coerced or subset.
pub fn anomaly_field(case: &GriddedField, clim: &GriddedField) -> Result<GriddedField, VisError> {
    align_exact(case, clim)?;
    let data = &case.data - &clim.data;
    Ok(GriddedField {
        name: case.name.clone(),
        long_name: case.long_name.clone().or_else(|| clim.long_name.clone()),
        units: if case.units.is_empty() {
            clim.units.clone()
        } else {
            case.units.clone()
        },
        data,
        levels: case.levels.clone(),
        latitudes: case.latitudes.clone(),
        longitudes: case.longitudes.clone(),
    })
}

fn align_exact(case: &GriddedField, clim: &GriddedField) -> Result<(), VisError> {
    let axes: [(&str, &[f64], &[f64]); 3] = [
        ("pressure_level", &case.levels, &clim.levels),
        ("latitude", &case.latitudes, &clim.latitudes),
        ("longitude", &case.longitudes, &clim.longitudes),
    ];
    for (axis, a, b) in axes {
        if a != b {
            return Err(VisError::AlignmentMismatch {
                axis: axis.to_string(),
            });
        }
    }
    Ok(())
}

/// Color palette families for filled contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Blue-to-red diverging, for anomalies
    Diverging,
    /// Blues, for wind speed
    WindSpeed,
    /// Viridis, default for case/climatology fields
    Sequential,
    /// Greys, for the geopotential background
    Greys,
}

impl Palette {
    /// Evaluate the palette at t in [0, 1].
    pub fn eval(&self, t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);
        let c = match self {
            // RED_BLUE runs red -> blue; anomalies are drawn cold -> warm
            Palette::Diverging => colorous::RED_BLUE.eval_continuous(1.0 - t),
            Palette::WindSpeed => colorous::BLUES.eval_continuous(t),
            Palette::Sequential => colorous::VIRIDIS.eval_continuous(t),
            Palette::Greys => colorous::GREYS.eval_continuous(t),
        };
        (c.r, c.g, c.b)
    }
}

/// Value-to-color mapping for a plot.
#[derive(Debug, Clone)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
    pub palette: Palette,
}

impl ColorScale {
    /// Scale for a resolved display mode:
    /// anomaly -> symmetric about zero at max(|min|, |max|), diverging;
    /// case/clim -> zero-based up to the field maximum, Blues for wind
    /// speed and Viridis otherwise.
    pub fn for_mode(mode: DisplayMode, var: &str, field: &GriddedField) -> Self {
        let (min, max) = field.min_max();
        match mode {
            DisplayMode::Anomaly => {
                let vmax = min.abs().max(max.abs());
                Self {
                    vmin: -vmax,
                    vmax,
                    palette: Palette::Diverging,
                }
            }
            _ => Self {
                vmin: 0.0,
                vmax: max,
                palette: if var == WSPD_VAR {
                    Palette::WindSpeed
                } else {
                    Palette::Sequential
                },
            },
        }
    }

    /// Normalized position of a value on the scale, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return 0.5;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    /// Discrete band index for contourf-style filled levels.
    pub fn band(&self, value: f64, nlevels: usize) -> usize {
        let t = self.normalize(value);
        ((t * nlevels as f64) as usize).min(nlevels - 1)
    }

    /// Color of a value, quantized to nlevels filled bands.
    pub fn color(&self, value: f64, nlevels: usize) -> (u8, u8, u8) {
        let band = self.band(value, nlevels);
        let t = (band as f64 + 0.5) / nlevels as f64;
        self.palette.eval(t)
    }
}
