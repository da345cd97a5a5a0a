//! Skew-T style sounding of the column at a point of interest: temperature
//! and dew point traces over dry adiabats, moist adiabats, and mixing-ratio
//! lines, with wind barbs along the right edge.

use chrono::Datelike;

use crate::config::Config;
use crate::data_io::{Era5Dataset, SoundingProfile};
use crate::error::VisError;
use crate::math::physics::{
    dewpoint_from_specific_humidity, dry_adiabat_temperature, saturation_mixing_ratio, wind_speed,
    EPSILON,
};

use super::{Canvas, Figure, BLACK, GREEN, GREY, MONTH_NAMES, RED};

const FIG_WIDTH: u32 = 760;
const FIG_HEIGHT: u32 = 860;
const MARGIN: i64 = 50;
/// Room reserved on the right for the wind barb column
const BARB_GUTTER: i64 = 60;

const T_MIN_C: f64 = -40.0;
const T_MAX_C: f64 = 45.0;
const P_TOP_HPA: f64 = 100.0;
const P_BOT_HPA: f64 = 1050.0;
/// Horizontal shift per decade of log-pressure, the "skew" of the diagram
const SKEW_FACTOR: f64 = 55.0;

/// Skewed log-p coordinates: y is proportional to ln(p), isotherms lean to
/// the right with height.
struct SkewGeom {
    px0: i64,
    py0: i64,
    px1: i64,
    py1: i64,
}

impl SkewGeom {
    fn p_to_py(&self, p_hpa: f64) -> i64 {
        let t = (p_hpa.ln() - P_TOP_HPA.ln()) / (P_BOT_HPA.ln() - P_TOP_HPA.ln());
        self.py0 + (t * (self.py1 - self.py0) as f64).round() as i64
    }

    fn t_to_px(&self, t_c: f64, p_hpa: f64) -> i64 {
        let base = (t_c - T_MIN_C) / (T_MAX_C - T_MIN_C);
        let skew = (P_BOT_HPA.ln() - p_hpa.ln()) / std::f64::consts::LN_10 * SKEW_FACTOR;
        self.px0 + (base * (self.px1 - self.px0) as f64 + skew).round() as i64
    }

    fn contains(&self, px: i64, py: i64) -> bool {
        px >= self.px0 && px <= self.px1 && py >= self.py0 && py <= self.py1
    }
}

/// Plot the sounding at the grid point nearest to (lat, lon), from the
/// first time step of the case file. Writes the PNG into the configured
/// PNG directory and returns the bare file name.
pub fn plot_sounding(config: &Config, lat_pt: f64, lon_pt: f64) -> Result<String, VisError> {
    config.validate()?;
    let ds = Era5Dataset::open_labeled(&config.datafile, "case file")?;
    let profile = ds.profile_at(lat_pt, lon_pt)?;

    let geom = SkewGeom {
        px0: MARGIN,
        py0: MARGIN,
        px1: FIG_WIDTH as i64 - MARGIN - BARB_GUTTER,
        py1: FIG_HEIGHT as i64 - MARGIN,
    };
    let mut canvas = Canvas::new(FIG_WIDTH, FIG_HEIGHT);

    draw_background(&mut canvas, &geom);
    draw_traces(&mut canvas, &geom, &profile);
    draw_barbs(&mut canvas, &geom, &profile);
    canvas.rect_outline(geom.px0, geom.py0, geom.px1, geom.py1, BLACK);

    let month_name = MONTH_NAMES[(profile.time.month() as usize - 1).min(11)];
    let title = format!(
        "Sounding at {}, {} \u{2022} {}",
        profile.longitude,
        profile.latitude,
        profile.time.format("%d %b %Y %H:%M")
    );

    let fname = format!(
        "ERA5_sounding_{},{}{} {}.png",
        lon_pt,
        lat_pt,
        month_name,
        profile.time.format("%Y")
    );
    let path = config.png_dir.join(&fname);
    let figure = Figure { canvas, title };
    figure.save(&path)?;
    println!("Plot saved to: {}", path.display());
    Ok(fname)
}

/// Reference lines: isobars, dry adiabats, moist adiabats, and
/// mixing-ratio lines, all in light grey.
fn draw_background(canvas: &mut Canvas, geom: &SkewGeom) {
    for p in [1000.0, 925.0, 850.0, 700.0, 500.0, 400.0, 300.0, 250.0, 200.0, 150.0, 100.0] {
        let py = geom.p_to_py(p);
        canvas.dotted_line(geom.px0, py, geom.px1, py, GREY);
    }

    // Dry adiabats, theta from 233 K to 533 K every 10 K
    let mut theta = 233.0;
    while theta <= 533.0 {
        draw_curve(canvas, geom, |p| dry_adiabat_temperature(theta, p));
        theta += 10.0;
    }

    // Mixing-ratio lines (g/kg), dew point of constant w with pressure
    for w_gkg in [0.5, 1.0, 2.0, 4.0, 7.0, 10.0, 16.0, 24.0, 32.0] {
        let w = w_gkg / 1000.0;
        draw_curve(canvas, geom, |p| {
            // invert w_s(T, p): e = w p / (eps + w), then Magnus inversion
            let e = w * p / (EPSILON + w);
            let ln_ratio = (e / 6.112).ln();
            243.5 * ln_ratio / (17.67 - ln_ratio)
        });
    }

    // Moist adiabats by stepwise pseudoadiabatic descent from 100 hPa
    let mut t0 = 233.0;
    while t0 <= 400.0 {
        draw_moist_adiabat(canvas, geom, t0);
        t0 += 5.0;
    }
}

/// Draw T(p) from the bottom to the top of the diagram.
fn draw_curve(canvas: &mut Canvas, geom: &SkewGeom, temperature_at: impl Fn(f64) -> f64) {
    let mut last: Option<(i64, i64)> = None;
    let mut p = P_BOT_HPA;
    while p >= P_TOP_HPA {
        let t = temperature_at(p);
        let px = geom.t_to_px(t, p);
        let py = geom.p_to_py(p);
        if geom.contains(px, py) {
            if let Some((lx, ly)) = last {
                canvas.line(lx, ly, px, py, GREY);
            }
            last = Some((px, py));
        } else {
            last = None;
        }
        p -= 10.0;
    }
}

/// Pseudoadiabat through temperature `t0_k` at 1000 hPa, integrated upward
/// in 10 hPa steps with the saturated lapse approximation
/// dT/dp = (Rd T + Lv w_s) / (cp + Lv² w_s eps / (Rd T²)) / p.
fn draw_moist_adiabat(canvas: &mut Canvas, geom: &SkewGeom, t0_k: f64) {
    const RD: f64 = 287.04;
    const CP: f64 = 1005.7;
    const LV: f64 = 2.501e6;

    let mut t_k = t0_k;
    let mut p = 1000.0;
    let mut last: Option<(i64, i64)> = None;
    while p >= P_TOP_HPA {
        let px = geom.t_to_px(t_k - 273.15, p);
        let py = geom.p_to_py(p);
        if geom.contains(px, py) {
            if let Some((lx, ly)) = last {
                canvas.line(lx, ly, px, py, GREY);
            }
            last = Some((px, py));
        } else {
            last = None;
        }

        let ws = saturation_mixing_ratio(t_k - 273.15, p).max(0.0);
        let numer = RD * t_k + LV * ws;
        let denom = CP + LV * LV * ws * EPSILON / (RD * t_k * t_k);
        let dp = 10.0;
        t_k -= numer / denom * dp / p;
        p -= dp;
    }
}

/// Temperature (red) and dew point (green) traces.
fn draw_traces(canvas: &mut Canvas, geom: &SkewGeom, profile: &SoundingProfile) {
    let mut last_t: Option<(i64, i64)> = None;
    let mut last_td: Option<(i64, i64)> = None;
    for (k, &p) in profile.levels.iter().enumerate() {
        let t_c = profile.temperature[k] - 273.15;
        let td_c = dewpoint_from_specific_humidity(profile.specific_humidity[k], p);
        let py = geom.p_to_py(p);

        let px = geom.t_to_px(t_c, p);
        if let Some((lx, ly)) = last_t {
            canvas.line(lx, ly, px, py, RED);
        }
        last_t = Some((px, py));

        let px = geom.t_to_px(td_c, p);
        if let Some((lx, ly)) = last_td {
            canvas.line(lx, ly, px, py, GREEN);
        }
        last_td = Some((px, py));
    }
}

/// Wind barbs in the right gutter, one per level. Speeds are in knots:
/// pennant = 50, full barb = 10, half barb = 5.
fn draw_barbs(canvas: &mut Canvas, geom: &SkewGeom, profile: &SoundingProfile) {
    const MS_TO_KT: f64 = 1.943_844;
    let cx = geom.px1 + BARB_GUTTER / 2;

    for (k, &p) in profile.levels.iter().enumerate() {
        let u = profile.u[k];
        let v = profile.v[k];
        if !u.is_finite() || !v.is_finite() {
            continue;
        }
        let py = geom.p_to_py(p);
        let speed_kt = wind_speed(u, v) * MS_TO_KT;

        // Shaft points into the wind (toward where it comes from)
        let spd = wind_speed(u, v);
        let (ux, uy) = if spd > 0.01 {
            (-u / spd, v / spd)
        } else {
            (0.0, -1.0)
        };
        let shaft = 18.0;
        let tip = (
            cx + (ux * shaft).round() as i64,
            py + (uy * shaft).round() as i64,
        );
        canvas.line(cx, py, tip.0, tip.1, BLACK);

        // Flag perpendicular, on the left of the shaft
        let (fx, fy) = (uy, -ux);
        let mut remaining = speed_kt.round();
        let mut along = 1.0;
        let step = 0.18;
        let mut tick = |canvas: &mut Canvas, len: f64, along: f64| {
            let bx = cx as f64 + ux * shaft * along;
            let by = py as f64 + uy * shaft * along;
            canvas.line(
                bx.round() as i64,
                by.round() as i64,
                (bx + fx * len).round() as i64,
                (by + fy * len).round() as i64,
                BLACK,
            );
        };
        while remaining >= 50.0 {
            tick(canvas, 9.0, along);
            along -= step;
            remaining -= 50.0;
        }
        while remaining >= 10.0 {
            tick(canvas, 8.0, along);
            along -= step;
            remaining -= 10.0;
        }
        if remaining >= 5.0 {
            tick(canvas, 4.0, along);
        }
    }
}
