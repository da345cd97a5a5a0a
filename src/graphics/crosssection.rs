//! Vertical cross-section figure: two stacked panels (W–E and S–N) through
//! a chosen point, shaded by the selected display mode, with climatological
//! geopotential height contours and optional terrain and wind arrows.

use std::path::Path;

use ndarray::Array2;

use crate::anomaly::{anomaly_field, resolve_display_mode, ColorScale, DisplayMode, Palette};
use crate::config::Config;
use crate::data_io::availability::check_dataset_availability;
use crate::data_io::{CrossSection, Era5Dataset, GriddedField, GEO_VAR, U_VAR, V_VAR, WSPD_VAR, W_VAR};
use crate::error::VisError;
use crate::math::interpolate::bilinear;
use crate::math::physics::G0;
use crate::terrain::{load_terrain_lines, TerrainProfile};

use super::{
    Canvas, Figure, PanelGeom, BLACK, GREY, MONTH_NAMES, NLEVELS_FILL, NLEVELS_GEO, QUIVER_SCALE,
    QUIVER_X_SKIP, QUIVER_Y_SKIP, WHITE, W_EXAG,
};

const FIG_WIDTH: u32 = 960;
const FIG_HEIGHT: u32 = 760;
const MARGIN: i64 = 50;
const PANEL_GAP: i64 = 40;

/// Build the full cross-section figure.
///
/// `field` is the requested display mode; wind speed silently falls back to
/// the case field when an anomaly is requested. The sections pass through
/// the grid point nearest to (lat, lon). Saved to `savepath` if given.
pub fn plot_crosssection(
    config: &Config,
    var: &str,
    lat: f64,
    lon: f64,
    field: DisplayMode,
    terrainfile: Option<&Path>,
    savepath: Option<&Path>,
) -> Result<Figure, VisError> {
    config.validate()?;
    let case = Era5Dataset::open_labeled(&config.datafile, "case file")?;
    let clim = Era5Dataset::open_labeled(&config.climfile, "climatology file")?;
    let (month, year) = case.case_month_year()?;

    let mode = resolve_display_mode(var, field);

    // Availability is checked against whichever files the mode reads
    if mode != DisplayMode::Climatology {
        check_dataset_availability(&case, var, None, None)?;
    }
    if mode != DisplayMode::Case {
        check_dataset_availability(&clim, var, None, None)?;
    }

    let shaded = match mode {
        DisplayMode::Case => case.field3d(var)?,
        DisplayMode::Climatology => clim.clim_field3d(var, month)?,
        DisplayMode::Anomaly => {
            let case_field = case.field3d(var)?;
            let clim_field = clim.clim_field3d(var, month)?;
            anomaly_field(&case_field, &clim_field)?
        }
    };

    // Climatological geopotential height (m) as the contour background
    let mut geo = clim.clim_field3d(GEO_VAR, month)?;
    geo.data.mapv_inplace(|v| v / G0);

    let scale = ColorScale::for_mode(mode, var, &shaded);

    let we = shaded.section_at_latitude(lat);
    let sn = shaded.section_at_longitude(lon);
    let geo_we = geo.section_at_latitude(lat);
    let geo_sn = geo.section_at_longitude(lon);
    let geo_scale = geo_section_scale(&geo_we, &geo_sn);

    // Wind-speed plots overlay in-plane arrows from the case snapshot
    let arrows = if var == WSPD_VAR {
        let u = case.field3d(U_VAR)?;
        let v = case.field3d(V_VAR)?;
        let w = case.field3d(W_VAR)?;
        Some(SectionWinds {
            we_h: u.section_at_latitude(lat),
            we_w: w.section_at_latitude(lat),
            sn_h: v.section_at_longitude(lon),
            sn_w: w.section_at_longitude(lon),
        })
    } else {
        None
    };

    let terrain = match terrainfile {
        Some(path) => Some(load_terrain_lines(path, we.fixed_coord, sn.fixed_coord)?),
        None => None,
    };

    let mut canvas = Canvas::new(FIG_WIDTH, FIG_HEIGHT);
    let panel_h = (FIG_HEIGHT as i64 - 2 * MARGIN - PANEL_GAP) / 2;
    let top = PanelGeom::new(
        MARGIN,
        MARGIN,
        FIG_WIDTH as i64 - MARGIN,
        MARGIN + panel_h,
        &we.x,
        &we.levels,
    );
    let bottom = PanelGeom::new(
        MARGIN,
        MARGIN + panel_h + PANEL_GAP,
        FIG_WIDTH as i64 - MARGIN,
        MARGIN + 2 * panel_h + PANEL_GAP,
        &sn.x,
        &sn.levels,
    );

    draw_section(&mut canvas, &top, &we, &scale, &geo_we, &geo_scale);
    draw_section(&mut canvas, &bottom, &sn, &scale, &geo_sn, &geo_scale);

    if let Some(winds) = &arrows {
        draw_arrows(&mut canvas, &top, &winds.we_h, &winds.we_w);
        draw_arrows(&mut canvas, &bottom, &winds.sn_h, &winds.sn_w);
    }

    if let Some((west_east, south_north)) = &terrain {
        draw_terrain(&mut canvas, &top, west_east);
        draw_terrain(&mut canvas, &bottom, south_north);
    }

    canvas.rect_outline(top.px0, top.py0, top.px1, top.py1, BLACK);
    canvas.rect_outline(bottom.px0, bottom.py0, bottom.px1, bottom.py1, BLACK);

    let title = section_title(mode, month, year, &config.clim_ref_period, &shaded);
    let figure = Figure { canvas, title };
    if let Some(path) = savepath {
        figure.save(path)?;
    }
    Ok(figure)
}

struct SectionWinds {
    we_h: CrossSection,
    we_w: CrossSection,
    sn_h: CrossSection,
    sn_w: CrossSection,
}

/// Title segments joined with " \u{2022} ": mode, the time it represents,
/// the climate reference (except for pure case plots), and the variable.
fn section_title(
    mode: DisplayMode,
    month: u32,
    year: i32,
    clim_ref_period: &str,
    field: &GriddedField,
) -> String {
    let month_name = MONTH_NAMES[(month as usize - 1).min(11)];
    let when = match mode {
        DisplayMode::Climatology => month_name.to_string(),
        _ => format!("{} {}", month_name, year),
    };
    let mut parts = vec![mode.label().to_string(), when];
    if mode != DisplayMode::Case {
        parts.push(format!("Model climate {}", clim_ref_period));
    }
    parts.push(field.pretty_name());
    parts.join(" \u{2022} ")
}

/// One shared contour scale for both geopotential sections so the line
/// spacing matches between panels.
fn geo_section_scale(a: &CrossSection, b: &CrossSection) -> ColorScale {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in a.data.iter().chain(b.data.iter()) {
        if v.is_finite() {
            min = min.min(*v);
            max = max.max(*v);
        }
    }
    ColorScale {
        vmin: min,
        vmax: max,
        palette: Palette::Greys,
    }
}

/// Filled bands for the shaded field with geopotential contour lines on
/// top, drawn at the band boundaries of the geopotential section.
fn draw_section(
    canvas: &mut Canvas,
    geom: &PanelGeom,
    section: &CrossSection,
    scale: &ColorScale,
    geo: &CrossSection,
    geo_scale: &ColorScale,
) {
    let nx = (geom.px1 - geom.px0) as usize;
    let ny = (geom.py1 - geom.py0) as usize;
    let mut geo_bands = Array2::<usize>::zeros((ny + 1, nx + 1));

    for py in 0..=ny {
        let p = geom.p_min + (geom.p_max - geom.p_min) * py as f64 / ny as f64;
        for px in 0..=nx {
            let x = geom.x_min + (geom.x_max - geom.x_min) * px as f64 / nx as f64;
            let value = bilinear(&section.data, &section.levels, &section.x, p, x);
            let color = scale.color(value, NLEVELS_FILL);
            canvas.set(geom.px0 + px as i64, geom.py0 + py as i64, color);

            let gv = bilinear(&geo.data, &geo.levels, &geo.x, p, x);
            geo_bands[[py, px]] = geo_scale.band(gv, NLEVELS_GEO);
        }
    }

    // Contour lines fall where the quantized band index changes
    for py in 1..=ny {
        for px in 1..=nx {
            let b = geo_bands[[py, px]];
            if b != geo_bands[[py - 1, px]] || b != geo_bands[[py, px - 1]] {
                canvas.set(geom.px0 + px as i64, geom.py0 + py as i64, GREY);
            }
        }
    }
}

/// In-plane wind arrows at thinned grid points. The vertical velocity is in
/// Pa/s; dividing by 100 gives hPa/s on the pressure axis, exaggerated so
/// the arrows have a visible tilt.
fn draw_arrows(canvas: &mut Canvas, geom: &PanelGeom, horiz: &CrossSection, vert: &CrossSection) {
    let (nk, nx) = horiz.data.dim();
    for k in (0..nk).step_by(QUIVER_Y_SKIP) {
        for i in (0..nx).step_by(QUIVER_X_SKIP) {
            let h = horiz.data[[k, i]];
            let w = vert.data[[k, i]];
            if !h.is_finite() || !w.is_finite() {
                continue;
            }
            let x0 = geom.x_to_px(horiz.x[i]);
            let y0 = geom.p_to_py(horiz.levels[k]);
            let dx = (h * QUIVER_SCALE).round() as i64;
            let dy = (w / 100.0 * W_EXAG * QUIVER_SCALE).round() as i64;
            canvas.arrow(x0, y0, x0 + dx, y0 + dy, BLACK);
        }
    }
}

/// Everything physically below the surface (pressure greater than the
/// terrain pressure) is masked white, with the surface itself outlined.
fn draw_terrain(canvas: &mut Canvas, geom: &PanelGeom, profile: &TerrainProfile) {
    let nx = (geom.px1 - geom.px0) as usize;
    let mut surface = Vec::with_capacity(nx + 1);
    for px in 0..=nx {
        let x = geom.x_min + (geom.x_max - geom.x_min) * px as f64 / nx as f64;
        let p_surf = crate::math::interpolate::linear(&profile.pressure_hpa, &profile.x, x);
        let py = geom.p_to_py(p_surf.min(geom.p_max));
        canvas.fill_rect(geom.px0 + px as i64, py, geom.px0 + px as i64, geom.py1, WHITE);
        surface.push(py);
    }
    for px in 1..=nx {
        canvas.line(
            geom.px0 + (px - 1) as i64,
            surface[px - 1],
            geom.px0 + px as i64,
            surface[px],
            BLACK,
        );
    }
}
