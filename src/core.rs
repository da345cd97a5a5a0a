//! The end-to-end workflows the command-line tools drive: extract, plot,
//! and wrap the result in an HTML page.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::data_io::{check_data_availability, Era5Dataset, TimeSelector};
use crate::error::VisError;
use crate::graphics::horizontal::{format_level, plot_horiz_cross_section, plot_map_anomaly};
use crate::graphics::sounding::plot_sounding;
use crate::graphics::MONTH_NAMES;
use crate::html::{build_html, mkdir, render_page};

/// Extract a horizontal cross-section, plot it, and write an index.html
/// around it. Returns the path of the written page.
///
/// The target `directory` defaults to the configured HTML directory; the
/// PNG is written next to the page so the image reference stays relative.
pub fn write_html(
    config: &Config,
    param: &str,
    level: f64,
    time: &TimeSelector,
    directory: Option<&Path>,
) -> Result<PathBuf, VisError> {
    check_data_availability(config, param, Some(level), Some(time))?;

    let directory = directory.unwrap_or(&config.html_dir);
    mkdir(directory)?;

    println!("Extracting horizontal cross-section");
    let ds = Era5Dataset::open_labeled(&config.datafile, "case file")?;
    let field = ds.horiz_cross_section(param, level, time)?;

    println!("Plotting data");
    let img_name = format!("era5_{}_level{}.png", param, format_level(level));
    let png_path = directory.join(&img_name);
    plot_horiz_cross_section(&field, Some(png_path.as_path()))?;

    render_page(directory, "Horizontal cross-section", param, &img_name)
}

/// Build the combined monthly-anomaly-map + sounding page for a point of
/// interest. Returns the path of the written page.
pub fn write_anomaly_sounding_page(
    config: &Config,
    param: &str,
    level: f64,
    lat: f64,
    lon: f64,
) -> Result<PathBuf, VisError> {
    check_data_availability(config, param, Some(level), None)?;

    let map_png = plot_map_anomaly(config, param, level, lat, lon)?;
    let sounding_png = plot_sounding(config, lat, lon)?;

    let ds = Era5Dataset::open_labeled(&config.datafile, "case file")?;
    let (month, year) = ds.case_month_year()?;
    let date = format!("{} {}", MONTH_NAMES[(month as usize - 1).min(11)], year);

    build_html(&config.html_dir, &map_png, &sounding_png, &date)
}
