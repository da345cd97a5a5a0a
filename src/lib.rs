//! era5vis: visualization of ERA5 pressure-level reanalysis data.
//!
//! The library reads ERA5 NetCDF case and climatology files, extracts
//! horizontal and vertical cross-sections, anomalies, and soundings,
//! renders them as PNG rasters, and wraps the results in static HTML
//! pages. Two binaries (`era5vis_modellevel`, `era5vis_clim`) drive the
//! pipeline from the command line.

pub mod anomaly;
pub mod cli;
pub mod config;
pub mod core;
pub mod data_io;
pub mod download;
pub mod error;
pub mod graphics;
pub mod html;
pub mod math;
pub mod terrain;

pub use config::Config;
pub use error::VisError;
