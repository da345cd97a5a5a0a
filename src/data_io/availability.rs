use crate::config::Config;
use crate::error::VisError;

use super::dataset::{parse_time_label, Era5Dataset};
use super::LEVEL_DIM;

/// How the caller picks a time step: by literal label or by position.
///
/// Resolved once at the CLI boundary; downstream code never inspects the
/// type of a "string or int" value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSelector {
    /// Literal time in YYYYmmddHHMM format
    ByLabel(String),
    /// Index into the time axis
    ByIndex(usize),
}

/// Check that the requested variable, pressure level, and time selector all
/// exist in the case dataset before any extraction is attempted.
///
/// Runs before selection so the user sees a descriptive error listing the
/// valid alternatives instead of a low-level lookup failure. Read-only.
pub fn check_data_availability(
    config: &Config,
    param: &str,
    level: Option<f64>,
    time: Option<&TimeSelector>,
) -> Result<(), VisError> {
    config.validate()?;
    let ds = Era5Dataset::open_labeled(&config.datafile, "dataset")?;
    check_dataset_availability(&ds, param, level, time)
}

/// The availability contract against an already-open dataset.
pub fn check_dataset_availability(
    ds: &Era5Dataset,
    param: &str,
    level: Option<f64>,
    time: Option<&TimeSelector>,
) -> Result<(), VisError> {
    if !ds.has_variable(param) {
        return Err(VisError::MissingVariable {
            name: param.to_string(),
            dataset: ds.label().to_string(),
            available: ds.data_vars(),
        });
    }

    if let Some(level) = level {
        if !ds.has_dimension(LEVEL_DIM) {
            return Err(VisError::MissingDimension(LEVEL_DIM.to_string()));
        }
        let levels = ds.pressure_levels()?;
        if !levels.contains(&level) {
            return Err(VisError::LevelNotFound {
                level,
                available: levels,
            });
        }
    }

    if let Some(time) = time {
        // Label syntax is checked even before touching the time axis
        if let TimeSelector::ByLabel(label) = time {
            parse_time_label(label)?;
        }
        ds.time_index(time)?;
    }

    Ok(())
}
