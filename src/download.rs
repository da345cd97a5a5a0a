//! Downloader for ERA5 monthly mean pressure-level data from the
//! Copernicus Climate Data Store (CDS).
//!
//! The request shape is fixed: one year-month of monthly means by hour of
//! day, six variables on thirteen pressure levels over the North Atlantic
//! and Europe, written to ./era5_data.nc.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::VisError;

pub const DATASET: &str = "reanalysis-era5-pressure-levels-monthly-means";
pub const PRODUCT_TYPE: &str = "monthly_averaged_reanalysis_by_hour_of_day";
pub const VARIABLES: [&str; 6] = [
    "geopotential",
    "specific_humidity",
    "specific_rain_water_content",
    "temperature",
    "u_component_of_wind",
    "v_component_of_wind",
];
pub const PRESSURE_LEVELS: [&str; 13] = [
    "1000", "950", "900", "850", "800", "750", "700", "600", "500", "400", "300", "200", "100",
];
/// Request extent as [North, West, South, East]
pub const AREA: [i32; 4] = [90, -55, 35, 35];
pub const TIME: &str = "00:00";
pub const TARGET: &str = "./era5_data.nc";

const DEFAULT_CDS_URL: &str = "https://cds.climate.copernicus.eu/api";
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Month name or number to a two-digit month string. Accepts numbers 1-12
/// and English and German month names, case-insensitive.
pub fn parse_month(month_input: &str) -> Result<String, VisError> {
    if let Ok(n) = month_input.parse::<i32>() {
        if (1..=12).contains(&n) {
            return Ok(format!("{:02}", n));
        }
        return Err(VisError::InvalidMonth(month_input.to_string()));
    }

    let month = match month_input.to_lowercase().as_str() {
        "january" | "jan" | "januar" => "01",
        "february" | "feb" | "februar" => "02",
        "march" | "mar" | "m\u{e4}rz" | "maerz" => "03",
        "april" | "apr" => "04",
        "may" | "mai" => "05",
        "june" | "jun" | "juni" => "06",
        "july" | "jul" | "juli" => "07",
        "august" | "aug" => "08",
        "september" | "sep" => "09",
        "october" | "oct" | "oktober" => "10",
        "november" | "nov" => "11",
        "december" | "dec" | "dezember" => "12",
        _ => return Err(VisError::InvalidMonth(month_input.to_string())),
    };
    Ok(month.to_string())
}

/// Credentialed CDS HTTP client. Credentials come from the environment:
/// CDSAPI_URL (optional) and CDSAPI_KEY (required, either the bare key or
/// the legacy "UID:KEY" form).
pub struct CdsClient {
    url: String,
    key: String,
    http: reqwest::blocking::Client,
}

impl CdsClient {
    pub fn from_env() -> Result<Self, VisError> {
        let url =
            std::env::var("CDSAPI_URL").unwrap_or_else(|_| DEFAULT_CDS_URL.to_string());
        let key = std::env::var("CDSAPI_KEY").map_err(|_| VisError::MissingCredentials)?;
        Ok(Self {
            url,
            key,
            http: reqwest::blocking::Client::new(),
        })
    }

    fn authed(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        // Legacy keys carry a numeric UID prefix; the API ignores it
        let key = self.key.rsplit(':').next().unwrap_or(&self.key);
        req.header("PRIVATE-TOKEN", key)
    }

    /// Submit a retrieval, poll until it completes, and stream the result
    /// to `target`.
    pub fn retrieve(&self, dataset: &str, request: &Value, target: &Path) -> Result<(), VisError> {
        let submit_url = format!(
            "{}/retrieve/v1/processes/{}/execution",
            self.url, dataset
        );
        let job: Value = self
            .authed(self.http.post(&submit_url))
            .json(&json!({ "inputs": request }))
            .send()?
            .error_for_status()?
            .json()?;

        let job_id = job["jobID"].as_str().unwrap_or_default().to_string();
        let status_url = format!("{}/retrieve/v1/jobs/{}", self.url, job_id);

        loop {
            let status: Value = self
                .authed(self.http.get(&status_url))
                .send()?
                .error_for_status()?
                .json()?;
            match status["status"].as_str().unwrap_or("") {
                "successful" => break,
                "failed" | "dismissed" => {
                    // Surface the server's message through the HTTP layer
                    let results_url = format!("{}/results", status_url);
                    self.authed(self.http.get(&results_url))
                        .send()?
                        .error_for_status()?;
                    break;
                }
                _ => std::thread::sleep(POLL_INTERVAL),
            }
        }

        let results_url = format!("{}/results", status_url);
        let results: Value = self
            .authed(self.http.get(&results_url))
            .send()?
            .error_for_status()?
            .json()?;
        let asset_url = results["asset"]["value"]["href"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let bytes = self
            .authed(self.http.get(&asset_url))
            .send()?
            .error_for_status()?
            .bytes()?;
        std::fs::write(target, &bytes)?;
        Ok(())
    }
}

/// Download one year-month of ERA5 monthly means to the fixed target path.
pub fn download_era5(year: &str, month: &str) -> Result<PathBuf, VisError> {
    let request = json!({
        "product_type": [PRODUCT_TYPE],
        "variable": VARIABLES,
        "year": [year],
        "month": [month],
        "time": [TIME],
        "pressure_level": PRESSURE_LEVELS,
        "data_format": "netcdf",
        "area": AREA,
    });

    let client = CdsClient::from_env()?;
    let target = PathBuf::from(TARGET);
    client.retrieve(DATASET, &request, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_numbers() {
        assert_eq!(parse_month("3").unwrap(), "03");
        assert_eq!(parse_month("12").unwrap(), "12");
        assert!(parse_month("0").is_err());
        assert!(parse_month("13").is_err());
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!(parse_month("January").unwrap(), "01");
        assert_eq!(parse_month("sep").unwrap(), "09");
        assert_eq!(parse_month("M\u{e4}rz").unwrap(), "03");
        assert_eq!(parse_month("maerz").unwrap(), "03");
        assert_eq!(parse_month("Dezember").unwrap(), "12");
        assert!(parse_month("Smarch").is_err());
    }
}
