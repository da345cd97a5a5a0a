//! Argument handling for the two command line tools.
//!
//! The flag vocabulary includes multi-character short flags (-lvl, -ti),
//! so arguments are scanned by hand; long forms are normalized to their
//! short forms first. Each function returns the process exit code.

use crate::config::Config;
use crate::core::{write_anomaly_sounding_page, write_html};
use crate::data_io::TimeSelector;
use crate::download::{download_era5, parse_month};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sounding point used by era5vis_clim: Innsbruck
const REFERENCE_LAT: f64 = 47.2692;
const REFERENCE_LON: f64 = 11.4041;

pub const HELP: &str = r#"era5vis_modellevel: Visualization of ERA5 at a given model level.

Usage:
   -h, --help                       : print the help
   -v, --version                    : print the installed version
   -p, --parameter [PARAM]          : ERA5 variable to plot, mandatory
   -lvl, --level [LEVEL]            : pressure level to plot (hPa), mandatory
   -t, --time [TIME]                : time to plot (YYYYmmddHHMM)
   -ti, --time_index [TIME_IND]     : time index within dataset to plot (--time takes
                                      precedence if both --time and --time_index are specified
                                      (default=0)
   --no-browser                     : the default behavior is to open a browser with the
                                      newly generated visualisation. Set to ignore
                                      and print the path to the html file instead
"#;

pub const HELP_CLIM: &str = r#"era5vis_clim: Download and visualize ERA5 monthly mean climatology data.

Usage:
   -h, --help                       : print the help
   -v, --version                    : print the installed version
   -y, --year [YEAR]                : year to download (e.g., 2024), mandatory
   -m, --month [MONTH]              : month to download (e.g., 03), mandatory
   -p, --parameter [PARAM]          : ERA5 variable to plot
   -lvl, --level [LEVEL]            : pressure level to plot (hPa)
   --no-browser                     : the default behavior is to open a browser with the
                                      newly generated visualisation. Set to ignore
                                      and print the path to the html file instead
"#;

/// Replace long flags with their short forms, in place.
fn normalize(args: &mut [String], pairs: &[(&str, &str)]) {
    for arg in args.iter_mut() {
        for (long, short) in pairs {
            if *arg == *long {
                *arg = short.to_string();
            }
        }
    }
}

/// Value following a flag, if the flag is present.
fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// The era5vis_modellevel command line tool.
pub fn modellevel(mut args: Vec<String>, config: &Config) -> i32 {
    normalize(
        &mut args,
        &[
            ("--parameter", "-p"),
            ("--level", "-lvl"),
            ("--time", "-t"),
            ("--time_index", "-ti"),
        ],
    );

    if args.is_empty() || args[0] == "-h" || args[0] == "--help" {
        println!("{}", HELP);
        return 0;
    }
    if args[0] == "-v" || args[0] == "--version" {
        println!("era5vis_modellevel: {}", VERSION);
        println!("Licence: public domain");
        println!("era5vis_modellevel is provided \"as is\", without warranty of any kind");
        return 0;
    }

    // parameter and level must be provided, time/time_index are optional
    let (param, level_str) = match (value_after(&args, "-p"), value_after(&args, "-lvl")) {
        (Some(p), Some(l)) => (p.to_string(), l.to_string()),
        _ => {
            println!(
                "era5vis_modellevel: command not understood. \
                 Type \"era5vis_modellevel --help\" for usage information."
            );
            return 0;
        }
    };

    let level: f64 = match level_str.parse::<i64>() {
        Ok(l) => l as f64,
        Err(_) => {
            eprintln!("Error: level must be an integer, got '{}'", level_str);
            return 1;
        }
    };

    let time = if let Some(t) = value_after(&args, "-t") {
        TimeSelector::ByLabel(t.to_string())
    } else if let Some(ti) = value_after(&args, "-ti") {
        match ti.parse::<usize>() {
            Ok(i) => TimeSelector::ByIndex(i),
            Err(_) => {
                eprintln!("Error: time index must be an integer, got '{}'", ti);
                return 1;
            }
        }
    } else {
        println!("No time provided, using default (first time in the file)");
        TimeSelector::ByIndex(0)
    };

    match write_html(config, &param, level, &time, None) {
        Ok(html_path) => {
            if has_flag(&args, "--no-browser") {
                println!("File successfully generated at: {}", html_path.display());
            } else if let Err(e) = webbrowser::open(&format!("file://{}", html_path.display())) {
                eprintln!("Could not open browser: {}", e);
                println!("File successfully generated at: {}", html_path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// The era5vis_clim command line tool.
pub fn clim(mut args: Vec<String>, config: &Config) -> i32 {
    normalize(
        &mut args,
        &[
            ("--year", "-y"),
            ("--month", "-m"),
            ("--parameter", "-p"),
            ("--level", "-lvl"),
        ],
    );

    if args.is_empty() || args[0] == "-h" || args[0] == "--help" {
        println!("{}", HELP_CLIM);
        return 0;
    }
    if args[0] == "-v" || args[0] == "--version" {
        println!("era5vis_clim: {}", VERSION);
        println!("Licence: public domain");
        println!("era5vis_clim is provided \"as is\", without warranty of any kind");
        return 0;
    }

    let (year, month_input) = match (value_after(&args, "-y"), value_after(&args, "-m")) {
        (Some(y), Some(m)) => (y.to_string(), m.to_string()),
        _ => {
            println!(
                "era5vis_clim: command not understood. \
                 Type \"era5vis_clim --help\" for usage information."
            );
            return 0;
        }
    };

    let month = match parse_month(&month_input) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("Downloading ERA5 monthly mean data for {}-{}...", year, month);
    let filepath = match download_era5(&year, &month) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!("Data downloaded to: {}", filepath.display());

    // Optional follow-up: plot the anomaly map and sounding for the
    // downloaded month at the reference point
    let (param, level_str) = match (value_after(&args, "-p"), value_after(&args, "-lvl")) {
        (Some(p), Some(l)) => (p.to_string(), l.to_string()),
        _ => return 0,
    };
    let level: f64 = match level_str.parse::<i64>() {
        Ok(l) => l as f64,
        Err(_) => {
            eprintln!("Error: level must be an integer, got '{}'", level_str);
            return 1;
        }
    };

    let mut download_config = config.clone();
    download_config.datafile = filepath.clone();
    match write_anomaly_sounding_page(
        &download_config,
        &param,
        level,
        REFERENCE_LAT,
        REFERENCE_LON,
    ) {
        Ok(html_path) => {
            if has_flag(&args, "--no-browser") {
                println!("File successfully generated at: {}", html_path.display());
            } else if let Err(e) = webbrowser::open(&format!("file://{}", html_path.display())) {
                eprintln!("Could not open browser: {}", e);
                println!("File successfully generated at: {}", html_path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rewrites_long_flags() {
        let mut args = vec!["--parameter".to_string(), "t".to_string()];
        normalize(&mut args, &[("--parameter", "-p")]);
        assert_eq!(args, vec!["-p", "t"]);
    }

    #[test]
    fn test_value_after() {
        let args: Vec<String> = ["-p", "t", "-lvl", "850"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(value_after(&args, "-p"), Some("t"));
        assert_eq!(value_after(&args, "-lvl"), Some("850"));
        assert_eq!(value_after(&args, "-t"), None);
    }

    #[test]
    fn test_help_exits_zero() {
        let config = Config::default();
        assert_eq!(modellevel(vec![], &config), 0);
        assert_eq!(modellevel(vec!["-h".to_string()], &config), 0);
        assert_eq!(clim(vec!["--help".to_string()], &config), 0);
    }

    #[test]
    fn test_command_not_understood_exits_zero() {
        let config = Config::default();
        assert_eq!(modellevel(vec!["-p".to_string(), "t".to_string()], &config), 0);
        assert_eq!(clim(vec!["-y".to_string(), "2024".to_string()], &config), 0);
    }

    #[test]
    fn test_bad_time_index_exits_one() {
        let config = Config::default();
        let args: Vec<String> = ["-p", "t", "-lvl", "850", "-ti", "abc"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(modellevel(args, &config), 1);
    }

    #[test]
    fn test_bad_month_exits_one() {
        let config = Config::default();
        let args: Vec<String> = ["-y", "2024", "-m", "Smarch"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(clim(args, &config), 1);
    }
}
