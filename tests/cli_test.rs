mod common;

use std::process::Command;

use tempfile::tempdir;

fn modellevel() -> Command {
    Command::new(env!("CARGO_BIN_EXE_era5vis_modellevel"))
}

fn clim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_era5vis_clim"))
}

#[test]
fn test_no_args_prints_help() {
    let out = modellevel().output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("-lvl, --level"));
}

#[test]
fn test_help_flag() {
    let out = modellevel().arg("--help").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage:"));
}

#[test]
fn test_version_flag() {
    let out = modellevel().arg("-v").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("era5vis_modellevel:"));
    assert!(stdout.contains("Licence: public domain"));
}

#[test]
fn test_command_not_understood() {
    let out = modellevel().args(["-p", "t"]).output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("command not understood"));
}

#[test]
fn test_bad_time_index_fails() {
    let out = modellevel()
        .args(["-p", "t", "-lvl", "850", "-ti", "abc"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("time index"));
}

#[test]
fn test_missing_datafile_fails_with_message() {
    let out = modellevel()
        .env("ERA5VIS_DATAFILE", "definitely_missing.nc")
        .args(["-p", "t", "-lvl", "850", "-ti", "0", "--no-browser"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
}

#[test]
fn test_end_to_end_generates_page() {
    let dir = tempdir().unwrap();
    let case_path = dir.path().join("case.nc");
    common::write_case_file(&case_path);

    let out = modellevel()
        .env("ERA5VIS_DATAFILE", &case_path)
        .env("ERA5VIS_HTML_DIR", dir.path().join("html"))
        .args(["-p", "t", "-lvl", "850", "-ti", "0", "--no-browser"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Extracting horizontal cross-section"));
    assert!(stdout.contains("Plotting data"));
    assert!(stdout.contains("File successfully generated at:"));
    assert!(dir.path().join("html").join("index.html").exists());
}

#[test]
fn test_default_time_message() {
    let dir = tempdir().unwrap();
    let case_path = dir.path().join("case.nc");
    common::write_case_file(&case_path);

    let out = modellevel()
        .env("ERA5VIS_DATAFILE", &case_path)
        .env("ERA5VIS_HTML_DIR", dir.path().join("html"))
        .args(["-p", "t", "-lvl", "850", "--no-browser"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout)
        .contains("No time provided, using default (first time in the file)"));
}

#[test]
fn test_clim_help_and_version() {
    let out = clim().output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage:"));

    let out = clim().arg("-v").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("era5vis_clim:"));
}

#[test]
fn test_clim_bad_month_fails() {
    let out = clim().args(["-y", "2024", "-m", "Smarch"]).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Could not parse month"));
}

#[test]
fn test_clim_missing_credentials() {
    let out = clim()
        .env_remove("CDSAPI_KEY")
        .args(["-y", "2024", "-m", "March"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stdout.contains("Downloading ERA5 monthly mean data for 2024-03..."));
    assert!(stderr.contains("CDSAPI_KEY"));
}
