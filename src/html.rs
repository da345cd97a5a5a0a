//! Static HTML pages that frame the rendered plots.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VisError;

/// Page template for a single plot. Placeholders are substituted verbatim.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>[PLOTTYPE] of [PLOTVAR]</title>
<style>
body { font-family: sans-serif; margin: 2em; background: #fafafa; }
h1 { font-size: 1.3em; }
img { max-width: 100%; border: 1px solid #ccc; }
</style>
</head>
<body>
<h1>[PLOTTYPE] of [PLOTVAR]</h1>
<img src="[IMGTYPE]" alt="[PLOTTYPE] of [PLOTVAR]">
</body>
</html>
"#;

/// Page template combining the anomaly map and the sounding.
const COMBINED_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ERA5 monthly mean anomaly and sounding</title>
<style>
body { font-family: sans-serif; margin: 2em; background: #fafafa; }
h1 { font-size: 1.3em; }
img { max-width: 100%; border: 1px solid #ccc; margin-bottom: 1.5em; }
</style>
</head>
<body>
<h1>ERA5 monthly mean anomaly and sounding</h1>
<img src="../PNG/[PLOT1]" alt="anomaly map">
<img src="../PNG/[PLOT2]" alt="sounding">
</body>
</html>
"#;

/// Create the directory (and parents) if it does not exist.
pub fn mkdir(path: &Path) -> Result<(), VisError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Write an index.html for a single plot into `directory` and return the
/// path of the written page.
pub fn render_page(
    directory: &Path,
    plot_type: &str,
    param: &str,
    img_name: &str,
) -> Result<PathBuf, VisError> {
    let html = PAGE_TEMPLATE
        .replace("[PLOTTYPE]", plot_type)
        .replace("[PLOTVAR]", param)
        .replace("[IMGTYPE]", img_name);
    let path = directory.join("index.html");
    fs::write(&path, html)?;
    Ok(path)
}

/// Write the combined anomaly + sounding page into `html_dir`, embedding
/// the two PNG file names relative to the sibling PNG directory.
pub fn build_html(
    html_dir: &Path,
    plot1: &str,
    plot2: &str,
    date: &str,
) -> Result<PathBuf, VisError> {
    mkdir(html_dir)?;
    let html = COMBINED_TEMPLATE
        .replace("[PLOT1]", plot1)
        .replace("[PLOT2]", plot2);
    let path = html_dir.join(format!("ERA5_mean_anomaly_and_sounding_{}.html", date));
    fs::write(&path, html)?;
    println!("HTML saved to: {}", path.display());
    Ok(path)
}
