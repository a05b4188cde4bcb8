use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::report::ReportData;
use crate::report::json::render_prediction_json;
use crate::report::text::render_report_text;

pub const REPORT_TEXT_FILE: &str = "report.txt";
pub const REPORT_JSON_FILE: &str = "prediction.json";

pub fn write_reports(data: &ReportData<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let report_path = out_dir.join(REPORT_TEXT_FILE);
    write_text(&report_path, &render_report_text(data))?;

    let json_path = out_dir.join(REPORT_JSON_FILE);
    let json = render_prediction_json(data)?;
    write_text(&json_path, &json)?;

    tracing::info!(out = %out_dir.display(), "reports written");
    Ok(())
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()?;
    Ok(())
}
