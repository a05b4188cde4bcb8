use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::catalog::{CatalogSource, FeatureCatalog, FeatureKey};
use crate::input::{InputError, open_maybe_gz, parse_number};

/// Reads a `feature<TAB>value` fallback table. A header starting with `feature` on the
/// first non-comment line is skipped. The table may be partial; features it leaves out have no fallback.
pub fn load_fallbacks(path: &Path) -> Result<FeatureCatalog, InputError> {
    let reader = open_maybe_gz(path)?;
    let fallbacks = parse_fallbacks(reader)?;
    let catalog = FeatureCatalog::with_fallbacks(fallbacks, CatalogSource::File(path.to_path_buf()));

    let missing = catalog.missing_fallbacks();
    if !missing.is_empty() {
        tracing::warn!(
            path = %path.display(),
            missing = missing.len(),
            "fallback table is partial; these features need a user reading: {}",
            missing
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(catalog)
}

pub fn parse_fallbacks(mut reader: impl BufRead) -> Result<BTreeMap<FeatureKey, f64>, InputError> {
    let mut buf = String::new();
    let mut out = BTreeMap::new();
    let mut line_no = 0usize;
    let mut first_row = true;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 2 {
            return Err(InputError::Parse(format!(
                "fallback line {} has <2 columns",
                line_no
            )));
        }
        let is_header = first_row && cols[0].trim().eq_ignore_ascii_case("feature");
        first_row = false;
        if is_header {
            continue;
        }
        let key: FeatureKey = cols[0]
            .parse()
            .map_err(|e| InputError::Parse(format!("fallback line {}: {}", line_no, e)))?;
        let value = parse_number(cols[1])
            .map_err(|e| InputError::Parse(format!("fallback line {}: {}", line_no, e)))?;
        if out.insert(key, value).is_some() {
            tracing::warn!(line = line_no, feature = %key, "duplicate fallback; keeping last");
        }
    }

    if out.is_empty() {
        return Err(InputError::Parse("fallback table is empty".to_string()));
    }

    Ok(out)
}
