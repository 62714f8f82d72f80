use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::enclave::ReportJsonSchema;

/// Read the data steward's report schema if the file exists.
///
/// A missing file is not an error: reports are posted without a schema.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Option<ReportJsonSchema>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("schema {} is not valid JSON", path.display()))?;

    info!("Attaching report schema from {}", path.display());
    Ok(Some(ReportJsonSchema(schema)))
}
