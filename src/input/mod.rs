use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWellRecord {
    #[serde(rename = "ReactId")]
    pub react_id: Option<u32>,
    #[serde(rename = "Barcode")]
    pub barcode: String,
    #[serde(rename = "PatientName")]
    pub patient_name: String,
    #[serde(rename = "FamCt")]
    pub fam_ct: String,
    #[serde(rename = "HexCt")]
    pub hex_ct: String,
    #[serde(rename = "FamCoordinateList")]
    pub fam_coordinates: String,
    #[serde(rename = "HexCoordinateList")]
    pub hex_coordinates: String,
}

impl RawWellRecord {
    pub fn placeholder(react_id: u32) -> Self {
        Self {
            react_id: Some(react_id),
            ..Self::default()
        }
    }
}

pub fn load_raw_records(path: &Path) -> Result<Vec<RawWellRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<RawWellRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse raw records in {}", path.display()))?;
    Ok(records)
}
