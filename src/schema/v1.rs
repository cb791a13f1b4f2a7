use serde::{Deserialize, Serialize};

// canonical export order, the TSV writer's rows must stay in sync
pub const EXPORT_COLUMNS: &[&str] = &[
    "patient_number",
    "well",
    "react_id",
    "barcode",
    "patient_name",
    "fam_ct",
    "hex_ct",
    "delta_ct",
    "fam_endpoint",
    "hex_endpoint",
    "endpoint_diff",
    "warning",
    "regression",
    "reference_ratio",
    "reference_result",
    "software_ratio",
    "software_result",
    "final_result",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub reference_well: Option<String>,
    pub carrier_threshold: f64,
    pub uncertain_threshold: f64,
    pub use_software_result: bool,
    pub cluster_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSummary {
    // "applied", "missing_delta_ct" or "not_configured"
    pub reference_outcome: Option<String>,
    pub reference_well: Option<String>,
    pub reference_delta_ct: Option<f64>,
    pub static_value: Option<f64>,
    // "reference" or "software"
    pub result_source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellRow {
    pub patient_number: Option<u8>,
    pub well: String,
    pub react_id: u8,
    pub barcode: String,
    pub patient_name: String,
    pub fam_ct: Option<f64>,
    pub hex_ct: Option<f64>,
    pub delta_ct: Option<f64>,
    pub fam_endpoint: f64,
    pub hex_endpoint: f64,
    pub endpoint_diff: f64,
    pub warning: String,
    pub regression: String,
    pub reference_ratio: Option<f64>,
    pub reference_result: Option<String>,
    pub software_ratio: Option<f64>,
    pub software_result: Option<String>,
    pub final_result: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenotypeCounts {
    pub healthy: u32,
    pub uncertain: u32,
    pub carrier: u32,
    pub patient: u32,
    pub repeat: u32,
    pub no_result: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmpliQcV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub config: ConfigSnapshot,
    pub calibration: CalibrationSummary,
    pub counts: GenotypeCounts,
    pub wells: Vec<WellRow>,
    pub warnings: Vec<String>,
}
