use std::path::PathBuf;

use crate::config::CalibrationConfig;
use crate::input::RawWellRecord;
use crate::plate::{Plate, WellId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceOutcome {
    Applied { well: WellId, delta_ct: f64 },
    // soft failure, the finalizer falls back to the software result
    MissingDeltaCt { well: WellId },
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Reference,
    Software,
}

impl ResultSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultSource::Reference => "reference",
            ResultSource::Software => "software",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub tsv_path: PathBuf,
}

#[derive(Debug)]
pub struct Ctx {
    pub config: CalibrationConfig,
    pub raw: Vec<RawWellRecord>,
    pub plate: Plate,
    pub reference: Option<ReferenceOutcome>,
    pub static_value: Option<f64>,
    pub software_applied: bool,
    pub result_source: Option<ResultSource>,
    pub warnings: Vec<String>,
    pub write_json: bool,
    pub write_tsv: bool,
    pub output: OutputPaths,
    pub tool_version: String,
}

impl Ctx {
    pub fn new(
        config: CalibrationConfig,
        raw: Vec<RawWellRecord>,
        out_dir: PathBuf,
        write_json: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("ampliqc.json");
        let tsv_path = out_dir.join("ampliqc.tsv");
        Self {
            config,
            raw,
            plate: Plate::default(),
            reference: None,
            static_value: None,
            software_applied: false,
            result_source: None,
            warnings: Vec::new(),
            write_json,
            write_tsv,
            output: OutputPaths {
                out_dir,
                json_path,
                tsv_path,
            },
            tool_version: tool_version.to_string(),
        }
    }
}
