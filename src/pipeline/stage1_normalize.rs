use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::error::Error;
use crate::input::RawWellRecord;
use crate::pipeline::Stage;
use crate::plate::{
    CurvePoint, PLATE_WELLS, Plate, RegressionClass, Warning, WellId, WellRecord, endpoint_rfu,
    parse_curve,
};

pub const MAX_VALID_CT: f64 = 40.0;
pub const MIN_VALID_RFU: f64 = 1200.0;

pub struct Stage1Normalize;

impl Stage1Normalize {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Normalize {
    fn name(&self) -> &'static str {
        "stage1_normalize"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let raw = std::mem::take(&mut ctx.raw);
        let mut warnings = Vec::new();
        let plate = normalize(raw, &mut warnings)?;
        let flagged = plate
            .wells
            .iter()
            .filter(|w| w.warning != Warning::None)
            .count();
        ctx.warnings.append(&mut warnings);
        ctx.plate = plate;
        info!(
            wells = ctx.plate.len(),
            flagged,
            "plate_normalized"
        );
        Ok(())
    }
}

pub fn normalize(raw: Vec<RawWellRecord>, warnings: &mut Vec<String>) -> Result<Plate> {
    if raw.is_empty() {
        return Err(Error::Validation("input contains no well records".into()).into());
    }
    let mut slots: Vec<Option<RawWellRecord>> = (0..PLATE_WELLS).map(|_| None).collect();
    for (idx, rec) in raw.into_iter().enumerate() {
        let react = match rec.react_id {
            Some(r) if (1..=PLATE_WELLS as u32).contains(&r) => r as usize,
            Some(r) => {
                return Err(Error::Validation(format!(
                    "record {}: React ID {} outside 1..=96",
                    idx + 1,
                    r
                ))
                .into());
            }
            None => {
                return Err(
                    Error::Validation(format!("record {}: React ID missing", idx + 1)).into(),
                );
            }
        };
        if slots[react - 1].is_some() {
            return Err(Error::Validation(format!("duplicate React ID {react}")).into());
        }
        slots[react - 1] = Some(rec);
    }
    let mut wells = Vec::with_capacity(PLATE_WELLS);
    for well in WellId::all() {
        let react = well.react_id();
        let rec = slots[react as usize - 1]
            .take()
            .unwrap_or_else(|| RawWellRecord::placeholder(react as u32));
        wells.push(build_record(well, rec, warnings));
    }
    Ok(Plate::new(wells))
}

fn build_record(well: WellId, raw: RawWellRecord, warnings: &mut Vec<String>) -> WellRecord {
    let fam_curve = parse_channel_curve(well, "FAM", &raw.fam_coordinates, warnings);
    let hex_curve = parse_channel_curve(well, "HEX", &raw.hex_coordinates, warnings);
    let fam_endpoint = endpoint_rfu(&fam_curve);
    let hex_endpoint = endpoint_rfu(&hex_curve);
    let fam_ct = parse_ct(&raw.fam_ct);
    let hex_ct = parse_ct(&raw.hex_ct);
    let delta_ct = match (fam_ct, hex_ct) {
        (Some(f), Some(h)) => Some(f - h),
        _ => None,
    };
    let warning = classify_warning(&raw.barcode, fam_ct, hex_ct, fam_endpoint, hex_endpoint);
    WellRecord {
        well,
        react_id: well.react_id(),
        barcode: raw.barcode,
        patient_name: raw.patient_name,
        fam_ct,
        hex_ct,
        delta_ct,
        fam_curve,
        hex_curve,
        fam_endpoint,
        hex_endpoint,
        endpoint_diff: fam_endpoint - hex_endpoint,
        warning,
        regression: RegressionClass::NotApplicable,
        reference_ratio: None,
        reference_call: None,
        software_ratio: None,
        software_call: None,
        final_call: None,
        patient_number: None,
    }
}

// non-numeric or non-finite Ct strings mean "no Ct", never an error
pub fn parse_ct(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// first matching flag wins
pub fn classify_warning(
    barcode: &str,
    fam_ct: Option<f64>,
    hex_ct: Option<f64>,
    fam_endpoint: f64,
    hex_endpoint: f64,
) -> Warning {
    if barcode.trim().is_empty() {
        return Warning::EmptyWell;
    }
    let ct_failed = |ct: Option<f64>| ct.is_none_or(|v| v > MAX_VALID_CT);
    if ct_failed(fam_ct) || ct_failed(hex_ct) {
        return Warning::InsufficientDna;
    }
    if fam_endpoint < MIN_VALID_RFU || hex_endpoint < MIN_VALID_RFU {
        return Warning::LowRfu;
    }
    Warning::None
}

fn parse_channel_curve(
    well: WellId,
    channel: &str,
    raw: &str,
    warnings: &mut Vec<String>,
) -> Vec<CurvePoint> {
    match parse_curve(raw) {
        Ok(points) => points,
        Err(reason) => {
            warn!(well = %well, channel, "curve unparseable, treating as empty");
            warnings.push(format!(
                "{well} {channel} curve unparseable ({reason}); treated as empty"
            ));
            Vec::new()
        }
    }
}
