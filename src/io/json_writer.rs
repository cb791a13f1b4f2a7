use std::path::Path;

use anyhow::Result;

use crate::ctx::{Ctx, ReferenceOutcome};
use crate::plate::{Genotype, Plate, WellRecord};
use crate::schema::v1::{AmpliQcV1, CalibrationSummary, ConfigSnapshot, GenotypeCounts, WellRow};

pub fn build_report(ctx: &Ctx) -> AmpliQcV1 {
    let calibration = CalibrationSummary {
        reference_outcome: ctx.reference.map(|r| {
            match r {
                ReferenceOutcome::Applied { .. } => "applied",
                ReferenceOutcome::MissingDeltaCt { .. } => "missing_delta_ct",
                ReferenceOutcome::NotConfigured => "not_configured",
            }
            .to_string()
        }),
        reference_well: ctx.reference.and_then(|r| match r {
            ReferenceOutcome::Applied { well, .. } | ReferenceOutcome::MissingDeltaCt { well } => {
                Some(well.to_string())
            }
            ReferenceOutcome::NotConfigured => None,
        }),
        reference_delta_ct: ctx.reference.and_then(|r| match r {
            ReferenceOutcome::Applied { delta_ct, .. } => Some(delta_ct),
            _ => None,
        }),
        static_value: ctx.static_value,
        result_source: ctx.result_source.map(|s| s.as_str().to_string()),
    };
    AmpliQcV1 {
        tool: "kira-ampliqc".to_string(),
        version: ctx.tool_version.clone(),
        schema_version: "v1".to_string(),
        config: ConfigSnapshot {
            reference_well: ctx.config.reference_well.clone(),
            carrier_threshold: ctx.config.carrier_threshold(),
            uncertain_threshold: ctx.config.uncertain_threshold(),
            use_software_result: ctx.config.use_software_result,
            cluster_count: ctx.config.cluster_count,
        },
        calibration,
        counts: genotype_counts(&ctx.plate),
        wells: ctx.plate.wells.iter().map(well_row).collect(),
        warnings: ctx.warnings.clone(),
    }
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    crate::io::write_json(path, &build_report(ctx))
}

pub fn genotype_counts(plate: &Plate) -> GenotypeCounts {
    let mut counts = GenotypeCounts::default();
    for w in &plate.wells {
        match w.final_call {
            Some(Genotype::Healthy) => counts.healthy += 1,
            Some(Genotype::Uncertain) => counts.uncertain += 1,
            Some(Genotype::Carrier) => counts.carrier += 1,
            Some(Genotype::Patient) => counts.patient += 1,
            Some(Genotype::Repeat) => counts.repeat += 1,
            None => counts.no_result += 1,
        }
    }
    counts
}

fn well_row(w: &WellRecord) -> WellRow {
    WellRow {
        patient_number: w.patient_number,
        well: w.well.to_string(),
        react_id: w.react_id,
        barcode: w.barcode.clone(),
        patient_name: w.patient_name.clone(),
        fam_ct: w.fam_ct,
        hex_ct: w.hex_ct,
        delta_ct: w.delta_ct,
        fam_endpoint: w.fam_endpoint,
        hex_endpoint: w.hex_endpoint,
        endpoint_diff: w.endpoint_diff,
        warning: w.warning.as_str().to_string(),
        regression: w.regression.as_str().to_string(),
        reference_ratio: w.reference_ratio,
        reference_result: w.reference_call.map(|g| g.as_str().to_string()),
        software_ratio: w.software_ratio,
        software_result: w.software_call.map(|g| g.as_str().to_string()),
        final_result: w.final_call.map(|g| g.as_str().to_string()),
    }
}
