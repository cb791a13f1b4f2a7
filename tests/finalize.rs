use std::path::PathBuf;

use kira_ampliqc::config::CalibrationConfig;
use kira_ampliqc::ctx::{Ctx, ReferenceOutcome, ResultSource};
use kira_ampliqc::error::Error;
use kira_ampliqc::input::RawWellRecord;
use kira_ampliqc::pipeline::Stage;
use kira_ampliqc::pipeline::stage1_normalize::Stage1Normalize;
use kira_ampliqc::pipeline::stage5_finalize::Stage5Finalize;
use kira_ampliqc::plate::{Genotype, WellId};

fn ctx_with_calls() -> Ctx {
    let batch: Vec<RawWellRecord> = (1..=96)
        .map(|n| RawWellRecord {
            react_id: Some(n),
            barcode: format!("BC{n:03}"),
            fam_ct: "24.00".to_string(),
            hex_ct: "22.00".to_string(),
            fam_coordinates: "[[1,100.0],[40,3000.0]]".to_string(),
            hex_coordinates: "[[1,90.0],[40,2400.0]]".to_string(),
            ..RawWellRecord::default()
        })
        .collect();
    let mut ctx = Ctx::new(
        CalibrationConfig::default(),
        batch,
        PathBuf::from("."),
        false,
        false,
        "test",
    );
    Stage1Normalize::new().run(&mut ctx).unwrap();
    for w in &mut ctx.plate.wells {
        w.reference_call = Some(Genotype::Healthy);
        w.software_call = Some(Genotype::Carrier);
    }
    ctx
}

fn applied() -> ReferenceOutcome {
    ReferenceOutcome::Applied {
        well: WellId::from_react_id(94).unwrap(),
        delta_ct: 2.0,
    }
}

#[test]
fn applied_reference_wins_by_default() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(applied());
    Stage5Finalize::new().run(&mut ctx).unwrap();
    assert_eq!(ctx.result_source, Some(ResultSource::Reference));
    assert!(ctx
        .plate
        .wells
        .iter()
        .all(|w| w.final_call == Some(Genotype::Healthy)));
}

#[test]
fn software_override_beats_applied_reference() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(applied());
    ctx.config.use_software_result = true;
    ctx.software_applied = true;
    Stage5Finalize::new().run(&mut ctx).unwrap();
    assert_eq!(ctx.result_source, Some(ResultSource::Software));
    assert!(ctx
        .plate
        .wells
        .iter()
        .all(|w| w.final_call == Some(Genotype::Carrier)));
}

#[test]
fn missing_delta_ct_falls_back_to_software() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(ReferenceOutcome::MissingDeltaCt {
        well: WellId::from_react_id(94).unwrap(),
    });
    ctx.software_applied = true;
    Stage5Finalize::new().run(&mut ctx).unwrap();
    assert_eq!(ctx.result_source, Some(ResultSource::Software));
}

#[test]
fn unconfigured_reference_falls_back_to_software() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(ReferenceOutcome::NotConfigured);
    ctx.software_applied = true;
    Stage5Finalize::new().run(&mut ctx).unwrap();
    assert_eq!(ctx.result_source, Some(ResultSource::Software));
}

#[test]
fn reference_mode_without_calibration_is_an_error() {
    let mut ctx = ctx_with_calls();
    ctx.reference = None;
    let err = Stage5Finalize::new().run(&mut ctx).unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::MissingColumn { column, .. }) => assert_eq!(*column, "reference_result"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(ctx.result_source, None);
}

#[test]
fn software_mode_without_static_value_is_an_error() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(ReferenceOutcome::NotConfigured);
    ctx.software_applied = false;
    let err = Stage5Finalize::new().run(&mut ctx).unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::MissingColumn { column, .. }) => assert_eq!(*column, "software_result"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn patient_numbers_follow_plate_order() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(applied());
    // rows arrive scrambled; finalization restores canonical order
    ctx.plate.wells.reverse();
    Stage5Finalize::new().run(&mut ctx).unwrap();
    for (i, w) in ctx.plate.wells.iter().enumerate() {
        assert_eq!(w.patient_number, Some(i as u8 + 1));
        assert_eq!(w.patient_number, Some(w.well.patient_number()));
    }
}

#[test]
fn wells_without_a_call_finalize_to_none() {
    let mut ctx = ctx_with_calls();
    ctx.reference = Some(applied());
    ctx.plate.wells[3].reference_call = None;
    Stage5Finalize::new().run(&mut ctx).unwrap();
    assert_eq!(ctx.plate.wells[3].final_call, None);
    assert_eq!(ctx.plate.wells[3].patient_number, Some(4));
}
