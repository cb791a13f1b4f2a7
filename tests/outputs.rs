use std::path::PathBuf;

use kira_ampliqc::config::CalibrationConfig;
use kira_ampliqc::ctx::Ctx;
use kira_ampliqc::input::RawWellRecord;
use kira_ampliqc::io::json_writer::{build_report, write_json};
use kira_ampliqc::io::summary::format_summary;
use kira_ampliqc::io::tsv_writer::{self, format_row};
use kira_ampliqc::pipeline::{PipelineExecutor, RunOutcome};
use kira_ampliqc::schema::v1::{AmpliQcV1, EXPORT_COLUMNS};
use tempfile::TempDir;

fn valid_record(n: u32, delta: f64) -> RawWellRecord {
    let fam = 3000.0 + n as f64 * 10.0;
    let noise = if n % 2 == 0 { 2.0 } else { -2.0 };
    RawWellRecord {
        react_id: Some(n),
        barcode: format!("BC{n:03}"),
        fam_ct: format!("{:.2}", 22.0 + delta),
        hex_ct: "22.00".to_string(),
        fam_coordinates: format!("[[1,100.0],[40,{fam}]]"),
        hex_coordinates: format!("[[1,90.0],[40,{}]]", 0.8 * fam + noise),
        ..RawWellRecord::default()
    }
}

fn finished_ctx(reference: Option<&str>) -> Box<Ctx> {
    let batch: Vec<RawWellRecord> = (1..=96).map(|n| valid_record(n, 2.0)).collect();
    let mut config = CalibrationConfig::default();
    config.reference_well = reference.map(str::to_string);
    let ctx = Ctx::new(config, batch, PathBuf::from("."), false, false, "1.2.3");
    match PipelineExecutor::standard()
        .run(ctx, |_, _| {}, || false)
        .unwrap()
    {
        RunOutcome::Completed(ctx) => ctx,
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn every_row_matches_the_column_catalogue() {
    let ctx = finished_ctx(Some("F12"));
    for w in &ctx.plate.wells {
        let row = format_row(w);
        assert_eq!(row.split('\t').count(), EXPORT_COLUMNS.len());
    }
}

#[test]
fn tsv_file_has_a_header_and_one_line_per_well() {
    let ctx = finished_ctx(Some("F12"));
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plate.tsv");
    tsv_writer::write_tsv(&path, &ctx).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 97);
    assert_eq!(lines[0], EXPORT_COLUMNS.join("\t"));
    assert!(lines[1].starts_with("1\tA01\t1\tBC001\t"));
    assert!(lines[96].starts_with("96\tH12\t96\tBC096\t"));
}

#[test]
fn report_covers_the_whole_plate() {
    let ctx = finished_ctx(Some("F12"));
    let report = build_report(&ctx);

    assert_eq!(report.tool, "kira-ampliqc");
    assert_eq!(report.version, "1.2.3");
    assert_eq!(report.schema_version, "v1");
    assert_eq!(report.wells.len(), 96);

    let c = &report.counts;
    let total = c.healthy + c.uncertain + c.carrier + c.patient + c.repeat + c.no_result;
    assert_eq!(total, 96);
    assert_eq!(c.healthy, 96);

    let cal = &report.calibration;
    assert_eq!(cal.reference_outcome.as_deref(), Some("applied"));
    assert_eq!(cal.reference_well.as_deref(), Some("F12"));
    assert_eq!(cal.reference_delta_ct, Some(2.0));
    assert_eq!(cal.static_value, Some(2.0));
    assert_eq!(cal.result_source.as_deref(), Some("reference"));
}

#[test]
fn report_roundtrips_through_json() {
    let ctx = finished_ctx(Some("F12"));
    let report = build_report(&ctx);
    let encoded = serde_json::to_string(&report).unwrap();
    let decoded: AmpliQcV1 = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.tool, report.tool);
    assert_eq!(decoded.schema_version, report.schema_version);
    assert_eq!(decoded.wells.len(), report.wells.len());
    assert_eq!(decoded.counts.healthy, report.counts.healthy);
    assert_eq!(decoded.wells[93].well, "F12");
    assert_eq!(decoded.wells[93].final_result.as_deref(), Some("healthy"));
}

#[test]
fn json_file_parses_back_into_the_schema() {
    let ctx = finished_ctx(Some("F12"));
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plate.json");
    write_json(&path, &ctx).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let report: AmpliQcV1 = serde_json::from_str(&content).unwrap();
    assert_eq!(report.wells.len(), 96);
    assert_eq!(report.config.reference_well.as_deref(), Some("F12"));
}

#[test]
fn summary_lists_the_reference_run_facts() {
    let ctx = finished_ctx(Some("F12"));
    let summary = format_summary(&ctx);
    assert!(summary.contains("kira-ampliqc v1.2.3"));
    assert!(summary.contains("Plate: 96 wells"));
    assert!(summary.contains("Reference: F12 dCt=2.00 (applied)"));
    assert!(summary.contains("Static value: 2.00"));
    assert!(summary.contains("Result source: reference"));
    assert!(summary.contains(
        "Results: healthy=96 uncertain=0 carrier=0 patient=0 repeat=0 no_result=0"
    ));
    assert!(summary.contains("Warnings: none"));
}

#[test]
fn summary_without_a_reference_reports_the_software_source() {
    let ctx = finished_ctx(None);
    let summary = format_summary(&ctx);
    assert!(summary.contains("Reference: none"));
    assert!(summary.contains("Result source: software"));
}
