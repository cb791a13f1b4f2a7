use std::path::{Path, PathBuf};

use assert_cmd::Command;
use kira_ampliqc::schema::v1::AmpliQcV1;
use tempfile::TempDir;

fn write_full_plate(dir: &Path) -> PathBuf {
    let records: Vec<serde_json::Value> = (1..=96u32)
        .map(|n| {
            let fam = 3000.0 + n as f64 * 10.0;
            let noise = if n % 2 == 0 { 2.0 } else { -2.0 };
            serde_json::json!({
                "ReactId": n,
                "Barcode": format!("BC{n:03}"),
                "PatientName": format!("Patient {n}"),
                "FamCt": "24.00",
                "HexCt": "22.00",
                "FamCoordinateList": format!("[[1,100.0],[40,{fam}]]"),
                "HexCoordinateList": format!("[[1,90.0],[40,{}]]", 0.8 * fam + noise),
            })
        })
        .collect();
    let path = dir.join("input.json");
    std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
    path
}

#[test]
fn run_writes_both_outputs_and_summarizes() {
    let dir = TempDir::new().unwrap();
    let input = write_full_plate(dir.path());
    let out = dir.path().join("out");

    let output = Command::cargo_bin("kira-ampliqc")
        .unwrap()
        .args(["run", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--reference", "F12", "--json", "--tsv"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Reference: F12 dCt=2.00 (applied)"));
    assert!(stdout.contains("Result source: reference"));
    assert!(stdout.contains("healthy=96"));

    let json_path = out.join("ampliqc.json");
    let tsv_path = out.join("ampliqc.tsv");
    assert!(json_path.exists());
    assert!(tsv_path.exists());

    let report: AmpliQcV1 =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(report.calibration.static_value, Some(2.0));
    assert_eq!(report.calibration.result_source.as_deref(), Some("reference"));
    assert_eq!(report.counts.healthy, 96);

    let tsv = std::fs::read_to_string(&tsv_path).unwrap();
    assert_eq!(tsv.lines().count(), 97);
}

#[test]
fn run_without_output_flags_writes_no_files() {
    let dir = TempDir::new().unwrap();
    let input = write_full_plate(dir.path());
    let out = dir.path().join("out");

    let output = Command::cargo_bin("kira-ampliqc")
        .unwrap()
        .args(["run", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!out.join("ampliqc.json").exists());
    assert!(!out.join("ampliqc.tsv").exists());
}

#[test]
fn run_can_prefer_the_software_result() {
    let dir = TempDir::new().unwrap();
    let input = write_full_plate(dir.path());
    let out = dir.path().join("out");

    let output = Command::cargo_bin("kira-ampliqc")
        .unwrap()
        .args(["run", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--reference", "F12", "--software-result"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Result source: software"));
}

#[test]
fn run_rejects_inverted_thresholds_up_front() {
    let dir = TempDir::new().unwrap();
    let input = write_full_plate(dir.path());
    let out = dir.path().join("out");

    let output = Command::cargo_bin("kira-ampliqc")
        .unwrap()
        .args(["run", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--carrier-threshold", "0.9", "--uncertain-threshold", "0.3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("must be below"));
}
