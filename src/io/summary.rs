use crate::ctx::{Ctx, ReferenceOutcome};
use crate::io::json_writer::genotype_counts;

pub fn format_summary(ctx: &Ctx) -> String {
    let mut out = String::new();
    out.push_str(&format!("kira-ampliqc v{}\n", ctx.tool_version));
    out.push_str(&format!("Plate: {} wells\n", ctx.plate.len()));
    match ctx.reference {
        Some(ReferenceOutcome::Applied { well, delta_ct }) => {
            out.push_str(&format!("Reference: {well} dCt={delta_ct:.2} (applied)\n"));
        }
        Some(ReferenceOutcome::MissingDeltaCt { well }) => {
            out.push_str(&format!("Reference: {well} (no delta Ct, ignored)\n"));
        }
        Some(ReferenceOutcome::NotConfigured) => {
            out.push_str("Reference: none\n");
        }
        None => {}
    }
    if let Some(sv) = ctx.static_value {
        out.push_str(&format!("Static value: {sv:.2}\n"));
    }
    if let Some(source) = ctx.result_source {
        out.push_str(&format!("Result source: {}\n", source.as_str()));
    }
    let counts = genotype_counts(&ctx.plate);
    out.push_str(&format!(
        "Results: healthy={} uncertain={} carrier={} patient={} repeat={} no_result={}\n",
        counts.healthy, counts.uncertain, counts.carrier, counts.patient, counts.repeat,
        counts.no_result
    ));
    if ctx.warnings.is_empty() {
        out.push_str("Warnings: none\n");
    } else {
        out.push_str(&format!("Warnings: {}\n", ctx.warnings.len()));
        for warning in &ctx.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }
    out
}
