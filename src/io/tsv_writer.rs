use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::plate::{Genotype, WellRecord};
use crate::schema::v1::EXPORT_COLUMNS;

pub fn write_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{}", EXPORT_COLUMNS.join("\t"))?;
    for well in &ctx.plate.wells {
        writeln!(w, "{}", format_row(well))?;
    }
    Ok(())
}

// one line in EXPORT_COLUMNS order, absent values render as empty cells
pub fn format_row(w: &WellRecord) -> String {
    let fields: [String; 18] = [
        opt_int(w.patient_number),
        w.well.to_string(),
        w.react_id.to_string(),
        w.barcode.clone(),
        w.patient_name.clone(),
        opt_num(w.fam_ct, 2),
        opt_num(w.hex_ct, 2),
        opt_num(w.delta_ct, 2),
        format!("{:.1}", w.fam_endpoint),
        format!("{:.1}", w.hex_endpoint),
        format!("{:.1}", w.endpoint_diff),
        w.warning.as_str().to_string(),
        w.regression.as_str().to_string(),
        opt_num(w.reference_ratio, 4),
        opt_genotype(w.reference_call),
        opt_num(w.software_ratio, 4),
        opt_genotype(w.software_call),
        opt_genotype(w.final_call),
    ];
    fields.join("\t")
}

fn opt_int(v: Option<u8>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn opt_num(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

fn opt_genotype(v: Option<Genotype>) -> String {
    v.map(|g| g.as_str().to_string()).unwrap_or_default()
}
