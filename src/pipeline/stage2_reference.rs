use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::{Ctx, ReferenceOutcome};
use crate::error::Error;
use crate::pipeline::{Stage, ensure_plate};
use crate::plate::{Genotype, Plate, Warning, WellId, classify_ratio};

pub struct Stage2Reference;

impl Stage2Reference {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Reference {
    fn name(&self) -> &'static str {
        "stage2_reference"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ensure_plate(&ctx.plate, "stage2_reference", "delta_ct")?;
        let configured = match &ctx.config.reference_well {
            Some(id) => id.clone(),
            None => {
                ctx.reference = Some(ReferenceOutcome::NotConfigured);
                info!("no reference well configured, software result will decide");
                return Ok(());
            }
        };
        let well: WellId = configured.parse().map_err(|_| Error::ReferenceLookup {
            well: configured.clone(),
        })?;
        let record = ctx.plate.get(well).ok_or_else(|| Error::ReferenceLookup {
            well: configured.clone(),
        })?;
        let reference_delta_ct = match record.delta_ct {
            Some(d) => d,
            None => {
                ctx.reference = Some(ReferenceOutcome::MissingDeltaCt { well });
                warn!(
                    well = %well,
                    "reference well has no delta Ct, falling back to software result"
                );
                return Ok(());
            }
        };
        apply_reference(
            &mut ctx.plate,
            reference_delta_ct,
            ctx.config.carrier_threshold(),
            ctx.config.uncertain_threshold(),
        );
        ctx.reference = Some(ReferenceOutcome::Applied {
            well,
            delta_ct: reference_delta_ct,
        });
        info!(well = %well, reference_delta_ct, "reference_applied");
        Ok(())
    }
}

pub fn apply_reference(plate: &mut Plate, reference_delta_ct: f64, carrier: f64, uncertain: f64) {
    for w in &mut plate.wells {
        if !matches!(w.warning, Warning::None | Warning::LowRfu) {
            continue;
        }
        w.reference_ratio = w.delta_ct.map(|d| (-(d - reference_delta_ct)).exp2());
        w.reference_call = Some(match w.reference_ratio {
            Some(r) => classify_ratio(r, carrier, uncertain),
            None => Genotype::Repeat,
        });
    }
}
