use anyhow::Result;
use tracing::info;

use crate::ctx::{Ctx, ReferenceOutcome, ResultSource};
use crate::error::Error;
use crate::pipeline::{Stage, ensure_plate};

pub struct Stage5Finalize;

impl Stage5Finalize {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Finalize {
    fn name(&self) -> &'static str {
        "stage5_finalize"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ensure_plate(&ctx.plate, "stage5_finalize", "well_id")?;
        // the reference column only wins when it was actually applied
        let source = match (&ctx.reference, ctx.config.use_software_result) {
            (Some(ReferenceOutcome::Applied { .. }), false) => ResultSource::Reference,
            (Some(_), _) | (None, true) => ResultSource::Software,
            (None, false) => {
                return Err(Error::MissingColumn {
                    stage: "stage5_finalize",
                    column: "reference_result",
                }
                .into());
            }
        };
        if source == ResultSource::Software && !ctx.software_applied {
            return Err(Error::MissingColumn {
                stage: "stage5_finalize",
                column: "software_result",
            }
            .into());
        }
        for w in &mut ctx.plate.wells {
            w.patient_number = Some(w.well.patient_number());
            w.final_call = match source {
                ResultSource::Reference => w.reference_call,
                ResultSource::Software => w.software_call,
            };
        }
        ctx.plate.wells.sort_by_key(|w| w.patient_number);
        ctx.result_source = Some(source);
        info!(source = source.as_str(), "results_finalized");
        Ok(())
    }
}
