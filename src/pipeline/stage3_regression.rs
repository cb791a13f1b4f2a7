use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::math::{linreg, stats};
use crate::pipeline::{Stage, ensure_plate};
use crate::plate::{RegressionClass, Warning};

pub const ITERATIVE_MIN_ROWS: usize = 50;
pub const MAX_ROUNDS: usize = 10;
pub const RESIDUAL_THRESHOLD: f64 = 2.0;
pub const RESIDUAL_BAND_WIDTH: f64 = 10.0;
pub const RESIDUAL_SIGMA_FACTOR: f64 = 2.2;
pub const MODIFIED_Z_LIMIT: f64 = 3.5;
pub const MAD_MIN_SURVIVORS: usize = 3;

pub struct Stage3Regression;

impl Stage3Regression {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Regression {
    fn name(&self) -> &'static str {
        "stage3_regression"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ensure_plate(&ctx.plate, "stage3_regression", "hex_ct")?;
        let subset: Vec<usize> = ctx
            .plate
            .wells
            .iter()
            .enumerate()
            .filter(|(_, w)| w.hex_ct.is_some())
            .map(|(i, _)| i)
            .collect();
        let xs: Vec<f64> = subset
            .iter()
            .map(|&i| ctx.plate.wells[i].fam_endpoint)
            .collect();
        let ys: Vec<f64> = subset
            .iter()
            .map(|&i| ctx.plate.wells[i].hex_endpoint)
            .collect();
        let keep = if subset.len() > ITERATIVE_MIN_ROWS {
            iterative_fit(&xs, &ys)
        } else {
            mad_fit(&xs, &ys)
        };
        for (k, &i) in subset.iter().enumerate() {
            ctx.plate.wells[i].regression = if keep[k] {
                RegressionClass::SafeZone
            } else {
                RegressionClass::RiskyArea
            };
        }
        // flagged wells never participate, whatever the fit said
        for w in &mut ctx.plate.wells {
            if matches!(w.warning, Warning::EmptyWell | Warning::InsufficientDna) {
                w.regression = RegressionClass::NotApplicable;
            }
        }
        let safe = ctx
            .plate
            .wells
            .iter()
            .filter(|w| w.regression == RegressionClass::SafeZone)
            .count();
        let risky = ctx
            .plate
            .wells
            .iter()
            .filter(|w| w.regression == RegressionClass::RiskyArea)
            .count();
        info!(
            subset = subset.len(),
            safe,
            risky,
            "regression_classified"
        );
        Ok(())
    }
}

pub fn iterative_fit(xs: &[f64], ys: &[f64]) -> Vec<bool> {
    let mut retained: Vec<usize> = (0..xs.len()).collect();
    for _ in 0..MAX_ROUNDS {
        if retained.len() < 2 {
            break;
        }
        let rx: Vec<f64> = retained.iter().map(|&i| xs[i]).collect();
        let ry: Vec<f64> = retained.iter().map(|&i| ys[i]).collect();
        let fit = linreg::fit(&rx, &ry);
        let res = linreg::residuals(&fit, &rx, &ry);
        let sigma = stats::population_std(&res);
        let lo = RESIDUAL_THRESHOLD - RESIDUAL_SIGMA_FACTOR * sigma;
        let hi = RESIDUAL_THRESHOLD + RESIDUAL_BAND_WIDTH + RESIDUAL_SIGMA_FACTOR * sigma;
        let next: Vec<usize> = retained
            .iter()
            .copied()
            .filter(|&i| {
                let r = (ys[i] - fit.predict(xs[i])).abs();
                r >= lo && r <= hi
            })
            .collect();
        if next.len() >= retained.len() {
            break;
        }
        retained = next;
    }
    let mut keep = vec![false; xs.len()];
    for i in retained {
        keep[i] = true;
    }
    keep
}

// a zero MAD or too few survivors keeps everything
pub fn mad_fit(xs: &[f64], ys: &[f64]) -> Vec<bool> {
    let n = xs.len();
    if n == 0 {
        return Vec::new();
    }
    let fit = linreg::fit(xs, ys);
    let res = linreg::residuals(&fit, xs, ys);
    let mut scratch = res.clone();
    let med = stats::median(&mut scratch);
    let mut scratch = res.clone();
    let mad = stats::mad(&mut scratch, med);
    if mad == 0.0 {
        return vec![true; n];
    }
    let keep: Vec<bool> = res
        .iter()
        .map(|&r| stats::modified_z(r, med, mad).abs() <= MODIFIED_Z_LIMIT)
        .collect();
    if keep.iter().filter(|&&k| k).count() < MAD_MIN_SURVIVORS {
        return vec![true; n];
    }
    keep
}
