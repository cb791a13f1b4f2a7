use anyhow::Result;
use tracing::{debug, info, warn};

use crate::ctx::Ctx;
use crate::error::Error;
use crate::math::{kmeans, optimize, stats};
use crate::pipeline::{Stage, ensure_plate};
use crate::plate::{Genotype, Plate, RegressionClass, Warning, classify_ratio};

pub const DEFAULT_INITIAL_GUESS: f64 = 2.0;
pub const CLUSTER_MAX_ITERATIONS: usize = 100;
// fixed seed, the calibrator must give identical output run to run
pub const KMEANS_SEED: u64 = 42;
pub const CENTER_SPREAD_LIMIT: f64 = 1.4;
pub const PENALTY_GROWTH: f64 = 1.1;
pub const RATIO_BAND_LO: f64 = 0.8;
pub const RATIO_BAND_HI: f64 = 1.2;
pub const STATIC_VALUE_LO: f64 = -4.0;
pub const STATIC_VALUE_HI: f64 = 4.0;
pub const ADJUST_RAISE_LO: f64 = 0.75;
pub const ADJUST_RAISE_HI: f64 = 1.0;
pub const ADJUST_LOWER_LIMIT: f64 = 0.7;

pub struct Stage4Software;

impl Stage4Software {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Software {
    fn name(&self) -> &'static str {
        "stage4_software"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ensure_plate(&ctx.plate, "stage4_software", "delta_ct")?;
        let delta_cts: Vec<f64> = ctx
            .plate
            .wells
            .iter()
            .filter(|w| {
                w.regression == RegressionClass::SafeZone
                    && matches!(w.warning, Warning::None | Warning::LowRfu)
            })
            .filter_map(|w| w.delta_ct)
            .collect();
        if delta_cts.is_empty() {
            info!("no safe-zone wells with a delta Ct, software calibration skipped");
            return Ok(());
        }
        let static_value = derive_static_value(&delta_cts, ctx.config.cluster_count)?;
        let carrier = ctx.config.carrier_threshold();
        let uncertain = ctx.config.uncertain_threshold();
        apply_software(&mut ctx.plate, static_value, carrier, uncertain);
        recenter(&mut ctx.plate, carrier, uncertain);
        ctx.static_value = Some(static_value);
        ctx.software_applied = true;
        let called = ctx
            .plate
            .wells
            .iter()
            .filter(|w| w.software_call.is_some())
            .count();
        info!(static_value, called, "software_calibration_applied");
        Ok(())
    }
}

pub fn derive_static_value(delta_cts: &[f64], cluster_count: usize) -> Result<f64> {
    let clustering = kmeans::cluster(
        delta_cts,
        cluster_count,
        CLUSTER_MAX_ITERATIONS,
        KMEANS_SEED,
    );
    let mut centers: Vec<(f64, usize)> = clustering
        .centers
        .iter()
        .zip(clustering.counts.iter())
        .filter(|&(_, &count)| count > 0)
        .map(|(&center, &count)| (center, count))
        .collect();
    if centers.iter().any(|(center, _)| !center.is_finite()) {
        return Err(Error::Calibration("cluster centers are not finite".into()).into());
    }
    centers.sort_by(|a, b| a.0.total_cmp(&b.0));

    let initial_guess = initial_guess(&centers, stats::population_std(delta_cts));
    if !initial_guess.is_finite() {
        return Err(Error::Calibration(format!(
            "initial guess is not finite (centers {centers:?})"
        ))
        .into());
    }

    let candidates: Vec<f64> = delta_cts
        .iter()
        .copied()
        .filter(|&d| {
            let ratio = (-(d - initial_guess)).exp2();
            (RATIO_BAND_LO..=RATIO_BAND_HI).contains(&ratio)
        })
        .collect();
    let optimum = if candidates.is_empty() {
        debug!(initial_guess, "no wells in the healthy band, keeping the initial guess");
        initial_guess
    } else {
        let objective = |x: f64| {
            candidates
                .iter()
                .map(|&d| {
                    let log_ratio = -(d - x);
                    log_ratio * log_ratio
                })
                .sum::<f64>()
                / candidates.len() as f64
        };
        let result = optimize::minimize_bounded(
            objective,
            initial_guess.clamp(STATIC_VALUE_LO, STATIC_VALUE_HI),
            STATIC_VALUE_LO,
            STATIC_VALUE_HI,
            &optimize::MinimizeConfig::default(),
        )
        .map_err(|err| Error::Calibration(err.to_string()))?;
        if !result.converged {
            warn!(
                iterations = result.iterations,
                "static value optimizer stopped before convergence"
            );
        }
        result.x
    };
    Ok(round2(optimum))
}

// centers must be nonempty clusters sorted ascending
pub fn initial_guess(centers: &[(f64, usize)], delta_std: f64) -> f64 {
    if centers.len() < 3 {
        if centers.is_empty() {
            return DEFAULT_INITIAL_GUESS;
        }
        return centers.iter().map(|(center, _)| center).sum::<f64>() / centers.len() as f64;
    }
    let (m1, c1) = centers[0];
    let (m2, c2) = centers[1];
    let (m3, c3) = centers[2];
    let spread = m3 / m1;
    // a wide spread means carrier wells drag the third center up
    let third = if spread > CENTER_SPREAD_LIMIT {
        let beta = 1.0 + delta_std / 2.0;
        let penalty =
            (spread - CENTER_SPREAD_LIMIT).powf(beta) * m1 * PENALTY_GROWTH.powi(c1 as i32);
        m3 - penalty
    } else {
        m3
    };
    let total = (c1 + c2 + c3) as f64;
    (c1 as f64 * m1 + c2 as f64 * m2 + c3 as f64 * third) / total
}

pub fn apply_software(plate: &mut Plate, static_value: f64, carrier: f64, uncertain: f64) {
    for w in &mut plate.wells {
        if w.warning == Warning::EmptyWell {
            continue;
        }
        w.software_ratio = w.delta_ct.map(|d| (-(d - static_value)).exp2());
        w.software_call = w
            .software_ratio
            .map(|r| classify_ratio(r, carrier, uncertain));
    }
}

pub fn recenter(plate: &mut Plate, carrier: f64, uncertain: f64) {
    let candidates: Vec<f64> = plate
        .wells
        .iter()
        .filter(|w| {
            w.software_call == Some(Genotype::Healthy) && w.regression == RegressionClass::SafeZone
        })
        .filter_map(|w| w.software_ratio)
        .filter(|r| (RATIO_BAND_LO..=RATIO_BAND_HI).contains(r))
        .collect();
    if candidates.is_empty() {
        debug!("no centering candidates, ratios left as computed");
        return;
    }
    let diff = 1.0 - stats::mean(&candidates);
    if diff > 0.0 {
        for w in &mut plate.wells {
            if let Some(r) = w.software_ratio {
                if r > ADJUST_RAISE_LO && r < ADJUST_RAISE_HI {
                    w.software_ratio = Some(r + diff);
                }
            }
        }
    } else if diff < 0.0 {
        for w in &mut plate.wells {
            if let Some(r) = w.software_ratio {
                if r < ADJUST_LOWER_LIMIT {
                    w.software_ratio = Some(r + diff);
                }
            }
        }
    } else {
        return;
    }
    for w in &mut plate.wells {
        if w.warning == Warning::EmptyWell {
            continue;
        }
        w.software_call = w
            .software_ratio
            .map(|r| classify_ratio(r, carrier, uncertain));
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
