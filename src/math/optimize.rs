use anyhow::{Result, bail};

#[derive(Debug, Clone)]
pub struct MinimizeConfig {
    pub max_iterations: usize,
    pub convergence_threshold: f64,
    pub gradient_step: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-8,
            gradient_step: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinimizeResult {
    pub x: f64,
    pub fx: f64,
    pub iterations: usize,
    pub converged: bool,
}

// the difference stencil samples just outside the bounds, so the
// objective must stay evaluable there
pub fn minimize_bounded<F>(
    f: F,
    x0: f64,
    lo: f64,
    hi: f64,
    config: &MinimizeConfig,
) -> Result<MinimizeResult>
where
    F: Fn(f64) -> f64,
{
    if !(lo < hi) {
        bail!("invalid bounds: [{lo}, {hi}]");
    }
    let mut x = x0.clamp(lo, hi);
    let mut fx = eval(&f, x)?;
    let mut prev: Option<(f64, f64)> = None;
    let mut iterations = 0;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iterations += 1;
        let g = gradient(&f, x, config.gradient_step)?;
        if g.abs() < config.convergence_threshold {
            converged = true;
            break;
        }
        let curvature = match prev {
            Some((px, pg)) if (x - px).abs() > f64::EPSILON => {
                let h = ((g - pg) / (x - px)).abs();
                if h > 1e-12 { h } else { 1.0 }
            }
            _ => 1.0,
        };
        prev = Some((x, g));
        let mut step = -g / curvature;
        let mut next = (x + step).clamp(lo, hi);
        let mut fnext = eval(&f, next)?;
        let mut backtracks = 0;
        while fnext > fx && backtracks < 30 {
            step *= 0.5;
            next = (x + step).clamp(lo, hi);
            fnext = eval(&f, next)?;
            backtracks += 1;
        }
        if fnext > fx {
            // no descending step inside the bounds
            converged = true;
            break;
        }
        let shift = (next - x).abs();
        x = next;
        fx = fnext;
        if shift < config.convergence_threshold {
            converged = true;
            break;
        }
    }
    Ok(MinimizeResult {
        x,
        fx,
        iterations,
        converged,
    })
}

fn gradient<F: Fn(f64) -> f64>(f: &F, x: f64, h: f64) -> Result<f64> {
    let hi = eval(f, x + h)?;
    let lo = eval(f, x - h)?;
    Ok((hi - lo) / (2.0 * h))
}

fn eval<F: Fn(f64) -> f64>(f: &F, x: f64) -> Result<f64> {
    let v = f(x);
    if !v.is_finite() {
        bail!("objective is not finite at x = {x}");
    }
    Ok(v)
}
