use crate::math::stats;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn fit(xs: &[f64], ys: &[f64]) -> LinearFit {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }
    let n = xs.len() as f64;
    let mean_x = stats::mean(xs);
    let mean_y = stats::mean(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx / n < 1e-12 {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
        };
    }
    LinearFit {
        slope: sxy / sxx,
        intercept: mean_y - (sxy / sxx) * mean_x,
    }
}

pub fn residuals(fit: &LinearFit, xs: &[f64], ys: &[f64]) -> Vec<f64> {
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| y - fit.predict(x))
        .collect()
}
