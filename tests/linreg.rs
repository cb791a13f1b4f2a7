use kira_ampliqc::math::linreg::{fit, residuals};

#[test]
fn fit_exact_line() {
    let xs = vec![1.0, 2.0, 3.0, 4.0];
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
    let f = fit(&xs, &ys);
    assert!((f.slope - 2.0).abs() < 1e-9);
    assert!((f.intercept - 1.0).abs() < 1e-9);
    for r in residuals(&f, &xs, &ys) {
        assert!(r.abs() < 1e-9);
    }
}

#[test]
fn fit_noisy_line() {
    let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs
        .iter()
        .enumerate()
        .map(|(i, x)| 0.5 * x + if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    let f = fit(&xs, &ys);
    assert!((f.slope - 0.5).abs() < 0.05);
}

#[test]
fn fit_degenerate_x_spread() {
    let xs = vec![3.0, 3.0, 3.0];
    let ys = vec![1.0, 2.0, 6.0];
    let f = fit(&xs, &ys);
    assert_eq!(f.slope, 0.0);
    assert!((f.intercept - 3.0).abs() < 1e-9);
}

#[test]
fn fit_empty() {
    let f = fit(&[], &[]);
    assert_eq!(f.slope, 0.0);
    assert_eq!(f.intercept, 0.0);
}
