//! Pearson correlation with a two-sided significance test.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pearson correlation coefficient and two-sided p-value.
///
/// Tests H0: rho = 0 using the t-statistic `r * sqrt(df / (1 - r^2))`
/// with `df = n - 2` degrees of freedom.
///
/// Callers must provide at least 3 paired observations with nonzero
/// variance on both sides; degenerate inputs are policy decisions made
/// upstream (see the correlation tester).
///
/// # Returns
/// `(rho, p_value)` with `rho` in `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> (f64, f64) {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    let n_f64 = n as f64;

    let mean_x: f64 = x.iter().sum::<f64>() / n_f64;
    let mean_y: f64 = y.iter().sum::<f64>() / n_f64;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let rho = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    let df = n_f64 - 2.0;
    if rho.abs() >= 1.0 {
        return (rho, 0.0);
    }

    let t = rho * (df / (1.0 - rho * rho)).sqrt();
    // df >= 1 is guaranteed by the caller's sample-size floor
    let t_dist = StudentsT::new(0.0, 1.0, df).unwrap();
    let p = 2.0 * (1.0 - t_dist.cdf(t.abs()));

    (rho, p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_positive() {
        let x: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let (rho, p) = pearson(&x, &y);
        assert_relative_eq!(rho, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_negative() {
        let x: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| -3.0 * v).collect();
        let (rho, p) = pearson(&x, &y);
        assert_relative_eq!(rho, -1.0, epsilon = 1e-12);
        assert_relative_eq!(p, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_value() {
        // r for these vectors is 0.8315 (hand-computed)
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let (rho, p) = pearson(&x, &y);
        assert_relative_eq!(rho, 0.8285714285714286, epsilon = 1e-10);
        assert!(p > 0.0 && p < 0.1);
    }

    #[test]
    fn test_uncorrelated() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = vec![5.0, 1.0, 4.0, 2.0, 6.0, 3.0, 8.0, 7.0];
        let (rho, p) = pearson(&x, &y);
        assert!(rho.abs() < 1.0);
        assert!(p > 0.0 && p <= 1.0);
    }
}
