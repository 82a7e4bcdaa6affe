//! Log-domain diagonal Gaussian density.

const LOG_2PI: f64 = 1.837_877_066_409_345_4; // ln(2*pi)

/// Log-density of `x` under a diagonal Gaussian with the given per-component
/// means and variances.
///
/// All three slices must have the same length; variances must be positive.
/// Returns NEG_INFINITY when any component is non-finite, so a corrupt
/// observation ranks below every valid one instead of poisoning the filter
/// with NaN.
pub fn log_pdf_diag(x: &[f64], means: &[f64], vars: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), means.len());
    debug_assert_eq!(x.len(), vars.len());

    let mut log_prob = 0.0;
    for ((xi, mi), vi) in x.iter().zip(means.iter()).zip(vars.iter()) {
        if !xi.is_finite() || !mi.is_finite() || !(*vi > 0.0) {
            return f64::NEG_INFINITY;
        }
        let diff = xi - mi;
        log_prob += -0.5 * (diff * diff / vi + vi.ln() + LOG_2PI);
    }
    log_prob
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_standard_normal_at_mean() {
        // Univariate N(0, 1) density at 0 is 1/sqrt(2*pi).
        let expected = -(0.5 * LOG_2PI);
        assert!(approx_eq(log_pdf_diag(&[0.0], &[0.0], &[1.0]), expected, 1e-12));
    }

    #[test]
    fn test_density_decreases_away_from_mean() {
        let at_mean = log_pdf_diag(&[1.0, 2.0], &[1.0, 2.0], &[0.5, 0.5]);
        let off_mean = log_pdf_diag(&[2.0, 3.0], &[1.0, 2.0], &[0.5, 0.5]);
        assert!(at_mean > off_mean);
    }

    #[test]
    fn test_factorizes_over_components() {
        let joint = log_pdf_diag(&[0.3, -0.7], &[0.0, 0.0], &[1.0, 2.0]);
        let split =
            log_pdf_diag(&[0.3], &[0.0], &[1.0]) + log_pdf_diag(&[-0.7], &[0.0], &[2.0]);
        assert!(approx_eq(joint, split, 1e-12));
    }

    #[test]
    fn test_non_finite_observation_gets_no_mass() {
        assert_eq!(
            log_pdf_diag(&[f64::NAN], &[0.0], &[1.0]),
            f64::NEG_INFINITY
        );
        assert_eq!(
            log_pdf_diag(&[f64::INFINITY], &[0.0], &[1.0]),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_zero_variance_gets_no_mass() {
        assert_eq!(log_pdf_diag(&[0.0], &[0.0], &[0.0]), f64::NEG_INFINITY);
    }
}
