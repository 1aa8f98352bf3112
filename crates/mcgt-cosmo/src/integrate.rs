//! Quadrature helpers for the distance and sound-horizon integrals.

use mcgt_core::errors::{ErrorInfo, McgtError};

fn check_interval(a: f64, b: f64, n: usize, minimum: usize) -> Result<(), McgtError> {
    if !(a.is_finite() && b.is_finite()) {
        return Err(McgtError::Integration(
            ErrorInfo::new("quadrature-bounds", "integration bounds must be finite")
                .with_context("a", a.to_string())
                .with_context("b", b.to_string()),
        ));
    }
    if n < minimum {
        return Err(McgtError::Integration(
            ErrorInfo::new("quadrature-intervals", "too few intervals")
                .with_context("n", n.to_string())
                .with_context("minimum", minimum.to_string()),
        ));
    }
    Ok(())
}

/// Composite trapezoid rule with `n` intervals.
pub fn trapezoid<F>(mut f: F, a: f64, b: f64, n: usize) -> Result<f64, McgtError>
where
    F: FnMut(f64) -> Result<f64, McgtError>,
{
    check_interval(a, b, n, 1)?;
    let h = (b - a) / n as f64;
    let mut sum = 0.5 * (f(a)? + f(b)?);
    for i in 1..n {
        sum += f(a + i as f64 * h)?;
    }
    Ok(sum * h)
}

/// Composite Simpson rule; `n` must be even and at least 2.
pub fn simpson<F>(mut f: F, a: f64, b: f64, n: usize) -> Result<f64, McgtError>
where
    F: FnMut(f64) -> Result<f64, McgtError>,
{
    check_interval(a, b, n, 2)?;
    if n % 2 != 0 {
        return Err(McgtError::Integration(
            ErrorInfo::new("quadrature-intervals", "simpson rule needs an even interval count")
                .with_context("n", n.to_string()),
        ));
    }
    let h = (b - a) / n as f64;
    let mut sum = f(a)? + f(b)?;
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h)?;
    }
    Ok(sum * h / 3.0)
}

/// Running trapezoid integral of tabulated `y(x)`; the first entry is zero.
pub fn cumulative_trapezoid(x: &[f64], y: &[f64]) -> Result<Vec<f64>, McgtError> {
    if x.len() != y.len() || x.is_empty() {
        return Err(McgtError::Integration(
            ErrorInfo::new("quadrature-samples", "abscissae and ordinates must match and be non-empty")
                .with_context("x", x.len().to_string())
                .with_context("y", y.len().to_string()),
        ));
    }
    let mut out = Vec::with_capacity(x.len());
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..x.len() {
        acc += 0.5 * (x[i] - x[i - 1]) * (y[i] + y[i - 1]);
        out.push(acc);
    }
    Ok(out)
}
