//! Hedge ratio, spread construction and series alignment.

use cointegrator_core::{AlignmentPolicy, CointError, Result};

/// Pairs two close series according to `policy`.
///
/// `Truncate` keeps the most recent observations of the longer series.
///
/// # Errors
/// Returns [`CointError::DimensionMismatch`] under `Strict` when lengths differ.
pub fn align<'a>(
    a: &'a [f64],
    b: &'a [f64],
    policy: AlignmentPolicy,
) -> Result<(&'a [f64], &'a [f64])> {
    if a.len() == b.len() {
        return Ok((a, b));
    }

    match policy {
        AlignmentPolicy::Strict => Err(CointError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        }),
        AlignmentPolicy::Truncate => {
            let len = a.len().min(b.len());
            Ok((&a[a.len() - len..], &b[b.len() - len..]))
        }
    }
}

/// No-intercept OLS coefficient of `a` regressed on `b`: `Σ a·b / Σ b²`.
///
/// # Errors
/// Fails on length mismatch, empty input, or an all-zero regressor.
pub fn hedge_ratio(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(CointError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(CointError::insufficient(1, 0));
    }

    let sxy: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let syy: f64 = b.iter().map(|y| y * y).sum();

    if syy == 0.0 {
        return Err(CointError::Degenerate(
            "hedge regressor is identically zero".to_string(),
        ));
    }

    Ok(sxy / syy)
}

/// `a[i] - hedge_ratio * b[i]`.
///
/// # Errors
/// Returns [`CointError::DimensionMismatch`] when lengths differ.
pub fn spread(a: &[f64], b: &[f64], hedge_ratio: f64) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(CointError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    Ok(a.iter().zip(b).map(|(x, y)| x - hedge_ratio * y).collect())
}

/// Number of adjacent values whose signs (-1, 0, +1) differ.
#[must_use]
pub fn zero_crossings(spread: &[f64]) -> usize {
    spread
        .windows(2)
        .filter(|w| sign(w[0]) != sign(w[1]))
        .count()
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
