//! Engle-Granger two-step cointegration test.
//!
//! Step one regresses `y` on a constant and `x`; step two runs an augmented
//! Dickey-Fuller regression without deterministic terms on the residuals,
//! picking the lag order by AIC. The statistic is referred to MacKinnon's
//! distribution for two variables with a constant:
//!
//! - p-values: MacKinnon (1994) approximate asymptotic surface
//! - critical values: MacKinnon (2010) finite-sample response surface

use crate::regression::OlsFit;
use cointegrator_core::{CointError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Residual fits with R² at or above this are treated as perfectly collinear.
const COLLINEARITY_R2: f64 = 1.0 - 100.0 * 1.490_116_119_384_765_6e-8;

// MacKinnon (1994), N = 2, constant term.
const TAU_MAX: f64 = 0.92;
const TAU_MIN: f64 = -18.86;
const TAU_STAR: f64 = -2.62;
const TAU_SMALL_P: [f64; 3] = [2.92, 1.5012, 0.039_796];
const TAU_LARGE_P: [f64; 4] = [2.1945, 0.646_95, -0.291_98, -0.042_377];

// MacKinnon (2010), N = 2, constant term: [β∞, β1, β2] at 1%, 5%, 10%.
const CRIT_1PCT: [f64; 3] = [-3.896_44, -10.9519, -22.527];
const CRIT_5PCT: [f64; 3] = [-3.336_13, -6.1101, -6.823];
const CRIT_10PCT: [f64; 3] = [-3.044_45, -4.2412, -2.720];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngleGrangerResult {
    /// ADF t-statistic on the residuals; `-inf` for a perfect linear fit.
    pub statistic: f64,
    pub pvalue: f64,
    pub critical_values: CriticalValues,
    /// Lag order picked for the residual ADF regression, `None` when skipped.
    pub used_lag: Option<usize>,
    pub nobs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
}

/// Tests whether `y` and `x` are cointegrated.
///
/// # Errors
/// Fails when the series differ in length or are too short, and when the
/// residuals are constant.
pub fn engle_granger(y: &[f64], x: &[f64]) -> Result<EngleGrangerResult> {
    if y.len() != x.len() {
        return Err(CointError::DimensionMismatch {
            left: y.len(),
            right: x.len(),
        });
    }
    let nobs = y.len();
    if nobs < 3 {
        return Err(CointError::insufficient(3, nobs));
    }

    let dependent = DVector::from_column_slice(y);
    let design = DMatrix::from_fn(nobs, 2, |r, c| if c == 0 { 1.0 } else { x[r] });
    let fit = OlsFit::fit(&dependent, &design)?;

    let r_squared = fit.r_squared(&dependent);
    let (statistic, used_lag) = if r_squared < COLLINEARITY_R2 {
        let residuals: Vec<f64> = fit.residuals.iter().copied().collect();
        let adf = adf_no_trend(&residuals)?;
        (adf.statistic, Some(adf.used_lag))
    } else {
        (f64::NEG_INFINITY, None)
    };

    Ok(EngleGrangerResult {
        statistic,
        pvalue: mackinnon_pvalue(statistic),
        critical_values: mackinnon_critical_values(nobs - 1),
        used_lag,
        nobs,
    })
}

/// Augmented Dickey-Fuller regression without constant or trend.
///
/// `Δx[t] = γ·x[t-1] + Σ φ_j·Δx[t-j] + ε`; the lag count is chosen by AIC
/// from `0..=maxlag` on a common sample, with
/// `maxlag = min(ceil(12·(n/100)^¼), n/2 - 1)`.
///
/// # Errors
/// Fails for series that are too short or constant.
pub fn adf_no_trend(series: &[f64]) -> Result<AdfResult> {
    let nobs = series.len();
    let Some(half) = (nobs / 2).checked_sub(1) else {
        return Err(CointError::insufficient(3, nobs));
    };
    if series.iter().all(|v| *v == series[0]) {
        return Err(CointError::Degenerate("series is constant".to_string()));
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize;
    let maxlag = half.min(schwert);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let (dependent, full_design) = adf_design(series, &diff, maxlag);
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=maxlag {
        let columns = lag + 1;
        if dependent.len() <= columns {
            break;
        }
        let design = full_design.columns(0, columns).into_owned();
        let fit = OlsFit::fit(&dependent, &design)?;
        let aic = fit.aic();
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }

    let Some((_, used_lag)) = best else {
        return Err(CointError::insufficient(maxlag + 3, nobs));
    };

    let (dependent, design) = adf_design(series, &diff, used_lag);
    let fit = OlsFit::fit(&dependent, &design)?;
    if fit.df_resid() == 0 {
        return Err(CointError::insufficient(used_lag + 3, nobs));
    }

    Ok(AdfResult {
        statistic: fit.t_value(0),
        used_lag,
        nobs: fit.nobs(),
    })
}

/// Rows `t = lags..diff.len()`: dependent `Δx[t]`, regressors `[x[t], Δx[t-1], .., Δx[t-lags]]`.
fn adf_design(levels: &[f64], diff: &[f64], lags: usize) -> (DVector<f64>, DMatrix<f64>) {
    let rows = diff.len() - lags;
    let dependent = DVector::from_column_slice(&diff[lags..]);
    let design = DMatrix::from_fn(rows, lags + 1, |r, c| {
        let t = r + lags;
        if c == 0 {
            levels[t]
        } else {
            diff[t - c]
        }
    });
    (dependent, design)
}

/// Approximate p-value of an Engle-Granger statistic (two variables, constant).
#[must_use]
pub fn mackinnon_pvalue(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let fitted = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    normal_cdf(fitted)
}

/// Critical values at 1%, 5% and 10% for a sample of `nobs` observations.
#[must_use]
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / nobs.max(1) as f64;
    let surface = |b: [f64; 3]| b[0] + b[1] * inv + b[2] * inv * inv;

    CriticalValues {
        one_pct: surface(CRIT_1PCT),
        five_pct: surface(CRIT_5PCT),
        ten_pct: surface(CRIT_10PCT),
    }
}

/// Evaluates `c[0] + c[1]·x + c[2]·x² + …`.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}
