//! Ordinary least squares on dense matrices.

use cointegrator_core::{CointError, Result};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Singular values below this fraction of the largest are treated as zero.
const PINV_RCOND: f64 = 1e-15;

/// A fitted OLS model `y = X·β + ε`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// `X⁺·X⁺ᵀ`, the unscaled parameter covariance.
    normalized_cov: DMatrix<f64>,
}

impl OlsFit {
    /// Fits through the SVD pseudo-inverse of `X`, so nearly collinear
    /// regressors still get the minimum-norm solution.
    ///
    /// # Errors
    /// Fails when the lengths disagree, when there are fewer rows than
    /// regressors, or when the decomposition does not converge.
    pub fn fit(y: &DVector<f64>, x: &DMatrix<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(CointError::DimensionMismatch {
                left: y.len(),
                right: x.nrows(),
            });
        }
        if x.nrows() < x.ncols() {
            return Err(CointError::insufficient(x.ncols(), x.nrows()));
        }

        let svd = x.clone().svd(true, true);
        let cutoff = PINV_RCOND * svd.singular_values.max();
        let pinv = svd
            .pseudo_inverse(cutoff)
            .map_err(|e| CointError::Degenerate(e.to_string()))?;

        let params = &pinv * y;
        let residuals = y - x * &params;
        let ssr = residuals.norm_squared();
        let normalized_cov = &pinv * pinv.transpose();

        Ok(Self {
            params,
            residuals,
            ssr,
            normalized_cov,
        })
    }

    #[must_use]
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    #[must_use]
    pub fn df_resid(&self) -> usize {
        self.nobs().saturating_sub(self.params.len())
    }

    /// t-statistic of coefficient `i`, using the unbiased residual variance.
    #[must_use]
    pub fn t_value(&self, i: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let scale = self.ssr / self.df_resid() as f64;
        self.params[i] / (scale * self.normalized_cov[(i, i)]).sqrt()
    }

    /// Gaussian log-likelihood at the fitted parameters.
    #[must_use]
    pub fn log_likelihood(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.nobs() as f64;
        -0.5 * n * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every regressor as a parameter.
    #[must_use]
    pub fn aic(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let k = self.params.len() as f64;
        -2.0 * self.log_likelihood() + 2.0 * k
    }

    /// Centered R² against the dependent variable the model was fitted on.
    #[must_use]
    pub fn r_squared(&self, y: &DVector<f64>) -> f64 {
        let mean = y.mean();
        let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        1.0 - self.ssr / tss
    }
}
