use crate::errors::{GpError, Result};
use crate::kernels::IsotropicKernel;
use crate::mean_models::MeanFunction;
use crate::multivariate_normal::MultivariateNormal;
use crate::points::IntoPoints;
use linfa::{Float, ParamGuard};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Lower bound of the gaussian likelihood noise variance applied to its default
pub const GP_NOISE_VAR_FLOOR: f64 = 1e-4;

/// Default variance of the gaussian likelihood noise, `softplus(0) + 1e-4`
pub const GP_DEFAULT_NOISE_VAR: f64 = std::f64::consts::LN_2 + GP_NOISE_VAR_FLOOR;

/// A set of validated exact inference GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Mean: Serialize, Kern: Serialize",
        deserialize = "F: Deserialize<'de>, Mean: Deserialize<'de>, Kern: Deserialize<'de>"
    ))
)]
pub struct ExactGpValidParams<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> {
    /// Mean function representing the prior mean m(x)
    pub(crate) mean: Mean,
    /// Kernel representing the prior covariance k(x, x')
    pub(crate) kernel: Kern,
    /// Length scale overriding the kernel one
    pub(crate) prior_length: Option<F>,
    /// Signal variance overriding the kernel one
    pub(crate) prior_var: Option<F>,
    /// Variance of the gaussian likelihood noise
    pub(crate) noise_var: F,
    /// Parameter to improve numerical stability
    pub(crate) jitter: F,
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> Default
    for ExactGpValidParams<F, Mean, Kern>
{
    fn default() -> ExactGpValidParams<F, Mean, Kern> {
        ExactGpValidParams {
            mean: Mean::default(),
            kernel: Kern::default(),
            prior_length: None,
            prior_var: None,
            noise_var: F::cast(GP_DEFAULT_NOISE_VAR),
            jitter: F::cast(100.0) * F::epsilon(),
        }
    }
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> ExactGpValidParams<F, Mean, Kern> {
    /// Get mean function
    pub fn mean(&self) -> &Mean {
        &self.mean
    }

    /// Get kernel as given, without prior overrides
    pub fn kernel(&self) -> &Kern {
        &self.kernel
    }

    /// Get length scale override
    pub fn prior_length(&self) -> Option<F> {
        self.prior_length
    }

    /// Get signal variance override
    pub fn prior_var(&self) -> Option<F> {
        self.prior_var
    }

    /// Get likelihood noise variance
    pub fn noise_var(&self) -> F {
        self.noise_var
    }

    /// Get jitter
    pub fn jitter(&self) -> F {
        self.jitter
    }

    /// Kernel with prior overrides applied:
    /// length scale set to `prior_length` and sigma to `sqrt(prior_var)` when given
    pub fn prior_kernel(&self) -> Kern {
        let mut kernel = self.kernel.clone();
        if let Some(length) = self.prior_length {
            kernel.set_length(length);
        }
        if let Some(var) = self.prior_var {
            kernel.set_sigma(var.sqrt());
        }
        kernel
    }

    /// GP prior at the given points, not conditioned on any data:
    /// the mean function values and the prior kernel self covariance.
    pub fn forward<'a>(&self, x: impl IntoPoints<'a, F>) -> Result<MultivariateNormal<F>> {
        let x = x.into_points()?;
        let mean = self.mean.value(&x);
        let covariance = self.prior_kernel().matrix(&x, &x)?;
        MultivariateNormal::new(mean, covariance)
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [exact inference GP algorithm](crate::ExactInferenceGp).
pub struct ExactGpParams<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>>(
    ExactGpValidParams<F, Mean, Kern>,
);

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> ExactGpParams<F, Mean, Kern> {
    /// A constructor for GP parameters given mean function and kernel
    pub fn new(mean: Mean, kernel: Kern) -> ExactGpParams<F, Mean, Kern> {
        Self(ExactGpValidParams {
            mean,
            kernel,
            ..Default::default()
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &ExactGpValidParams<F, Mean, Kern>) -> Self {
        Self(params.clone())
    }

    /// Set mean function.
    pub fn mean(mut self, mean: Mean) -> Self {
        self.0.mean = mean;
        self
    }

    /// Set kernel.
    pub fn kernel(mut self, kernel: Kern) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set the prior length scale, `None` keeps the kernel one.
    pub fn prior_length(mut self, prior_length: Option<F>) -> Self {
        self.0.prior_length = prior_length;
        self
    }

    /// Set the prior signal variance, `None` keeps the kernel one.
    pub fn prior_var(mut self, prior_var: Option<F>) -> Self {
        self.0.prior_var = prior_var;
        self
    }

    /// Set the variance of the gaussian likelihood noise.
    pub fn noise_var(mut self, noise_var: F) -> Self {
        self.0.noise_var = noise_var;
        self
    }

    /// Set jitter.
    ///
    /// Jitter is added to the covariance diagonal to improve numerical stability
    pub fn jitter(mut self, jitter: F) -> Self {
        self.0.jitter = jitter;
        self
    }
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>>
    From<ExactGpValidParams<F, Mean, Kern>> for ExactGpParams<F, Mean, Kern>
{
    fn from(valid: ExactGpValidParams<F, Mean, Kern>) -> Self {
        ExactGpParams(valid)
    }
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> ParamGuard
    for ExactGpParams<F, Mean, Kern>
{
    type Checked = ExactGpValidParams<F, Mean, Kern>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        for (name, value) in [
            ("prior_length", self.0.prior_length),
            ("prior_var", self.0.prior_var),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= F::zero() {
                    return Err(GpError::InvalidValueError(format!(
                        "`{name}` should be finite and strictly positive, got {v}"
                    )));
                }
            }
        }
        for (name, v) in [("noise_var", self.0.noise_var), ("jitter", self.0.jitter)] {
            if !v.is_finite() || v < F::zero() {
                return Err(GpError::InvalidValueError(format!(
                    "`{name}` should be finite and positive, got {v}"
                )));
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{AbsoluteExponential, SquaredExponential};
    use crate::mean_models::{ConstantMean, ZeroMean};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_params() {
        let params = ExactGpParams::new(ZeroMean(), SquaredExponential::<f64>::default())
            .check()
            .unwrap();
        assert_abs_diff_eq!(std::f64::consts::LN_2 + 1e-4, params.noise_var());
        assert_abs_diff_eq!(100. * f64::EPSILON, params.jitter());
        assert_eq!(None, params.prior_length());
        assert_eq!(None, params.prior_var());
        assert_eq!(SquaredExponential::default(), params.prior_kernel());
    }

    #[test]
    fn test_prior_kernel() {
        let params = ExactGpParams::new(ConstantMean::new(1.), AbsoluteExponential::new(1., 1.))
            .prior_length(Some(0.5))
            .prior_var(Some(4.))
            .check()
            .unwrap();
        assert_eq!(AbsoluteExponential::new(2., 0.5), params.prior_kernel());
        assert_eq!(&AbsoluteExponential::new(1., 1.), params.kernel());
    }

    #[test]
    fn test_prior_without_data() {
        let params = ExactGpParams::new(ZeroMean(), AbsoluteExponential::new(1., 2.))
            .check()
            .unwrap();
        let prior = params.forward(&[0., 2.]).unwrap();
        let e = f64::exp(-1.);
        assert_eq!(&ndarray::array![0., 0.], prior.mean());
        assert_abs_diff_eq!(
            &ndarray::array![[1., e], [e, 1.]],
            prior.covariance(),
            epsilon = 1e-12
        );

        let params = ExactGpParams::new(ConstantMean::new(1.5), SquaredExponential::new(1., 1.))
            .prior_var(Some(4.))
            .check()
            .unwrap();
        let prior = params.forward(&[[0., 0.], [3., 4.], [1., 1.]]).unwrap();
        assert_eq!(3, prior.dim());
        assert_eq!(&ndarray::array![1.5, 1.5, 1.5], prior.mean());
        assert_abs_diff_eq!(ndarray::array![4., 4., 4.], prior.variance(), epsilon = 1e-12);
        assert!(matches!(
            params.forward(vec![vec![0., 1.], vec![2.]]),
            Err(GpError::TypeConversionError(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let base = ExactGpParams::new(ZeroMean(), SquaredExponential::<f64>::default());
        for params in [
            base.clone().prior_length(Some(0.)),
            base.clone().prior_length(Some(-1.)),
            base.clone().prior_var(Some(f64::NAN)),
            base.clone().noise_var(-1e-3),
            base.clone().noise_var(f64::INFINITY),
            base.clone().jitter(-1.),
        ] {
            assert!(matches!(
                params.check_ref(),
                Err(GpError::InvalidValueError(_))
            ));
        }
        assert!(base.noise_var(0.).jitter(0.).check().is_ok());
    }
}
