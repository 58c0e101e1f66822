use crate::distance::pairwise_distances;
use crate::errors::{GpError, Result};
use crate::kernels::IsotropicKernel;
use crate::mean_models::MeanFunction;
use crate::multivariate_normal::MultivariateNormal;
use crate::parameters::{ExactGpParams, ExactGpValidParams};
use crate::points::IntoPoints;

use linfa::prelude::{DatasetBase, Fit, Float, PredictInplace};
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use log::{debug, warn};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// An exact inference GP regression models the observed outputs as
///
/// `y = f(x) + eps`
///
/// where:
/// * `f` is a gaussian process with prior `GP(m(x), k(x, x'))`,
///   `m` being the mean function and `k` an isotropic kernel,
/// * `eps ~ Normal(0, noise_var)` is the gaussian likelihood noise.
///
/// Fitting conditions the prior on the training data in closed form:
/// hyperparameters are not optimized, they are the ones given in [ExactGpParams]
/// (kernel hyperparameters possibly overridden by `prior_length` and `prior_var`).
///
/// # Example
///
/// ```no_run
/// use gpkit::{mean_models::ZeroMean, ExactInferenceGp, SquaredExponential};
/// use linfa::prelude::*;
/// use ndarray::{arr2, Array, Array1, Array2, Axis};
///
/// // one-dimensional test function to approximate
/// fn xsinx(x: &Array2<f64>) -> Array1<f64> {
///     ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
/// }
///
/// // training data
/// let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
/// let yt = xsinx(&xt);
///
/// let gp = ExactInferenceGp::<f64, ZeroMean, SquaredExponential<f64>>::params(
///         ZeroMean(),
///         SquaredExponential::new(5., 4.),
///     )
///     .noise_var(1e-6)
///     .fit(&Dataset::new(xt, yt))
///     .expect("GP fitted");
///
/// let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
/// let posterior = gp.posterior(&xtest).expect("GP posterior");
/// let (lower, upper) = posterior.confidence_region();
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Mean: Serialize, Kern: Serialize",
        deserialize = "F: Deserialize<'de>, Mean: Deserialize<'de>, Kern: Deserialize<'de>"
    ))
)]
pub struct ExactInferenceGp<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> {
    /// Kernel with prior overrides applied
    kernel: Kern,
    /// Cholesky decomposition of the training covariance `K + (noise_var + jitter) I`
    l_chol: Array2<F>,
    /// Solution of `(K + (noise_var + jitter) I) alpha = y - m(X)`
    alpha: Array1<F>,
    /// Log marginal likelihood of the training outputs
    log_likelihood: F,
    /// Training dataset (input, output)
    training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    params: ExactGpValidParams<F, Mean, Kern>,
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> fmt::Display
    for ExactInferenceGp<F, Mean, Kern>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ExactGP(mean={}, kernel={}, noise_var={}, likelihood={})",
            self.params.mean, self.kernel, self.params.noise_var, self.log_likelihood,
        )
    }
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>> ExactInferenceGp<F, Mean, Kern> {
    /// Gp parameters contructor
    pub fn params<NewMean: MeanFunction<F>, NewKern: IsotropicKernel<F>>(
        mean: NewMean,
        kernel: NewKern,
    ) -> ExactGpParams<F, NewMean, NewKern> {
        ExactGpParams::new(mean, kernel)
    }

    /// GP prior at the given points: the mean function values
    /// and the kernel self covariance.
    ///
    /// The prior does not depend on training data, see [ExactGpValidParams::forward]
    /// to get it without fitting.
    pub fn forward<'a>(&self, x: impl IntoPoints<'a, F>) -> Result<MultivariateNormal<F>> {
        self.params.forward(x)
    }

    /// Length scale of the prior kernel
    pub fn prior_length(&self) -> F {
        self.kernel.length()
    }

    /// Signal variance of the prior kernel
    pub fn prior_var(&self) -> F {
        self.kernel.variance()
    }

    /// Variance of the gaussian likelihood noise
    pub fn noise_var(&self) -> F {
        self.params.noise_var
    }

    /// Predict output values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let k_star = self.kernel.matrix(x, &self.training_data.0)?;
        Ok(self.params.mean.value(x) + k_star.dot(&self.alpha))
    }

    /// Predict latent variance values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n variance values as (n,) column vector.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let k_star = self.kernel.matrix(x, &self.training_data.0)?;
        self.compute_variance(x, &k_star)
    }

    /// Predict both output values and variance at n given `x` points of nx components
    pub fn predict_valvar(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let k_star = self.kernel.matrix(x, &self.training_data.0)?;
        let mean = self.params.mean.value(x) + k_star.dot(&self.alpha);
        let var = self.compute_variance(x, &k_star)?;
        Ok((mean, var))
    }

    /// Posterior distribution of the latent function at the given `x` points
    /// with its full covariance matrix
    pub fn posterior(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<MultivariateNormal<F>> {
        let k_star = self.kernel.matrix(x, &self.training_data.0)?;
        let mean = self.params.mean.value(x) + k_star.dot(&self.alpha);
        let v = self.l_chol.solve_triangular(&k_star.t(), UPLO::Lower)?;
        let covariance = self.kernel.matrix(x, x)? - v.t().dot(&v);
        MultivariateNormal::new(mean, covariance)
    }

    /// Predictive distribution of the observations at the given `x` points,
    /// i.e. the posterior with the likelihood noise added to the diagonal
    pub fn predictive(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<MultivariateNormal<F>> {
        let posterior = self.posterior(x)?;
        let noise = Array2::<F>::eye(posterior.dim()) * self.params.noise_var;
        MultivariateNormal::new(posterior.mean().to_owned(), posterior.covariance() + &noise)
    }

    /// Log marginal likelihood of the training outputs
    pub fn log_marginal_likelihood(&self) -> F {
        self.log_likelihood
    }

    /// Prior kernel, hyperparameters overrides applied
    pub fn kernel(&self) -> &Kern {
        &self.kernel
    }

    /// Mean function
    pub fn mean(&self) -> &Mean {
        &self.params.mean
    }

    /// Retrieve number of input and output dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.training_data.0.ncols(), 1)
    }

    /// Training data (input, output)
    pub fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    fn compute_variance(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        k_star: &Array2<F>,
    ) -> Result<Array1<F>> {
        let v = self.l_chol.solve_triangular(&k_star.t(), UPLO::Lower)?;
        let var = self.kernel.diag(x)? - v.mapv(|v| v * v).sum_axis(Axis(0));
        // Variance might be slightly negative depending on
        // machine precision: set to zero in that case
        Ok(var.mapv(|v| v.max(F::zero())))
    }
}

impl<F, D, Mean, Kern> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for ExactInferenceGp<F, Mean, Kern>
where
    F: Float,
    D: Data<Elem = F>,
    Mean: MeanFunction<F>,
    Kern: IsotropicKernel<F>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let values = self.predict(x).expect("GP Prediction");
        *y = values;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros((x.nrows(),))
    }
}

impl<F: Float, Mean: MeanFunction<F>, Kern: IsotropicKernel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for ExactGpValidParams<F, Mean, Kern>
{
    type Object = ExactInferenceGp<F, Mean, Kern>;

    /// Condition the GP prior on the training data
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let now = Instant::now();
        let x = dataset.records();
        let y = dataset.targets();
        if x.nrows() != y.len() {
            return Err(GpError::ShapeMismatchError(format!(
                "{} training inputs given for {} training outputs",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(GpError::InvalidValueError(
                "GP cannot be fitted without training data".to_string(),
            ));
        }
        debug!(
            "Fit exact GP with {} training points of dimension {}",
            x.nrows(),
            x.ncols()
        );

        let kernel = self.prior_kernel();
        let distances = pairwise_distances(x, x, kernel.norm_order())?;
        if distances
            .indexed_iter()
            .any(|((i, j), d)| i < j && *d == F::zero())
        {
            warn!("Multiple training inputs have the same value (at least same row twice)");
        }
        let mut cov = distances.mapv(|d| kernel.value(d));
        let diag_term = self.noise_var + self.jitter;
        cov.diag_mut().mapv_inplace(|v| v + diag_term);
        let l_chol = cov.cholesky()?;

        let residuals = (y - &self.mean.value(x)).insert_axis(Axis(1));
        let z = l_chol.solve_triangular(&residuals, UPLO::Lower)?;
        let alpha = l_chol
            .t()
            .to_owned()
            .solve_triangular(&z, UPLO::Upper)?
            .remove_axis(Axis(1));

        let n = F::cast(x.nrows());
        let log_det = l_chol.diag().mapv(|v| v.ln()).sum();
        let log_likelihood = F::cast(-0.5) * z.mapv(|v| v * v).sum()
            - log_det
            - n * F::cast(0.5 * f64::ln(2. * std::f64::consts::PI));
        debug!("Log marginal likelihood = {log_likelihood}");
        debug!("elapsed fit = {:?}", now.elapsed().as_millis());

        Ok(ExactInferenceGp {
            kernel,
            l_chol,
            alpha,
            log_likelihood,
            training_data: (x.to_owned(), y.to_owned()),
            params: self.clone(),
        })
    }
}
