//! Multivariate normal distribution returned by the GP model
//! as its prior at given points, its posterior or its predictive distribution.

use crate::errors::{GpError, Result};
use linfa::Float;
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

/// Diagonal term added to the covariance to draw samples
const SAMPLING_JITTER: f64 = 1e-10;

/// Gaussian distribution over `dim` variables given its mean vector and covariance matrix
#[derive(Clone, Debug, PartialEq)]
pub struct MultivariateNormal<F: Float> {
    mean: Array1<F>,
    covariance: Array2<F>,
}

impl<F: Float> MultivariateNormal<F> {
    /// Constructor given mean (n,) and covariance (n, n).
    ///
    /// Fails with [GpError::ShapeMismatchError] when the covariance is not square
    /// or does not match the mean length.
    pub fn new(mean: Array1<F>, covariance: Array2<F>) -> Result<Self> {
        if !covariance.is_square() || covariance.nrows() != mean.len() {
            return Err(GpError::ShapeMismatchError(format!(
                "covariance of shape {:?} does not match mean of length {}",
                covariance.dim(),
                mean.len()
            )));
        }
        Ok(MultivariateNormal { mean, covariance })
    }

    /// Number of variables
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector
    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    /// Covariance matrix
    pub fn covariance(&self) -> &Array2<F> {
        &self.covariance
    }

    /// Marginal variances, the covariance diagonal
    pub fn variance(&self) -> Array1<F> {
        self.covariance.diag().to_owned()
    }

    /// Marginal standard deviations
    pub fn stddev(&self) -> Array1<F> {
        self.covariance
            .diag()
            .mapv(|v| v.max(F::zero()).sqrt())
    }

    /// Lower and upper bounds of the region within two standard deviations of the mean
    pub fn confidence_region(&self) -> (Array1<F>, Array1<F>) {
        let width = self.stddev() * F::cast(2.);
        (&self.mean - &width, &self.mean + &width)
    }

    /// Log probability density at `y`
    pub fn log_prob(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        if y.len() != self.dim() {
            return Err(GpError::ShapeMismatchError(format!(
                "value of length {} does not match distribution of dimension {}",
                y.len(),
                self.dim()
            )));
        }
        let chol = self.covariance.cholesky()?;
        let diff = (y - &self.mean).insert_axis(Axis(1));
        let z = chol.solve_triangular(&diff, UPLO::Lower)?;
        let quad = z.mapv(|v| v * v).sum();
        let log_det = chol.diag().mapv(|v| v.ln()).sum() * F::cast(2.);
        let cst = F::cast(self.dim() as f64 * f64::ln(2. * std::f64::consts::PI));
        Ok(F::cast(-0.5) * (quad + log_det + cst))
    }

    /// Probability density at `y`
    pub fn pdf(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        self.log_prob(y).map(|v| v.exp())
    }

    /// Draw `n_samples` realizations as a (n_samples, dim) matrix
    pub fn sample<R: Rng + ?Sized>(&self, n_samples: usize, rng: &mut R) -> Result<Array2<F>> {
        let jitter = Array2::<F>::eye(self.dim()) * F::cast(SAMPLING_JITTER);
        let chol = (&self.covariance + &jitter).cholesky()?;
        let normal = Array2::<f64>::random_using((self.dim(), n_samples), StandardNormal, rng)
            .mapv(|v| F::cast(v));
        Ok(chol.dot(&normal).reversed_axes() + &self.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn test_case(mean: Array1<f64>, covariance: Array2<f64>, expected: f64, y: Array1<f64>) {
        let mvn = MultivariateNormal::new(mean, covariance).unwrap();
        assert_abs_diff_eq!(expected, mvn.pdf(&y).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_pdf() {
        test_case(
            array![0., 0.],
            array![[1., 0.], [0., 1.]],
            0.05854983152431917,
            array![1., 1.],
        );
        test_case(
            array![0., 0.],
            array![[1., 0.], [0., 1.]],
            0.013064233284684921,
            array![1., 2.],
        );
        test_case(
            array![0.5, -0.2],
            array![[2.0, 0.3], [0.3, 0.5]],
            0.00014842259203296995,
            array![-1., 2.],
        )
    }

    #[test]
    fn test_log_prob_univariate() {
        let mvn = MultivariateNormal::new(array![1.], array![[4.]]).unwrap();
        let expected = -0.5 * (0.25 + f64::ln(4.) + f64::ln(2. * std::f64::consts::PI));
        assert_abs_diff_eq!(expected, mvn.log_prob(&array![2.]).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let res = MultivariateNormal::new(array![0., 0.], array![[1., 0., 0.], [0., 1., 0.]]);
        assert!(matches!(res, Err(GpError::ShapeMismatchError(_))));
        let res = MultivariateNormal::new(array![0.], array![[1., 0.], [0., 1.]]);
        assert!(matches!(res, Err(GpError::ShapeMismatchError(_))));
        let mvn = MultivariateNormal::new(array![0.], array![[1.]]).unwrap();
        assert!(matches!(
            mvn.log_prob(&array![0., 1.]),
            Err(GpError::ShapeMismatchError(_))
        ));
    }

    #[test]
    fn test_not_positive_definite() {
        let mvn = MultivariateNormal::new(array![0., 0.], array![[1., 2.], [2., 1.]]).unwrap();
        assert!(matches!(
            mvn.log_prob(&array![0., 0.]),
            Err(GpError::LinalgError(_))
        ));
    }

    #[test]
    fn test_confidence_region() {
        let mvn = MultivariateNormal::new(array![1., -1.], array![[4., 0.5], [0.5, 0.25]]).unwrap();
        assert_eq!(array![4., 0.25], mvn.variance());
        assert_eq!(array![2., 0.5], mvn.stddev());
        let (lower, upper) = mvn.confidence_region();
        assert_abs_diff_eq!(array![-3., -2.], lower, epsilon = 1e-12);
        assert_abs_diff_eq!(array![5., 0.], upper, epsilon = 1e-12);
    }

    #[test]
    fn test_sample() {
        let mean = array![1., -2.];
        let covariance = array![[2., 0.6], [0.6, 0.5]];
        let mvn = MultivariateNormal::new(mean.clone(), covariance.clone()).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let n = 20000;
        let samples = mvn.sample(n, &mut rng).unwrap();
        assert_eq!((n, 2), samples.dim());

        let empirical_mean = samples.mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(mean, empirical_mean, epsilon = 5e-2);
        let centered = &samples - &empirical_mean;
        let empirical_cov = centered.t().dot(&centered) / (n - 1) as f64;
        assert_abs_diff_eq!(covariance, empirical_cov, epsilon = 1e-1);
    }

    #[test]
    fn test_sample_is_reproducible() {
        let mvn = MultivariateNormal::new(array![0.], array![[1.]]).unwrap();
        let s1 = mvn.sample(5, &mut Xoshiro256Plus::seed_from_u64(0)).unwrap();
        let s2 = mvn.sample(5, &mut Xoshiro256Plus::seed_from_u64(0)).unwrap();
        assert_eq!(s1, s2);
    }
}
