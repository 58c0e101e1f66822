//! Pairwise distances between two point sets under a Minkowski norm of order `p`.
//!
//! * `p = 2`: euclidean distance,
//! * `p = 1`: manhattan distance,
//! * `p = +inf`: chebyshev distance,
//! * `p = 0`: number of differing components.
//!
//! Any other order is passed through to `(sum_k |a_k - b_k|^p)^(1/p)` without validation,
//! the result is not a metric for `p < 1`.

use crate::errors::{GpError, Result};
use crate::points::{IntoPoints, Pairwise};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2, Zip};

/// Norm order used when none is specified: euclidean distance
pub const DEFAULT_NORM_ORDER: f64 = 2.;

/// Minkowski distance of order `p` between two points `a` and `b`.
///
/// Fails with [GpError::ShapeMismatchError] when `a` and `b` have not the same number of components.
pub fn minkowski<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    p: F,
) -> Result<F> {
    if a.len() != b.len() {
        return Err(GpError::ShapeMismatchError(format!(
            "point of dimension {} cannot be compared to point of dimension {}",
            a.len(),
            b.len()
        )));
    }
    Ok(minkowski_unchecked(a, b, p))
}

/// Points are expected to have the same number of components
fn minkowski_unchecked<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    p: F,
) -> F {
    let diffs = (a - b).mapv(num_traits::Float::abs);
    if p == F::one() {
        diffs.sum()
    } else if p == F::cast(2.) {
        diffs.mapv(|v| v * v).sum().sqrt()
    } else if p == F::infinity() {
        diffs.fold(F::zero(), |acc, &v| acc.max(v))
    } else if p == F::zero() {
        F::cast(diffs.iter().filter(|v| **v != F::zero()).count())
    } else {
        diffs.mapv(|v| v.powf(p)).sum().powf(F::one() / p)
    }
}

/// Computes the `(n1, n2)` matrix of distances of order `norm_order` between
/// each point (row) of `x1` and each point (row) of `x2`.
///
/// Fails with [GpError::ShapeMismatchError] when points have not the same dimension.
pub fn pairwise_distances<F: Float>(
    x1: &ArrayBase<impl Data<Elem = F>, Ix2>,
    x2: &ArrayBase<impl Data<Elem = F>, Ix2>,
    norm_order: F,
) -> Result<Array2<F>> {
    if x1.ncols() != x2.ncols() {
        return Err(GpError::ShapeMismatchError(format!(
            "points of dimension {} cannot be compared to points of dimension {}",
            x1.ncols(),
            x2.ncols()
        )));
    }
    let (x1, x2) = (x1.view(), x2.view());
    let mut dist = Array2::zeros((x1.nrows(), x2.nrows()));
    Zip::indexed(&mut dist).par_for_each(|(i, j), d| {
        *d = minkowski_unchecked(&x1.row(i), &x2.row(j), norm_order);
    });
    Ok(dist)
}

/// Distances of order `norm_order` between `points1` and `points2`.
///
/// Returns a `(n1, n2)` matrix, or a bare scalar when both point sets hold a single point.
///
/// ```
/// use gpkit::{distance, Pairwise};
///
/// let d = distance(&[[0., 0.]], &[[3., 4.]], 2.).unwrap();
/// assert_eq!(Pairwise::Scalar(5.), d);
/// let d = distance(&[[0., 0.]], &[[3., 4.]], 1.).unwrap();
/// assert_eq!(Pairwise::Scalar(7.), d);
/// ```
pub fn distance<'a, 'b, F: Float>(
    points1: impl IntoPoints<'a, F>,
    points2: impl IntoPoints<'b, F>,
    norm_order: F,
) -> Result<Pairwise<F>> {
    let x1 = points1.into_points()?;
    let x2 = points2.into_points()?;
    pairwise_distances(&x1, &x2, norm_order).map(Pairwise::from_matrix)
}

/// Distances of order `norm_order` between `points` and the origin,
/// i.e. the zero vector of the points dimension.
///
/// Returns a `(n, 1)` matrix, or a bare scalar when there is a single point.
pub fn distance_to_origin<'a, F: Float>(
    points: impl IntoPoints<'a, F>,
    norm_order: F,
) -> Result<Pairwise<F>> {
    let x = points.into_points()?;
    let origin = Array2::zeros((1, x.ncols()));
    pairwise_distances(&x, &origin, norm_order).map(Pairwise::from_matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_self_distances() {
        let p = array![[0., 1.], [2., 3.], [4., -1.], [0.5, 0.5]];
        let d = pairwise_distances(&p, &p, 2.).unwrap();
        assert_eq!(d, d.t());
        assert_eq!(Array1::<f64>::zeros(4), d.diag());
        assert!(d.iter().all(|v| *v >= 0.));
        assert_abs_diff_eq!(f64::sqrt(8.), d[[0, 1]], epsilon = 1e-12);
    }

    #[test]
    fn test_norm_orders() {
        let a = [[0., 0.]];
        let b = [[3., 4.]];
        assert_eq!(
            Pairwise::Scalar(5.),
            distance(&a, &b, DEFAULT_NORM_ORDER).unwrap()
        );
        assert_eq!(Pairwise::Scalar(7.), distance(&a, &b, 1.).unwrap());
        assert_eq!(
            Pairwise::Scalar(4.),
            distance(&a, &b, f64::INFINITY).unwrap()
        );
        assert_eq!(Pairwise::Scalar(2.), distance(&a, &b, 0.).unwrap());
        assert_eq!(
            Pairwise::Scalar(1.),
            distance(&a, &[[0., 1.]], 0.).unwrap()
        );
        let d = distance(&a, &[[1., 1.]], 0.5).unwrap();
        assert_abs_diff_eq!(4., d.as_scalar().unwrap(), epsilon = 1e-12);
        let d = distance(&a, &b, 3.).unwrap();
        assert_abs_diff_eq!(
            f64::powf(91., 1. / 3.),
            d.as_scalar().unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_single_pair_is_squeezed() {
        assert_eq!(Pairwise::Scalar(2.), distance(1., 3., 2.).unwrap());
        assert_eq!(Pairwise::Scalar(0.), distance(0., 0., 2.).unwrap());
    }

    #[test]
    fn test_flat_sequences_are_one_dimensional_points() {
        let d = distance(&[0., 2.], &[1.], 2.).unwrap();
        assert_eq!(Some(&array![[1.], [1.]]), d.as_matrix());
        let d = distance(&[0., 2., 5.], &[0., 2., 5.], 1.).unwrap();
        assert_eq!(
            Some(&array![[0., 2., 5.], [2., 0., 3.], [5., 3., 0.]]),
            d.as_matrix()
        );
    }

    #[test]
    fn test_shape() {
        let x1 = array![[0., 1.], [2., 3.], [4., 5.]];
        let x2 = array![[0., 0.], [1., 1.]];
        assert_eq!((3, 2), distance(&x1, &x2, 2.).unwrap().shape());
        assert_eq!((2, 3), distance(&x2, &x1, 2.).unwrap().shape());
        assert_eq!((1, 3), distance(&[[0., 0.]], &x1, 2.).unwrap().shape());
    }

    #[test]
    fn test_empty_point_sets() {
        let d = distance(Vec::<f64>::new(), &[1., 2.], 2.).unwrap();
        assert_eq!((0, 2), d.shape());
        let d = distance(&[1.], Vec::<f64>::new(), 2.).unwrap();
        assert_eq!((1, 0), d.shape());
        assert!(!d.is_scalar());
    }

    #[test]
    fn test_dimension_mismatch() {
        let res = distance(&[[0., 0.]], &[[1., 2., 3.]], 2.);
        assert!(matches!(res, Err(GpError::ShapeMismatchError(_))));
    }

    #[test]
    fn test_minkowski() {
        let a = array![1., -1., 2.];
        let b = array![0., 1., 2.];
        assert_abs_diff_eq!(3., minkowski(&a, &b, 1.).unwrap());
        assert_abs_diff_eq!(f64::sqrt(5.), minkowski(&a, &b, 2.).unwrap(), epsilon = 1e-12);
        assert_abs_diff_eq!(2., minkowski(&a.view(), &b.view(), f64::INFINITY).unwrap());
        assert!(matches!(
            minkowski(&a, &array![0., 1.], 2.),
            Err(GpError::ShapeMismatchError(_))
        ));
    }

    #[test]
    fn test_ragged_points() {
        let res = distance(vec![vec![0., 1.], vec![2.]], &[[0., 0.]], 2.);
        assert!(matches!(res, Err(GpError::TypeConversionError(_))));
    }

    #[test]
    fn test_distance_to_origin() {
        let d = distance_to_origin(&[[3., 4.], [0., 1.]], 2.).unwrap();
        assert_eq!(Some(&array![[5.], [1.]]), d.as_matrix());
        let d = distance_to_origin(&[[3., 4.]], 1.).unwrap();
        assert_eq!(Pairwise::Scalar(7.), d);
        let d = distance_to_origin(&[-2., 2.], 2.).unwrap();
        assert_eq!(Some(&array![[2.], [2.]]), d.as_matrix());
    }

    #[test]
    fn test_single_precision() {
        let d = distance(&[[0f32, 0.]], &[[3f32, 4.]], 2f32).unwrap();
        assert_eq!(Pairwise::Scalar(5f32), d);
    }
}
