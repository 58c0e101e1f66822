//! Point sets given to distance and kernel computations, and the shape of their pairwise results.
//!
//! A point set is an ordered collection of `n` points of dimension `nx`, that is a `(n, nx)` matrix.
//! Scalars and flat sequences are accepted as well: each scalar is then a point of dimension 1,
//! so that `[0., 2.]` is a set of two 1-dimensional points, not one 2-dimensional point.
//! Use `[[0., 2.]]` (or an `(1, 2)` array) for the latter.

use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, CowArray, Data, Ix0, Ix1, Ix2};

/// Conversion of a value into a `(n, nx)` point set.
///
/// The conversion borrows the underlying data whenever the value already
/// has a suitable memory layout (slices, ndarray arrays and views).
pub trait IntoPoints<'a, F: Float> {
    /// Returns the points as rows of a 2D array
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>>;
}

macro_rules! impl_scalar_points {
    ($float:ty) => {
        impl<'a> IntoPoints<'a, $float> for $float {
            fn into_points(self) -> Result<CowArray<'a, $float, Ix2>> {
                Ok(CowArray::from(Array2::from_elem((1, 1), self)))
            }
        }
    };
}

impl_scalar_points!(f32);
impl_scalar_points!(f64);

impl<'a, F: Float> IntoPoints<'a, F> for &'a [F] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(ArrayView1::from(self).insert_axis(Axis(1))))
    }
}

impl<'a, F: Float, const N: usize> IntoPoints<'a, F> for &'a [F; N] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        self.as_slice().into_points()
    }
}

impl<'a, F: Float, const N: usize> IntoPoints<'a, F> for [F; N] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        self.to_vec().into_points()
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for &'a Vec<F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        self.as_slice().into_points()
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for Vec<F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(Array1::from(self).insert_axis(Axis(1))))
    }
}

impl<'a, F: Float, const D: usize> IntoPoints<'a, F> for &'a [[F; D]] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self, D)
    }
}

impl<'a, F: Float, const D: usize, const N: usize> IntoPoints<'a, F> for &'a [[F; D]; N] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self.as_slice(), D)
    }
}

impl<'a, F: Float, const D: usize, const N: usize> IntoPoints<'a, F> for [[F; D]; N] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self.as_slice(), D)
    }
}

impl<'a, F: Float, const D: usize> IntoPoints<'a, F> for Vec<[F; D]> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self.as_slice(), D)
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for &'a [Vec<F>] {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self, 1)
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for &'a Vec<Vec<F>> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self.as_slice(), 1)
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for Vec<Vec<F>> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        from_rows(self.as_slice(), 1)
    }
}

impl<'a, F: Float, S: Data<Elem = F>> IntoPoints<'a, F> for &'a ArrayBase<S, Ix0> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(
            self.view().insert_axis(Axis(0)).insert_axis(Axis(1)),
        ))
    }
}

impl<'a, F: Float, S: Data<Elem = F>> IntoPoints<'a, F> for &'a ArrayBase<S, Ix1> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self.view().insert_axis(Axis(1))))
    }
}

impl<'a, F: Float, S: Data<Elem = F>> IntoPoints<'a, F> for &'a ArrayBase<S, Ix2> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self.view()))
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for ArrayView1<'a, F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self.insert_axis(Axis(1))))
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for ArrayView2<'a, F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self))
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for Array1<F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self.insert_axis(Axis(1))))
    }
}

impl<'a, F: Float> IntoPoints<'a, F> for Array2<F> {
    fn into_points(self) -> Result<CowArray<'a, F, Ix2>> {
        Ok(CowArray::from(self))
    }
}

/// Build a point set from rows which are all expected to have the same length.
/// An empty set of rows gives a `(0, empty_dim)` point set.
fn from_rows<'a, F: Float, R: AsRef<[F]>>(
    rows: &[R],
    empty_dim: usize,
) -> Result<CowArray<'a, F, Ix2>> {
    let nx = rows.first().map_or(empty_dim, |r| r.as_ref().len());
    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.as_ref().len() != nx)
    {
        return Err(GpError::TypeConversionError(format!(
            "ragged point set: point {} has {} components, expected {}",
            i,
            row.as_ref().len(),
            nx
        )));
    }
    let data = rows
        .iter()
        .flat_map(|r| r.as_ref().iter().copied())
        .collect::<Vec<_>>();
    let points = Array2::from_shape_vec((rows.len(), nx), data)
        .map_err(|e| GpError::TypeConversionError(e.to_string()))?;
    Ok(CowArray::from(points))
}

/// The result of a pairwise computation between `n1` and `n2` points:
/// a `(n1, n2)` matrix, collapsed to a bare scalar when `n1 == n2 == 1`.
#[derive(Clone, Debug, PartialEq)]
pub enum Pairwise<F> {
    /// Value for a single pair of points
    Scalar(F),
    /// Values for every pair of points, entry `(i, j)` relates point i of the first set
    /// to point j of the second set
    Matrix(Array2<F>),
}

impl<F: Float> Pairwise<F> {
    /// Wrap a `(n1, n2)` matrix, squeezing it to a scalar when it is `(1, 1)`.
    /// Empty dimensions are preserved.
    pub fn from_matrix(matrix: Array2<F>) -> Self {
        if matrix.dim() == (1, 1) {
            Pairwise::Scalar(matrix[[0, 0]])
        } else {
            Pairwise::Matrix(matrix)
        }
    }

    /// Shape of the result, `(1, 1)` for a scalar
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Pairwise::Scalar(_) => (1, 1),
            Pairwise::Matrix(m) => m.dim(),
        }
    }

    /// Whether the result was squeezed to a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Pairwise::Scalar(_))
    }

    /// Scalar value if the result was squeezed
    pub fn as_scalar(&self) -> Option<F> {
        match self {
            Pairwise::Scalar(v) => Some(*v),
            Pairwise::Matrix(_) => None,
        }
    }

    /// Matrix if the result was not squeezed
    pub fn as_matrix(&self) -> Option<&Array2<F>> {
        match self {
            Pairwise::Scalar(_) => None,
            Pairwise::Matrix(m) => Some(m),
        }
    }

    /// Value for the pair `(i, j)`
    pub fn get(&self, i: usize, j: usize) -> Option<F> {
        match self {
            Pairwise::Scalar(v) => (i == 0 && j == 0).then_some(*v),
            Pairwise::Matrix(m) => m.get((i, j)).copied(),
        }
    }

    /// Result as a `(n1, n2)` matrix, a scalar gives back a `(1, 1)` matrix
    pub fn into_matrix(self) -> Array2<F> {
        match self {
            Pairwise::Scalar(v) => Array2::from_elem((1, 1), v),
            Pairwise::Matrix(m) => m,
        }
    }

    /// Apply `f` to every value, preserving the shape
    pub fn mapv(&self, f: impl Fn(F) -> F) -> Self {
        match self {
            Pairwise::Scalar(v) => Pairwise::Scalar(f(*v)),
            Pairwise::Matrix(m) => Pairwise::Matrix(m.mapv(f)),
        }
    }
}

impl<F: Float> From<Pairwise<F>> for Array2<F> {
    fn from(pairwise: Pairwise<F>) -> Array2<F> {
        pairwise.into_matrix()
    }
}
