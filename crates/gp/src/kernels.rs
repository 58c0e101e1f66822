//! A module for isotropic covariance functions (aka kernels) of the GP model.
//!
//! An isotropic kernel only depends on the distance `d` between two points,
//! computed with a norm order attached to the kernel variant.
//!
//! The following kernels are implemented:
//! * squared exponential: `sigma^2 * exp(-0.5 * d^2 / length^2)` with euclidean distance,
//! * absolute exponential: `sigma^2 * exp(-|d| / length)` with manhattan distance.
//!
//! Both are parameterized by a signal standard deviation `sigma` and a `length` scale.
//! These hyperparameters are stored as absolute values.

use crate::distance::{distance, distance_to_origin, pairwise_distances};
use crate::errors::{GpError, Result};
use crate::points::{IntoPoints, Pairwise};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};
use num_traits::{NumCast, ToPrimitive};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trait for isotropic covariance functions used as the covariance module of a GP model
pub trait IsotropicKernel<F: Float>: Clone + Default + fmt::Display + Send + Sync {
    /// Covariance value for a given non-negative distance `d`
    fn value(&self, d: F) -> F;

    /// Order of the Minkowski norm used to compute distances between points
    fn norm_order(&self) -> F;

    /// Signal standard deviation
    fn sigma(&self) -> F;

    /// Length scale
    fn length(&self) -> F;

    /// Set the signal standard deviation, the absolute value is stored
    fn set_sigma(&mut self, sigma: F);

    /// Set the length scale, the absolute value is stored
    fn set_length(&mut self, length: F);

    /// Signal variance, `sigma^2`
    fn variance(&self) -> F {
        self.sigma() * self.sigma()
    }

    /// Covariance between each point of `points1` and each point of `points2`.
    ///
    /// Returns a `(n1, n2)` matrix or a bare scalar when both sets hold a single point.
    /// Distance errors (dimension mismatch, unusable points) are propagated unchanged.
    fn evaluate<'a, 'b>(
        &self,
        points1: impl IntoPoints<'a, F>,
        points2: impl IntoPoints<'b, F>,
    ) -> Result<Pairwise<F>> {
        let d = distance(points1, points2, self.norm_order())?;
        Ok(d.mapv(|v| self.value(v)))
    }

    /// Covariance of a point set with itself, same as `evaluate(points, points)`.
    fn self_covariance<'a>(&self, points: impl IntoPoints<'a, F>) -> Result<Pairwise<F>> {
        let x = points.into_points()?;
        self.evaluate(&x, &x)
    }

    /// Covariance between each point of `points` and the origin.
    ///
    /// Returns a `(n, 1)` matrix or a bare scalar for a single point.
    fn covariance_to_origin<'a>(&self, points: impl IntoPoints<'a, F>) -> Result<Pairwise<F>> {
        let d = distance_to_origin(points, self.norm_order())?;
        Ok(d.mapv(|v| self.value(v)))
    }

    /// Prior variance at each point, the diagonal of the self covariance
    fn diag<'a>(&self, points: impl IntoPoints<'a, F>) -> Result<Array1<F>> {
        let x = points.into_points()?;
        Ok(Array1::from_elem(x.nrows(), self.value(F::zero())))
    }

    /// Covariance matrix between rows of `x1` and rows of `x2`, never squeezed
    fn matrix(
        &self,
        x1: &ArrayBase<impl Data<Elem = F>, Ix2>,
        x2: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Array2<F>> {
        let d = pairwise_distances(x1, x2, self.norm_order())?;
        Ok(d.mapv(|v| self.value(v)))
    }
}

/// Kernel hyperparameters as (de)serialized
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Hyperparameters<F> {
    /// Signal standard deviation
    pub sigma: F,
    /// Length scale
    pub length: F,
}

fn to_float<F: Float>(name: &str, value: impl ToPrimitive) -> Result<F> {
    <F as NumCast>::from(value).ok_or_else(|| {
        GpError::TypeConversionError(format!("{name} is not representable as a float value"))
    })
}

macro_rules! isotropic_kernel {
    ($kernel:ident, $name:literal) => {
        impl<F: Float> $kernel<F> {
            /// Constructor from signal standard deviation and length scale,
            /// absolute values are stored.
            pub fn new(sigma: F, length: F) -> Self {
                $kernel {
                    sigma: num_traits::Float::abs(sigma),
                    length: num_traits::Float::abs(length),
                }
            }

            /// Constructor from any primitive numeric values.
            ///
            /// Fails with [GpError::TypeConversionError] when a value is not representable
            /// as the kernel float type.
            pub fn try_new(sigma: impl ToPrimitive, length: impl ToPrimitive) -> Result<Self> {
                Ok(Self::new(
                    to_float("sigma", sigma)?,
                    to_float("length", length)?,
                ))
            }
        }

        impl<F: Float> Default for $kernel<F> {
            fn default() -> Self {
                Self::new(F::one(), F::one())
            }
        }

        impl<F: Float> From<Hyperparameters<F>> for $kernel<F> {
            fn from(hyp: Hyperparameters<F>) -> Self {
                Self::new(hyp.sigma, hyp.length)
            }
        }

        impl<F: Float> From<$kernel<F>> for Hyperparameters<F> {
            fn from(kernel: $kernel<F>) -> Self {
                Hyperparameters {
                    sigma: kernel.sigma,
                    length: kernel.length,
                }
            }
        }

        impl<F: Float> fmt::Display for $kernel<F> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}(sigma={}, length={})", $name, self.sigma, self.length)
            }
        }
    };
}

/// Squared exponential kernel
///
/// ```text
/// k(d) = sigma^2 * exp(-0.5 * d^2 / length^2)
/// ```
///
/// where `d` is the euclidean distance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(from = "Hyperparameters<F>", into = "Hyperparameters<F>"),
    serde(bound(serialize = "F: Serialize", deserialize = "F: Deserialize<'de>"))
)]
pub struct SquaredExponential<F: Float> {
    sigma: F,
    length: F,
}

isotropic_kernel!(SquaredExponential, "SquaredExponential");

impl<F: Float> IsotropicKernel<F> for SquaredExponential<F> {
    fn value(&self, d: F) -> F {
        self.variance() * F::exp(F::cast(-0.5) * d * d / (self.length * self.length))
    }

    fn norm_order(&self) -> F {
        F::cast(2.)
    }

    fn sigma(&self) -> F {
        self.sigma
    }

    fn length(&self) -> F {
        self.length
    }

    fn set_sigma(&mut self, sigma: F) {
        self.sigma = num_traits::Float::abs(sigma);
    }

    fn set_length(&mut self, length: F) {
        self.length = num_traits::Float::abs(length);
    }
}

/// Absolute exponential kernel
///
/// ```text
/// k(d) = sigma^2 * exp(-|d| / length)
/// ```
///
/// where `d` is the manhattan distance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(from = "Hyperparameters<F>", into = "Hyperparameters<F>"),
    serde(bound(serialize = "F: Serialize", deserialize = "F: Deserialize<'de>"))
)]
pub struct AbsoluteExponential<F: Float> {
    sigma: F,
    length: F,
}

isotropic_kernel!(AbsoluteExponential, "AbsoluteExponential");

impl<F: Float> IsotropicKernel<F> for AbsoluteExponential<F> {
    fn value(&self, d: F) -> F {
        self.variance() * F::exp(-num_traits::Float::abs(d) / self.length)
    }

    fn norm_order(&self) -> F {
        F::one()
    }

    fn sigma(&self) -> F {
        self.sigma
    }

    fn length(&self) -> F {
        self.length
    }

    fn set_sigma(&mut self, sigma: F) {
        self.sigma = num_traits::Float::abs(sigma);
    }

    fn set_length(&mut self, length: F) {
        self.length = num_traits::Float::abs(length);
    }
}

/// Kernel variants which can be selected at runtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum KernelKind {
    /// [SquaredExponential] kernel
    #[default]
    SquaredExponential,
    /// [AbsoluteExponential] kernel
    AbsoluteExponential,
}

impl FromStr for KernelKind {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "squaredexponential" | "squared_exponential" | "se" | "rbf" => {
                Ok(KernelKind::SquaredExponential)
            }
            "absoluteexponential" | "absolute_exponential" | "ae" | "exponential" => {
                Ok(KernelKind::AbsoluteExponential)
            }
            _ => Err(GpError::InvalidConfigurationError(format!(
                "Unknown kernel '{s}', should be 'SquaredExponential' or 'AbsoluteExponential'"
            ))),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelKind::SquaredExponential => write!(f, "SquaredExponential"),
            KernelKind::AbsoluteExponential => write!(f, "AbsoluteExponential"),
        }
    }
}

/// A kernel whose variant is chosen at runtime
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "F: Serialize", deserialize = "F: Deserialize<'de>"))
)]
pub enum AnyKernel<F: Float> {
    /// Squared exponential variant
    SquaredExponential(SquaredExponential<F>),
    /// Absolute exponential variant
    AbsoluteExponential(AbsoluteExponential<F>),
}

impl<F: Float> AnyKernel<F> {
    /// Constructor of the given `kind` of kernel
    pub fn new(kind: KernelKind, sigma: F, length: F) -> Self {
        match kind {
            KernelKind::SquaredExponential => {
                AnyKernel::SquaredExponential(SquaredExponential::new(sigma, length))
            }
            KernelKind::AbsoluteExponential => {
                AnyKernel::AbsoluteExponential(AbsoluteExponential::new(sigma, length))
            }
        }
    }

    /// Constructor from the variant name, see [KernelKind] for accepted names
    pub fn from_name(name: &str, sigma: F, length: F) -> Result<Self> {
        Ok(Self::new(name.parse()?, sigma, length))
    }

    /// Variant of the kernel
    pub fn kind(&self) -> KernelKind {
        match self {
            AnyKernel::SquaredExponential(_) => KernelKind::SquaredExponential,
            AnyKernel::AbsoluteExponential(_) => KernelKind::AbsoluteExponential,
        }
    }
}

impl<F: Float> Default for AnyKernel<F> {
    fn default() -> Self {
        AnyKernel::SquaredExponential(SquaredExponential::default())
    }
}

impl<F: Float> From<SquaredExponential<F>> for AnyKernel<F> {
    fn from(kernel: SquaredExponential<F>) -> Self {
        AnyKernel::SquaredExponential(kernel)
    }
}

impl<F: Float> From<AbsoluteExponential<F>> for AnyKernel<F> {
    fn from(kernel: AbsoluteExponential<F>) -> Self {
        AnyKernel::AbsoluteExponential(kernel)
    }
}

impl<F: Float> fmt::Display for AnyKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyKernel::SquaredExponential(k) => write!(f, "{k}"),
            AnyKernel::AbsoluteExponential(k) => write!(f, "{k}"),
        }
    }
}

impl<F: Float> IsotropicKernel<F> for AnyKernel<F> {
    fn value(&self, d: F) -> F {
        match self {
            AnyKernel::SquaredExponential(k) => k.value(d),
            AnyKernel::AbsoluteExponential(k) => k.value(d),
        }
    }

    fn norm_order(&self) -> F {
        match self {
            AnyKernel::SquaredExponential(k) => k.norm_order(),
            AnyKernel::AbsoluteExponential(k) => k.norm_order(),
        }
    }

    fn sigma(&self) -> F {
        match self {
            AnyKernel::SquaredExponential(k) => k.sigma(),
            AnyKernel::AbsoluteExponential(k) => k.sigma(),
        }
    }

    fn length(&self) -> F {
        match self {
            AnyKernel::SquaredExponential(k) => k.length(),
            AnyKernel::AbsoluteExponential(k) => k.length(),
        }
    }

    fn set_sigma(&mut self, sigma: F) {
        match self {
            AnyKernel::SquaredExponential(k) => k.set_sigma(sigma),
            AnyKernel::AbsoluteExponential(k) => k.set_sigma(sigma),
        }
    }

    fn set_length(&mut self, length: F) {
        match self {
            AnyKernel::SquaredExponential(k) => k.set_length(length),
            AnyKernel::AbsoluteExponential(k) => k.set_length(length),
        }
    }
}
