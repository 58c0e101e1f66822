//! This library implements isotropic covariance functions (kernels) for
//! [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) models
//! together with the distance computations they rely on.
//!
//! * [distance] computes pairwise Minkowski distances between two point sets,
//!   squeezed to a bare scalar when both sets hold a single point (see [Pairwise]).
//! * [IsotropicKernel] is implemented by [SquaredExponential] and [AbsoluteExponential]
//!   kernels, parameterized by a signal standard deviation `sigma` and a `length` scale.
//! * [ExactInferenceGp], parameterized by [ExactGpParams], combines a mean function
//!   and a kernel into a GP prior conditioned on training data with a gaussian likelihood.
//!
//! Points can be given as scalars, flat sequences (n points of dimension 1),
//! nested sequences (one row per point) or `ndarray` arrays, see [IntoPoints].
//!
//! ```
//! use gpkit::{AbsoluteExponential, IsotropicKernel, SquaredExponential};
//!
//! let k = SquaredExponential::new(2., 1.);
//! assert_eq!(4., k.evaluate(0., 0.).unwrap().as_scalar().unwrap());
//!
//! let k = AbsoluteExponential::new(1., 2.);
//! let cov = k.self_covariance(&[0., 2.]).unwrap();
//! assert_eq!((2, 2), cov.shape());
//! ```
//!
//! Kernels hold their hyperparameters by value and setters take `&mut self`:
//! a kernel shared between threads is read-only unless wrapped by the caller
//! in a synchronization primitive.
//!
//! # Features
//!
//! ## serializable
//!
//! The `serializable` feature enables the serialization of kernels, mean functions
//! and GP models using the [`serde crate`](https://serde.rs/).
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod distance;
mod errors;
pub mod kernels;
pub mod mean_models;
mod multivariate_normal;
mod parameters;
mod points;

pub use algorithm::*;
pub use distance::*;
pub use errors::*;
pub use kernels::{AbsoluteExponential, AnyKernel, IsotropicKernel, KernelKind, SquaredExponential};
pub use multivariate_normal::*;
pub use parameters::*;
pub use points::*;
