//! A module for mean functions of the GP model.
//!
//! The following mean functions are implemented:
//! * zero,
//! * constant.

use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// A trait for mean functions used as the mean module of a GP model
pub trait MeanFunction<F: Float>: Clone + Default + fmt::Display + Send + Sync {
    /// Compute the prior mean at the given `x` data points specified as (n, nx) matrix.
    /// Returns a vector of length n.
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F>;
}

/// A zero function as mean of the GP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct ZeroMean();

impl<F: Float> MeanFunction<F> for ZeroMean {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl fmt::Display for ZeroMean {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ZeroMean")
    }
}

impl From<ZeroMean> for String {
    fn from(_item: ZeroMean) -> String {
        "ZeroMean".to_string()
    }
}

impl TryFrom<String> for ZeroMean {
    type Error = &'static str;
    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s == "ZeroMean" {
            Ok(Self::default())
        } else {
            Err("Bad string value for ZeroMean, should be \'ZeroMean\'")
        }
    }
}

/// A constant function as mean of the GP
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ConstantMean<F: Float> {
    constant: F,
}

impl<F: Float> ConstantMean<F> {
    /// Constructor given the constant value
    pub fn new(constant: F) -> Self {
        ConstantMean { constant }
    }

    /// The constant value
    pub fn constant(&self) -> F {
        self.constant
    }
}

impl<F: Float> Default for ConstantMean<F> {
    fn default() -> Self {
        ConstantMean::new(F::zero())
    }
}

impl<F: Float> MeanFunction<F> for ConstantMean<F> {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
        Array1::from_elem(x.nrows(), self.constant)
    }
}

impl<F: Float> fmt::Display for ConstantMean<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConstantMean({})", self.constant)
    }
}

/// Mean function modes which can be selected at runtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum MeanKind {
    /// [ZeroMean]
    #[default]
    Zero,
    /// [ConstantMean]
    Constant,
}

impl FromStr for MeanKind {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero" | "zeromean" => Ok(MeanKind::Zero),
            "constant" | "constantmean" => Ok(MeanKind::Constant),
            _ => Err(GpError::InvalidConfigurationError(format!(
                "Unknown mean mode '{s}', should be 'zero' or 'constant'"
            ))),
        }
    }
}

impl fmt::Display for MeanKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeanKind::Zero => write!(f, "zero"),
            MeanKind::Constant => write!(f, "constant"),
        }
    }
}

/// A mean function whose mode is chosen at runtime
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum AnyMean<F: Float> {
    /// Zero mode
    Zero(ZeroMean),
    /// Constant mode
    Constant(ConstantMean<F>),
}

impl<F: Float> AnyMean<F> {
    /// Mean function of the given `kind`, a constant mean starts at zero
    pub fn new(kind: MeanKind) -> Self {
        match kind {
            MeanKind::Zero => AnyMean::Zero(ZeroMean()),
            MeanKind::Constant => AnyMean::Constant(ConstantMean::default()),
        }
    }

    /// Mean function from its mode name (`"zero"` or `"constant"`).
    ///
    /// Fails with [GpError::InvalidConfigurationError] on unknown modes
    pub fn from_mode(mode: &str) -> Result<Self> {
        Ok(Self::new(mode.parse()?))
    }

    /// Mode of the mean function
    pub fn kind(&self) -> MeanKind {
        match self {
            AnyMean::Zero(_) => MeanKind::Zero,
            AnyMean::Constant(_) => MeanKind::Constant,
        }
    }
}

impl<F: Float> Default for AnyMean<F> {
    fn default() -> Self {
        AnyMean::Zero(ZeroMean())
    }
}

impl<F: Float> From<ZeroMean> for AnyMean<F> {
    fn from(mean: ZeroMean) -> Self {
        AnyMean::Zero(mean)
    }
}

impl<F: Float> From<ConstantMean<F>> for AnyMean<F> {
    fn from(mean: ConstantMean<F>) -> Self {
        AnyMean::Constant(mean)
    }
}

impl<F: Float> MeanFunction<F> for AnyMean<F> {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
        match self {
            AnyMean::Zero(m) => m.value(x),
            AnyMean::Constant(m) => m.value(x),
        }
    }
}

impl<F: Float> fmt::Display for AnyMean<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyMean::Zero(m) => write!(f, "{m}"),
            AnyMean::Constant(m) => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_zero_mean() {
        let x = array![[1., 2.], [3., 4.], [5., 6.]];
        assert_eq!(array![0., 0., 0.], ZeroMean().value(&x));
    }

    #[test]
    fn test_constant_mean() {
        let x = array![[1.], [3.]];
        assert_eq!(array![2.5, 2.5], ConstantMean::new(2.5).value(&x));
        assert_eq!(0., ConstantMean::<f64>::default().constant());
    }

    #[test]
    fn test_from_mode() {
        let mean = AnyMean::<f64>::from_mode("zero").unwrap();
        assert_eq!(MeanKind::Zero, mean.kind());
        let mean = AnyMean::<f64>::from_mode("Constant").unwrap();
        assert_eq!(AnyMean::Constant(ConstantMean::new(0.)), mean);
        assert_eq!(array![0.], mean.value(&array![[7.]]));
        match AnyMean::<f64>::from_mode("linear") {
            Err(GpError::InvalidConfigurationError(msg)) => assert!(msg.contains("linear")),
            res => panic!("unexpected result {res:?}"),
        }
    }

    #[test]
    fn test_utils() {
        assert_eq!("ZeroMean", ZeroMean().to_string());
        assert_eq!("ConstantMean(1.5)", ConstantMean::new(1.5).to_string());
        assert_eq!("constant", MeanKind::Constant.to_string());
        assert_eq!(Ok(ZeroMean()), ZeroMean::try_from("ZeroMean".to_string()));
        assert!(ZeroMean::try_from("OneMean".to_string()).is_err());
    }

    #[cfg(feature = "serializable")]
    #[test]
    fn test_save_load() {
        let json = serde_json::to_string(&ZeroMean()).unwrap();
        assert_eq!(r#""ZeroMean""#, json);
        let mean: AnyMean<f64> = AnyMean::Constant(ConstantMean::new(3.));
        let json = serde_json::to_string(&mean).unwrap();
        let loaded: AnyMean<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(mean, loaded);
    }
}
