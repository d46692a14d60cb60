//! Error taxonomy for the registries and the conversion engine
//!
//! Every error is a value local to the failing call. Conversion graphs are
//! static once declared, so no failure here is retryable without new
//! declarations, and no partial results are ever returned.

use mensura_core::NumberError;
use thiserror::Error;

/// Errors raised by the registries, the quantity arithmetic, and the
/// conversion engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A name or symbol was already bound in the same registry
    #[error("the {kind} name or symbol {name:?} is already registered")]
    NameTaken { kind: &'static str, name: String },

    /// Operands measure different dimensions; a logical impossibility,
    /// distinct from a merely missing declaration
    #[error("dimension mismatch: {left} and {right} measure different dimensions")]
    DimensionMismatch { left: String, right: String },

    /// No declared path connects two commensurable units
    #[error("no conversion from {from} to {to}")]
    ConversionNotFound { from: String, to: String },

    /// A root that does not evenly divide every exponent
    #[error("taking the {degree} root of {value} would result in a fractional dimension")]
    FractionalDimension { degree: u32, value: String },

    /// A unit was equated or translated to itself
    #[error("no need to define conversions between {unit} and itself")]
    SelfConversion { unit: String },

    /// Magnitude arithmetic failed
    #[error(transparent)]
    Number(#[from] NumberError),
}

pub type Result<T> = std::result::Result<T, Error>;
