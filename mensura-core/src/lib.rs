//! Mensura core types
//!
//! Exposes [`Number`], the exact arbitrary-precision magnitude used for
//! quantities, conversion ratios, and offsets, plus its error type.
//! Kept in its own crate so that collaborators (parsers, codecs, domain
//! vocabularies) can speak the same numeric language without pulling in
//! the unit registries.

mod number;

pub use number::{Number, NumberError};
