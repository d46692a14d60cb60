//! Mensura: exact physical-quantity algebra
//!
//! Dimensions, prefixes, and units are interned flyweights owned by a
//! [`UnitSystem`]; handles are cheap `Copy` values whose equality is value
//! equality. Quantities pair an exact arbitrary-precision magnitude with a
//! unit, and conversions between commensurable units are found by searching
//! a declared conversion graph.
//!
//! ```
//! use mensura::{Quantity, UnitSystem};
//!
//! let mut system = UnitSystem::new();
//! let length = system.define_dimension("length", "L")?;
//! let meter = system.define_unit(length, "meter", "m")?;
//! let foot = system.define_unit(length, "foot", "ft")?;
//! system.equate(
//!     Quantity::new("0.3048".parse()?, meter),
//!     Quantity::of(1, foot),
//! )?;
//!
//! let marathon = Quantity::of(42195, meter);
//! let in_feet = marathon.in_unit(foot, &mut system)?;
//! assert_eq!(in_feet.unit, foot);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod convert;
mod dimension;
mod error;
mod prefix;
mod quantity;
mod system;
mod unit;

pub use convert::ConversionStats;
pub use dimension::Dimension;
pub use error::{Error, Result};
pub use prefix::Prefix;
pub use quantity::Quantity;
pub use system::UnitSystem;
pub use unit::Unit;

pub use mensura_core::{Number, NumberError};
