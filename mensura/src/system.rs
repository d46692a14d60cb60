//! The unit system: one registry to own all interning tables
//!
//! A [`UnitSystem`] owns the dimension, prefix, and unit tables plus the
//! conversion graph. Handles are only meaningful within the system that
//! issued them, and everything that mutates or memoizes takes `&mut self`,
//! so the borrow checker enforces the one-writer rule; there is no global
//! state and no locking. Construction seeds the three identities at
//! handle 0: the `number` dimension, the identity prefix, and the unit
//! `one`.

use crate::convert::ConversionTable;
use crate::dimension::{Dimension, DimensionTable};
use crate::error::Result;
use crate::prefix::{Prefix, PrefixTable};
use crate::unit::{Unit, UnitTable};

#[derive(Debug)]
pub struct UnitSystem {
    pub(crate) dimensions: DimensionTable,
    pub(crate) prefixes: PrefixTable,
    pub(crate) units: UnitTable,
    pub(crate) conversions: ConversionTable,
}

impl UnitSystem {
    pub fn new() -> Self {
        let mut system = UnitSystem {
            dimensions: DimensionTable::default(),
            prefixes: PrefixTable::default(),
            units: UnitTable::default(),
            conversions: ConversionTable::default(),
        };
        system.dimensions.seed();
        system.prefixes.seed();
        system.units.seed();
        system
    }

    /// Registers a new fundamental dimension, widening every existing
    /// dimension by one axis
    pub fn define_dimension(&mut self, name: &str, symbol: &str) -> Result<Dimension> {
        self.dimensions.define(name, symbol)
    }

    /// Names a compound dimension, such as `length^2` as `area`
    pub fn derive_dimension(
        &mut self,
        dimension: Dimension,
        name: &str,
        symbol: Option<&str>,
    ) -> Result<Dimension> {
        self.dimensions.derive(dimension, name, symbol)
    }

    pub fn dimension_named(&self, name: &str) -> Option<Dimension> {
        self.dimensions.lookup_name(name)
    }

    /// The fundamental dimensions in registration order, starting with
    /// `number`
    pub fn fundamental_dimensions(&self) -> &[Dimension] {
        self.dimensions.fundamental()
    }

    /// Every dimension interned so far, fundamental or derived
    pub fn known_dimensions(&self) -> Vec<Dimension> {
        self.dimensions.known()
    }

    /// The canonical prefix denoting `base^exponent`
    pub fn prefix(&mut self, base: i64, exponent: i32) -> Prefix {
        self.prefixes.get(base, exponent)
    }

    /// Names the prefix denoting `base^exponent`, as in
    /// `define_prefix(10, 3, "kilo", "k")`
    pub fn define_prefix(
        &mut self,
        base: i64,
        exponent: i32,
        name: &str,
        symbol: &str,
    ) -> Result<Prefix> {
        self.prefixes.define(base, exponent, name, symbol)
    }

    pub fn prefix_named(&self, name: &str) -> Option<Prefix> {
        self.prefixes.lookup_name(name)
    }

    pub fn known_prefixes(&self) -> Vec<Prefix> {
        self.prefixes.known()
    }

    /// Registers a new base unit measuring the given dimension
    pub fn define_unit(&mut self, dimension: Dimension, name: &str, symbol: &str) -> Result<Unit> {
        self.units.define(dimension, name, symbol)
    }

    /// Binds a further name and symbol to an existing unit, typically a
    /// compound like `meter/second`
    pub fn derive_unit(&mut self, unit: Unit, name: &str, symbol: &str) -> Result<Unit> {
        self.units.derive(unit, name, symbol)
    }

    pub fn unit_named(&self, name: &str) -> Option<Unit> {
        self.units.lookup_name(name)
    }

    pub fn unit_symbolled(&self, symbol: &str) -> Option<Unit> {
        self.units.lookup_symbol(symbol)
    }

    /// The base units in registration order, starting with `one`
    pub fn base_units(&self) -> &[Unit] {
        self.units.base()
    }

    /// Every unit interned so far, named or structural
    pub fn known_units(&self) -> Vec<Unit> {
        self.units.known()
    }

}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::new()
    }
}
