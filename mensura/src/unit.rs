//! Unit registry and algebra
//!
//! A unit is a prefix plus a sorted multiset of base-unit factors, tagged
//! with the dimension the product measures. Base units are their own sole
//! factor; compound units are built structurally by the group operations
//! and interned so that `meter / second` is the same handle every time.
//! Naming is additive: a unit keeps every name and symbol ever bound to it,
//! with the first bound pair treated as primary.

use std::collections::HashMap;

use mensura_core::Number;
use serde::{Deserialize, Serialize};

use crate::dimension::{Dimension, DimensionTable};
use crate::error::{Error, Result};
use crate::prefix::{Prefix, PrefixTable};
use crate::quantity::Quantity;
use crate::system::UnitSystem;

/// Canonical handle to an interned unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Unit(pub(crate) u32);

impl Unit {
    /// The dimensionless identity unit
    pub const ONE: Unit = Unit(0);

    pub fn mul(self, other: Unit, system: &mut UnitSystem) -> Unit {
        let UnitSystem {
            dimensions,
            prefixes,
            units,
            ..
        } = system;
        units.multiply(self, other, dimensions, prefixes)
    }

    pub fn div(self, other: Unit, system: &mut UnitSystem) -> Unit {
        let UnitSystem {
            dimensions,
            prefixes,
            units,
            ..
        } = system;
        units.divide(self, other, dimensions, prefixes)
    }

    pub fn pow(self, power: i32, system: &mut UnitSystem) -> Unit {
        let UnitSystem {
            dimensions,
            prefixes,
            units,
            ..
        } = system;
        units.power(self, power, dimensions, prefixes)
    }

    /// Take an integer root; every factor exponent, prefix term, and
    /// dimension exponent must divide evenly
    pub fn root(self, degree: u32, system: &mut UnitSystem) -> Result<Unit> {
        let UnitSystem {
            dimensions,
            prefixes,
            units,
            ..
        } = system;
        units.root(self, degree, dimensions, prefixes)
    }

    /// Attach a further prefix, composing with any prefix already present
    pub fn scale(self, prefix: Prefix, system: &mut UnitSystem) -> Unit {
        let UnitSystem {
            prefixes, units, ..
        } = system;
        units.scale(self, prefix, prefixes)
    }

    /// Split into numerator and denominator units: the factors with
    /// positive exponents (carrying the prefix) over the factors with
    /// negative exponents, the latter negated
    pub fn as_ratio(self, system: &mut UnitSystem) -> (Unit, Unit) {
        let UnitSystem {
            dimensions, units, ..
        } = system;
        units.as_ratio(self, dimensions)
    }

    /// Fold the prefix into a magnitude, yielding an equal quantity in the
    /// bare (identity-prefixed) unit
    pub fn quantify(self, system: &mut UnitSystem) -> Quantity {
        let UnitSystem {
            prefixes, units, ..
        } = system;
        let (magnitude, unit) = units.quantify(self, prefixes);
        Quantity::new(magnitude, unit)
    }

    /// Homogeneity assertion: only the identical canonical unit may be added
    pub fn add(self, other: Unit, system: &UnitSystem) -> Result<Unit> {
        system.units.homogeneous(self, other, &system.prefixes)
    }

    /// Homogeneity assertion, as [`Unit::add`]
    pub fn sub(self, other: Unit, system: &UnitSystem) -> Result<Unit> {
        system.units.homogeneous(self, other, &system.prefixes)
    }

    pub fn dimension(self, system: &UnitSystem) -> Dimension {
        system.units.dimension(self)
    }

    pub fn prefix(self, system: &UnitSystem) -> Prefix {
        system.units.prefix(self)
    }

    /// The base-unit factors and their exponents, sorted by handle
    pub fn factors(self, system: &UnitSystem) -> &[(Unit, i32)] {
        system.units.factors(self)
    }

    /// The primary (first bound) name, if any
    pub fn name(self, system: &UnitSystem) -> Option<&str> {
        system.units.name(self)
    }

    /// The primary (first bound) symbol, if any
    pub fn symbol(self, system: &UnitSystem) -> Option<&str> {
        system.units.symbol(self)
    }

    /// All names bound to this unit, in binding order
    pub fn names(self, system: &UnitSystem) -> &[String] {
        system.units.names(self)
    }

    /// All symbols bound to this unit, in binding order
    pub fn symbols(self, system: &UnitSystem) -> &[String] {
        system.units.symbols(self)
    }

    /// The primary symbol if one is bound, else a structural rendering
    /// like `m·s^-1`
    pub fn label(self, system: &UnitSystem) -> String {
        system.units.label(self, &system.prefixes)
    }
}

#[derive(Debug)]
struct UnitRecord {
    prefix: Prefix,
    factors: Vec<(Unit, i32)>,
    dimension: Dimension,
    names: Vec<String>,
    symbols: Vec<String>,
}

type UnitKey = (Prefix, Vec<(Unit, i32)>);

/// Interning table for units
#[derive(Debug, Default)]
pub(crate) struct UnitTable {
    records: Vec<UnitRecord>,
    by_key: HashMap<UnitKey, Unit>,
    by_name: HashMap<String, Unit>,
    by_symbol: HashMap<String, Unit>,
    base: Vec<Unit>,
}

impl UnitTable {
    /// Installs the dimensionless identity unit `one` at handle 0
    pub(crate) fn seed(&mut self) {
        let factors = vec![(Unit::ONE, 1)];
        self.by_key
            .insert((Prefix::IDENTITY, factors.clone()), Unit::ONE);
        self.records.push(UnitRecord {
            prefix: Prefix::IDENTITY,
            factors,
            dimension: Dimension::NUMBER,
            names: vec!["one".to_string()],
            symbols: vec!["1".to_string()],
        });
        self.by_name.insert("one".to_string(), Unit::ONE);
        self.by_symbol.insert("1".to_string(), Unit::ONE);
        self.base.push(Unit::ONE);
    }

    fn record(&self, unit: Unit) -> &UnitRecord {
        &self.records[unit.0 as usize]
    }

    fn check_free(&self, candidate: &str) -> Result<()> {
        if self.by_name.contains_key(candidate) || self.by_symbol.contains_key(candidate) {
            return Err(Error::NameTaken {
                kind: "unit",
                name: candidate.to_string(),
            });
        }
        Ok(())
    }

    /// Defines a new base unit of the given dimension; it becomes its own
    /// sole factor
    pub(crate) fn define(
        &mut self,
        dimension: Dimension,
        name: &str,
        symbol: &str,
    ) -> Result<Unit> {
        self.check_free(name)?;
        self.check_free(symbol)?;
        let unit = Unit(self.records.len() as u32);
        let factors = vec![(unit, 1)];
        self.by_key
            .insert((Prefix::IDENTITY, factors.clone()), unit);
        self.records.push(UnitRecord {
            prefix: Prefix::IDENTITY,
            factors,
            dimension,
            names: vec![name.to_string()],
            symbols: vec![symbol.to_string()],
        });
        self.by_name.insert(name.to_string(), unit);
        self.by_symbol.insert(symbol.to_string(), unit);
        self.base.push(unit);
        tracing::debug!(name, symbol, "defined base unit");
        Ok(unit)
    }

    /// Binds a further name and symbol to an existing unit; the unit's
    /// identity is unchanged and earlier bindings stay valid
    pub(crate) fn derive(&mut self, unit: Unit, name: &str, symbol: &str) -> Result<Unit> {
        self.check_free(name)?;
        self.check_free(symbol)?;
        let record = &mut self.records[unit.0 as usize];
        record.names.push(name.to_string());
        record.symbols.push(symbol.to_string());
        self.by_name.insert(name.to_string(), unit);
        self.by_symbol.insert(symbol.to_string(), unit);
        tracing::debug!(name, symbol, "derived unit alias");
        Ok(unit)
    }

    /// Sums duplicate factors, drops zero exponents and the identity unit,
    /// sorts by handle, and maps the empty product to `[one^1]`
    fn simplify(factors: Vec<(Unit, i32)>) -> Vec<(Unit, i32)> {
        let mut merged: Vec<(Unit, i32)> = Vec::with_capacity(factors.len());
        for (unit, exponent) in factors {
            match merged.iter_mut().find(|(u, _)| *u == unit) {
                Some((_, e)) => *e += exponent,
                None => merged.push((unit, exponent)),
            }
        }
        merged.retain(|&(unit, exponent)| exponent != 0 && unit != Unit::ONE);
        merged.sort_by_key(|&(unit, _)| unit.0);
        if merged.is_empty() {
            merged.push((Unit::ONE, 1));
        }
        merged
    }

    pub(crate) fn intern(
        &mut self,
        prefix: Prefix,
        factors: Vec<(Unit, i32)>,
        dimension: Dimension,
    ) -> Unit {
        let factors = Self::simplify(factors);
        let key = (prefix, factors.clone());
        if let Some(&found) = self.by_key.get(&key) {
            return found;
        }
        let unit = Unit(self.records.len() as u32);
        self.by_key.insert(key, unit);
        self.records.push(UnitRecord {
            prefix,
            factors,
            dimension,
            names: Vec::new(),
            symbols: Vec::new(),
        });
        unit
    }

    pub(crate) fn multiply(
        &mut self,
        a: Unit,
        b: Unit,
        dimensions: &mut DimensionTable,
        prefixes: &mut PrefixTable,
    ) -> Unit {
        let dimension = dimensions.multiply(self.record(a).dimension, self.record(b).dimension);
        let prefix = prefixes.multiply(self.record(a).prefix, self.record(b).prefix);
        let mut factors = self.record(a).factors.clone();
        factors.extend_from_slice(&self.record(b).factors);
        self.intern(prefix, factors, dimension)
    }

    pub(crate) fn divide(
        &mut self,
        a: Unit,
        b: Unit,
        dimensions: &mut DimensionTable,
        prefixes: &mut PrefixTable,
    ) -> Unit {
        let dimension = dimensions.divide(self.record(a).dimension, self.record(b).dimension);
        let prefix = prefixes.divide(self.record(a).prefix, self.record(b).prefix);
        let mut factors = self.record(a).factors.clone();
        factors.extend(self.record(b).factors.iter().map(|&(u, e)| (u, -e)));
        self.intern(prefix, factors, dimension)
    }

    pub(crate) fn power(
        &mut self,
        unit: Unit,
        power: i32,
        dimensions: &mut DimensionTable,
        prefixes: &mut PrefixTable,
    ) -> Unit {
        let dimension = dimensions.power(self.record(unit).dimension, power);
        let prefix = prefixes.power(self.record(unit).prefix, power);
        let factors = self
            .record(unit)
            .factors
            .iter()
            .map(|&(u, e)| (u, e * power))
            .collect();
        self.intern(prefix, factors, dimension)
    }

    pub(crate) fn root(
        &mut self,
        unit: Unit,
        degree: u32,
        dimensions: &mut DimensionTable,
        prefixes: &mut PrefixTable,
    ) -> Result<Unit> {
        if degree == 0 {
            return Ok(Unit::ONE);
        }
        if degree == 1 {
            return Ok(unit);
        }
        // the identity is its own sole factor at exponent 1, which would
        // otherwise trip the divisibility check
        if unit == Unit::ONE {
            return Ok(Unit::ONE);
        }
        let divisor = degree as i32;
        if self
            .record(unit)
            .factors
            .iter()
            .any(|&(_, e)| e % divisor != 0)
        {
            return Err(Error::FractionalDimension {
                degree,
                value: self.label(unit, prefixes),
            });
        }
        let dimension = dimensions.root(self.record(unit).dimension, degree)?;
        let prefix = prefixes.root(self.record(unit).prefix, degree)?;
        let factors = self
            .record(unit)
            .factors
            .iter()
            .map(|&(u, e)| (u, e / divisor))
            .collect();
        Ok(self.intern(prefix, factors, dimension))
    }

    pub(crate) fn scale(&mut self, unit: Unit, prefix: Prefix, prefixes: &mut PrefixTable) -> Unit {
        let combined = prefixes.multiply(self.record(unit).prefix, prefix);
        let factors = self.record(unit).factors.clone();
        let dimension = self.record(unit).dimension;
        self.intern(combined, factors, dimension)
    }

    pub(crate) fn as_ratio(&mut self, unit: Unit, dimensions: &mut DimensionTable) -> (Unit, Unit) {
        let record = self.record(unit);
        let prefix = record.prefix;
        let numerator_factors: Vec<(Unit, i32)> = record
            .factors
            .iter()
            .filter(|&&(_, e)| e > 0)
            .copied()
            .collect();
        let denominator_factors: Vec<(Unit, i32)> = record
            .factors
            .iter()
            .filter(|&&(_, e)| e < 0)
            .map(|&(u, e)| (u, -e))
            .collect();

        let numerator_dimension = self.product_dimension(&numerator_factors, dimensions);
        let denominator_dimension = self.product_dimension(&denominator_factors, dimensions);

        let numerator = self.intern(prefix, numerator_factors, numerator_dimension);
        let denominator =
            self.intern(Prefix::IDENTITY, denominator_factors, denominator_dimension);
        (numerator, denominator)
    }

    fn product_dimension(
        &self,
        factors: &[(Unit, i32)],
        dimensions: &mut DimensionTable,
    ) -> Dimension {
        factors
            .iter()
            .fold(Dimension::NUMBER, |acc, &(factor, exponent)| {
                let raised = dimensions.power(self.record(factor).dimension, exponent);
                dimensions.multiply(acc, raised)
            })
    }

    pub(crate) fn quantify(&mut self, unit: Unit, prefixes: &mut PrefixTable) -> (Number, Unit) {
        let magnitude = prefixes.quantify(self.record(unit).prefix);
        let factors = self.record(unit).factors.clone();
        let dimension = self.record(unit).dimension;
        let bare = self.intern(Prefix::IDENTITY, factors, dimension);
        (magnitude, bare)
    }

    pub(crate) fn homogeneous(&self, a: Unit, b: Unit, prefixes: &PrefixTable) -> Result<Unit> {
        if a == b {
            Ok(a)
        } else {
            Err(Error::DimensionMismatch {
                left: self.label(a, prefixes),
                right: self.label(b, prefixes),
            })
        }
    }

    pub(crate) fn dimension(&self, unit: Unit) -> Dimension {
        self.record(unit).dimension
    }

    pub(crate) fn prefix(&self, unit: Unit) -> Prefix {
        self.record(unit).prefix
    }

    pub(crate) fn factors(&self, unit: Unit) -> &[(Unit, i32)] {
        &self.record(unit).factors
    }

    pub(crate) fn name(&self, unit: Unit) -> Option<&str> {
        self.record(unit).names.first().map(String::as_str)
    }

    pub(crate) fn symbol(&self, unit: Unit) -> Option<&str> {
        self.record(unit).symbols.first().map(String::as_str)
    }

    pub(crate) fn names(&self, unit: Unit) -> &[String] {
        &self.record(unit).names
    }

    pub(crate) fn symbols(&self, unit: Unit) -> &[String] {
        &self.record(unit).symbols
    }

    pub(crate) fn lookup_name(&self, name: &str) -> Option<Unit> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn lookup_symbol(&self, symbol: &str) -> Option<Unit> {
        self.by_symbol.get(symbol).copied()
    }

    pub(crate) fn base(&self) -> &[Unit] {
        &self.base
    }

    pub(crate) fn known(&self) -> Vec<Unit> {
        (0..self.records.len() as u32).map(Unit).collect()
    }

    pub(crate) fn label(&self, unit: Unit, prefixes: &PrefixTable) -> String {
        let record = self.record(unit);
        if let Some(symbol) = record.symbols.first() {
            return symbol.clone();
        }
        let factors = record
            .factors
            .iter()
            .map(|&(factor, exponent)| {
                let symbol = self
                    .record(factor)
                    .symbols
                    .first()
                    .map(String::as_str)
                    .unwrap_or("?");
                if exponent == 1 {
                    symbol.to_string()
                } else {
                    format!("{symbol}^{exponent}")
                }
            })
            .collect::<Vec<_>>()
            .join("·");
        let prefix = prefixes.label(record.prefix);
        if prefix.is_empty() {
            factors
        } else if prefixes.symbol(record.prefix).is_some() {
            format!("{prefix}{factors}")
        } else {
            format!("{prefix}({factors})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::UnitSystem;

    fn kinematics() -> (UnitSystem, Unit, Unit) {
        let mut system = UnitSystem::new();
        let length = system.define_dimension("length", "L").unwrap();
        let time = system.define_dimension("time", "T").unwrap();
        let meter = system.define_unit(length, "meter", "m").unwrap();
        let second = system.define_unit(time, "second", "s").unwrap();
        (system, meter, second)
    }

    #[test]
    fn test_canonical_compounds() {
        let (mut system, meter, second) = kinematics();
        let speed = meter.div(second, &mut system);
        assert_eq!(meter.div(second, &mut system), speed);
        assert_eq!(speed.factors(&system), &[(meter, 1), (second, -1)]);
        assert_eq!(
            speed.dimension(&system),
            meter
                .dimension(&system)
                .div(second.dimension(&system), &mut system)
        );
    }

    #[test]
    fn test_identity_and_inverse() {
        let (mut system, meter, second) = kinematics();
        assert_eq!(meter.mul(Unit::ONE, &mut system), meter);
        assert_eq!(meter.div(meter, &mut system), Unit::ONE);
        assert_eq!(meter.pow(0, &mut system), Unit::ONE);
        let speed = meter.div(second, &mut system);
        assert_eq!(speed.mul(second, &mut system), meter);
    }

    #[test]
    fn test_factor_order_is_insensitive() {
        let (mut system, meter, second) = kinematics();
        assert_eq!(
            meter.mul(second, &mut system),
            second.mul(meter, &mut system)
        );
    }

    #[test]
    fn test_power_and_root() {
        let (mut system, meter, _) = kinematics();
        let area = meter.pow(2, &mut system);
        assert_eq!(area.root(2, &mut system).unwrap(), meter);
        assert!(matches!(
            meter.root(2, &mut system),
            Err(Error::FractionalDimension { degree: 2, .. })
        ));
        assert_eq!(Unit::ONE.root(2, &mut system).unwrap(), Unit::ONE);
    }

    #[test]
    fn test_prefix_scaling_and_quantify() {
        let (mut system, meter, _) = kinematics();
        let kilo = system.define_prefix(10, 3, "kilo", "k").unwrap();
        let kilometer = meter.scale(kilo, &mut system);
        assert_ne!(kilometer, meter);
        assert_eq!(kilometer.factors(&system), meter.factors(&system));
        assert_eq!(kilometer.prefix(&system), kilo);

        let quantified = kilometer.quantify(&mut system);
        assert_eq!(quantified.magnitude, Number::from_i64(1000));
        assert_eq!(quantified.unit, meter);

        // prefixes compose when scaled again
        let milli = system.define_prefix(10, -3, "milli", "mi").unwrap();
        assert_eq!(kilometer.scale(milli, &mut system), meter);
    }

    #[test]
    fn test_as_ratio() {
        let (mut system, meter, second) = kinematics();
        let accel = meter.div(second.pow(2, &mut system), &mut system);
        let (numerator, denominator) = accel.as_ratio(&mut system);
        assert_eq!(numerator, meter);
        assert_eq!(denominator, second.pow(2, &mut system));

        let (n, d) = meter.as_ratio(&mut system);
        assert_eq!(n, meter);
        assert_eq!(d, Unit::ONE);
    }

    #[test]
    fn test_derive_aliases() {
        let (mut system, meter, second) = kinematics();
        let speed = meter.div(second, &mut system);
        let pace = system.derive_unit(speed, "pace", "pc").unwrap();
        assert_eq!(pace, speed);
        let gait = system.derive_unit(speed, "gait", "gt").unwrap();
        assert_eq!(gait, speed);
        assert_eq!(speed.name(&system), Some("pace"));
        assert_eq!(speed.names(&system), &["pace", "gait"]);
        assert_eq!(system.unit_named("gait"), Some(speed));
        assert!(system.derive_unit(speed, "pace", "xx").is_err());
    }

    #[test]
    fn test_homogeneity() {
        let (mut system, meter, second) = kinematics();
        assert_eq!(meter.add(meter, &system).unwrap(), meter);
        assert!(matches!(
            meter.add(second, &system),
            Err(Error::DimensionMismatch { .. })
        ));
        let _ = &mut system;
    }

    #[test]
    fn test_labels() {
        let (mut system, meter, second) = kinematics();
        let speed = meter.div(second, &mut system);
        assert_eq!(speed.label(&system), "m·s^-1");
        assert_eq!(meter.label(&system), "m");
        assert_eq!(Unit::ONE.label(&system), "1");

        let kilo = system.define_prefix(10, 3, "kilo", "k").unwrap();
        let kilometer = meter.scale(kilo, &mut system);
        assert_eq!(kilometer.label(&system), "km");
    }
}
