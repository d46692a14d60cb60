//! Dimension registry and algebra
//!
//! A dimension is the kind of physical quantity being measured, represented
//! as a vector of signed integer exponents over the fundamental dimensions
//! registered so far. The registry interns one canonical record per distinct
//! exponent vector, so handle equality is value equality and the dimensions
//! form an abelian group under multiplication.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::system::UnitSystem;

/// Canonical handle to an interned dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dimension(pub(crate) u32);

impl Dimension {
    /// The dimension of pure numbers, the group identity (all exponents zero)
    pub const NUMBER: Dimension = Dimension(0);

    /// Multiply dimensions (add exponents)
    pub fn mul(self, other: Dimension, system: &mut UnitSystem) -> Dimension {
        system.dimensions.multiply(self, other)
    }

    /// Divide dimensions (subtract exponents)
    pub fn div(self, other: Dimension, system: &mut UnitSystem) -> Dimension {
        system.dimensions.divide(self, other)
    }

    /// Raise to an integer power (scale exponents)
    pub fn pow(self, power: i32, system: &mut UnitSystem) -> Dimension {
        system.dimensions.power(self, power)
    }

    /// Take an integer root; every exponent must divide evenly
    pub fn root(self, degree: u32, system: &mut UnitSystem) -> Result<Dimension> {
        system.dimensions.root(self, degree)
    }

    /// Dimensional-homogeneity assertion: only the identical canonical
    /// dimension may be added, and the sum is the dimension unchanged
    pub fn add(self, other: Dimension, system: &UnitSystem) -> Result<Dimension> {
        system.dimensions.homogeneous(self, other)
    }

    /// Dimensional-homogeneity assertion, as [`Dimension::add`]
    pub fn sub(self, other: Dimension, system: &UnitSystem) -> Result<Dimension> {
        system.dimensions.homogeneous(self, other)
    }

    /// Whether this dimension is a component of the given compound dimension:
    /// every nonzero exponent here appears in `whole` with the same sign and
    /// at least the same magnitude
    pub fn is_factor(self, whole: Dimension, system: &UnitSystem) -> bool {
        system.dimensions.is_factor(self, whole)
    }

    /// The exponents over the fundamental dimensions, in registration order
    pub fn exponents(self, system: &UnitSystem) -> &[i32] {
        system.dimensions.exponents(self)
    }

    pub fn name(self, system: &UnitSystem) -> Option<&str> {
        system.dimensions.name(self)
    }

    pub fn symbol(self, system: &UnitSystem) -> Option<&str> {
        system.dimensions.symbol(self)
    }

    /// Rendering used in error messages: the symbol if one is bound, else a
    /// composition over the fundamental symbols like `L^2·T^-1`
    pub fn label(self, system: &UnitSystem) -> String {
        system.dimensions.label(self)
    }
}

#[derive(Debug)]
struct DimensionRecord {
    exponents: Vec<i32>,
    name: Option<String>,
    symbol: Option<String>,
}

/// Interning table for dimensions
#[derive(Debug, Default)]
pub(crate) struct DimensionTable {
    records: Vec<DimensionRecord>,
    by_key: HashMap<Vec<i32>, Dimension>,
    by_name: HashMap<String, Dimension>,
    by_symbol: HashMap<String, Dimension>,
    fundamental: Vec<Dimension>,
}

impl DimensionTable {
    /// Installs the `number` identity dimension at handle 0
    pub(crate) fn seed(&mut self) {
        let number = self.intern(vec![0]);
        debug_assert_eq!(number, Dimension::NUMBER);
        self.records[0].name = Some("number".to_string());
        self.records[0].symbol = Some("1".to_string());
        self.by_name.insert("number".to_string(), number);
        self.by_symbol.insert("1".to_string(), number);
        self.fundamental.push(number);
    }

    fn record(&self, dimension: Dimension) -> &DimensionRecord {
        &self.records[dimension.0 as usize]
    }

    pub(crate) fn intern(&mut self, exponents: Vec<i32>) -> Dimension {
        if let Some(&found) = self.by_key.get(&exponents) {
            return found;
        }
        let dimension = Dimension(self.records.len() as u32);
        self.by_key.insert(exponents.clone(), dimension);
        self.records.push(DimensionRecord {
            exponents,
            name: None,
            symbol: None,
        });
        dimension
    }

    fn check_free(&self, kind: &'static str, candidate: &str) -> Result<()> {
        if self.by_name.contains_key(candidate) || self.by_symbol.contains_key(candidate) {
            return Err(Error::NameTaken {
                kind,
                name: candidate.to_string(),
            });
        }
        Ok(())
    }

    /// Defines a new fundamental dimension, appending one axis to every
    /// existing exponent vector. Handles never change, so all existing
    /// equality and identity relationships are preserved; the re-keying is a
    /// single exclusive step with no half-extended state visible.
    pub(crate) fn define(&mut self, name: &str, symbol: &str) -> Result<Dimension> {
        self.check_free("dimension", name)?;
        self.check_free("dimension", symbol)?;

        self.by_key.clear();
        for (index, record) in self.records.iter_mut().enumerate() {
            record.exponents.push(0);
            self.by_key
                .insert(record.exponents.clone(), Dimension(index as u32));
        }

        let width = self.fundamental.len() + 1;
        let mut exponents = vec![0; width];
        exponents[width - 1] = 1;
        let dimension = self.intern(exponents);

        self.records[dimension.0 as usize].name = Some(name.to_string());
        self.records[dimension.0 as usize].symbol = Some(symbol.to_string());
        self.by_name.insert(name.to_string(), dimension);
        self.by_symbol.insert(symbol.to_string(), dimension);
        self.fundamental.push(dimension);

        tracing::debug!(name, symbol, axes = self.fundamental.len(), "defined fundamental dimension");
        Ok(dimension)
    }

    /// Binds a name (and optionally a symbol) to a derived dimension;
    /// repeated derivations of the same dimension register aliases
    pub(crate) fn derive(
        &mut self,
        dimension: Dimension,
        name: &str,
        symbol: Option<&str>,
    ) -> Result<Dimension> {
        self.check_free("dimension", name)?;
        if let Some(symbol) = symbol {
            self.check_free("dimension", symbol)?;
        }

        let record = &mut self.records[dimension.0 as usize];
        if record.name.is_none() {
            record.name = Some(name.to_string());
        }
        if record.symbol.is_none() {
            if let Some(symbol) = symbol {
                record.symbol = Some(symbol.to_string());
            }
        }
        self.by_name.insert(name.to_string(), dimension);
        if let Some(symbol) = symbol {
            self.by_symbol.insert(symbol.to_string(), dimension);
        }
        Ok(dimension)
    }

    pub(crate) fn multiply(&mut self, a: Dimension, b: Dimension) -> Dimension {
        let exponents = self
            .record(a)
            .exponents
            .iter()
            .zip(&self.record(b).exponents)
            .map(|(x, y)| x + y)
            .collect();
        self.intern(exponents)
    }

    pub(crate) fn divide(&mut self, a: Dimension, b: Dimension) -> Dimension {
        let exponents = self
            .record(a)
            .exponents
            .iter()
            .zip(&self.record(b).exponents)
            .map(|(x, y)| x - y)
            .collect();
        self.intern(exponents)
    }

    pub(crate) fn power(&mut self, dimension: Dimension, power: i32) -> Dimension {
        let exponents = self
            .record(dimension)
            .exponents
            .iter()
            .map(|e| e * power)
            .collect();
        self.intern(exponents)
    }

    pub(crate) fn root(&mut self, dimension: Dimension, degree: u32) -> Result<Dimension> {
        if degree == 0 {
            return Ok(Dimension::NUMBER);
        }
        if degree == 1 {
            return Ok(dimension);
        }
        let divisor = degree as i32;
        if self
            .record(dimension)
            .exponents
            .iter()
            .any(|e| e % divisor != 0)
        {
            return Err(Error::FractionalDimension {
                degree,
                value: self.label(dimension),
            });
        }
        let exponents = self
            .record(dimension)
            .exponents
            .iter()
            .map(|e| e / divisor)
            .collect();
        Ok(self.intern(exponents))
    }

    pub(crate) fn homogeneous(&self, a: Dimension, b: Dimension) -> Result<Dimension> {
        if a == b {
            Ok(a)
        } else {
            Err(Error::DimensionMismatch {
                left: self.label(a),
                right: self.label(b),
            })
        }
    }

    pub(crate) fn is_factor(&self, part: Dimension, whole: Dimension) -> bool {
        if part == Dimension::NUMBER {
            return whole == Dimension::NUMBER;
        }
        if part == whole {
            return true;
        }
        self.record(part)
            .exponents
            .iter()
            .zip(&self.record(whole).exponents)
            .all(|(&p, &w)| p == 0 || (p.signum() == w.signum() && w.abs() >= p.abs()))
    }

    pub(crate) fn exponents(&self, dimension: Dimension) -> &[i32] {
        &self.record(dimension).exponents
    }

    pub(crate) fn name(&self, dimension: Dimension) -> Option<&str> {
        self.record(dimension).name.as_deref()
    }

    pub(crate) fn symbol(&self, dimension: Dimension) -> Option<&str> {
        self.record(dimension).symbol.as_deref()
    }

    pub(crate) fn lookup_name(&self, name: &str) -> Option<Dimension> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn fundamental(&self) -> &[Dimension] {
        &self.fundamental
    }

    pub(crate) fn known(&self) -> Vec<Dimension> {
        (0..self.records.len() as u32).map(Dimension).collect()
    }

    pub(crate) fn label(&self, dimension: Dimension) -> String {
        if let Some(symbol) = &self.record(dimension).symbol {
            return symbol.clone();
        }
        let parts: Vec<String> = self
            .fundamental
            .iter()
            .zip(&self.record(dimension).exponents)
            .filter(|(_, &exponent)| exponent != 0)
            .map(|(&axis, &exponent)| {
                let symbol = self.record(axis).symbol.as_deref().unwrap_or("?");
                if exponent == 1 {
                    symbol.to_string()
                } else {
                    format!("{symbol}^{exponent}")
                }
            })
            .collect();
        if parts.is_empty() {
            "?".to_string()
        } else {
            parts.join("·")
        }
    }
}
