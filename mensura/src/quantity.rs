//! Quantities: a magnitude paired with a unit
//!
//! All arithmetic is exact. Addition and subtraction convert the right
//! operand into the left operand's unit first, so `1 foot + 12 inch` is
//! `2 foot`; mixing incommensurable dimensions is an error, not a panic.
//! Equality across units goes through the conversion engine and therefore
//! needs the system, so `Quantity` deliberately does not implement
//! `PartialEq`; use [`Quantity::eq_in`] or compare fields directly.

use std::cmp::Ordering;

use mensura_core::Number;
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::Result;
use crate::system::UnitSystem;
use crate::unit::Unit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: Number,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: Number, unit: Unit) -> Self {
        Quantity { magnitude, unit }
    }

    /// Convenience for integer magnitudes
    pub fn of(magnitude: i64, unit: Unit) -> Self {
        Quantity::new(Number::from_i64(magnitude), unit)
    }

    pub fn dimension(&self, system: &UnitSystem) -> Dimension {
        self.unit.dimension(system)
    }

    /// Fold the unit's prefix into the magnitude; `1 km` becomes `1000 m`
    pub fn unprefixed(&self, system: &mut UnitSystem) -> Quantity {
        let quantified = self.unit.quantify(system);
        Quantity::new(
            self.magnitude.mul(&quantified.magnitude),
            quantified.unit,
        )
    }

    /// Express this quantity in another unit of the same dimension
    pub fn in_unit(&self, target: Unit, system: &mut UnitSystem) -> Result<Quantity> {
        system.convert(self, target)
    }

    pub fn add(&self, other: &Quantity, system: &mut UnitSystem) -> Result<Quantity> {
        let converted = system.convert(other, self.unit)?;
        let unit = self.unit.add(converted.unit, system)?;
        Ok(Quantity::new(self.magnitude.add(&converted.magnitude), unit))
    }

    pub fn sub(&self, other: &Quantity, system: &mut UnitSystem) -> Result<Quantity> {
        let converted = system.convert(other, self.unit)?;
        let unit = self.unit.sub(converted.unit, system)?;
        Ok(Quantity::new(self.magnitude.sub(&converted.magnitude), unit))
    }

    pub fn mul(&self, other: &Quantity, system: &mut UnitSystem) -> Quantity {
        Quantity::new(
            self.magnitude.mul(&other.magnitude),
            self.unit.mul(other.unit, system),
        )
    }

    pub fn div(&self, other: &Quantity, system: &mut UnitSystem) -> Result<Quantity> {
        Ok(Quantity::new(
            self.magnitude.checked_div(&other.magnitude)?,
            self.unit.div(other.unit, system),
        ))
    }

    /// Scale by a bare number without touching the unit
    pub fn scale_by(&self, factor: &Number) -> Quantity {
        Quantity::new(self.magnitude.mul(factor), self.unit)
    }

    /// Raise to an integer power. The unit is always inverted exactly; a
    /// zero magnitude stays zero even under negative powers, per
    /// [`Number::pow`].
    pub fn pow(&self, power: i32, system: &mut UnitSystem) -> Quantity {
        Quantity::new(self.magnitude.pow(power), self.unit.pow(power, system))
    }

    pub fn root(&self, degree: u32, system: &mut UnitSystem) -> Result<Quantity> {
        let unit = self.unit.root(degree, system)?;
        let magnitude = self.magnitude.nth_root(degree)?;
        Ok(Quantity::new(magnitude, unit))
    }

    pub fn neg(&self) -> Quantity {
        Quantity::new(self.magnitude.neg(), self.unit)
    }

    pub fn abs(&self) -> Quantity {
        Quantity::new(self.magnitude.abs(), self.unit)
    }

    /// Exact equality across units: converts `other` into this unit and
    /// compares magnitudes. Incommensurable or unconnected quantities are
    /// simply unequal.
    pub fn eq_in(&self, other: &Quantity, system: &mut UnitSystem) -> bool {
        match system.convert(other, self.unit) {
            Ok(converted) => self.magnitude == converted.magnitude,
            Err(_) => false,
        }
    }

    /// Whether the two quantities differ by at most `within` (measured in
    /// this quantity's unit) after conversion
    pub fn approximates(&self, other: &Quantity, within: &Number, system: &mut UnitSystem) -> bool {
        match system.convert(other, self.unit) {
            Ok(converted) => {
                self.magnitude.sub(&converted.magnitude).abs() <= within.abs()
            }
            Err(_) => false,
        }
    }

    /// Ordering after conversion into this unit; `None` when the quantities
    /// are incommensurable or unconnected
    pub fn cmp_in(&self, other: &Quantity, system: &mut UnitSystem) -> Option<Ordering> {
        let converted = system.convert(other, self.unit).ok()?;
        self.magnitude.partial_cmp(&converted.magnitude)
    }

    pub fn label(&self, system: &UnitSystem) -> String {
        if self.unit == Unit::ONE {
            format!("{}", self.magnitude)
        } else {
            format!("{} {}", self.magnitude, self.unit.label(system))
        }
    }
}
