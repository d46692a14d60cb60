//! Conversion engine
//!
//! Conversions between commensurable units form a sparse graph: `equate`
//! and `translate` declare symmetric edges, and `convert` searches the
//! graph for a path, memoizing results. Edge lists are ordered by
//! declaration, so path search is deterministic across runs.
//!
//! The search works on the numerator and denominator of a unit's factor
//! ratio independently, after collapsing same-dimension factors into a
//! single anchor unit and after dividing out any common power of the
//! dimension (so a `foot^2` to `inch^2` request reuses the `foot` to
//! `inch` edge, squared).

use std::collections::{HashMap, HashSet};

use mensura_core::Number;
use num_integer::gcd;

use crate::dimension::Dimension;
use crate::error::{Error, Result};
use crate::prefix::Prefix;
use crate::quantity::Quantity;
use crate::system::UnitSystem;
use crate::unit::Unit;

#[derive(Debug, Clone)]
struct Edge {
    to: Unit,
    scale: Number,
    offset: Number,
}

/// One step of a conversion plan: `magnitude * scale + offset`, landing in
/// `unit`
#[derive(Debug, Clone)]
pub(crate) struct Hop {
    scale: Number,
    offset: Number,
    unit: Unit,
}

/// Conversion graph plus memoization state
#[derive(Debug, Default)]
pub(crate) struct ConversionTable {
    edges: HashMap<Unit, Vec<Edge>>,
    path_cache: HashMap<(Unit, Unit), Option<Vec<Hop>>>,
    collapse_cache: HashMap<Unit, (Number, Unit)>,
    searches: u64,
}

/// Observability counters for the conversion caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Path searches actually performed (cache misses)
    pub searches: u64,
    /// Entries in the path cache, including negative results
    pub cached_paths: usize,
    /// Directed edges declared so far
    pub edges: usize,
}

impl ConversionTable {
    /// Appends a directed edge and drops every memoized result; paths found
    /// before this edge existed may no longer be the ones declaration order
    /// would now produce
    fn add_edge(&mut self, from: Unit, edge: Edge) {
        self.edges.entry(from).or_default().push(edge);
        self.path_cache.clear();
        self.collapse_cache.clear();
    }
}

impl UnitSystem {
    /// Declares that the two quantities describe the same amount, deriving
    /// the ratio between their units in both directions. Both sides are
    /// unprefixed first, so `1 km == 1000 m` declares a `1 m == 1 m` edge
    /// and is rejected as a self-conversion.
    pub fn equate(&mut self, a: Quantity, b: Quantity) -> Result<()> {
        let a = a.unprefixed(self);
        let b = b.unprefixed(self);
        let left = a.unit.dimension(self);
        let right = b.unit.dimension(self);
        if left != right {
            return Err(Error::DimensionMismatch {
                left: a.unit.label(self),
                right: b.unit.label(self),
            });
        }
        if a.unit == b.unit && a.unit != Unit::ONE {
            return Err(Error::SelfConversion {
                unit: a.unit.label(self),
            });
        }
        let forward = b.magnitude.checked_div(&a.magnitude)?;
        let backward = a.magnitude.checked_div(&b.magnitude)?;
        tracing::debug!(
            from = %a.unit.label(self),
            to = %b.unit.label(self),
            ratio = %forward,
            "equated units"
        );
        self.conversions.add_edge(
            a.unit,
            Edge {
                to: b.unit,
                scale: forward,
                offset: Number::zero(),
            },
        );
        self.conversions.add_edge(
            b.unit,
            Edge {
                to: a.unit,
                scale: backward,
                offset: Number::zero(),
            },
        );
        Ok(())
    }

    /// Declares that `unit` measures the same scale as `zero.unit` but from
    /// a shifted origin: `0 unit` coincides with `zero`, as in
    /// `translate(celsius, 273.15 kelvin)`
    pub fn translate(&mut self, unit: Unit, zero: Quantity) -> Result<()> {
        let zero = zero.unprefixed(self);
        let scaled = unit.quantify(self);
        let left = scaled.unit.dimension(self);
        let right = zero.unit.dimension(self);
        if left != right {
            return Err(Error::DimensionMismatch {
                left: scaled.unit.label(self),
                right: zero.unit.label(self),
            });
        }
        if scaled.unit == zero.unit && scaled.unit != Unit::ONE {
            return Err(Error::SelfConversion {
                unit: scaled.unit.label(self),
            });
        }
        // degrees in the bare unit map to zero's unit through the folded
        // prefix magnitude: m_zero = m_bare / p + zero
        let forward_scale = Number::one().checked_div(&scaled.magnitude)?;
        let backward_offset = zero.magnitude.neg().mul(&scaled.magnitude);
        tracing::debug!(
            from = %scaled.unit.label(self),
            to = %zero.unit.label(self),
            offset = %zero.magnitude,
            "translated units"
        );
        self.conversions.add_edge(
            scaled.unit,
            Edge {
                to: zero.unit,
                scale: forward_scale,
                offset: zero.magnitude.clone(),
            },
        );
        self.conversions.add_edge(
            zero.unit,
            Edge {
                to: scaled.unit,
                scale: scaled.magnitude,
                offset: backward_offset,
            },
        );
        Ok(())
    }

    /// Expresses a quantity in another unit of the same dimension.
    ///
    /// Incommensurable targets fail with [`Error::DimensionMismatch`];
    /// commensurable targets with no declared path fail with
    /// [`Error::ConversionNotFound`].
    pub fn convert(&mut self, quantity: &Quantity, target: Unit) -> Result<Quantity> {
        if quantity.unit == target {
            return Ok(quantity.clone());
        }
        let source_dimension = quantity.unit.dimension(self);
        let target_dimension = target.dimension(self);
        if source_dimension != target_dimension {
            return Err(Error::DimensionMismatch {
                left: quantity.unit.label(self),
                right: target.label(self),
            });
        }

        let this = quantity.unprefixed(self);
        let other = target.quantify(self);

        let (this_multiplier, this_unit) = match self.collapse_by_dimension(this.unit) {
            Some(collapsed) => collapsed,
            None => return Err(self.no_conversion(quantity.unit, target)),
        };
        let (other_multiplier, other_unit) = match self.collapse_by_dimension(other.unit) {
            Some(collapsed) => collapsed,
            None => return Err(self.no_conversion(quantity.unit, target)),
        };

        // a declared edge may join units whose ratio shapes differ, e.g. a
        // named reciprocal (hertz vs s^-1) or a named compound rate, so try
        // the whole pair before splitting
        if let Some(path) = self.find_path(this_unit, other_unit) {
            let mut this_magnitude = this.magnitude.mul(&this_multiplier);
            for hop in &path {
                this_magnitude = this_magnitude.mul(&hop.scale).add(&hop.offset);
            }
            let other_magnitude = other.magnitude.mul(&other_multiplier);
            let magnitude = this_magnitude.checked_div(&other_magnitude)?;
            return Ok(Quantity::new(magnitude, target));
        }

        let (this_numerator, this_denominator) = this_unit.as_ratio(self);
        let (other_numerator, other_denominator) = other_unit.as_ratio(self);

        let numerator_path = match self.find_path(this_numerator, other_numerator) {
            Some(path) => path,
            None => return Err(self.no_conversion(quantity.unit, target)),
        };
        let denominator_path = match self.find_path(this_denominator, other_denominator) {
            Some(path) => path,
            None => return Err(self.no_conversion(quantity.unit, target)),
        };

        let mut this_magnitude = this.magnitude.mul(&this_multiplier);
        for hop in &numerator_path {
            this_magnitude = this_magnitude.mul(&hop.scale).add(&hop.offset);
        }
        let mut other_magnitude = other.magnitude.mul(&other_multiplier);
        for hop in &denominator_path {
            other_magnitude = other_magnitude.mul(&hop.scale).add(&hop.offset);
        }

        let magnitude = this_magnitude.checked_div(&other_magnitude)?;
        Ok(Quantity::new(magnitude, target))
    }

    fn no_conversion(&self, from: Unit, to: Unit) -> Error {
        Error::ConversionNotFound {
            from: from.label(self),
            to: to.label(self),
        }
    }

    /// Observability counters for tests and diagnostics
    pub fn conversion_stats(&self) -> ConversionStats {
        ConversionStats {
            searches: self.conversions.searches,
            cached_paths: self.conversions.path_cache.len(),
            edges: self.conversions.edges.values().map(Vec::len).sum(),
        }
    }

    /// Merges same-dimension factors of a unit into a single anchor factor
    /// per dimension, returning the net magnitude multiplier and the
    /// collapsed unit. `foot·inch` becomes `foot^2` with multiplier `1/12`.
    /// `None` when two factors of the same dimension have no declared path
    /// between them; successes are cached per input unit.
    fn collapse_by_dimension(&mut self, unit: Unit) -> Option<(Number, Unit)> {
        if let Some(cached) = self.conversions.collapse_cache.get(&unit) {
            return Some(cached.clone());
        }
        let factors = self.units.factors(unit).to_vec();
        let dimension = self.units.dimension(unit);

        let mut groups: Vec<(Dimension, Vec<(Unit, i32)>)> = Vec::new();
        for (factor, exponent) in factors {
            let factor_dimension = factor.dimension(self);
            match groups.iter_mut().find(|(d, _)| *d == factor_dimension) {
                Some((_, members)) => members.push((factor, exponent)),
                None => groups.push((factor_dimension, vec![(factor, exponent)])),
            }
        }

        let mut multiplier = Number::one();
        let mut collapsed: Vec<(Unit, i32)> = Vec::new();
        for (_, members) in groups {
            let mut members = members.into_iter();
            let Some((anchor, mut anchor_exponent)) = members.next() else {
                continue;
            };
            for (factor, exponent) in members {
                let path = self.find_path(factor, anchor)?;
                let mut scale = Number::one();
                for hop in &path {
                    scale = scale.mul(&hop.scale).add(&hop.offset);
                }
                multiplier = multiplier.mul(&scale.pow(exponent));
                anchor_exponent += exponent;
            }
            collapsed.push((anchor, anchor_exponent));
        }

        let collapsed_unit = self.units.intern(Prefix::IDENTITY, collapsed, dimension);
        self.conversions
            .collapse_cache
            .insert(unit, (multiplier.clone(), collapsed_unit));
        Some((multiplier, collapsed_unit))
    }

    /// Memoized path search; negative results are cached too
    fn find_path(&mut self, start: Unit, end: Unit) -> Option<Vec<Hop>> {
        if let Some(cached) = self.conversions.path_cache.get(&(start, end)) {
            return cached.clone();
        }
        self.conversions.searches += 1;
        let path = self.compute_path(start, end);
        tracing::debug!(
            from = %start.label(self),
            to = %end.label(self),
            hops = path.as_ref().map(Vec::len),
            "searched conversion path"
        );
        self.conversions.path_cache.insert((start, end), path.clone());
        path
    }

    fn compute_path(&mut self, start: Unit, end: Unit) -> Option<Vec<Hop>> {
        if start == end {
            return Some(Vec::new());
        }
        // search from the structurally simpler side: an edge declared on a
        // named compound (acre) is only discoverable by starting there
        let (reduced_start, reduced_end, _) = self.reduce_pair(start, end);
        let start_weight = self.factor_weight(reduced_start);
        let end_weight = self.factor_weight(reduced_end);
        if start_weight > end_weight {
            tracing::trace!(
                from = %start.label(self),
                to = %end.label(self),
                "searching in reverse"
            );
            let mut visited = HashSet::new();
            let path = self.dfs(end, start, &mut visited)?;
            self.invert_path(&path, end)
        } else {
            let mut visited = HashSet::new();
            self.dfs(start, end, &mut visited)
        }
    }

    /// Depth-first search over the edge lists. Each level divides out any
    /// common power of the pair's dimensions first, so higher-power
    /// requests reuse first-power edges; the found path is raised back to
    /// the level's power on the way out. Direct edges win immediately,
    /// otherwise the shortest path found wins with earlier declarations
    /// breaking ties.
    fn dfs(&mut self, start: Unit, end: Unit, visited: &mut HashSet<Unit>) -> Option<Vec<Hop>> {
        if start == end {
            return Some(Vec::new());
        }
        if !visited.insert(start) {
            return None;
        }
        let (start, end, exponent) = self.reduce_pair(start, end);
        if start == end {
            return Some(Vec::new());
        }
        let edges = self.conversions.edges.get(&start)?.clone();
        let mut best: Option<Vec<Hop>> = None;
        for edge in edges {
            let hop = Hop {
                scale: edge.scale.clone(),
                offset: edge.offset.clone(),
                unit: edge.to,
            };
            if edge.to == end {
                return Some(self.raise_path(vec![hop], exponent));
            }
            if visited.contains(&edge.to) {
                continue;
            }
            if let Some(rest) = self.dfs(edge.to, end, visited) {
                let mut path = Vec::with_capacity(1 + rest.len());
                path.push(hop);
                path.extend(rest);
                if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                    best = Some(path);
                }
            }
        }
        best.map(|path| self.raise_path(path, exponent))
    }

    /// Divides both units by any common power of their dimensions, e.g.
    /// `(foot^2, inch^2)` becomes `(foot, inch)` at power 2. Units whose
    /// factor exponents do not divide evenly (a named compound like acre)
    /// are left alone.
    fn reduce_pair(&mut self, start: Unit, end: Unit) -> (Unit, Unit, u32) {
        let common = {
            let start_exponents = self.dimensions.exponents(self.units.dimension(start));
            let end_exponents = self.dimensions.exponents(self.units.dimension(end));
            start_exponents
                .iter()
                .chain(end_exponents)
                .fold(0i32, |g, &e| gcd(g, e.abs()))
        };
        if common <= 1 {
            return (start, end, 1);
        }
        let degree = common as u32;
        let UnitSystem {
            dimensions,
            prefixes,
            units,
            ..
        } = self;
        match (
            units.root(start, degree, dimensions, prefixes),
            units.root(end, degree, dimensions, prefixes),
        ) {
            (Ok(reduced_start), Ok(reduced_end)) => (reduced_start, reduced_end, degree),
            _ => (start, end, 1),
        }
    }

    fn factor_weight(&self, unit: Unit) -> i32 {
        self.units
            .factors(unit)
            .iter()
            .map(|&(_, exponent)| exponent.abs())
            .sum()
    }

    fn raise_path(&mut self, path: Vec<Hop>, exponent: u32) -> Vec<Hop> {
        if exponent <= 1 {
            return path;
        }
        let power = exponent as i32;
        path.into_iter()
            .map(|hop| Hop {
                scale: hop.scale.pow(power),
                offset: hop.offset.pow(power),
                unit: hop.unit.pow(power, self),
            })
            .collect()
    }

    /// Reverses a path found from `search_start`, inverting each affine
    /// step: `m' = m*s + o` becomes `m = m'/s - o/s`
    fn invert_path(&self, path: &[Hop], search_start: Unit) -> Option<Vec<Hop>> {
        let mut inverted = Vec::with_capacity(path.len());
        for (index, hop) in path.iter().enumerate().rev() {
            let scale = Number::one().checked_div(&hop.scale).ok()?;
            let offset = hop.offset.neg().checked_div(&hop.scale).ok()?;
            let unit = if index == 0 {
                search_start
            } else {
                path[index - 1].unit
            };
            inverted.push(Hop {
                scale,
                offset,
                unit,
            });
        }
        Some(inverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths() -> (UnitSystem, Unit, Unit) {
        let mut system = UnitSystem::new();
        let length = system.define_dimension("length", "L").unwrap();
        let foot = system.define_unit(length, "foot", "ft").unwrap();
        let inch = system.define_unit(length, "inch", "in").unwrap();
        system
            .equate(Quantity::of(1, foot), Quantity::of(12, inch))
            .unwrap();
        (system, foot, inch)
    }

    #[test]
    fn test_direct_edges_both_ways() {
        let (mut system, foot, inch) = lengths();
        let inches = system.convert(&Quantity::of(1, foot), inch).unwrap();
        assert_eq!(inches.magnitude, Number::from_i64(12));
        assert_eq!(inches.unit, inch);

        let feet = system.convert(&Quantity::of(12, inch), foot).unwrap();
        assert_eq!(feet.magnitude, Number::from_i64(1));
    }

    #[test]
    fn test_multi_hop_chain() {
        let (mut system, foot, inch) = lengths();
        let length = system.dimension_named("length").unwrap();
        let yard = system.define_unit(length, "yard", "yd").unwrap();
        system
            .equate(Quantity::of(1, yard), Quantity::of(3, foot))
            .unwrap();

        let inches = system.convert(&Quantity::of(1, yard), inch).unwrap();
        assert_eq!(inches.magnitude, Number::from_i64(36));
        let yards = system.convert(&Quantity::of(72, inch), yard).unwrap();
        assert_eq!(yards.magnitude, Number::from_i64(2));
    }

    #[test]
    fn test_powers_reuse_first_power_edges() {
        let (mut system, foot, inch) = lengths();
        let square_foot = foot.pow(2, &mut system);
        let square_inch = inch.pow(2, &mut system);
        let converted = system
            .convert(&Quantity::of(144, square_inch), square_foot)
            .unwrap();
        assert_eq!(converted.magnitude, Number::from_i64(1));

        let cubic_foot = foot.pow(3, &mut system);
        let cubic_inch = inch.pow(3, &mut system);
        let cubic = system
            .convert(&Quantity::of(1, cubic_foot), cubic_inch)
            .unwrap();
        assert_eq!(cubic.magnitude, Number::from_i64(1728));
    }

    #[test]
    fn test_named_compound_reached_in_reverse() {
        let (mut system, foot, inch) = lengths();
        let area = foot.dimension(&system).pow(2, &mut system);
        let acre = system.define_unit(area, "acre", "ac").unwrap();
        let square_foot = foot.pow(2, &mut system);
        system
            .equate(Quantity::of(1, acre), Quantity::of(43560, square_foot))
            .unwrap();

        let square_inch = inch.pow(2, &mut system);
        let inches = system.convert(&Quantity::of(1, acre), square_inch).unwrap();
        assert_eq!(inches.magnitude, Number::from_i64(6_272_640));

        // the edge lives on acre, so this search must start there and
        // invert the result
        let acres = system
            .convert(&Quantity::of(6_272_640, square_inch), acre)
            .unwrap();
        assert_eq!(acres.magnitude, Number::from_i64(1));
    }

    #[test]
    fn test_named_reciprocal_unit_edges() {
        let mut system = UnitSystem::new();
        let time = system.define_dimension("time", "T").unwrap();
        let second = system.define_unit(time, "second", "s").unwrap();
        let frequency = time.pow(-1, &mut system);
        let hertz = system.define_unit(frequency, "hertz", "Hz").unwrap();
        let per_second = second.pow(-1, &mut system);
        system
            .equate(Quantity::of(1, hertz), Quantity::of(1, per_second))
            .unwrap();

        // hertz is a base unit while s^-1 is all denominator, so the edge
        // connects units whose ratio shapes differ
        let spun = system.convert(&Quantity::of(5, hertz), per_second).unwrap();
        assert_eq!(spun.magnitude, Number::from_i64(5));
        assert_eq!(spun.unit, per_second);

        let back = system.convert(&spun, hertz).unwrap();
        assert_eq!(back.magnitude, Number::from_i64(5));
        assert_eq!(back.unit, hertz);
    }

    #[test]
    fn test_named_rate_unit_reached_in_reverse() {
        let mut system = UnitSystem::new();
        let length = system.define_dimension("length", "L").unwrap();
        let time = system.define_dimension("time", "T").unwrap();
        let meter = system.define_unit(length, "meter", "m").unwrap();
        let second = system.define_unit(time, "second", "s").unwrap();
        let speed = length.div(time, &mut system);
        let knot = system.define_unit(speed, "knot", "kn").unwrap();
        let meter_per_second = meter.div(second, &mut system);
        system
            .equate(
                Quantity::of(1, knot),
                Quantity::new(
                    Number::from_ratio(1852, 3600).unwrap(),
                    meter_per_second,
                ),
            )
            .unwrap();

        let rate = system
            .convert(&Quantity::of(2, knot), meter_per_second)
            .unwrap();
        assert_eq!(rate.magnitude, Number::from_ratio(463, 450).unwrap());

        // the edge lives on knot, so this search must start there and
        // invert the result
        let knots = system.convert(&rate, knot).unwrap();
        assert_eq!(knots.magnitude, Number::from_i64(2));
    }

    #[test]
    fn test_offset_conversions_are_exact() {
        let mut system = UnitSystem::new();
        let temperature = system.define_dimension("temperature", "Θ").unwrap();
        let kelvin = system.define_unit(temperature, "kelvin", "K").unwrap();
        let celsius = system.define_unit(temperature, "celsius", "°C").unwrap();
        let freezing: Number = "273.15".parse().unwrap();
        system
            .translate(celsius, Quantity::new(freezing.clone(), kelvin))
            .unwrap();

        let boiled = system
            .convert(&Quantity::of(100, celsius), kelvin)
            .unwrap();
        assert_eq!(boiled.magnitude, "373.15".parse().unwrap());

        let frozen = system
            .convert(&Quantity::new(freezing, kelvin), celsius)
            .unwrap();
        assert_eq!(frozen.magnitude, Number::zero());
    }

    #[test]
    fn test_collapse_mixed_factors() {
        let (mut system, foot, inch) = lengths();
        // a foot·inch area equals 12 square inches
        let mixed = Quantity::of(1, foot.mul(inch, &mut system));
        let square_inch = inch.pow(2, &mut system);
        let collapsed = system.convert(&mixed, square_inch).unwrap();
        assert_eq!(collapsed.magnitude, Number::from_i64(12));
    }

    #[test]
    fn test_collapse_requires_connected_factors() {
        let (mut system, foot, _) = lengths();
        let length = system.dimension_named("length").unwrap();
        let cubit = system.define_unit(length, "cubit", "cb").unwrap();
        let mixed = Quantity::of(1, foot.mul(cubit, &mut system));
        let square_foot = foot.pow(2, &mut system);
        assert!(matches!(
            system.convert(&mixed, square_foot),
            Err(Error::ConversionNotFound { .. })
        ));
    }

    #[test]
    fn test_prefixed_source_and_target() {
        let (mut system, foot, inch) = lengths();
        let kilo = system.define_prefix(10, 3, "kilo", "k").unwrap();
        let kilofoot = foot.scale(kilo, &mut system);
        let inches = system.convert(&Quantity::of(1, kilofoot), inch).unwrap();
        assert_eq!(inches.magnitude, Number::from_i64(12_000));

        let kilofeet = system
            .convert(&Quantity::of(24_000, inch), kilofoot)
            .unwrap();
        assert_eq!(kilofeet.magnitude, Number::from_i64(2));
    }

    #[test]
    fn test_unconnected_units_and_dimension_mismatch() {
        let (mut system, foot, _) = lengths();
        let length = system.dimension_named("length").unwrap();
        let cubit = system.define_unit(length, "cubit", "cb").unwrap();
        assert!(matches!(
            system.convert(&Quantity::of(1, foot), cubit),
            Err(Error::ConversionNotFound { .. })
        ));
        assert!(matches!(
            system.convert(&Quantity::of(1, cubit), foot),
            Err(Error::ConversionNotFound { .. })
        ));

        let time = system.define_dimension("time", "T").unwrap();
        let second = system.define_unit(time, "second", "s").unwrap();
        assert!(matches!(
            system.convert(&Quantity::of(1, foot), second),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_equate_validation() {
        let (mut system, foot, inch) = lengths();
        assert!(matches!(
            system.equate(Quantity::of(1, foot), Quantity::of(1, foot)),
            Err(Error::SelfConversion { .. })
        ));
        assert!(system
            .equate(Quantity::of(0, foot), Quantity::of(12, inch))
            .is_err());
        assert!(system
            .equate(Quantity::of(1, foot), Quantity::of(0, inch))
            .is_err());

        let time = system.define_dimension("time", "T").unwrap();
        let second = system.define_unit(time, "second", "s").unwrap();
        assert!(matches!(
            system.equate(Quantity::of(1, foot), Quantity::of(1, second)),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_prefixes_collapse_before_self_conversion_check() {
        let (mut system, foot, _) = lengths();
        let kilo = system.define_prefix(10, 3, "kilo", "k").unwrap();
        let kilofoot = foot.scale(kilo, &mut system);
        assert!(matches!(
            system.equate(Quantity::of(1, kilofoot), Quantity::of(1000, foot)),
            Err(Error::SelfConversion { .. })
        ));
    }

    #[test]
    fn test_search_results_are_memoized() {
        let (mut system, foot, inch) = lengths();
        let _ = system.convert(&Quantity::of(1, foot), inch).unwrap();
        let after_first = system.conversion_stats().searches;
        let _ = system.convert(&Quantity::of(7, foot), inch).unwrap();
        assert_eq!(system.conversion_stats().searches, after_first);

        // negative results are cached too
        let length = system.dimension_named("length").unwrap();
        let cubit = system.define_unit(length, "cubit", "cb").unwrap();
        assert!(system.convert(&Quantity::of(1, foot), cubit).is_err());
        let after_miss = system.conversion_stats().searches;
        assert!(system.convert(&Quantity::of(1, foot), cubit).is_err());
        assert_eq!(system.conversion_stats().searches, after_miss);
    }

    #[test]
    fn test_new_edges_invalidate_caches() {
        let (mut system, foot, _) = lengths();
        let length = system.dimension_named("length").unwrap();
        let cubit = system.define_unit(length, "cubit", "cb").unwrap();
        assert!(system.convert(&Quantity::of(1, foot), cubit).is_err());

        system
            .equate(Quantity::of(2, foot), Quantity::of(1, cubit))
            .unwrap();
        let cubits = system.convert(&Quantity::of(4, foot), cubit).unwrap();
        assert_eq!(cubits.magnitude, Number::from_i64(2));
    }

    #[test]
    fn test_round_trips_are_exact() {
        let (mut system, foot, inch) = lengths();
        let start = Quantity::new(Number::from_ratio(7, 3).unwrap(), foot);
        let there = system.convert(&start, inch).unwrap();
        let back = system.convert(&there, foot).unwrap();
        assert_eq!(back.magnitude, start.magnitude);
    }
}
