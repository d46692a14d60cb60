//! Metric-style prefix registry
//!
//! A prefix is a pure multiplier attached to a unit, held symbolically as a
//! normalized list of `(base, exponent)` terms so that prefixes from
//! different bases (decimal kilo, binary kibi) compose without losing
//! exactness. The empty term list is the identity prefix. Like dimensions,
//! prefixes are interned: one canonical handle per distinct term list.

use std::collections::HashMap;

use mensura_core::Number;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::system::UnitSystem;

/// Canonical handle to an interned prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prefix(pub(crate) u32);

impl Prefix {
    /// The multiplicative identity, an empty term list
    pub const IDENTITY: Prefix = Prefix(0);

    /// Combine prefixes; same-base terms merge by adding exponents, while
    /// terms with different bases are kept side by side
    pub fn mul(self, other: Prefix, system: &mut UnitSystem) -> Prefix {
        system.prefixes.multiply(self, other)
    }

    pub fn div(self, other: Prefix, system: &mut UnitSystem) -> Prefix {
        system.prefixes.divide(self, other)
    }

    pub fn pow(self, power: i32, system: &mut UnitSystem) -> Prefix {
        system.prefixes.power(self, power)
    }

    /// Take an integer root; every term's exponent must divide evenly
    pub fn root(self, degree: u32, system: &mut UnitSystem) -> Result<Prefix> {
        system.prefixes.root(self, degree)
    }

    /// The exact numeric multiplier this prefix denotes
    pub fn quantify(self, system: &UnitSystem) -> Number {
        system.prefixes.quantify(self)
    }

    /// The normalized `(base, exponent)` terms, sorted by base
    pub fn terms(self, system: &UnitSystem) -> &[(i64, i32)] {
        system.prefixes.terms(self)
    }

    pub fn name(self, system: &UnitSystem) -> Option<&str> {
        system.prefixes.name(self)
    }

    pub fn symbol(self, system: &UnitSystem) -> Option<&str> {
        system.prefixes.symbol(self)
    }

    /// The symbol if one is bound, else the terms spelled out like `10^3`;
    /// the identity renders as the empty string
    pub fn label(self, system: &UnitSystem) -> String {
        system.prefixes.label(self)
    }
}

#[derive(Debug)]
struct PrefixRecord {
    terms: Vec<(i64, i32)>,
    name: Option<String>,
    symbol: Option<String>,
}

/// Interning table for prefixes
#[derive(Debug, Default)]
pub(crate) struct PrefixTable {
    records: Vec<PrefixRecord>,
    by_key: HashMap<Vec<(i64, i32)>, Prefix>,
    by_name: HashMap<String, Prefix>,
    by_symbol: HashMap<String, Prefix>,
}

impl PrefixTable {
    /// Installs the identity prefix at handle 0
    pub(crate) fn seed(&mut self) {
        let identity = self.intern(Vec::new());
        debug_assert_eq!(identity, Prefix::IDENTITY);
    }

    fn record(&self, prefix: Prefix) -> &PrefixRecord {
        &self.records[prefix.0 as usize]
    }

    /// Merges duplicate bases, drops degenerate terms, and sorts by base
    fn normalize(terms: Vec<(i64, i32)>) -> Vec<(i64, i32)> {
        let mut merged: Vec<(i64, i32)> = Vec::with_capacity(terms.len());
        for (base, exponent) in terms {
            match merged.iter_mut().find(|(b, _)| *b == base) {
                Some((_, e)) => *e += exponent,
                None => merged.push((base, exponent)),
            }
        }
        merged.retain(|&(base, exponent)| exponent != 0 && base != 1);
        merged.sort_by_key(|&(base, _)| base);
        merged
    }

    fn intern(&mut self, terms: Vec<(i64, i32)>) -> Prefix {
        if let Some(&found) = self.by_key.get(&terms) {
            return found;
        }
        let prefix = Prefix(self.records.len() as u32);
        self.by_key.insert(terms.clone(), prefix);
        self.records.push(PrefixRecord {
            terms,
            name: None,
            symbol: None,
        });
        prefix
    }

    /// The canonical prefix for a single `base^exponent` term
    pub(crate) fn get(&mut self, base: i64, exponent: i32) -> Prefix {
        self.intern(Self::normalize(vec![(base, exponent)]))
    }

    fn check_free(&self, candidate: &str) -> Result<()> {
        if self.by_name.contains_key(candidate) || self.by_symbol.contains_key(candidate) {
            return Err(Error::NameTaken {
                kind: "prefix",
                name: candidate.to_string(),
            });
        }
        Ok(())
    }

    /// Names the canonical prefix for `base^exponent`
    pub(crate) fn define(
        &mut self,
        base: i64,
        exponent: i32,
        name: &str,
        symbol: &str,
    ) -> Result<Prefix> {
        self.check_free(name)?;
        self.check_free(symbol)?;
        let prefix = self.get(base, exponent);
        let record = &mut self.records[prefix.0 as usize];
        if record.name.is_none() {
            record.name = Some(name.to_string());
        }
        if record.symbol.is_none() {
            record.symbol = Some(symbol.to_string());
        }
        self.by_name.insert(name.to_string(), prefix);
        self.by_symbol.insert(symbol.to_string(), prefix);
        tracing::debug!(base, exponent, name, symbol, "defined prefix");
        Ok(prefix)
    }

    pub(crate) fn multiply(&mut self, a: Prefix, b: Prefix) -> Prefix {
        let mut terms = self.record(a).terms.clone();
        terms.extend_from_slice(&self.record(b).terms);
        self.intern(Self::normalize(terms))
    }

    pub(crate) fn divide(&mut self, a: Prefix, b: Prefix) -> Prefix {
        let mut terms = self.record(a).terms.clone();
        terms.extend(self.record(b).terms.iter().map(|&(base, e)| (base, -e)));
        self.intern(Self::normalize(terms))
    }

    pub(crate) fn power(&mut self, prefix: Prefix, power: i32) -> Prefix {
        let terms = self
            .record(prefix)
            .terms
            .iter()
            .map(|&(base, e)| (base, e * power))
            .collect();
        self.intern(Self::normalize(terms))
    }

    pub(crate) fn root(&mut self, prefix: Prefix, degree: u32) -> Result<Prefix> {
        if degree == 0 {
            return Ok(Prefix::IDENTITY);
        }
        if degree == 1 {
            return Ok(prefix);
        }
        let divisor = degree as i32;
        if self
            .record(prefix)
            .terms
            .iter()
            .any(|&(_, e)| e % divisor != 0)
        {
            return Err(Error::FractionalDimension {
                degree,
                value: self.label(prefix),
            });
        }
        let terms = self
            .record(prefix)
            .terms
            .iter()
            .map(|&(base, e)| (base, e / divisor))
            .collect();
        Ok(self.intern(Self::normalize(terms)))
    }

    /// Exact product of `base^exponent` over all terms
    pub(crate) fn quantify(&self, prefix: Prefix) -> Number {
        self.record(prefix)
            .terms
            .iter()
            .fold(Number::one(), |acc, &(base, exponent)| {
                acc.mul(&Number::from_i64(base).pow(exponent))
            })
    }

    pub(crate) fn terms(&self, prefix: Prefix) -> &[(i64, i32)] {
        &self.record(prefix).terms
    }

    pub(crate) fn name(&self, prefix: Prefix) -> Option<&str> {
        self.record(prefix).name.as_deref()
    }

    pub(crate) fn symbol(&self, prefix: Prefix) -> Option<&str> {
        self.record(prefix).symbol.as_deref()
    }

    pub(crate) fn lookup_name(&self, name: &str) -> Option<Prefix> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn known(&self) -> Vec<Prefix> {
        (0..self.records.len() as u32).map(Prefix).collect()
    }

    pub(crate) fn label(&self, prefix: Prefix) -> String {
        let record = self.record(prefix);
        if let Some(symbol) = &record.symbol {
            return symbol.clone();
        }
        record
            .terms
            .iter()
            .map(|&(base, exponent)| format!("{base}^{exponent}"))
            .collect::<Vec<_>>()
            .join("·")
    }
}
