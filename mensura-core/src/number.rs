//! Exact arbitrary-precision numbers
//!
//! Conversion ratios are often reciprocals of small integers (1/12, 1/3600),
//! and the algebraic invariants of the unit registries only hold if chains of
//! those ratios compose without rounding. Number is therefore a rational
//! built on num-rational's BigRational: field operations are exact, and only
//! the explicitly-approximate operations (inexact roots, f64 exports) lose
//! precision.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),
}

/// Longest denominator (in decimal digits) rendered as a plain decimal
/// before Display falls back to the `numerator/denominator` form.
const MAX_DISPLAY_SCALE: u32 = 64;

/// Exact rational number
///
/// All operations return Results or new Numbers - never panic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Number {
    inner: BigRational,
}

impl Number {
    // ========== Construction ==========

    /// The number zero
    pub fn zero() -> Self {
        Self {
            inner: BigRational::zero(),
        }
    }

    /// The number one
    pub fn one() -> Self {
        Self {
            inner: BigRational::from_integer(BigInt::from(1)),
        }
    }

    /// Create from i64
    pub fn from_i64(n: i64) -> Self {
        Self {
            inner: BigRational::from_integer(BigInt::from(n)),
        }
    }

    /// Create from a ratio of integers (exact division)
    pub fn from_ratio(numerator: i64, denominator: i64) -> Result<Self, NumberError> {
        if denominator == 0 {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Self {
            inner: BigRational::new(BigInt::from(numerator), BigInt::from(denominator)),
        })
    }

    /// Create from f64; NaN and infinities collapse to zero
    pub fn from_f64(f: f64) -> Self {
        if !f.is_finite() {
            return Self::zero();
        }
        BigRational::from_float(f)
            .map(|inner| Self { inner })
            .unwrap_or_else(Self::zero)
    }

    // ========== Predicates ==========

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.inner.is_negative()
    }

    /// Check if the value is an integer
    pub fn is_integer(&self) -> bool {
        self.inner.is_integer()
    }

    // ========== Basic Arithmetic ==========

    /// Addition
    pub fn add(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner + &other.inner,
        }
    }

    /// Subtraction
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner - &other.inner,
        }
    }

    /// Multiplication
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner * &other.inner,
        }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self {
                inner: &self.inner / &other.inner,
            })
        }
    }

    /// Integer power (exact); zero raised to a negative power collapses
    /// to zero rather than erroring
    pub fn pow(&self, exponent: i32) -> Self {
        if exponent == 0 {
            return Self::one();
        }
        if self.is_zero() {
            return Self::zero();
        }

        let magnitude = exponent.unsigned_abs();
        let numer: BigInt = Pow::pow(self.inner.numer(), magnitude);
        let denom: BigInt = Pow::pow(self.inner.denom(), magnitude);

        let inner = if exponent > 0 {
            BigRational::new(numer, denom)
        } else {
            BigRational::new(denom, numer)
        };
        Self { inner }
    }

    /// Integer root
    ///
    /// Exact when the operand is a perfect power of the degree; otherwise an
    /// approximation seeded from the f64 value of the operand.
    pub fn nth_root(&self, degree: u32) -> Result<Self, NumberError> {
        if degree == 0 {
            return Err(NumberError::DomainError("zeroth root".to_string()));
        }
        if degree == 1 || self.is_zero() {
            return Ok(self.clone());
        }
        if self.is_negative() && degree % 2 == 0 {
            return Err(NumberError::DomainError(
                "even root of a negative number".to_string(),
            ));
        }

        let numer = self.inner.numer().abs();
        let denom = self.inner.denom().clone();
        let numer_root = numer.nth_root(degree);
        let denom_root = denom.nth_root(degree);
        if Pow::pow(&numer_root, degree) == numer && Pow::pow(&denom_root, degree) == denom {
            let mut inner = BigRational::new(numer_root, denom_root);
            if self.is_negative() {
                inner = -inner;
            }
            return Ok(Self { inner });
        }

        let f = self
            .to_f64()
            .ok_or_else(|| NumberError::DomainError("root operand out of f64 range".to_string()))?;
        let approx = f.abs().powf(1.0 / f64::from(degree));
        let approx = if f < 0.0 { -approx } else { approx };
        BigRational::from_float(approx)
            .map(|inner| Self { inner })
            .ok_or_else(|| NumberError::DomainError("root result out of f64 range".to_string()))
    }

    // ========== Other Operations ==========

    /// Absolute value
    pub fn abs(&self) -> Self {
        Self {
            inner: self.inner.abs(),
        }
    }

    /// Negation
    pub fn neg(&self) -> Self {
        Self {
            inner: -self.inner.clone(),
        }
    }

    /// Try to convert to i64
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.inner.numer().to_i64()
    }

    /// Convert to f64 (may lose precision)
    pub fn to_f64(&self) -> Option<f64> {
        let f = self.inner.to_f64()?;
        f.is_finite().then_some(f)
    }

    /// Render as an exact decimal when the denominator allows one
    fn exact_decimal(&self) -> Option<String> {
        let two = BigInt::from(2);
        let five = BigInt::from(5);

        let mut twos: u32 = 0;
        let mut fives: u32 = 0;
        let mut rest = self.inner.denom().clone();
        while (&rest % &two).is_zero() {
            rest /= &two;
            twos += 1;
        }
        while (&rest % &five).is_zero() {
            rest /= &five;
            fives += 1;
        }
        if rest != BigInt::from(1) {
            return None;
        }

        let scale = twos.max(fives);
        if scale > MAX_DISPLAY_SCALE {
            return None;
        }

        let ten_pow: BigInt = Pow::pow(&BigInt::from(10), scale);
        let scaled = (self.inner.numer() * ten_pow) / self.inner.denom();

        let negative = scaled.is_negative();
        let mut digits = scaled.abs().to_string();
        let scale = scale as usize;
        while digits.len() <= scale {
            digits.insert(0, '0');
        }
        digits.insert(digits.len() - scale, '.');

        if negative {
            digits.insert(0, '-');
        }
        Some(digits)
    }
}

// ========== Trait Implementations ==========

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            return write!(f, "{}", self.inner.numer());
        }
        match self.exact_decimal() {
            Some(decimal) => write!(f, "{decimal}"),
            None => write!(f, "{}/{}", self.inner.numer(), self.inner.denom()),
        }
    }
}

impl FromStr for Number {
    type Err = NumberError;

    /// Parses integers, decimals, `a/b` rationals, and scientific notation:
    /// "123", "3.14", "1/3", "1.5e10", "-42"
    fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        if let Some((numer, denom)) = s.split_once('/') {
            let numer: BigInt = numer
                .trim()
                .parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            let denom: BigInt = denom
                .trim()
                .parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            if denom.is_zero() {
                return Err(NumberError::DivisionByZero);
            }
            return Ok(Self {
                inner: BigRational::new(numer, denom),
            });
        }

        if let Some((mantissa, exponent)) = s.split_once(['e', 'E']) {
            let mantissa = parse_decimal(mantissa)?;
            let exponent: i32 = exponent
                .parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            let ten_pow: BigInt = Pow::pow(&BigInt::from(10), exponent.unsigned_abs());
            let scale = BigRational::from_integer(ten_pow);
            let inner = if exponent >= 0 {
                mantissa * scale
            } else {
                mantissa / scale
            };
            return Ok(Self { inner });
        }

        Ok(Self {
            inner: parse_decimal(s)?,
        })
    }
}

/// Parses `[+-]?digits[.digits]` into an exact rational
fn parse_decimal(s: &str) -> Result<BigRational, NumberError> {
    let s = s.trim();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(NumberError::ParseError(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(NumberError::ParseError(s.to_string()));
    }

    let digits = format!("{int_part}{frac_part}");
    let mantissa: BigInt = digits
        .parse()
        .map_err(|_| NumberError::ParseError(s.to_string()))?;
    let denom: BigInt = Pow::pow(&BigInt::from(10), frac_part.len() as u32);

    let mut inner = BigRational::new(mantissa, denom);
    if negative {
        inner = -inner;
    }
    Ok(inner)
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
