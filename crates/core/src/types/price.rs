//! Fixed-point decimal price type.
//!
//! [`Price`] stores values as `mantissa * 10^(-scale)` and parses exchange
//! decimal strings exactly, digit by digit. This matters for order-book
//! reduction: `"9.9" < "10.0"` numerically even though the strings compare
//! the other way around lexically, and `"99.50"` equals `"99.5"` regardless
//! of how many trailing zeros the venue pads with.
//!
//! Cross-scale operands are normalized to the higher (more precise) scale
//! before comparing or operating.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Sub};

use serde::{Deserialize, Serialize};

/// Most fractional digits accepted from a wire decimal string.
const MAX_PARSE_SCALE: usize = 18;

/// Fixed-point decimal representing a price.
///
/// `value = mantissa * 10^(-scale)`
///
/// # Examples
///
/// ```
/// use tob_core::types::Price;
///
/// let price = Price::parse("50000.50").unwrap();
/// assert_eq!(price, Price::new(5000050, 2));
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Price {
    mantissa: i64,
    scale: u8,
}

impl Price {
    /// Create a new price from mantissa and scale.
    #[inline]
    pub const fn new(mantissa: i64, scale: u8) -> Self {
        Self { mantissa, scale }
    }

    /// Create a zero price with the given scale.
    #[inline]
    pub const fn zero(scale: u8) -> Self {
        Self { mantissa: 0, scale }
    }

    /// Returns `true` if this price is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Returns the raw mantissa.
    #[inline]
    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// Returns the scale (number of decimal places).
    #[inline]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Parse a decimal string exactly, without going through `f64`.
    ///
    /// Accepts an optional leading `-`, an integer part, and an optional
    /// fractional part (`"50000.50"`, `"0.06824000"`, `".5"`). Returns
    /// `None` for anything else, for more than 18 fractional digits, or on
    /// mantissa overflow.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if frac_part.len() > MAX_PARSE_SCALE {
            return None;
        }

        let mut mantissa: i64 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let digit = c.to_digit(10)? as i64;
            mantissa = mantissa.checked_mul(10)?.checked_add(digit)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Some(Self {
            mantissa,
            scale: frac_part.len() as u8,
        })
    }

    /// Convert to `f64`. Intended for logging and display only.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// Normalize two prices to the same (higher) scale, returning their
    /// aligned mantissas and the common scale.
    ///
    /// Returns `None` if the scale conversion would overflow `i64`.
    #[inline]
    fn normalize(a: Self, b: Self) -> Option<(i64, i64, u8)> {
        if a.scale == b.scale {
            return Some((a.mantissa, b.mantissa, a.scale));
        }

        let (lo, hi, lo_mantissa, hi_mantissa) = if a.scale < b.scale {
            (a.scale, b.scale, a.mantissa, b.mantissa)
        } else {
            (b.scale, a.scale, b.mantissa, a.mantissa)
        };

        let diff = (hi - lo) as u32;
        let factor = 10i64.checked_pow(diff)?;
        let scaled = lo_mantissa.checked_mul(factor)?;

        if a.scale < b.scale {
            Some((scaled, hi_mantissa, hi))
        } else {
            Some((hi_mantissa, scaled, hi))
        }
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({}, scale={})", self.to_f64(), self.scale)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            let divisor = 10i64.pow(self.scale as u32);
            let whole = self.mantissa / divisor;
            let frac = (self.mantissa % divisor).abs();
            write!(
                f,
                "{}.{:0>width$}",
                whole,
                frac,
                width = self.scale as usize
            )
        }
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        match Self::normalize(*self, *other) {
            Some((a, b, _)) => a == b,
            None => false,
        }
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        match Self::normalize(*self, *other) {
            Some((a, b, _)) => a.cmp(&b),
            // If normalization overflows, fall back to f64 comparison.
            None => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl Add for Price {
    type Output = Self;

    /// Add two prices. Panics on overflow.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        let (a, b, scale) =
            Self::normalize(self, rhs).expect("Price::add overflow during scale normalization");
        Self {
            mantissa: a.checked_add(b).expect("Price::add overflow"),
            scale,
        }
    }
}

impl Sub for Price {
    type Output = Self;

    /// Subtract two prices. Panics on overflow.
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        let (a, b, scale) =
            Self::normalize(self, rhs).expect("Price::sub overflow during scale normalization");
        Self {
            mantissa: a.checked_sub(b).expect("Price::sub overflow"),
            scale,
        }
    }
}

impl Div<i64> for Price {
    type Output = Self;

    /// Divide a price by an integer scalar (truncating division).
    #[inline]
    fn div(self, rhs: i64) -> Self::Output {
        assert!(rhs != 0, "Price::div division by zero");
        Self {
            mantissa: self.mantissa / rhs,
            scale: self.scale,
        }
    }
}

impl From<f64> for Price {
    /// Convert an `f64` to a `Price` with scale 8.
    ///
    /// Some venues transmit prices as JSON numbers rather than strings; this
    /// is the conversion for those, and for tests. Exact wire strings should
    /// go through [`Price::parse`] instead.
    fn from(value: f64) -> Self {
        const DEFAULT_SCALE: u8 = 8;
        let factor = 10f64.powi(DEFAULT_SCALE as i32);
        Self {
            mantissa: (value * factor).round() as i64,
            scale: DEFAULT_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let p = Price::new(5000050, 2);
        assert_eq!(p.mantissa(), 5000050);
        assert_eq!(p.scale(), 2);
    }

    #[test]
    fn test_zero() {
        let z = Price::zero(4);
        assert!(z.is_zero());
        assert_eq!(z.mantissa(), 0);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(Price::parse("42"), Some(Price::new(42, 0)));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Price::parse("50000.50"), Some(Price::new(5000050, 2)));
        assert_eq!(Price::parse("0.06824000"), Some(Price::new(6824000, 8)));
    }

    #[test]
    fn test_parse_leading_dot() {
        assert_eq!(Price::parse(".5"), Some(Price::new(5, 1)));
    }

    #[test]
    fn test_parse_trailing_dot() {
        assert_eq!(Price::parse("7."), Some(Price::new(7, 0)));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-1.25"), Some(Price::new(-125, 2)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Price::parse(""), None);
        assert_eq!(Price::parse("."), None);
        assert_eq!(Price::parse("abc"), None);
        assert_eq!(Price::parse("1e5"), None);
        assert_eq!(Price::parse("1.2.3"), None);
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(Price::parse("0.0000000000000000001").is_none()); // 19 digits
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(Price::parse("99999999999999999999").is_none());
    }

    #[test]
    fn test_parsed_eq_across_scales() {
        // "99.5" and "99.50" are the same price.
        assert_eq!(Price::parse("99.5").unwrap(), Price::parse("99.50").unwrap());
    }

    #[test]
    fn test_parsed_ord_is_numeric_not_lexical() {
        // Lexically "9.9" > "10.0"; numerically it is smaller.
        let a = Price::parse("9.9").unwrap();
        let b = Price::parse("10.0").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_ord_different_scale() {
        assert!(Price::new(250, 2) > Price::new(20, 1)); // 2.50 > 2.0
    }

    #[test]
    fn test_to_f64() {
        let p = Price::new(5000050, 2);
        assert!((p.to_f64() - 50000.50).abs() < 1e-10);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Price::new(5000050, 2)), "50000.50");
        assert_eq!(format!("{}", Price::new(42, 0)), "42");
        assert_eq!(format!("{}", Price::new(1, 4)), "0.0001");
        assert_eq!(format!("{}", Price::new(-5000050, 2)), "-50000.50");
    }

    #[test]
    fn test_add_different_scale() {
        let a = Price::new(10, 1); // 1.0
        let b = Price::new(250, 2); // 2.50
        assert_eq!(a + b, Price::new(350, 2));
    }

    #[test]
    fn test_sub_same_scale() {
        let a = Price::new(300, 2);
        let b = Price::new(100, 2);
        assert_eq!(a - b, Price::new(200, 2));
    }

    #[test]
    fn test_div_scalar_for_mid_price() {
        // (50000.00 + 50001.00) / 2 = 50000.50
        let mid = (Price::new(5000000, 2) + Price::new(5000100, 2)) / 2;
        assert_eq!(mid, Price::new(5000050, 2));
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_div_by_zero() {
        let _ = Price::new(100, 2) / 0;
    }

    #[test]
    fn test_from_f64() {
        let p = Price::from(50000.50);
        assert!((p.to_f64() - 50000.50).abs() < 1e-6);
    }

    #[test]
    fn test_zero_different_scales_equal() {
        assert_eq!(Price::zero(0), Price::zero(4));
    }
}
