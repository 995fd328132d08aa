//! Exact decimal scaling and display formatting for chain-native amounts.
//!
//! Chain amounts are integers in base units (wei, nAVAX, token base units).
//! Turning them into display units is always an exact shift by a power of
//! ten on an arbitrary-precision decimal. Binary floating point never touches
//! an amount, so 10^30 base units keep every digit.
//!
//! A `DecimalAmount` remembers how many places it has already been scaled
//! by, so normalizing a scaled amount never divides twice:
//!
//! ```
//! use chainlens_core::decimal::{format, scale};
//!
//! let amount = scale("4499999999912000", 8).unwrap();
//! assert_eq!(format(&amount, 8, true), "44,999,999.99912");
//! ```

use crate::error::DecimalError;
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Rendered values strictly between zero and this magnitude are returned at
/// full fixed precision, untrimmed.
pub const DEFAULT_SCI_THRESHOLD_EXP: u32 = 7;

/// Largest decimal exponent, in either direction, an amount may carry. Also
/// the cap on fractional digits when rendering.
pub const MAX_EXPONENT: u32 = 1 << 16;

/// An arbitrary-precision decimal amount.
///
/// `denomination` counts the places `scale` (or `shift_down`) has already
/// divided out of the raw integer; it is 0 for parsed or converted values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DecimalAmount {
    value: BigDecimal,
    denomination: u32,
}

impl DecimalAmount {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Exact conversion from an unsigned 256-bit chain integer.
    pub fn from_u256(value: U256) -> Self {
        let digits = BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>());
        Self::from_integer(digits)
    }

    fn from_integer(digits: BigInt) -> Self {
        Self { value: BigDecimal::new(digits, 0), denomination: 0 }
    }

    pub fn as_bigdecimal(&self) -> &BigDecimal {
        &self.value
    }

    /// Places already divided out of the raw integer.
    pub fn denomination(&self) -> u32 {
        self.denomination
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    /// `self / 10^places`, exact. The places are added to `denomination`.
    pub fn shift_down(&self, places: u32) -> Result<Self, DecimalError> {
        let (digits, exp) = self.value.as_bigint_and_exponent();
        let exp = exp
            .checked_add(i64::from(places))
            .ok_or_else(|| out_of_range(exp, places))?;
        let denomination = self
            .denomination
            .checked_add(places)
            .ok_or_else(|| out_of_range(exp, places))?;
        Ok(Self { value: bounded(digits, exp)?, denomination })
    }

    /// `self * 10^places`, exact. The places are taken off `denomination`.
    pub fn shift_up(&self, places: u32) -> Result<Self, DecimalError> {
        let (digits, exp) = self.value.as_bigint_and_exponent();
        let exp = exp
            .checked_sub(i64::from(places))
            .ok_or_else(|| out_of_range(exp, places))?;
        Ok(Self {
            value: bounded(digits, exp)?,
            denomination: self.denomination.saturating_sub(places),
        })
    }

    /// Plain (never scientific) rendering at exactly `places` fractional
    /// digits, without grouping. `places` is capped at `MAX_EXPONENT`.
    pub fn to_fixed(&self, places: u32) -> String {
        let places = places.min(MAX_EXPONENT);
        render(&self.units_at(places, 0), places as usize, None, ".")
    }

    /// The integer `n` such that `n / 10^places` is `self / 10^extra`
    /// rounded to `places` fractional digits, ties away from zero.
    fn units_at(&self, places: u32, extra: u32) -> BigInt {
        let (digits, exp) = self.value.as_bigint_and_exponent();
        // |exp| <= MAX_EXPONENT and extra <= u32::MAX: no i64 overflow.
        let exp = exp + i64::from(extra);
        let target = i64::from(places);
        if exp <= target {
            return digits * pow10((target - exp).unsigned_abs());
        }
        let drop = (exp - target).unsigned_abs();
        // Dropping more places than there are digits always rounds to zero.
        if drop > digit_count(&digits) {
            return BigInt::zero();
        }
        let divisor = pow10(drop);
        let quotient = &digits / &divisor;
        let remainder = &digits % &divisor;
        if remainder.abs() * 2u8 >= divisor {
            quotient + digits.signum()
        } else {
            quotient
        }
    }
}

/// Keep an exponent inside `±MAX_EXPONENT`.
fn bounded(digits: BigInt, exp: i64) -> Result<BigDecimal, DecimalError> {
    if exp.unsigned_abs() > u64::from(MAX_EXPONENT) {
        return Err(DecimalError::OutOfRange(format!(
            "exponent {exp} exceeds ±{MAX_EXPONENT}"
        )));
    }
    Ok(BigDecimal::new(digits, exp))
}

fn out_of_range(exp: i64, places: u32) -> DecimalError {
    DecimalError::OutOfRange(format!("shifting exponent {exp} by {places} places"))
}

fn digit_count(digits: &BigInt) -> u64 {
    digits.abs().to_string().len() as u64
}

/// Callers keep `exp` within a few multiples of `MAX_EXPONENT` or the
/// digit count of an existing value.
fn pow10(exp: u64) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

impl FromStr for DecimalAmount {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse_err = |reason: &str| DecimalError::Parse {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(parse_err("empty string"));
        }
        if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            let digits = BigInt::parse_bytes(hex.as_bytes(), 16)
                .ok_or_else(|| parse_err("invalid hex digits"))?;
            return Ok(Self::from_integer(digits));
        }
        let value = BigDecimal::from_str(trimmed).map_err(|e| parse_err(&e.to_string()))?;
        Self::try_from(value).map_err(|_| parse_err("exponent out of range"))
    }
}

impl TryFrom<BigDecimal> for DecimalAmount {
    type Error = DecimalError;

    fn try_from(v: BigDecimal) -> Result<Self, Self::Error> {
        let (digits, exp) = v.into_bigint_and_exponent();
        Ok(Self { value: bounded(digits, exp)?, denomination: 0 })
    }
}

impl From<U256> for DecimalAmount {
    fn from(v: U256) -> Self {
        Self::from_u256(v)
    }
}

impl From<u128> for DecimalAmount {
    fn from(v: u128) -> Self {
        Self::from_integer(BigInt::from(v))
    }
}

/// Exact plain rendering with trailing fractional zeros removed.
impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (digits, exp) = self.value.as_bigint_and_exponent();
        if exp <= 0 {
            return write!(f, "{}", digits * pow10(exp.unsigned_abs()));
        }
        let (digits, places) = trim_trailing_zeros(digits, exp as usize);
        f.write_str(&render(&digits, places, None, "."))
    }
}

/// Serialized as the plain value; `denomination` is not carried.
impl Serialize for DecimalAmount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DecimalAmount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display options for `format_with`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Thousands separator for the integer part
    pub group_separator: String,
    pub decimal_separator: String,
    /// Values with `0 < |v| < 10^-sci_threshold_exp` are not trimmed
    pub sci_threshold_exp: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            group_separator: ",".into(),
            decimal_separator: ".".into(),
            sci_threshold_exp: DEFAULT_SCI_THRESHOLD_EXP,
        }
    }
}

impl FormatOptions {
    fn threshold(&self) -> BigDecimal {
        BigDecimal::new(BigInt::from(1u8), i64::from(self.sci_threshold_exp))
    }
}

/// Parse `raw` and divide it by `10^denomination`, exactly.
///
/// `raw` may be a decimal integer, a decimal fraction, or `0x` hex. Malformed
/// input is a `DecimalError::Parse`; it is never read as zero. An exponent
/// beyond `MAX_EXPONENT` is `DecimalError::OutOfRange`.
pub fn scale(raw: &str, denomination: u32) -> Result<DecimalAmount, DecimalError> {
    raw.parse::<DecimalAmount>()?.shift_down(denomination)
}

/// `format_with` using the default options (`,` grouping, `.` decimal point).
pub fn format(amount: &DecimalAmount, denomination: u32, normalize: bool) -> String {
    format_with(amount, denomination, normalize, &FormatOptions::default())
}

/// Render an amount for display.
///
/// With `normalize`, `amount` is brought to display units by dividing out
/// whatever part of `10^denomination` it has not been scaled by yet; an
/// amount from `scale(raw, denomination)` is not divided again. Without it,
/// `amount` is taken as already in display units. The value is rendered at
/// `denomination` fractional digits (at most `MAX_EXPONENT`); if that
/// rendering is a non-zero magnitude below the threshold it is returned
/// verbatim. Otherwise the fraction is trimmed to the fewest digits that keep
/// the same value and the integer part is grouped.
pub fn format_with(
    amount: &DecimalAmount,
    denomination: u32,
    normalize: bool,
    opts: &FormatOptions,
) -> String {
    let pending = if normalize {
        denomination.saturating_sub(amount.denomination)
    } else {
        0
    };
    let denomination = denomination.min(MAX_EXPONENT);

    let places = denomination as usize;
    let units = amount.units_at(denomination, pending);

    let rendered = BigDecimal::new(units.clone(), i64::from(denomination));
    if !rendered.is_zero() && rendered.abs() < opts.threshold() {
        return render(&units, places, None, &opts.decimal_separator);
    }

    let (units, places) = trim_trailing_zeros(units, places);
    render(
        &units,
        places,
        Some(&opts.group_separator),
        &opts.decimal_separator,
    )
}

fn trim_trailing_zeros(mut units: BigInt, mut places: usize) -> (BigInt, usize) {
    let ten = BigInt::from(10u8);
    while places > 0 && !units.is_zero() && (&units % &ten).is_zero() {
        units /= &ten;
        places -= 1;
    }
    if units.is_zero() {
        places = 0;
    }
    (units, places)
}

/// Render `units / 10^places` with an optional integer-part separator.
fn render(units: &BigInt, places: usize, group: Option<&str>, point: &str) -> String {
    let digits = units.abs().to_string();
    let digits = if digits.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = digits.split_at(digits.len() - places);

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if units.is_negative() {
        out.push('-');
    }
    match group {
        Some(sep) => out.push_str(&group_digits(int_part, sep)),
        None => out.push_str(int_part),
    }
    if !frac_part.is_empty() {
        out.push_str(point);
        out.push_str(frac_part);
    }
    out
}

fn group_digits(int_part: &str, sep: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}
