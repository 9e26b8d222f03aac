//! Token amount codec.
//!
//! Converts between the decimal amounts users type and the denominated
//! integers the delegation contract works with, and produces the minimal
//! big-endian hex form used for `@`-separated call arguments. All paths use
//! arbitrary precision: an 18-decimal denomination overflows `u64` at ~18
//! whole tokens.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, Zero};

use crate::error::{BotError, BotResult};

/// Denomination exponent used when the network config does not say otherwise
pub const DEFAULT_DENOMINATION: u32 = 18;

/// Ticker shown next to amounts
pub const TOKEN: &str = "eGLD";

/// Integer digits accepted from user input; far above any token supply
pub const MAX_INTEGER_DIGITS: i64 = 32;
/// Fraction digits accepted from user input
pub const MAX_FRACTION_DIGITS: i64 = 32;
/// Largest power of ten a conversion may need. Inputs within the digit
/// bounds above stay well below it for any real denomination.
const MAX_POW10: u32 = 128;

/// `10^n`, or `None` when `n` is negative or beyond [`MAX_POW10`]
fn pow10(n: i64) -> Option<BigInt> {
    let n = u32::try_from(n).ok().filter(|n| *n <= MAX_POW10)?;
    Some(BigInt::from(10u8).pow(n))
}

/// Parse user input as a decimal number. Rejects anything non-numeric and
/// values whose magnitude or precision is out of range: `1e1000000000`
/// parses cheaply but would be expensive to scale.
pub fn parse_decimal(text: &str) -> BotResult<BigDecimal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BotError::validation("Invalid amount"));
    }
    let amount = BigDecimal::from_str(text).map_err(|_| BotError::validation("Invalid amount"))?;

    let (digits, scale) = amount.as_bigint_and_exponent();
    if digits.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let width = digits.abs().to_string().len() as i64;
    let integer_digits = width.checked_sub(scale);
    match integer_digits {
        Some(n) if n <= MAX_INTEGER_DIGITS && scale <= MAX_FRACTION_DIGITS => Ok(amount),
        _ => Err(BotError::validation("Invalid amount")),
    }
}

/// Parse a token amount that must be non-negative and at least `minimum`.
pub fn parse_amount(text: &str, minimum: &BigDecimal) -> BotResult<BigDecimal> {
    let amount = parse_decimal(text)?;
    if amount.is_negative() {
        return Err(BotError::validation("Amount can't be negative"));
    }
    if &amount < minimum {
        return Err(BotError::validation(format!(
            "Minimum amount is {} {}",
            minimum, TOKEN
        )));
    }
    Ok(amount)
}

/// Multiply by `10^exponent` and truncate toward zero.
/// Negative inputs map to zero; callers validate sign before encoding.
pub fn to_chain_units(amount: &BigDecimal, exponent: u32) -> BotResult<BigUint> {
    let (digits, scale) = amount.as_bigint_and_exponent();
    let out_of_range = || BotError::validation("Invalid amount");
    let shift = i64::from(exponent).checked_sub(scale).ok_or_else(out_of_range)?;
    let scaled = if shift >= 0 {
        digits * pow10(shift).ok_or_else(out_of_range)?
    } else {
        digits / pow10(-shift).ok_or_else(out_of_range)?
    };
    Ok(scaled.to_biguint().unwrap_or_default())
}

/// Inverse of [`to_chain_units`], exact.
pub fn to_decimal(value: &BigUint, exponent: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(value.clone()), exponent as i64)
}

/// Fixed-point rendering with `places` decimals, rounding half away from zero.
/// `BigDecimal`'s own `Display` may switch to exponent notation, which we never
/// want in chat output.
pub fn format_amount(amount: &BigDecimal, places: u32) -> String {
    let (digits, scale) = amount.as_bigint_and_exponent();
    let shift = i64::from(places).saturating_sub(scale);
    let units = if shift >= 0 {
        match pow10(shift) {
            Some(factor) => digits * factor,
            None => return amount.to_string(),
        }
    } else {
        let Some(divisor) = pow10(-shift) else {
            return amount.to_string();
        };
        let quotient = &digits / &divisor;
        let remainder = (&digits % &divisor).abs();
        if remainder * 2u8 >= divisor {
            match digits.sign() {
                Sign::Minus => quotient - 1,
                _ => quotient + 1,
            }
        } else {
            quotient
        }
    };

    let negative = units.is_negative();
    let mut body = units.abs().to_string();
    let places = places as usize;
    if places > 0 {
        if body.len() <= places {
            body = format!("{}{}", "0".repeat(places + 1 - body.len()), body);
        }
        body.insert(body.len() - places, '.');
    }
    if negative && body.chars().any(|c| c != '0' && c != '.') {
        format!("-{}", body)
    } else {
        body
    }
}

/// Amount in whole tokens with 4 decimals and the ticker, e.g. `12.5000 eGLD`
pub fn display_tokens(value: &BigUint, exponent: u32) -> String {
    format!("{} {}", format_amount(&to_decimal(value, exponent), 4), TOKEN)
}

/// Minimal big-endian hex. Zero encodes as the empty string.
pub fn encode_argument(value: &BigUint) -> String {
    if value.is_zero() {
        return String::new();
    }
    hex::encode(value.to_bytes_be())
}

/// Unsigned big-endian integer from raw VM return bytes. Empty is zero.
pub fn decode_unsigned(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Parse a service fee percentage in `[0, 100]`.
pub fn parse_service_fee(text: &str) -> BotResult<BigDecimal> {
    let fee = parse_decimal(text).map_err(|_| BotError::validation("Invalid fee"))?;
    if fee.is_negative() || fee > BigDecimal::from(100) {
        return Err(BotError::validation("Invalid fee"));
    }
    Ok(fee)
}

/// Fee percentage as 2-byte big-endian basis points: `12.5` → `"04e2"`.
pub fn encode_service_fee(fee: &BigDecimal) -> BotResult<String> {
    if fee.is_negative() || fee > &BigDecimal::from(100) {
        return Err(BotError::validation("Invalid fee"));
    }
    let basis_points = to_chain_units(fee, 2).map_err(|_| BotError::validation("Invalid fee"))?;
    let basis_points = u16::try_from(basis_points).map_err(|_| BotError::validation("Invalid fee"))?;
    Ok(hex::encode(basis_points.to_be_bytes()))
}
