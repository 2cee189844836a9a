//! Valor de ponto fixo com precisão explícita e o parse/format das strings decimais
//! que entram e saem da API (`"1000"`, `"0.5"`, `"1.5e-10"`).
//!
//! Política:
//! - parse: sinal opcional, parte inteira e/ou fracionária, expoente opcional `e±N`;
//!   dígitos abaixo da precisão alvo são **truncados** (em direção a zero).
//! - format: sem zeros à direita e sem ponto quando a fração é nula (`"0"`, `"9.89"`).

use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Serialize, Serializer};

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::math::pow10;

/// Maior expoente decimal aceito em notação científica.
const MAX_EXPONENT: i64 = 1_000;
/// Maior precisão aceita para um token.
pub const MAX_DECIMALS: u32 = 77;

/// Inteiro escalado por `10^decimals`. Só nasce via `parse` ou `from_raw`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    raw: BigInt,
    decimals: u32,
}

impl FixedPoint {
    /// Encapsula um inteiro já escalado.
    pub fn from_raw(raw: BigInt, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    /// Interpreta uma string decimal humana na precisão `decimals`.
    pub fn parse(input: &str, decimals: u32) -> Result<Self> {
        Ok(Self { raw: parse_units(input, decimals)?, decimals })
    }

    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(&self.raw, self.decimals))
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_failure(input: &str) -> super::error::SimError {
    sim_err!(SimErrorCode::ParseError, input => input)
}

/// String decimal → inteiro escalado por `10^decimals`.
pub fn parse_units(input: &str, decimals: u32) -> Result<BigInt> {
    if decimals > MAX_DECIMALS {
        sim_bail!(SimErrorCode::ParseError, input => input, decimals => decimals);
    }
    let s = input.trim();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match body.find(&['e', 'E'][..]) {
        Some(pos) => {
            let exp_str = &body[pos + 1..];
            let digits = exp_str.strip_prefix(&['+', '-'][..]).unwrap_or(exp_str);
            if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
                return Err(parse_failure(input));
            }
            let exp = exp_str.parse::<i64>().map_err(|_| parse_failure(input))?;
            if exp.abs() > MAX_EXPONENT {
                return Err(parse_failure(input));
            }
            (&body[..pos], exp)
        }
        None => (body, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(parse_failure(input));
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|c| c.is_ascii_digit()) {
        return Err(parse_failure(input));
    }

    let digits = format!("{int_part}{frac_part}");
    let mut value = BigInt::from_str(&digits).map_err(|_| parse_failure(input))?;

    // posição da vírgula relativa à precisão alvo
    let shift = exponent + i64::from(decimals) - frac_part.len() as i64;
    if shift >= 0 {
        value *= pow10(shift as u32);
    } else {
        // dígitos abaixo da precisão: trunca (valor ainda sem sinal aqui)
        value /= pow10((-shift) as u32);
    }
    Ok(if negative { -value } else { value })
}

/// Inteiro escalado → string decimal humana.
pub fn format_units(value: &BigInt, decimals: u32) -> String {
    let digits = value.abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };
    let d = decimals as usize;
    if d == 0 {
        return format!("{sign}{digits}");
    }
    let padded = if digits.len() <= d {
        format!("{}{}", "0".repeat(d + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - d);
    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_trimmed}")
    }
}

/// Inteiro "de chain" (sem fração, sem sinal), como `n`, `p` e taxas.
pub fn parse_chain_integer(input: &str) -> Result<BigInt> {
    let s = input.trim();
    if s.is_empty() || !s.bytes().all(|c| c.is_ascii_digit()) {
        return Err(parse_failure(input));
    }
    BigInt::from_str(s).map_err(|_| parse_failure(input))
}
