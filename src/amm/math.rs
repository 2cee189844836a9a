//! Primitivas de ponto fixo em precisão arbitrária (FixedPointMath).
//! Todas as contas intermediárias rodam em `BigInt`, então `a*b` nunca trunca.
//! Política de arredondamento explícita em cada chamada (floor/ceil).

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use super::error::Result;
use super::error_catalog::SimErrorCode;

/// Direção de arredondamento de uma divisão.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// `10^exp` como `BigInt`.
#[inline]
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// Divisão `n/d` com arredondamento explícito (floor/ceil matemáticos, vale para negativos).
pub fn div_rounding(n: &BigInt, d: &BigInt, rounding: Rounding) -> Result<BigInt> {
    if d.is_zero() {
        sim_bail!(SimErrorCode::DivisionByZero, numerator => n);
    }
    let (q, r) = n.div_mod_floor(d);
    match rounding {
        Rounding::Floor => Ok(q),
        Rounding::Ceil if r.is_zero() => Ok(q),
        Rounding::Ceil => Ok(q + 1u8),
    }
}

/// `floor(n/d)`
#[inline]
pub fn floor_div(n: &BigInt, d: &BigInt) -> Result<BigInt> {
    div_rounding(n, d, Rounding::Floor)
}

/// `ceil(n/d)`
#[inline]
pub fn ceil_div(n: &BigInt, d: &BigInt) -> Result<BigInt> {
    div_rounding(n, d, Rounding::Ceil)
}

/// `a*b/c` com o produto em largura ilimitada e arredondamento `rounding`.
pub fn mul_div(a: &BigInt, b: &BigInt, c: &BigInt, rounding: Rounding) -> Result<BigInt> {
    div_rounding(&(a * b), c, rounding)
}

/// Raiz quadrada inteira (floor) por Newton; para quando `x1 >= x0`.
pub fn isqrt(value: &BigInt) -> Result<BigInt> {
    if value.is_negative() {
        sim_bail!(SimErrorCode::NegativeSquareRoot, value => value);
    }
    if *value < BigInt::from(2u8) {
        return Ok(value.clone());
    }
    let mut x0 = value.clone();
    let mut x1: BigInt = (&x0 + value / &x0) >> 1usize;
    while x1 < x0 {
        x0 = x1;
        x1 = (&x0 + value / &x0) >> 1usize;
    }
    Ok(x0)
}

/// Reescala `amount` de `from` para `to` casas decimais (multiplica ao subir, floor ao descer).
pub fn rescale(amount: &BigInt, from_decimals: u32, to_decimals: u32) -> BigInt {
    use core::cmp::Ordering;
    match to_decimals.cmp(&from_decimals) {
        Ordering::Equal => amount.clone(),
        Ordering::Greater => amount * pow10(to_decimals - from_decimals),
        Ordering::Less => amount.div_floor(&pow10(from_decimals - to_decimals)),
    }
}

/// Valor nativo do token → domínio WAD.
#[inline]
pub fn upscale(amount: &BigInt, decimals: u32) -> BigInt {
    rescale(amount, decimals, super::types::WAD_DECIMALS)
}

/// Domínio WAD → valor nativo do token (floor).
#[inline]
pub fn downscale(amount: &BigInt, decimals: u32) -> BigInt {
    rescale(amount, super::types::WAD_DECIMALS, decimals)
}

/// Domínio WAD → valor nativo do token (ceil). Usado nas taxas de liquidez,
/// que nunca arredondam a favor do usuário.
pub fn downscale_ceil(amount: &BigInt, decimals: u32) -> BigInt {
    let wad_decimals = super::types::WAD_DECIMALS;
    if decimals >= wad_decimals {
        return rescale(amount, wad_decimals, decimals);
    }
    let floored = (-amount).div_floor(&pow10(wad_decimals - decimals));
    -floored
}

#[inline]
pub fn abs(v: &BigInt) -> BigInt {
    v.abs()
}

#[inline]
pub fn min(a: &BigInt, b: &BigInt) -> BigInt {
    if a <= b { a.clone() } else { b.clone() }
}

#[inline]
pub fn max(a: &BigInt, b: &BigInt) -> BigInt {
    if a >= b { a.clone() } else { b.clone() }
}
