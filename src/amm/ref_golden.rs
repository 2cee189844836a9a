//! Referência de alta precisão ("goldens") baseada em **BigRational**
//! para a aritmética e o PAV do simulador.
//!
//! Objetivos:
//! 1. Reproduzir `mul_div`/`isqrt` por um caminho independente (racionais e
//!    `num_integer::Roots`) e servir de **oráculo** para os testes de arredondamento.
//! 2. Calcular o PAV **contínuo** (sem quantização intermediária) e medir o
//!    desvio do core discreto.
//!
//! Não entra no caminho de produção; só testes e geração de goldens.

use num_bigint::BigInt;
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::math::{pow10, Rounding};
use super::pricing::solve_pav;
use super::types::WAD;

#[inline]
fn q(n: &BigInt, d: &BigInt) -> BigRational {
    BigRational::new(n.clone(), d.clone())
}

#[inline]
fn qi(n: &BigInt) -> BigRational {
    BigRational::from_integer(n.clone())
}

/// `a·b/c` exato e depois arredondado pela política pedida.
pub fn rational_mul_div(a: &BigInt, b: &BigInt, c: &BigInt, rounding: Rounding) -> Result<BigInt> {
    if c.is_zero() {
        sim_bail!(SimErrorCode::DivisionByZero, stage => "ref.mul_div");
    }
    let exact = q(&(a * b), c);
    Ok(match rounding {
        Rounding::Floor => exact.floor().to_integer(),
        Rounding::Ceil => exact.ceil().to_integer(),
    })
}

/// Raiz inteira de referência (`floor(√v)`).
pub fn reference_isqrt(value: &BigInt) -> Result<BigInt> {
    if value.is_negative() {
        sim_bail!(SimErrorCode::NegativeSquareRoot, value => value);
    }
    Ok(Roots::sqrt(value))
}

/// Raiz de um racional não negativo com 36 casas extras de precisão.
fn sqrt_rat(v: &BigRational) -> BigRational {
    let scale = pow10(36);
    let scaled = (v * qi(&scale)).floor().to_integer();
    q(&Roots::sqrt(&scaled), &pow10(18))
}

/// PAV contínuo: mesma quadrática do core, sem nenhum arredondamento intermediário.
pub fn continuous_pav(x: &BigInt, a0: &BigInt, a1: &BigInt, n: &BigInt, pa: &BigInt) -> Result<BigRational> {
    let wad = &*WAD;
    let c2 = n * (n * 2u8 - 1u8);
    if c2.is_zero() || a1.is_zero() || a0.is_zero() {
        sim_bail!(SimErrorCode::DivisionByZero, stage => "ref.pav");
    }
    let shrink = q(a0, &(a0 + x));
    let a = (q(&(x * pa), a1) * &shrink + qi(&(n * 2u8 * wad))) / qi(&c2);
    let b = q(&(x * (a0 * pa + a1 * wad)), &(a0 * a1)) * &shrink / qi(&c2);
    let delta = &a * &a - qi(&(wad * 4u8)) * &b;
    if delta.is_negative() {
        sim_bail!(SimErrorCode::InvalidSwapParameters, stage => "ref.pav");
    }
    let t = (&a - sqrt_rat(&delta)) / qi(&BigInt::from(2u8));
    Ok((qi(wad) - t) * qi(pa) / qi(wad))
}

/// Core vs contínuo para um PAV.
#[derive(Debug, Clone)]
pub struct RefPav {
    pub pav_core: BigInt,
    pub pav_cont: BigRational,
    /// `|pav_core − pav_cont|` em wei.
    pub abs_diff: BigRational,
}

pub fn golden_pav(x: &BigInt, a0: &BigInt, a1: &BigInt, n: &BigInt, pa: &BigInt) -> Result<RefPav> {
    let pav_core = solve_pav(x, a0, a1, n, pa)?.pav;
    let pav_cont = continuous_pav(x, a0, a1, n, pa)?;
    let abs_diff = (qi(&pav_core) - &pav_cont).abs();
    Ok(RefPav { pav_core, pav_cont, abs_diff })
}
