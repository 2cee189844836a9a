//! Preço de execução (PAV) da curva da VTP e utilitários de slippage.
//!
//! O PAV sai da forma fechada de uma quadrática derivada da bonding curve:
//!
//! ```text
//! C  = n·(2n-1)
//! a  = floor( ( floor(floor(x·pa/a1)·a0/(a0+x)) + 2n·WAD ) / C )
//! b  = ceil( ceil( ceil(x·(a0·pa + a1·WAD)/(a0·a1))·a0/(a0+x) ) / C )
//! Δ  = a² − 4·WAD·b            (Δ < 0 ⇒ swap grande demais)
//! t  = (a − isqrt(Δ)) / 2
//! pav = (WAD − t)·pa / WAD
//! ```
//!
//! `x` é o input líquido já em WAD; `a0`/`a1` as reservas (WAD) do token de entrada/saída.
//! As direções de arredondamento seguem o contrato on-chain e não podem mudar.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tracing::debug;

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::math::{ceil_div, floor_div, isqrt, mul_div, Rounding};
use super::types::WAD;

/// Componentes da quadrática e o preço resultante (todos WAD, exceto `delta` em WAD²).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PavQuote {
    pub a: BigInt,
    pub b: BigInt,
    pub delta: BigInt,
    pub t: BigInt,
    pub pav: BigInt,
}

/// Resolve o PAV para um input líquido `real_in_wad`.
pub fn solve_pav(real_in_wad: &BigInt, a0: &BigInt, a1: &BigInt, n: &BigInt, pa: &BigInt) -> Result<PavQuote> {
    let wad = &*WAD;
    let two_n: BigInt = n * 2u8;
    let c2 = n * (&two_n - 1u8);
    let a0_plus_in = a0 + real_in_wad;

    // a
    let in_priced = mul_div(real_in_wad, pa, a1, Rounding::Floor)?;
    let in_priced = mul_div(&in_priced, a0, &a0_plus_in, Rounding::Floor)?;
    let a = floor_div(&(in_priced + &two_n * wad), &c2)?;

    // b
    let weighted = a0 * pa + a1 * wad;
    let b_inner = mul_div(real_in_wad, &weighted, &(a0 * a1), Rounding::Ceil)?;
    let b_inner = mul_div(&b_inner, a0, &a0_plus_in, Rounding::Ceil)?;
    let b = ceil_div(&b_inner, &c2)?;

    let delta: BigInt = &a * &a - wad * &b * 4u8;
    if delta.is_negative() {
        sim_bail!(SimErrorCode::InvalidSwapParameters, delta => &delta, real_in => real_in_wad);
    }
    let t = floor_div(&(&a - isqrt(&delta)?), &BigInt::from(2u8))?;
    let pav = mul_div(&(wad - &t), pa, wad, Rounding::Floor)?;

    debug!(a = %a, b = %b, delta = %delta, t = %t, pav = %pav, "pav resolvido");
    Ok(PavQuote { a, b, delta, t, pav })
}

/// Saída esperada ao preço de referência, sem taxa nem curva: `amount_in_wad·pa/WAD`.
pub fn expected_out_wad(amount_in_wad: &BigInt, pa: &BigInt) -> Result<BigInt> {
    mul_div(amount_in_wad, pa, &WAD, Rounding::Floor)
}

/// `slippage = WAD − real_out·WAD/expected` (WAD); 0 quando `expected = 0`.
/// Negativo quando há recompensa acima do preço de referência.
pub fn slippage(real_out_wad: &BigInt, expected_out_wad: &BigInt) -> Result<BigInt> {
    if expected_out_wad.is_zero() {
        return Ok(BigInt::zero());
    }
    Ok(&*WAD - mul_div(real_out_wad, &WAD, expected_out_wad, Rounding::Floor)?)
}

/// `a0·pa − a1·WAD`: quão longe a VTP está do seu ponto de equilíbrio (WAD²).
/// Só diagnóstico, usado nos logs de swap.
pub fn reserve_skew(a0: &BigInt, a1: &BigInt, pa: &BigInt) -> BigInt {
    a0 * pa - a1 * &*WAD
}
