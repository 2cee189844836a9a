//! Validações de entrada e checkpoints de saída do simulador.
//! Objetivo: rejeitar estado inválido antes de qualquer conta e nunca devolver
//! saída negativa ou maior que a reserva.

use num_bigint::BigInt;
use num_traits::Signed;

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::fixed::parse_units;
use super::types::{Token, Vtp};

/// Interpreta o montante humano e exige `> 0`.
pub fn parse_positive_amount(input: &str, decimals: u32) -> Result<BigInt> {
    let amount = parse_units(input, decimals)?;
    if !amount.is_positive() {
        sim_bail!(SimErrorCode::InvalidAmount, amount => input.trim());
    }
    Ok(amount)
}

/// Interpreta um montante humano que pode ser zero, mas nunca negativo.
pub fn parse_non_negative(input: &str, decimals: u32, field: &str) -> Result<BigInt> {
    let amount = parse_units(input, decimals)?;
    if amount.is_negative() {
        sim_bail!(SimErrorCode::InvalidAmount, field => field, amount => input.trim());
    }
    Ok(amount)
}

#[inline]
pub fn ensure_positive(value: &BigInt, field: &str) -> Result<()> {
    if value.is_positive() {
        Ok(())
    } else {
        Err(sim_err!(SimErrorCode::InsufficientState, field => field, value => value))
    }
}

/// `n > 0` e `pa > 0` (já com o override aplicado).
pub fn ensure_curve(vtp: &Vtp, pa: &BigInt) -> Result<()> {
    ensure_positive(&vtp.params.n, "n")?;
    ensure_positive(pa, "pa")
}

/// `assets > 0` e `liability > 0`.
pub fn ensure_token_state(token: &Token, side: &str) -> Result<()> {
    ensure_positive(&token.status.assets, &format!("{side}.assets"))?;
    ensure_positive(&token.status.liability, &format!("{side}.liability"))
}

/// Checkpoint de saída: `0 <= out <= reserve`.
pub fn ensure_within_reserve(out: &BigInt, reserve: &BigInt, stage: &str) -> Result<()> {
    if out.is_negative() {
        sim_bail!(SimErrorCode::NegativeResult, stage => stage, out => out);
    }
    if out > reserve {
        sim_bail!(SimErrorCode::InsufficientLiquidity, stage => stage, out => out, reserve => reserve);
    }
    Ok(())
}
