//! Razões de risco pós-swap (ALR/RALR) e o ajuste assimétrico de punição/recompensa.
//!
//! - ALR = assets·WAD / liability, por lado.
//! - RALR = ALR_in·WAD / ALR_out (ceil).
//! - `m = p·1e14 + WAD` (p em escala 1e4 → WAD, mais a base 1.0).
//!
//! RALR acima de `m` pune o output; RALR·m abaixo de WAD² recompensa; no meio, nada muda.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tracing::debug;

use super::error::Result;
use super::math::{ceil_div, min, mul_div, pow10, Rounding};
use super::types::{RATE_SCALE, WAD, WAD_SQ};

/// ALRs projetadas depois do swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostSwapRatios {
    pub new_alr_in: BigInt,
    pub new_alr_out: BigInt,
    pub new_ralr: BigInt,
}

/// Regime do ajuste aplicado ao output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdjustmentMode {
    Punishment,
    Reward,
    Neutral,
}

/// Resultado do ajuste. `signed_amount` > 0 é punição, < 0 é recompensa.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiskAdjustment {
    pub mode: AdjustmentMode,
    pub signed_amount: BigInt,
    pub real_out: BigInt,
}

impl RiskAdjustment {
    pub fn is_punishment(&self) -> bool {
        self.mode == AdjustmentMode::Punishment
    }
}

/// Saldos de um lado da VTP antes e depois do swap (decimais nativos).
#[derive(Clone, Copy, Debug)]
pub struct SideFlow<'a> {
    pub assets: &'a BigInt,
    pub liability: &'a BigInt,
    /// Delta nos assets: `+amount_in` na entrada, `esti_out` (saindo) na saída.
    pub moved: &'a BigInt,
    /// Taxa que fica com os LPs desse lado.
    pub fee: &'a BigInt,
}

/// `new_alr_in` (ceil), `new_alr_out` (floor) e `new_ralr` (ceil).
pub fn post_swap_ratios(side_in: SideFlow<'_>, side_out: SideFlow<'_>) -> Result<PostSwapRatios> {
    let wad = &*WAD;
    let new_alr_in = mul_div(
        &(side_in.assets + side_in.moved),
        wad,
        &(side_in.liability + side_in.fee),
        Rounding::Ceil,
    )?;
    let new_alr_out = mul_div(
        &(side_out.assets - side_out.moved),
        wad,
        &(side_out.liability + side_out.fee),
        Rounding::Floor,
    )?;
    let new_ralr = mul_div(&new_alr_in, wad, &new_alr_out, Rounding::Ceil)?;
    Ok(PostSwapRatios { new_alr_in, new_alr_out, new_ralr })
}

/// Limiar `m = p·1e14 + WAD`.
pub fn punishment_threshold(p: &BigInt) -> BigInt {
    p * pow10(14) + &*WAD
}

/// Aplica punição/recompensa sobre `esti_out` conforme `new_ralr` e `p`.
pub fn adjust_output(esti_out: &BigInt, new_ralr: &BigInt, p: &BigInt) -> Result<RiskAdjustment> {
    let wad = &*WAD;
    let wad_sq = &*WAD_SQ;
    let m = punishment_threshold(p);
    let ralr_m = new_ralr * &m;

    if *new_ralr > m {
        let gap = new_ralr * new_ralr - &m * &m;
        let den = &gap + &ralr_m;
        let punish = mul_div(esti_out, &gap, &den, Rounding::Ceil)?;
        let punish = min(&punish, esti_out);
        debug!(ralr = %new_ralr, m = %m, punish = %punish, "punição");
        return Ok(RiskAdjustment {
            mode: AdjustmentMode::Punishment,
            real_out: esti_out - &punish,
            signed_amount: punish,
        });
    }

    if ralr_m < *wad_sq {
        let r = ceil_div(&ralr_m, wad)?;
        let num = wad_sq - &r * &r;
        let den = wad_sq + &r * (wad - &r);
        let reward = mul_div(esti_out, &num, &den, Rounding::Floor)?;
        debug!(ralr = %new_ralr, m = %m, reward = %reward, "recompensa");
        return Ok(RiskAdjustment {
            mode: AdjustmentMode::Reward,
            real_out: esti_out + &reward,
            signed_amount: -reward,
        });
    }

    Ok(RiskAdjustment { mode: AdjustmentMode::Neutral, signed_amount: BigInt::zero(), real_out: esti_out.clone() })
}

/// `new_assets·1e4 <= alr_lower_bound·new_liability` no lado de saída.
/// Só sinaliza: o contrato de referência calcula mas não bloqueia o swap.
pub fn alr_below_lower_bound(new_assets: &BigInt, new_liability: &BigInt, alr_lower_bound: &BigInt) -> bool {
    if alr_lower_bound.is_zero() || new_liability.is_negative() {
        return false;
    }
    new_assets * &*RATE_SCALE <= alr_lower_bound * new_liability
}
