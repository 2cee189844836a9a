//! Allocate/deallocate de liquidez numa VTP: taxa de provisão sob regimes
//! sobre/sub-colateralizados e, no deallocate, earnings e shares queimadas.
//!
//! Taxas pelo whitepaper (todas em WAD, `lb` = `alr_lower_bound` em escala 1e4):
//! - §3.2 allocate, `l0 >= a0`: `ceil(x·(a0·1e4 − l0·lb)·(l0·(1e4−lb)) / (l0·lb·(l0+x)·1e4·n))`
//! - §3.3 allocate, `a0 >= l0` e par com folga: `ceil(x·x'·WAD / (l0·pa·n))`,
//!   `x' = ceil(y1·(y1·pa + (a0−l0)·WAD) / (y1·pa + (a0+x)·WAD))`
//! - §3.1 deallocate, `l0 >= a0`: `ceil(x·(l0−a0)·(1e4−lb) / ((l0−x)·1e4·n))`
//! - §3.4 deallocate, `a0 >= l0` e par com folga: igual a §3.3 com `(a0−x)` no denominador
//!
//! As duas fórmulas de cada operação são sempre calculadas, cada uma guardada pelo
//! seu regime, e a maior vence. Denominador não positivo desativa a fórmula.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::fixed::FixedPoint;
use super::guardrails::{ensure_curve, parse_non_negative, parse_positive_amount};
use super::math::{ceil_div, downscale_ceil, floor_div, max, min, mul_div, upscale, Rounding};
use super::types::{SimulationConfig, Token, Vtp, RATE_SCALE, WAD, WAD_DECIMALS};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateResult {
    pub fee: FixedPoint,
    pub fee_rate: FixedPoint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeallocateResult {
    pub fee: FixedPoint,
    pub fee_rate: FixedPoint,
    pub earnings: FixedPoint,
    /// Shares queimadas.
    pub burn: FixedPoint,
    pub total_amount: FixedPoint,
    pub normal_part: FixedPoint,
    pub pause_part: FixedPoint,
}

/// Posição do LP no token sendo retirado (strings humanas nos decimais do token).
#[derive(Clone, Copy, Debug)]
pub struct DeallocatePosition<'a> {
    pub user_allocation: &'a str,
    pub user_shares: &'a str,
    pub total_shares: &'a str,
}

/// Folga do token par acima do seu limite inferior de ALR, em WAD.
/// `None` quando o par não tem folga (`assets·1e4 <= liability·lb`).
fn paired_slack_wad(paired: &Token) -> Result<Option<BigInt>> {
    let scale = &*RATE_SCALE;
    let lb = &paired.params.alr_lower_bound;
    let assets = &paired.status.assets;
    let liability = &paired.status.liability;
    if assets * scale <= liability * lb {
        return Ok(None);
    }
    let floor_level = mul_div(liability, lb, scale, Rounding::Ceil)?;
    Ok(Some(upscale(&(assets - floor_level), paired.decimals())))
}

/// Fórmula de folga do par (§3.3 / §3.4). `reserve_after` é `a0+x` ou `a0−x`.
fn paired_slack_fee(
    x: &BigInt,
    y1: &BigInt,
    a0: &BigInt,
    l0: &BigInt,
    reserve_after: &BigInt,
    pa: &BigInt,
    n: &BigInt,
) -> Result<Option<BigInt>> {
    let wad = &*WAD;
    let y1_pa = y1 * pa;
    let den_inner = &y1_pa + reserve_after * wad;
    let den = l0 * pa * n;
    if !den_inner.is_positive() || !den.is_positive() {
        return Ok(None);
    }
    let x_prime = mul_div(y1, &(&y1_pa + (a0 - l0) * wad), &den_inner, Rounding::Ceil)?;
    Ok(Some(mul_div(&(x * &x_prime), wad, &den, Rounding::Ceil)?))
}

/// §3.2 (allocate, sub-colateralizado).
fn allocate_under_fee(x: &BigInt, a0: &BigInt, l0: &BigInt, lb: &BigInt, n: &BigInt) -> Result<Option<BigInt>> {
    let scale = &*RATE_SCALE;
    let den = l0 * lb * (l0 + x) * scale * n;
    if !den.is_positive() {
        return Ok(None);
    }
    let num = x * (a0 * scale - l0 * lb) * (l0 * (scale - lb));
    Ok(Some(ceil_div(&num, &den)?))
}

/// §3.1 (deallocate, sub-colateralizado).
fn deallocate_under_fee(x: &BigInt, a0: &BigInt, l0: &BigInt, lb: &BigInt, n: &BigInt) -> Result<Option<BigInt>> {
    let scale = &*RATE_SCALE;
    let den = (l0 - x) * scale * n;
    if !den.is_positive() {
        return Ok(None);
    }
    let num = x * (l0 - a0) * (scale - lb);
    Ok(Some(ceil_div(&num, &den)?))
}

fn keep_larger(fee: BigInt, candidate: Option<BigInt>) -> BigInt {
    match candidate {
        Some(c) if c > fee => c,
        _ => fee,
    }
}

fn rate(fee: &BigInt, amount: &BigInt) -> Result<BigInt> {
    if amount.is_zero() {
        return Ok(BigInt::zero());
    }
    mul_div(fee, &WAD, amount, Rounding::Floor)
}

/// Estima a taxa de allocate de `amount` (string humana) em `token`, com `paired` do outro lado da VTP.
#[instrument(level = "debug", skip(vtp, token, paired, config), err(Display))]
pub fn estimate_allocate(
    vtp: &Vtp,
    token: &Token,
    paired: &Token,
    amount: &str,
    config: &SimulationConfig,
) -> Result<AllocateResult> {
    let cfg = config.resolve()?;
    let decimals = token.decimals();
    let amount = parse_positive_amount(amount, decimals)?;
    let pa = cfg.effective_pa(vtp);
    ensure_curve(vtp, pa)?;

    let wad_fp = |v: BigInt| FixedPoint::from_raw(v, WAD_DECIMALS);
    if token.is_balanced() && paired.is_balanced() {
        debug!("vtp equilibrada: allocate sem taxa");
        return Ok(AllocateResult {
            fee: FixedPoint::from_raw(BigInt::zero(), decimals),
            fee_rate: wad_fp(BigInt::zero()),
        });
    }

    let n = &vtp.params.n;
    let lb = &token.params.alr_lower_bound;
    let a0 = upscale(&token.status.assets, decimals);
    let l0 = upscale(&token.status.liability, decimals);
    let x = upscale(&amount, decimals);

    let mut fee_wad = BigInt::zero();

    // §3.3
    if a0 >= l0 {
        if let Some(y1) = paired_slack_wad(paired)? {
            let fee = paired_slack_fee(&x, &y1, &a0, &l0, &(&a0 + &x), pa, n)?;
            debug!(fee = ?fee, "wp 3.3");
            fee_wad = keep_larger(fee_wad, fee);
        }
    }
    // §3.2
    if l0 >= a0 {
        let fee = allocate_under_fee(&x, &a0, &l0, lb, n)?;
        debug!(fee = ?fee, "wp 3.2");
        fee_wad = keep_larger(fee_wad, fee);
    }

    let fee = downscale_ceil(&fee_wad, decimals);
    let fee_rate = rate(&fee, &amount)?;
    Ok(AllocateResult { fee: FixedPoint::from_raw(fee, decimals), fee_rate: wad_fp(fee_rate) })
}

/// Maior parte de `total` que mantém `(a−x)·1e4 >= lb·(l−x)`.
fn split_normal_part(total: &BigInt, assets: &BigInt, liability: &BigInt, lb: &BigInt) -> Result<BigInt> {
    let scale = &*RATE_SCALE;
    let drops_below = (assets - total) * scale < lb * (liability - total);
    if !drops_below {
        return Ok(total.clone());
    }
    if lb >= scale {
        return Ok(BigInt::zero());
    }
    let cap = floor_div(&(assets * scale - lb * liability), &(scale - lb))?;
    Ok(min(&max(&cap, &BigInt::zero()), total))
}

/// Estima o deallocate de `amount` (principal) de `token`, sacando também os earnings acumulados.
#[instrument(level = "debug", skip(vtp, token, paired, position, config), err(Display))]
pub fn estimate_deallocate(
    vtp: &Vtp,
    token: &Token,
    paired: &Token,
    amount: &str,
    position: &DeallocatePosition<'_>,
    config: &SimulationConfig,
) -> Result<DeallocateResult> {
    let cfg = config.resolve()?;
    let decimals = token.decimals();
    let amount = parse_positive_amount(amount, decimals)?;
    let user_allocation = parse_non_negative(position.user_allocation, decimals, "userAllocation")?;
    let user_shares = parse_non_negative(position.user_shares, decimals, "userShares")?;
    let total_shares = parse_non_negative(position.total_shares, decimals, "totalShares")?;
    let pa = cfg.effective_pa(vtp);
    ensure_curve(vtp, pa)?;

    let native = |v: BigInt| FixedPoint::from_raw(v, decimals);
    let wad_fp = |v: BigInt| FixedPoint::from_raw(v, WAD_DECIMALS);

    // 1) fast path
    if token.is_balanced() && paired.is_balanced() {
        debug!("vtp equilibrada: deallocate sem taxa");
        return Ok(DeallocateResult {
            fee: native(BigInt::zero()),
            fee_rate: wad_fp(BigInt::zero()),
            earnings: native(BigInt::zero()),
            burn: native(amount.clone()),
            total_amount: native(amount.clone()),
            normal_part: native(amount),
            pause_part: native(BigInt::zero()),
        });
    }

    let wad = &*WAD;
    let scale = &*RATE_SCALE;
    let assets = &token.status.assets;
    let liability = &token.status.liability;
    let lb = &token.params.alr_lower_bound;

    // 2) earnings e shares
    let share_price = if total_shares.is_zero() {
        wad.clone()
    } else {
        mul_div(liability, wad, &total_shares, Rounding::Floor)?
    };
    let user_value = mul_div(&share_price, &user_shares, wad, Rounding::Floor)?;
    let earnings = max(&(&user_value - &user_allocation), &BigInt::zero());
    let total_amount = &amount + &earnings;
    let remaining = max(&(&user_allocation - &amount), &BigInt::zero());
    let kept_shares = mul_div(&remaining, wad, &share_price, Rounding::Floor)?;
    let burn = max(&(&user_shares - kept_shares), &BigInt::zero());

    // 3) limites
    if &total_amount > assets {
        sim_bail!(SimErrorCode::CalculationOverflow, stage => "deallocate.assets", total => &total_amount, assets => assets);
    }
    if &total_amount > liability {
        sim_bail!(SimErrorCode::CalculationOverflow, stage => "deallocate.liability", total => &total_amount, liability => liability);
    }

    // 4) normal vs pause
    let normal_part = split_normal_part(&total_amount, assets, liability, lb)?;
    let pause_part = &total_amount - &normal_part;

    // 5) taxas
    let n = &vtp.params.n;
    let a0 = upscale(assets, decimals);
    let l0 = upscale(liability, decimals);
    let x = upscale(&normal_part, decimals);
    if x > a0 || x > l0 {
        sim_bail!(SimErrorCode::CalculationOverflow, stage => "deallocate.normal_part", normal_part => &normal_part);
    }

    let mut fee_wad = BigInt::zero();
    // §3.1
    if l0 >= a0 {
        let fee = deallocate_under_fee(&x, &a0, &l0, lb, n)?;
        debug!(fee = ?fee, "wp 3.1");
        fee_wad = keep_larger(fee_wad, fee);
    }
    // §3.4
    if a0 >= l0 {
        if let Some(y1) = paired_slack_wad(paired)? {
            let fee = paired_slack_fee(&x, &y1, &a0, &l0, &(&a0 - &x), pa, n)?;
            debug!(fee = ?fee, "wp 3.4");
            fee_wad = keep_larger(fee_wad, fee);
        }
    }

    let mut fee = downscale_ceil(&fee_wad, decimals);
    if pause_part.is_positive() {
        let pause_fee = mul_div(&pause_part, &(scale - lb), scale, Rounding::Floor)?;
        fee += max(&pause_fee, &BigInt::zero());
    }
    let fee_rate = rate(&fee, &total_amount)?;

    debug!(
        total = %total_amount,
        normal = %normal_part,
        pause = %pause_part,
        fee = %fee,
        "deallocate estimado"
    );

    Ok(DeallocateResult {
        fee: native(fee),
        fee_rate: wad_fp(fee_rate),
        earnings: native(earnings),
        burn: native(burn),
        total_amount: native(total_amount),
        normal_part: native(normal_part),
        pause_part: native(pause_part),
    })
}
