//! Estimativa de swap numa VTP (calculadora offline), na ordem fixa do contrato:
//! 1. parse/validação
//! 2. fee-in (ceil) com desconto (floor)
//! 3. PAV pela quadrática (`pricing::solve_pav`)
//! 4. swap_get = real_in·pav (nos decimais do token de saída)
//! 5. fee-out (ceil) com desconto, checkpoint de reserva
//! 6. punição/recompensa por RALR (`risk`), checkpoint de reserva
//! 7. slippage contra o preço de referência

use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::Result;
use super::fixed::FixedPoint;
use super::guardrails::{ensure_curve, ensure_token_state, ensure_within_reserve, parse_positive_amount};
use super::math::{mul_div, pow10, upscale, Rounding};
use super::pricing::{expected_out_wad, reserve_skew, slippage, solve_pav};
use super::risk::{adjust_output, alr_below_lower_bound, post_swap_ratios, SideFlow};
use super::types::{SimulationConfig, Token, Vtp, PPM_SCALE, RATE_SCALE, WAD, WAD_DECIMALS};

/// Resultado completo de um swap, já formatado nos decimais de cada grandeza.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub amount_in: FixedPoint,
    pub fee_in: FixedPoint,
    pub real_fee_in: FixedPoint,
    pub real_in: FixedPoint,
    pub pav: FixedPoint,
    pub pav_a: FixedPoint,
    pub pav_b: FixedPoint,
    /// WAD² (36 casas).
    pub pav_delta: FixedPoint,
    pub pav_t: FixedPoint,
    pub swap_get: FixedPoint,
    pub fee_out: FixedPoint,
    pub real_fee_out: FixedPoint,
    /// Parcela de `real_fee_out` que vai para o protocolo (informativo).
    pub protocol_fee: FixedPoint,
    /// Output antes da punição/recompensa.
    pub esti_out: FixedPoint,
    /// > 0 punição, < 0 recompensa.
    pub punishment: FixedPoint,
    pub is_punishment: bool,
    pub amount_out: FixedPoint,
    pub expected_out: FixedPoint,
    pub new_ralr: FixedPoint,
    pub slippage: FixedPoint,
    /// ALR do lado de saída no/abaixo do limite inferior; não bloqueia o swap.
    pub alr_below_lower_bound: bool,
}

/// Aplica o desconto (WAD) sobre uma taxa: `floor(fee·(WAD−discount)/WAD)`.
pub fn discounted_fee(fee: &BigInt, discount: &BigInt) -> Result<BigInt> {
    if discount.is_zero() {
        return Ok(fee.clone());
    }
    mul_div(fee, &(&*WAD - discount), &WAD, Rounding::Floor)
}

/// Taxa em ppm, arredondada para cima.
pub fn ppm_fee(amount: &BigInt, fee_ppm: &BigInt) -> Result<BigInt> {
    mul_div(amount, fee_ppm, &PPM_SCALE, Rounding::Ceil)
}

/// Estima um swap `from → to` de `amount` (string decimal humana nos decimais de `from`).
#[instrument(level = "debug", skip(vtp, from, to, config), err(Display))]
pub fn estimate_swap(
    vtp: &Vtp,
    from: &Token,
    to: &Token,
    amount: &str,
    config: &SimulationConfig,
) -> Result<SwapResult> {
    // 1) validação
    let cfg = config.resolve()?;
    let dec_in = from.decimals();
    let dec_out = to.decimals();
    let amount_in = parse_positive_amount(amount, dec_in)?;
    ensure_token_state(from, "from")?;
    ensure_token_state(to, "to")?;
    let pa = cfg.effective_pa(vtp);
    ensure_curve(vtp, pa)?;

    let assets_in = &from.status.assets;
    let assets_out = &to.status.assets;

    // 2) fee-in
    let fee_in = ppm_fee(&amount_in, &from.params.swap_fee_in)?;
    let real_fee_in = discounted_fee(&fee_in, &cfg.discount)?;
    let real_in = &amount_in - &real_fee_in;

    // 3) PAV
    let a0 = upscale(assets_in, dec_in);
    let a1 = upscale(assets_out, dec_out);
    let real_in_wad = upscale(&real_in, dec_in);
    debug!(skew = %reserve_skew(&a0, &a1, pa), "estado da vtp");
    let quote = solve_pav(&real_in_wad, &a0, &a1, &vtp.params.n, pa)?;

    // 4) swap_get nos decimais de saída: real_in_wad·pav / 10^(36−dec_out)
    let swap_get = if dec_out <= 2 * WAD_DECIMALS {
        mul_div(&real_in_wad, &quote.pav, &pow10(2 * WAD_DECIMALS - dec_out), Rounding::Floor)?
    } else {
        &real_in_wad * &quote.pav * pow10(dec_out - 2 * WAD_DECIMALS)
    };

    // 5) fee-out
    let fee_out = ppm_fee(&swap_get, &to.params.swap_fee_out)?;
    let real_fee_out = discounted_fee(&fee_out, &cfg.discount)?;
    let esti_out = &swap_get - &real_fee_out;
    ensure_within_reserve(&esti_out, assets_out, "fee_out")?;

    // 6) punição/recompensa
    let ratios = post_swap_ratios(
        SideFlow {
            assets: assets_in,
            liability: &from.status.liability,
            moved: &amount_in,
            fee: &real_fee_in,
        },
        SideFlow {
            assets: assets_out,
            liability: &to.status.liability,
            moved: &esti_out,
            fee: &real_fee_out,
        },
    )?;
    let adjustment = adjust_output(&esti_out, &ratios.new_ralr, &vtp.params.p)?;
    let real_out = adjustment.real_out.clone();
    // limite final: nada altera `real_out` depois daqui
    ensure_within_reserve(&real_out, assets_out, "punishment")?;

    let new_assets_out = assets_out - &real_out;
    let new_liability_out = &to.status.liability + &real_fee_out;
    let below_bound = alr_below_lower_bound(&new_assets_out, &new_liability_out, &to.params.alr_lower_bound);
    if below_bound {
        // TODO: bloquear com AlrTooLowAfterSwap quando o contrato passar a exigir.
        warn!(
            new_assets_out = %new_assets_out,
            new_liability_out = %new_liability_out,
            alr_lower_bound = %to.params.alr_lower_bound,
            "ALR de saída abaixo do limite inferior após o swap"
        );
    }

    // 7) slippage
    let expected_wad = expected_out_wad(&upscale(&amount_in, dec_in), pa)?;
    let real_out_wad = upscale(&real_out, dec_out);
    let slip = slippage(&real_out_wad, &expected_wad)?;
    let expected_out = super::math::downscale(&expected_wad, dec_out);

    let protocol_fee = mul_div(&real_fee_out, &to.params.protocol_fee_rate, &RATE_SCALE, Rounding::Floor)?;

    debug!(
        amount_in = %amount_in,
        real_out = %real_out,
        ralr = %ratios.new_ralr,
        mode = ?adjustment.mode,
        "swap estimado"
    );

    let out = |v: BigInt| FixedPoint::from_raw(v, dec_out);
    let inn = |v: BigInt| FixedPoint::from_raw(v, dec_in);
    let wad = |v: BigInt| FixedPoint::from_raw(v, WAD_DECIMALS);

    Ok(SwapResult {
        amount_in: inn(amount_in),
        fee_in: inn(fee_in),
        real_fee_in: inn(real_fee_in),
        real_in: inn(real_in),
        is_punishment: adjustment.is_punishment(),
        pav: wad(quote.pav),
        pav_a: wad(quote.a),
        pav_b: wad(quote.b),
        pav_delta: FixedPoint::from_raw(quote.delta, 2 * WAD_DECIMALS),
        pav_t: wad(quote.t),
        swap_get: out(swap_get),
        fee_out: out(fee_out),
        real_fee_out: out(real_fee_out),
        protocol_fee: out(protocol_fee),
        esti_out: out(esti_out),
        punishment: out(adjustment.signed_amount),
        amount_out: out(real_out),
        expected_out: out(expected_out),
        new_ralr: wad(ratios.new_ralr),
        slippage: wad(slip),
        alr_below_lower_bound: below_bound,
    })
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::error_catalog::SimErrorCode;
    use crate::amm::types::{TokenParams, TokenStatus, VtpParams, VtpStatus};

    fn token(decimals: u32, fee_in: u32, fee_out: u32, assets: &str, liability: &str) -> Token {
        Token {
            params: TokenParams {
                decimals,
                swap_fee_in: fee_in.into(),
                swap_fee_out: fee_out.into(),
                protocol_fee_rate: 0u8.into(),
                max_allocate_rate: 0u8.into(),
                alr_lower_bound: 0u8.into(),
            },
            status: TokenStatus {
                assets: crate::amm::fixed::parse_units(assets, decimals).unwrap(),
                liability: crate::amm::fixed::parse_units(liability, decimals).unwrap(),
                total_shares: 0u8.into(),
            },
        }
    }

    fn vtp() -> Vtp {
        Vtp {
            params: VtpParams { n: 10u8.into(), p: 1200u32.into() },
            status: VtpStatus { po: WAD.clone(), pa: WAD.clone() },
        }
    }

    fn cfg() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn t_balanced_swap_close_to_one_percent_fee() {
        let a = token(18, 0, 10_000, "1000", "1000");
        let b = token(18, 0, 10_000, "1000", "1000");
        let r = estimate_swap(&vtp(), &a, &b, "10", &cfg()).unwrap();
        let out = r.amount_out.raw().clone();
        assert!(out < BigInt::from(99u8) * pow10(17), "out={}", r.amount_out);
        assert!(out > BigInt::from(98u8) * pow10(17), "out={}", r.amount_out);
        assert!(!r.is_punishment);
        assert!(r.punishment.is_zero());
        assert_eq!(r.fee_in.to_string(), "0");
        assert_eq!(r.real_in.to_string(), "10");
        assert_eq!(r.pav_delta.decimals(), 36);
    }

    #[test]
    fn t_zero_amount_rejected() {
        let a = token(18, 0, 10_000, "1000", "1000");
        let err = estimate_swap(&vtp(), &a, &a, "0", &cfg()).unwrap_err();
        assert_eq!(err.code, SimErrorCode::InvalidAmount);
    }

    #[test]
    fn t_empty_reserve_rejected() {
        let a = token(18, 0, 0, "1000", "1000");
        let empty = token(18, 0, 0, "0", "1000");
        let err = estimate_swap(&vtp(), &a, &empty, "1", &cfg()).unwrap_err();
        assert_eq!(err.code, SimErrorCode::InsufficientState);
    }

    #[test]
    fn t_discount_removes_fees() {
        let a = token(18, 3_000, 10_000, "1000", "1000");
        let b = token(18, 3_000, 10_000, "1000", "1000");
        let full = SimulationConfig { exclude_swap_fee: true, ..Default::default() };
        let r = estimate_swap(&vtp(), &a, &b, "10", &full).unwrap();
        assert!(r.real_fee_in.is_zero());
        assert!(r.real_fee_out.is_zero());
        assert_eq!(r.fee_in.to_string(), "0.03");
        let paid = estimate_swap(&vtp(), &a, &b, "10", &cfg()).unwrap();
        assert!(paid.amount_out.raw() < r.amount_out.raw());
    }

    #[test]
    fn t_mixed_decimals() {
        let a = token(6, 0, 0, "1000", "1000");
        let b = token(18, 0, 0, "1000", "1000");
        let r = estimate_swap(&vtp(), &a, &b, "1", &cfg()).unwrap();
        assert_eq!(r.amount_in.decimals(), 6);
        assert_eq!(r.amount_out.decimals(), 18);
        assert!(r.amount_out.raw() < &pow10(18));
        assert!(r.amount_out.raw() > &(BigInt::from(99u8) * pow10(16)));
    }

    #[test]
    fn t_oversized_swap_rejected() {
        let a = token(18, 0, 0, "1000", "1000");
        let err = estimate_swap(&vtp(), &a, &a, "1000", &cfg()).unwrap_err();
        assert_eq!(err.code, SimErrorCode::InvalidSwapParameters);
    }

    #[test]
    fn t_deterministic() {
        let a = token(18, 100, 10_000, "1200", "1000");
        let b = token(18, 100, 10_000, "800", "1000");
        let r1 = estimate_swap(&vtp(), &a, &b, "25.5", &cfg()).unwrap();
        let r2 = estimate_swap(&vtp(), &a, &b, "25.5", &cfg()).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn t_alr_flag_does_not_block() {
        let a = token(18, 0, 0, "1200", "1000");
        let mut b = token(18, 0, 0, "800", "1000");
        b.params.alr_lower_bound = 9000u32.into();
        let r = estimate_swap(&vtp(), &a, &b, "10", &cfg()).unwrap();
        assert!(r.alr_below_lower_bound);
        assert!(r.is_punishment);
        assert_eq!(r.amount_out.to_string(), "6.105075780991912935");

        b.params.alr_lower_bound = 0u8.into();
        let r = estimate_swap(&vtp(), &a, &b, "10", &cfg()).unwrap();
        assert!(!r.alr_below_lower_bound);
    }

    #[test]
    fn t_rounding_past_reserve_fails_at_fee_out() {
        // n = 1 e pa = 750 com reserva de saída de 1e12 wei: swap_get passa 500 wei da reserva
        let v = Vtp {
            params: VtpParams { n: 1u8.into(), p: 1200u32.into() },
            status: VtpStatus { po: WAD.clone(), pa: WAD.clone() },
        };
        let a = token(18, 0, 0, "1", "1");
        let b = token(18, 0, 0, "0.000001", "1");
        let config = SimulationConfig { pa_overwrite: Some("750".into()), ..Default::default() };
        let err = estimate_swap(&v, &a, &b, "2", &config).unwrap_err();
        assert_eq!(err.code, SimErrorCode::InsufficientLiquidity);
        assert_eq!(err.context.get("stage").map(String::as_str), Some("fee_out"));
        assert_eq!(err.context.get("out").map(String::as_str), Some("1000000000500"));
    }

    #[test]
    fn t_reward_past_reserve_fails_after_adjustment() {
        // entrada muito sub-colateralizada, saída super-colateralizada: recompensa > reserva
        let v = Vtp {
            params: VtpParams { n: 1u8.into(), p: 1200u32.into() },
            status: VtpStatus { po: WAD.clone(), pa: WAD.clone() },
        };
        let a = token(18, 0, 0, "10", "1000");
        let b = token(18, 0, 0, "10", "1");
        let err = estimate_swap(&v, &a, &b, "20", &cfg()).unwrap_err();
        assert_eq!(err.code, SimErrorCode::InsufficientLiquidity);
        assert_eq!(err.context.get("stage").map(String::as_str), Some("punishment"));
        assert_eq!(err.context.get("out").map(String::as_str), Some("13266797256496609948"));
    }
}
