use num_bigint::BigInt;
use proptest::prelude::*;
use staple_engine_core::amm::fixed::{format_units, parse_units};
use staple_engine_core::amm::math::{isqrt, mul_div, Rounding};
use staple_engine_core::amm::ref_golden::rational_mul_div;
use staple_engine_core::amm::swap::ppm_fee;
use staple_engine_core::amm::types::{TokenParams, TokenStatus, VtpParams, VtpStatus, WAD};
use staple_engine_core::{estimate_allocate, estimate_swap, SimulationConfig, SwapResult, Token, Vtp};

#[inline]
fn to_wad(v: u64) -> BigInt { BigInt::from(v) * &*WAD }

fn balanced_token(reserve: u64, fee_in: u32, fee_out: u32) -> Token {
    Token {
        params: TokenParams {
            decimals: 18,
            swap_fee_in: fee_in.into(),
            swap_fee_out: fee_out.into(),
            protocol_fee_rate: 0u8.into(),
            max_allocate_rate: 0u8.into(),
            alr_lower_bound: 0u8.into(),
        },
        status: TokenStatus { assets: to_wad(reserve), liability: to_wad(reserve), total_shares: to_wad(reserve) },
    }
}

fn pool_token(assets: u64, liability: u64, fee_in: u32, fee_out: u32) -> Token {
    let mut t = balanced_token(assets, fee_in, fee_out);
    t.status.liability = to_wad(liability);
    t.status.total_shares = to_wad(liability);
    t
}

fn vtp(n: u32) -> Vtp {
    Vtp {
        params: VtpParams { n: n.into(), p: 1200u32.into() },
        status: VtpStatus { po: WAD.clone(), pa: WAD.clone() },
    }
}

proptest! {
#![proptest_config(ProptestConfig { cases: 2_000, .. ProptestConfig::default() })]

#[test]
fn mul_div_matches_oracle(a in any::<i64>(), b in any::<i64>(), c in any::<i64>().prop_filter("c != 0", |c| *c != 0)) {
    let (a, b, c) = (BigInt::from(a), BigInt::from(b), BigInt::from(c));
    let floor = mul_div(&a, &b, &c, Rounding::Floor).unwrap();
    let ceil = mul_div(&a, &b, &c, Rounding::Ceil).unwrap();
    prop_assert_eq!(&floor, &rational_mul_div(&a, &b, &c, Rounding::Floor).unwrap());
    prop_assert_eq!(&ceil, &rational_mul_div(&a, &b, &c, Rounding::Ceil).unwrap());
    // ceil - floor ∈ {0, 1}
    let gap = &ceil - &floor;
    prop_assert!(gap == BigInt::from(0u8) || gap == BigInt::from(1u8));
}

#[test]
fn isqrt_brackets_value(v in any::<u128>()) {
    let v = BigInt::from(v);
    let s = isqrt(&v).unwrap();
    prop_assert!(&s * &s <= v);
    let s1 = &s + 1u8;
    prop_assert!(&s1 * &s1 > v);
}

#[test]
fn format_then_parse_is_identity(raw in any::<i128>(), decimals in 0u32..=30) {
    let raw = BigInt::from(raw);
    let text = format_units(&raw, decimals);
    prop_assert_eq!(parse_units(&text, decimals).unwrap(), raw);
}

#[test]
fn fee_is_monotonic(a in 0u64..=u64::MAX / 2, extra in 0u64..=1_000_000, fee in 0u32..=1_000_000) {
    let fee = BigInt::from(fee);
    let lo = ppm_fee(&BigInt::from(a), &fee).unwrap();
    let hi = ppm_fee(&(BigInt::from(a) + extra), &fee).unwrap();
    prop_assert!(lo <= hi);
}
}

proptest! {
#![proptest_config(ProptestConfig { cases: 1_000, .. ProptestConfig::default() })]

#[test]
fn swap_never_pays_more_than_reference(
    ra in 1_000u64..=1_000_000,
    rb in 1_000u64..=1_000_000,
    n in 1u32..=20,
    frac_ppm in 1u64..=1_000_000, // fração de 1% da menor reserva
    fee_in in 0u32..=3000,
    fee_out in 0u32..=3000,
) {
    let (a, b) = (balanced_token(ra, fee_in, fee_out), balanced_token(rb, fee_in, fee_out));
    let amount = to_wad(ra.min(rb)) * frac_ppm / 100_000_000u64;
    prop_assume!(amount > BigInt::from(0u8));
    let amount_str = format_units(&amount, 18);

    let r = estimate_swap(&vtp(n), &a, &b, &amount_str, &SimulationConfig::default()).unwrap();

    // pav <= pa e pools equilibrados nunca recompensam
    prop_assert!(r.pav.raw() <= &*WAD);
    prop_assert!(r.punishment.raw() >= &BigInt::from(0u8));
    prop_assert!(r.amount_out.raw() >= &BigInt::from(0u8));
    prop_assert!(r.amount_out.raw() <= &amount);
    prop_assert!(r.amount_out.raw() <= &to_wad(rb));

    // determinismo
    let again = estimate_swap(&vtp(n), &a, &b, &amount_str, &SimulationConfig::default()).unwrap();
    prop_assert_eq!(r, again);
}

#[test]
fn allocate_on_balanced_vtp_is_free(reserve in 1u64..=1_000_000_000, amt in 1u64..=1_000_000, n in 1u32..=50) {
    let t = balanced_token(reserve, 0, 0);
    let r = estimate_allocate(&vtp(n), &t, &t, &amt.to_string(), &SimulationConfig::default()).unwrap();
    prop_assert!(r.fee.is_zero());
    prop_assert!(r.fee_rate.is_zero());
}
}

/// Pool desequilibrado: limites de saída, taxa menor nunca piora o swap e o desconto só ajuda.
fn check_unbalanced_swap(
    (ai, li, ao, lo): (u64, u64, u64, u64),
    n: u32,
    frac_ppm: u64,
    (fee_in, fee_out): (u32, u32),
) -> Result<(), TestCaseError> {
    let amount = to_wad(ai.min(ao)) * frac_ppm / 100_000_000u64;
    prop_assume!(amount > BigInt::from(0u8));
    let amount_str = format_units(&amount, 18);
    let reserve_out = to_wad(ao);

    let run = |fi: u32, fo: u32, config: &SimulationConfig| -> SwapResult {
        estimate_swap(&vtp(n), &pool_token(ai, li, fi, fo), &pool_token(ao, lo, fi, fo), &amount_str, config).unwrap()
    };
    let check_bounds = |r: &SwapResult| -> Result<(), TestCaseError> {
        prop_assert!(r.real_in.raw() >= &BigInt::from(0u8));
        prop_assert!(r.real_in.raw() <= &amount);
        prop_assert!(r.esti_out.raw() >= &BigInt::from(0u8));
        prop_assert!(r.amount_out.raw() >= &BigInt::from(0u8));
        prop_assert!(r.amount_out.raw() <= &reserve_out);
        Ok(())
    };

    // taxas indo a zero: fee, fee/2, 0
    let by_fee: Vec<SwapResult> = [2u32, 1, 0]
        .iter()
        .map(|k| run(fee_in * k / 2, fee_out * k / 2, &SimulationConfig::default()))
        .collect();
    for r in &by_fee {
        check_bounds(r)?;
    }
    prop_assert!(by_fee[0].amount_out.raw() <= by_fee[1].amount_out.raw());
    prop_assert!(by_fee[1].amount_out.raw() <= by_fee[2].amount_out.raw());

    // desconto 0, 0.5, 1
    let by_discount: Vec<SwapResult> = ["0", "0.5", "1"]
        .iter()
        .map(|d| run(fee_in, fee_out, &SimulationConfig { discount: Some((*d).into()), ..Default::default() }))
        .collect();
    for r in &by_discount {
        check_bounds(r)?;
    }
    prop_assert_eq!(&by_discount[0].amount_out, &by_fee[0].amount_out);
    prop_assert!(by_discount[0].amount_out.raw() <= by_discount[1].amount_out.raw());
    prop_assert!(by_discount[1].amount_out.raw() <= by_discount[2].amount_out.raw());
    // desconto total equivale a taxa zero: é o máximo
    prop_assert_eq!(&by_discount[2].amount_out, &by_fee[2].amount_out);
    Ok(())
}

proptest! {
#![proptest_config(ProptestConfig { cases: 300, .. ProptestConfig::default() })]

#[test]
fn unbalanced_swap_in_punishment_regime(
    ai in 1_000u64..=2_000, li in 500u64..=1_000,
    ao in 500u64..=1_000, lo in 1_000u64..=2_000,
    n in 1u32..=20,
    frac_ppm in 1u64..=1_000_000,
    fee_in in 0u32..=3000,
    fee_out in 0u32..=10_000,
) {
    check_unbalanced_swap((ai, li, ao, lo), n, frac_ppm, (fee_in, fee_out))?;
}

#[test]
fn unbalanced_swap_in_reward_regime(
    ai in 500u64..=1_000, li in 1_000u64..=2_000,
    ao in 1_000u64..=2_000, lo in 500u64..=1_000,
    n in 1u32..=20,
    frac_ppm in 1u64..=1_000_000,
    fee_in in 0u32..=3000,
    fee_out in 0u32..=10_000,
) {
    check_unbalanced_swap((ai, li, ao, lo), n, frac_ppm, (fee_in, fee_out))?;
}
}
