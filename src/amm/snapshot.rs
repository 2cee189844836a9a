//! Forma "string" do estado em cache (como lido da chain e formatado pelo front)
//! e conversão validada para o modelo tipado de `types.rs`.

use num_bigint::BigInt;
use serde::Deserialize;

use super::error::{Result, SimError};
use super::error_catalog::SimErrorCode;
use super::fixed::{parse_chain_integer, parse_units, MAX_DECIMALS};
use super::types::{Token, TokenParams, TokenStatus, Vtp, VtpParams, VtpStatus, WAD_DECIMALS};

/// VTP como vem do cache: `n`/`p` inteiros de chain, `po`/`pa` decimais humanos.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VtpSnapshot {
    pub n: String,
    pub p: String,
    pub po: String,
    pub pa: String,
}

/// Token como vem do cache: taxas/limites inteiros de chain, saldos decimais humanos.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    pub decimals: u32,
    #[serde(default = "zero")]
    pub swap_fee_in: String,
    #[serde(default = "zero")]
    pub swap_fee_out: String,
    #[serde(default = "zero")]
    pub protocol_fee_rate: String,
    #[serde(default = "zero")]
    pub max_allocate_rate: String,
    #[serde(default = "zero")]
    pub alr_lower_bound: String,
    pub assets: String,
    pub liability: String,
    #[serde(default = "zero")]
    pub total_shares: String,
}

fn zero() -> String {
    "0".to_string()
}

fn human_non_negative(input: &str, decimals: u32, field: &str) -> Result<BigInt> {
    let v = parse_units(input, decimals).map_err(|e| e.with_context("field", field))?;
    if v < BigInt::from(0u8) {
        sim_bail!(SimErrorCode::ParseError, input => input, field => field);
    }
    Ok(v)
}

fn chain(input: &str, field: &str) -> Result<BigInt> {
    parse_chain_integer(input).map_err(|e| e.with_context("field", field))
}

impl TryFrom<&VtpSnapshot> for Vtp {
    type Error = SimError;

    fn try_from(raw: &VtpSnapshot) -> Result<Self> {
        Ok(Vtp {
            params: VtpParams { n: chain(&raw.n, "n")?, p: chain(&raw.p, "p")? },
            status: VtpStatus {
                po: human_non_negative(&raw.po, WAD_DECIMALS, "po")?,
                pa: human_non_negative(&raw.pa, WAD_DECIMALS, "pa")?,
            },
        })
    }
}

impl TryFrom<&TokenSnapshot> for Token {
    type Error = SimError;

    fn try_from(raw: &TokenSnapshot) -> Result<Self> {
        let decimals = raw.decimals;
        if decimals > MAX_DECIMALS {
            sim_bail!(SimErrorCode::ParseError, field => "decimals", input => decimals);
        }
        Ok(Token {
            params: TokenParams {
                decimals,
                swap_fee_in: chain(&raw.swap_fee_in, "swapFeeIn")?,
                swap_fee_out: chain(&raw.swap_fee_out, "swapFeeOut")?,
                protocol_fee_rate: chain(&raw.protocol_fee_rate, "protocolFeeRate")?,
                max_allocate_rate: chain(&raw.max_allocate_rate, "maxAllocateRate")?,
                alr_lower_bound: chain(&raw.alr_lower_bound, "alrLowerBound")?,
            },
            status: TokenStatus {
                assets: human_non_negative(&raw.assets, decimals, "assets")?,
                liability: human_non_negative(&raw.liability, decimals, "liability")?,
                total_shares: human_non_negative(&raw.total_shares, decimals, "totalShares")?,
            },
        })
    }
}
