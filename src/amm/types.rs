//! Tipos do simulador: escalas de ponto fixo, parâmetros/estado da VTP e dos tokens,
//! e a configuração opcional por chamada.
//!
//! Escalas (como vêm da chain):
//! - preços/razões: WAD (1e18)
//! - `swap_fee_in`/`swap_fee_out`: ppm (1e6)
//! - `p`, `protocol_fee_rate`, `max_allocate_rate`, `alr_lower_bound`: 1e4 (fração = valor/10000)
//! - `assets`, `liability`, `total_shares`: decimais nativos do token

use num_bigint::BigInt;
use num_traits::Signed;
use once_cell::sync::Lazy;
use serde::Deserialize;

use super::error::Result;
use super::error_catalog::SimErrorCode;
use super::fixed::parse_units;

pub const WAD_DECIMALS: u32 = 18;

/// 1e18
pub static WAD: Lazy<BigInt> = Lazy::new(|| super::math::pow10(WAD_DECIMALS));
/// 1e36 (WAD²)
pub static WAD_SQ: Lazy<BigInt> = Lazy::new(|| super::math::pow10(2 * WAD_DECIMALS));
/// 1e6 (ppm)
pub static PPM_SCALE: Lazy<BigInt> = Lazy::new(|| BigInt::from(1_000_000u32));
/// 1e4 (taxas/limites em "percent × 100")
pub static RATE_SCALE: Lazy<BigInt> = Lazy::new(|| BigInt::from(10_000u32));

/// Parâmetros da curva da VTP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VtpParams {
    /// Inclinação da curva (inteiro > 0).
    pub n: BigInt,
    /// Parâmetro da curva de punição (escala 1e4).
    pub p: BigInt,
}

/// Estado de preço da VTP (WAD).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VtpStatus {
    pub po: BigInt,
    pub pa: BigInt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vtp {
    pub params: VtpParams,
    pub status: VtpStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenParams {
    pub decimals: u32,
    pub swap_fee_in: BigInt,
    pub swap_fee_out: BigInt,
    pub protocol_fee_rate: BigInt,
    pub max_allocate_rate: BigInt,
    pub alr_lower_bound: BigInt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenStatus {
    pub assets: BigInt,
    pub liability: BigInt,
    pub total_shares: BigInt,
}

/// Um lado da VTP: parâmetros + estado de um token do pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub params: TokenParams,
    pub status: TokenStatus,
}

impl Token {
    pub fn decimals(&self) -> u32 {
        self.params.decimals
    }

    /// `assets == liability`
    pub fn is_balanced(&self) -> bool {
        self.status.assets == self.status.liability
    }
}

/// Opções reconhecidas por chamada. Todos os campos são strings decimais humanas.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Fração em `[0, 1]` de desconto aplicada às duas taxas de swap.
    pub discount: Option<String>,
    /// Atalho para `discount = 1`.
    pub exclude_swap_fee: bool,
    /// Sobrescreve `pa` (preço WAD) para cenários.
    pub pa_overwrite: Option<String>,
}

/// Configuração já validada, em WAD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub discount: BigInt,
    pub pa_overwrite: Option<BigInt>,
}

impl SimulationConfig {
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let discount = if self.exclude_swap_fee {
            WAD.clone()
        } else {
            match self.discount.as_deref() {
                Some(raw) => {
                    let d = parse_units(raw, WAD_DECIMALS)?;
                    if d.is_negative() || d > *WAD {
                        sim_bail!(SimErrorCode::InvalidAmount, discount => raw);
                    }
                    d
                }
                None => BigInt::from(0u8),
            }
        };
        let pa_overwrite = match self.pa_overwrite.as_deref() {
            Some(raw) => {
                let pa = parse_units(raw, WAD_DECIMALS)?;
                if !pa.is_positive() {
                    sim_bail!(SimErrorCode::InsufficientState, field => "paOverwrite");
                }
                Some(pa)
            }
            None => None,
        };
        Ok(ResolvedConfig { discount, pa_overwrite })
    }
}

impl ResolvedConfig {
    /// `pa` efetivo da chamada.
    pub fn effective_pa<'a>(&'a self, vtp: &'a Vtp) -> &'a BigInt {
        self.pa_overwrite.as_ref().unwrap_or(&vtp.status.pa)
    }
}
