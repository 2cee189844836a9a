//! Simulador offline, em ponto fixo, das operações de swap/allocate/deallocate
//! das VTPs do Staple. Reproduz bit a bit a aritmética inteira do contrato.

#[macro_use]
pub mod amm;
pub mod obs;
pub mod telemetry;

pub use amm::error::{Result, SimError};
pub use amm::error_catalog::SimErrorCode;
pub use amm::fixed::{format_units, parse_units, FixedPoint};
pub use amm::liquidity::{estimate_allocate, estimate_deallocate, AllocateResult, DeallocatePosition, DeallocateResult};
pub use amm::snapshot::{TokenSnapshot, VtpSnapshot};
pub use amm::swap::{estimate_swap, SwapResult};
pub use amm::types::{SimulationConfig, Token, Vtp};
