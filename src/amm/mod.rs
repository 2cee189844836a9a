// Erros primeiro: as macros `sim_err!`/`sim_bail!` precisam estar visíveis aos demais.
#[macro_use]
pub mod error;
pub mod error_catalog;

pub mod math;          // mul_div / isqrt / rescale
pub mod fixed;         // parse/format de decimais
pub mod types;
pub mod guardrails;
pub mod snapshot;      // fronteira string → tipado

pub mod pricing;       // PAV
pub mod risk;          // ALR/RALR, punição/recompensa
pub mod swap;
pub mod liquidity;     // allocate / deallocate

pub mod ref_golden;
