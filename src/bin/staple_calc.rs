//! staple-calc: calculadora offline de swap/allocate/deallocate.
//!
//! Lê um cenário JSON `{ vtp, tokenA, tokenB, config }` (mesma forma "string" do
//! cache) e imprime o resultado da estimativa como JSON no stdout. Logs vão para
//! o stderr (`RUST_LOG`); com `OTEL_EXPORTER_OTLP_ENDPOINT` definido também
//! exporta traces e métricas.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;

use staple_engine_core::obs::wrap;
use staple_engine_core::telemetry;
use staple_engine_core::{
    estimate_allocate, estimate_deallocate, estimate_swap, format_units, DeallocatePosition, SimError,
    SimulationConfig, Token, TokenSnapshot, Vtp, VtpSnapshot,
};

#[derive(Parser)]
#[command(name = "staple-calc")]
#[command(about = "Offline fixed-point calculator for Staple VTP swaps and liquidity", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file (JSON with vtp, tokenA, tokenB and optional config)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Print compact JSON instead of pretty
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Side {
    A,
    B,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a swap from one side of the VTP to the other
    Swap {
        /// Amount in (decimal string, input token units)
        amount: String,

        /// Token being sold
        #[arg(long, value_enum, default_value = "a")]
        from: Side,
    },

    /// Estimate the fee to allocate liquidity to one token
    Allocate {
        amount: String,

        #[arg(long, value_enum, default_value = "a")]
        token: Side,
    },

    /// Estimate a deallocate (principal plus accrued earnings)
    Deallocate {
        amount: String,

        #[arg(long, value_enum, default_value = "a")]
        token: Side,

        /// Principal the LP originally allocated
        #[arg(long)]
        user_allocation: String,

        /// Shares held by the LP
        #[arg(long)]
        user_shares: String,

        /// Total shares of the token (defaults to the scenario's totalShares)
        #[arg(long)]
        total_shares: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    vtp: VtpSnapshot,
    token_a: TokenSnapshot,
    token_b: TokenSnapshot,
    #[serde(default)]
    config: SimulationConfig,
}

struct LoadedScenario {
    vtp: Vtp,
    token_a: Token,
    token_b: Token,
    config: SimulationConfig,
}

impl LoadedScenario {
    fn pick(&self, side: Side) -> (&Token, &Token) {
        match side {
            Side::A => (&self.token_a, &self.token_b),
            Side::B => (&self.token_b, &self.token_a),
        }
    }
}

fn load(path: &PathBuf) -> Result<LoadedScenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw).context("parsing scenario JSON")?;
    Ok(LoadedScenario {
        vtp: Vtp::try_from(&scenario.vtp).context("vtp")?,
        token_a: Token::try_from(&scenario.token_a).context("tokenA")?,
        token_b: Token::try_from(&scenario.token_b).context("tokenB")?,
        config: scenario.config,
    })
}

fn run(cli: &Cli, sc: &LoadedScenario) -> Result<serde_json::Value> {
    let value = match &cli.command {
        Commands::Swap { amount, from } => {
            let (from, to) = sc.pick(*from);
            let r = wrap::time("swap", || estimate_swap(&sc.vtp, from, to, amount, &sc.config))?;
            serde_json::to_value(r).context("serializing swap result")?
        }
        Commands::Allocate { amount, token } => {
            let (token, paired) = sc.pick(*token);
            let r = wrap::time("allocate", || estimate_allocate(&sc.vtp, token, paired, amount, &sc.config))?;
            serde_json::to_value(r).context("serializing allocate result")?
        }
        Commands::Deallocate { amount, token, user_allocation, user_shares, total_shares } => {
            let (token, paired) = sc.pick(*token);
            let default_total = format_units(&token.status.total_shares, token.decimals());
            let position = DeallocatePosition {
                user_allocation,
                user_shares,
                total_shares: total_shares.as_deref().unwrap_or(&default_total),
            };
            let r = wrap::time("deallocate", || {
                estimate_deallocate(&sc.vtp, token, paired, amount, &position, &sc.config)
            })?;
            serde_json::to_value(r).context("serializing deallocate result")?
        }
    };
    Ok(value)
}

/// Código STP-* quando a falha veio do motor; `None` para IO/serialização.
fn sim_code(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<SimError>().map(|e| e.code().code())
}

fn op_name(cmd: &Commands) -> &'static str {
    match cmd {
        Commands::Swap { .. } => "swap",
        Commands::Allocate { .. } => "allocate",
        Commands::Deallocate { .. } => "deallocate",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tel = telemetry::init("staple-calc")?;

    let scenario = load(&cli.scenario)?;
    let op = op_name(&cli.command);
    let span = telemetry::make_info_span(op, &cli.scenario.display().to_string());
    let _guard = span.enter();

    let started = Instant::now();
    let outcome = run(&cli, &scenario);
    let code = outcome.as_ref().err().and_then(sim_code);
    tel.record_estimate(op, started.elapsed(), code);

    let result = match outcome {
        Ok(value) => {
            let text = if cli.compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            println!("{text}");
            Ok(())
        }
        Err(err) => {
            match err.downcast_ref::<SimError>() {
                Some(sim) => tracing::error!(error = %sim.to_log_json(), "estimate failed"),
                None => tracing::error!(error = %err, "estimate failed"),
            }
            Err(err)
        }
    };

    drop(_guard);
    tel.shutdown();
    result
}
