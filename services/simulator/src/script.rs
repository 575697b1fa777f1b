//! Scripted operations for the rehearsal driver
//!
//! `swap:A:100`, `swap:B:2500`, `add:10:25000`, `remove:5`, `reset`.

use amm::{Asset, Decimal};
use anyhow::{anyhow, bail, Context, Result};
use pool_state::{AmmFacade, RemotePool};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOp {
    Swap { token_in: Asset, amount_in: Decimal },
    Add { amount0: Decimal, amount1: Decimal },
    Remove { shares: Decimal },
    Reset,
}

impl FromStr for ScriptOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            ["swap", side, amount] => Ok(ScriptOp::Swap {
                token_in: parse_asset(side)?,
                amount_in: parse_amount(amount)?,
            }),
            ["add", amount0, amount1] => Ok(ScriptOp::Add {
                amount0: parse_amount(amount0)?,
                amount1: parse_amount(amount1)?,
            }),
            ["remove", shares] => Ok(ScriptOp::Remove {
                shares: parse_amount(shares)?,
            }),
            ["reset"] => Ok(ScriptOp::Reset),
            _ => bail!(
                "Unrecognised operation '{}' (expected swap:A|B:<amount>, add:<a0>:<a1>, remove:<shares> or reset)",
                s
            ),
        }
    }
}

impl fmt::Display for ScriptOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOp::Swap {
                token_in,
                amount_in,
            } => write!(f, "swap {} {}", amount_in, token_in),
            ScriptOp::Add { amount0, amount1 } => write!(f, "add {} + {}", amount0, amount1),
            ScriptOp::Remove { shares } => write!(f, "remove {} shares", shares),
            ScriptOp::Reset => write!(f, "reset"),
        }
    }
}

fn parse_asset(side: &str) -> Result<Asset> {
    match side.to_ascii_lowercase().as_str() {
        "a" | "token0" | "weth" => Ok(Asset::A),
        "b" | "token1" | "usdc" => Ok(Asset::B),
        other => Err(anyhow!("Unknown side '{}'", other)),
    }
}

fn parse_amount(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).with_context(|| format!("Invalid amount '{}'", value))
}

/// One line of the run report
#[derive(Debug, Clone, Serialize)]
pub struct OpReport {
    pub op: String,
    pub ok: bool,
    pub detail: String,
}

/// Run one operation against the facade; failures are reported, not raised
pub async fn run_op<R: RemotePool>(facade: &AmmFacade<R>, op: &ScriptOp) -> OpReport {
    let detail = match *op {
        ScriptOp::Swap {
            token_in,
            amount_in,
        } => facade
            .swap(token_in, amount_in)
            .await
            .map(|out| format!("received {} {}", out, token_in.other())),
        ScriptOp::Add { amount0, amount1 } => facade
            .add_liquidity(amount0, amount1)
            .await
            .map(|shares| format!("minted {} shares", shares)),
        ScriptOp::Remove { shares } => facade
            .remove_liquidity(shares)
            .await
            .map(|amounts| format!("withdrew {} + {}", amounts.amount0, amounts.amount1)),
        ScriptOp::Reset => {
            facade.reset_pool();
            Ok("pool reset to genesis".to_string())
        }
    };
    match detail {
        Ok(detail) => OpReport {
            op: op.to_string(),
            ok: true,
            detail,
        },
        Err(e) => OpReport {
            op: op.to_string(),
            ok: false,
            detail: e.to_string(),
        },
    }
}
