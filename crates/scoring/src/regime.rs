//! Regime classification and the per-regime guidance table.

use common::{DirectionBias, Guidance, Regime};

/// Composite above this is RISK_ON.
pub const RISK_ON_THRESHOLD: f64 = 0.25;
/// Composite below this is RISK_OFF.
pub const RISK_OFF_THRESHOLD: f64 = -0.25;

/// Strict comparisons: a composite exactly on a threshold stays NEUTRAL.
pub fn regime_from_composite(composite: f64) -> Regime {
    if composite > RISK_ON_THRESHOLD {
        Regime::RiskOn
    } else if composite < RISK_OFF_THRESHOLD {
        Regime::RiskOff
    } else {
        Regime::Neutral
    }
}

pub fn default_guidance(regime: Regime) -> Guidance {
    match regime {
        Regime::RiskOn => Guidance {
            allow_new_trades: true,
            direction_bias: DirectionBias::Both,
            risk_budget_pct: 0.40,
            daily_dd_cap_pct: 2.0,
            max_leverage: 4.0,
            do_not_trade_until: None,
        },
        Regime::Neutral => Guidance {
            allow_new_trades: true,
            direction_bias: DirectionBias::Both,
            risk_budget_pct: 0.30,
            daily_dd_cap_pct: 2.0,
            max_leverage: 3.0,
            do_not_trade_until: None,
        },
        Regime::RiskOff => Guidance {
            allow_new_trades: false,
            direction_bias: DirectionBias::ShortOnly,
            risk_budget_pct: 0.20,
            daily_dd_cap_pct: 2.0,
            max_leverage: 2.0,
            do_not_trade_until: None,
        },
    }
}
