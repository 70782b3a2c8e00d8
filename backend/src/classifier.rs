use serde::Serialize;
use std::fmt;

use crate::error::SignalError;
use crate::models::IndicatorRow;

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

/// How many bars back the EMA trend is measured against
pub const TREND_LOOKBACK: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Headline shown next to the index name
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY Signal",
            Signal::Sell => "SELL Signal",
            Signal::Hold => "HOLD / No clear signal",
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            Signal::Buy => "Consider entering long position.",
            Signal::Sell => "Consider exiting or shorting.",
            Signal::Hold => "Wait for better conditions.",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(name)
    }
}

/// Scalars the rule looks at, taken from the latest augmented rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalInputs {
    pub close: f64,
    pub rsi: f64,
    pub ema: f64,
    /// EMA now minus EMA `TREND_LOOKBACK` bars earlier
    pub trend: f64,
}

impl SignalInputs {
    pub fn from_rows(rows: &[IndicatorRow]) -> Result<Self, SignalError> {
        let required = TREND_LOOKBACK + 1;
        if rows.len() < required {
            return Err(SignalError::InsufficientData {
                required,
                available: rows.len(),
            });
        }

        let latest = &rows[rows.len() - 1];
        let earlier = &rows[rows.len() - 1 - TREND_LOOKBACK];

        Ok(Self {
            close: latest.close,
            rsi: latest.rsi,
            ema: latest.ema,
            trend: latest.ema - earlier.ema,
        })
    }
}

/// Oversold and recovering above a rising EMA buys; overbought and breaking
/// below a falling EMA sells; anything else holds. Thresholds are strict.
pub fn classify(inputs: &SignalInputs) -> Signal {
    let SignalInputs {
        close,
        rsi,
        ema,
        trend,
    } = *inputs;

    if rsi < OVERSOLD && close > ema && trend > 0.0 {
        Signal::Buy
    } else if rsi > OVERBOUGHT && close < ema && trend < 0.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
