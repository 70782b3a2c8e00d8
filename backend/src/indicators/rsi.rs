use super::moving_averages::Sma;
use crate::error::SignalError;

/// Relative Strength Index (RSI)
/// Compares the magnitude of recent gains to recent losses, in 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Averages are plain rolling means over `period` price changes (no Wilder
/// smoothing). A window with losses of exactly zero reads 100; a window with
/// neither gains nor losses has no defined value.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    average: Sma,
}

impl Rsi {
    pub const DEFAULT_PERIOD: usize = 14;

    pub fn new(period: usize) -> Result<Self, SignalError> {
        let average = Sma::new(period).map_err(|_| {
            SignalError::InvalidParameter("RSI period must be at least 1".to_string())
        })?;
        Ok(Self { average })
    }

    pub fn period(&self) -> usize {
        self.average.period()
    }

    /// Calculate RSI for a price series
    /// Returns a vector of the same length as input
    /// First `period` values are `None` (warmup period)
    pub fn calculate(&self, prices: &[f64]) -> Vec<Option<f64>> {
        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());

        // The first price has no previous bar to diff against
        if !prices.is_empty() {
            gains.push(None);
            losses.push(None);
        }

        for pair in prices.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(Some(if change > 0.0 { change } else { 0.0 }));
            losses.push(Some(if change < 0.0 { -change } else { 0.0 }));
        }

        let avg_gains = self.average.calculate(&gains);
        let avg_losses = self.average.calculate(&losses);

        avg_gains
            .into_iter()
            .zip(avg_losses)
            .map(|averages| match averages {
                (Some(avg_gain), Some(avg_loss)) => rsi_from_averages(avg_gain, avg_loss),
                _ => None,
            })
            .collect()
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        // 0/0 on a flat window stays undefined
        return (avg_gain > 0.0).then_some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
